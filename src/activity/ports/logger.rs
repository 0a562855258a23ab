//! Activity logger port.

use crate::activity::domain::{
    ActivityLog, ActivitySearchQuery, ActivitySearchResult, ActivityValidationError, NewActivity,
};
use crate::error::{ErrorKind, ServiceError};
use crate::pagination::PageWindow;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for activity logger operations.
pub type ActivityLogResult<T> = Result<T, ActivityLogError>;

/// Records and searches request activity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityLogger: Send + Sync {
    /// Validates and records one request.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityLogError::Invalid`] for incomplete commands or
    /// [`ActivityLogError::Persistence`] when the entry cannot be stored.
    async fn log_activity(&self, activity: NewActivity) -> ActivityLogResult<ActivityLog>;

    /// Returns one page of matching entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityLogError::Persistence`] when the log cannot be read.
    async fn search(
        &self,
        query: &ActivitySearchQuery,
        window: PageWindow,
    ) -> ActivityLogResult<ActivitySearchResult>;
}

/// Errors returned by activity logger implementations.
#[derive(Debug, Clone, Error)]
pub enum ActivityLogError {
    /// The command failed validation.
    #[error(transparent)]
    Invalid(#[from] ActivityValidationError),

    /// Persistence-layer failure.
    #[error("activity log error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ActivityLogError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl ServiceError for ActivityLogError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid(_) => ErrorKind::Validation,
            Self::Persistence(_) => ErrorKind::Internal,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "activity.invalid",
            Self::Persistence(_) => "activity.log-failure",
        }
    }
}
