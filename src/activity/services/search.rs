//! Paged search over recorded request activity.

use crate::activity::{
    domain::{ActivitySearchQuery, ActivitySearchResult},
    ports::{ActivityLogResult, ActivityLogger},
};
use crate::error::ServiceError;
use crate::pagination::PaginationConfig;
use std::sync::Arc;

/// Serves activity searches with the configured pagination defaults.
#[derive(Clone)]
pub struct ActivitySearchService<L>
where
    L: ActivityLogger,
{
    logger: Arc<L>,
    pagination: PaginationConfig,
}

impl<L> ActivitySearchService<L>
where
    L: ActivityLogger,
{
    /// Creates a service using the default pagination settings.
    #[must_use]
    pub fn new(logger: Arc<L>) -> Self {
        Self::with_pagination(logger, PaginationConfig::default())
    }

    /// Creates a service that falls back to `pagination` for unset paging.
    #[must_use]
    pub const fn with_pagination(logger: Arc<L>, pagination: PaginationConfig) -> Self {
        Self { logger, pagination }
    }

    /// Returns one page of matching entries, newest first.
    ///
    /// The query's `page` and `per_page` are served as given; values of zero
    /// or less fall back to the service's pagination defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::activity::ports::ActivityLogError::Persistence`] when the log cannot be read.
    pub async fn search(
        &self,
        query: &ActivitySearchQuery,
    ) -> ActivityLogResult<ActivitySearchResult> {
        let window = self.pagination.window(query.page, query.per_page);
        let outcome = self.logger.search(query, window).await;
        match &outcome {
            Ok(result) => tracing::debug!(
                total_count = result.total_count,
                page = result.page,
                per_page = result.per_page,
                "activity search served"
            ),
            Err(err) => tracing::error!(code = err.code(), error = %err, "activity search failed"),
        }
        outcome
    }
}
