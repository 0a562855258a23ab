//! Response error envelope.

use crate::access::services::AccessError;
use crate::activity::ports::ActivityLogError;
use crate::error::{ErrorKind, ServiceError};
use crate::task::services::TaskLifecycleError;
use serde::Serialize;
use thiserror::Error;

/// Message returned in place of internal failure details.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Returns the HTTP status for an error kind.
#[must_use]
pub const fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::Validation => 400,
        ErrorKind::Unauthenticated => 401,
        ErrorKind::Forbidden => 403,
        ErrorKind::NotFound => 404,
        ErrorKind::Conflict => 409,
        ErrorKind::Internal => 500,
    }
}

/// Error body returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{status} {code}: {message}")]
pub struct ApiError {
    status: u16,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Maps a service error to its response form.
    ///
    /// Internal failures are logged in full and answered with
    /// [`INTERNAL_ERROR_MESSAGE`].
    #[must_use]
    pub fn from_service_error<E: ServiceError + ?Sized>(err: &E) -> Self {
        let kind = err.kind();
        let message = if kind == ErrorKind::Internal {
            tracing::error!(code = err.code(), error = %err, "internal error reached the API boundary");
            INTERNAL_ERROR_MESSAGE.to_owned()
        } else {
            err.to_string()
        };
        Self {
            status: status_for(kind),
            code: err.code(),
            message,
        }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Returns the caller-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        Self::from_service_error(&err)
    }
}

impl From<ActivityLogError> for ApiError {
    fn from(err: ActivityLogError) -> Self {
        Self::from_service_error(&err)
    }
}

impl From<TaskLifecycleError> for ApiError {
    fn from(err: TaskLifecycleError) -> Self {
        Self::from_service_error(&err)
    }
}
