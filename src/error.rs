//! Error taxonomy shared by every service error.
//!
//! Each service error reports one [`ErrorKind`] and a stable machine-readable
//! code; the [`crate::api`] boundary turns the kind into an HTTP status.

use serde::Serialize;

/// Category of failure surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input shape or value; correctable by the caller.
    Validation,
    /// The addressed resource does not exist.
    NotFound,
    /// Duplicate resource or invalid state transition.
    Conflict,
    /// Missing, malformed, invalid, or revoked credentials.
    Unauthenticated,
    /// Authenticated caller lacks the required role, permission, or
    /// ownership.
    Forbidden,
    /// Storage or transport failure; details stay server-side.
    Internal,
}

/// Common interface of errors that cross the service boundary.
pub trait ServiceError: std::error::Error {
    /// Returns the failure category.
    fn kind(&self) -> ErrorKind;

    /// Returns the stable machine-readable code.
    fn code(&self) -> &'static str;
}
