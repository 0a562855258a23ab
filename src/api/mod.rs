//! Boundary mapping from service errors to HTTP-shaped responses.
//!
//! Routing and transport are left to the embedding server; this module only
//! fixes the status, code, and message each error surfaces as.

mod error;

pub use error::{ApiError, INTERNAL_ERROR_MESSAGE, status_for};
