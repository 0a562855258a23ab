//! Port contracts for activity auditing.

pub mod logger;

pub use logger::{ActivityLogError, ActivityLogResult, ActivityLogger};

#[cfg(test)]
pub use logger::MockActivityLogger;
