//! Application services for task lifecycle orchestration.

mod guarded;
mod lifecycle;

pub use lifecycle::{TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService};
