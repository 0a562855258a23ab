//! Domain model for task lifecycle management.
//!
//! The task domain models task validation, the status state machine, and
//! its guard conditions while keeping all infrastructure concerns outside of
//! the domain boundary.

mod command;
mod error;
mod ids;
mod search;
mod task;

pub use crate::access::domain::UserId;
pub use command::{
    ApproveTaskCommand, CreateTaskCommand, SubmitTaskCommand, TaskFields, UpdateTaskCommand,
};
pub use error::{ParseTaskAttributeError, TaskDomainError, TaskValidationError};
pub use ids::TaskId;
pub use search::{SearchTaskQuery, SearchTaskResult, TaskPage, TaskSearchFilter};
pub use task::{Difficulty, NewTask, PersistedTaskData, Priority, Task, TaskStatus};
