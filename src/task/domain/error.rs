//! Error types for task validation, parsing, and state transitions.

use super::{TaskId, TaskStatus, UserId};
use crate::access::domain::Role;
use thiserror::Error;

/// Errors returned when a task command carries invalid field values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskValidationError {
    /// The title is missing or too short.
    #[error("invalid task title")]
    InvalidTitle,

    /// The description is missing or too short.
    #[error("invalid task description")]
    InvalidDescription,

    /// The owning user identifier is not positive.
    #[error("invalid user id")]
    InvalidUserId,

    /// The priority is not one of `low`, `medium`, or `high`.
    #[error("invalid task priority: {0}")]
    InvalidPriority(String),

    /// The difficulty is not one of `easy`, `medium`, or `hard`.
    #[error("invalid task difficulty: {0}")]
    InvalidDifficulty(String),

    /// The status is not a known lifecycle status.
    #[error("invalid task status: {0}")]
    InvalidStatus(String),
}

/// Error returned while parsing a task attribute from text or storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task {attribute}: {value}")]
pub struct ParseTaskAttributeError {
    /// Attribute being parsed.
    pub attribute: &'static str,
    /// Rejected input.
    pub value: String,
}

impl ParseTaskAttributeError {
    pub(crate) fn new(attribute: &'static str, value: impl Into<String>) -> Self {
        Self {
            attribute,
            value: value.into(),
        }
    }
}

/// Guard failures raised by lifecycle transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// Only the task's assignee may submit it.
    #[error("only the assigned user can submit task {task_id}")]
    OnlyAssignedUserCanSubmit {
        /// Task being submitted.
        task_id: TaskId,
        /// Assigned user.
        owner: UserId,
        /// User that attempted the submission.
        caller: UserId,
    },

    /// Submission requires the task to be pending.
    #[error("task {task_id} is not pending (status {status})")]
    TaskIsNotPending {
        /// Task being submitted.
        task_id: TaskId,
        /// Status found.
        status: TaskStatus,
    },

    /// Approval requires the task owner to hold an approving role.
    #[error("only superuser can approve task {task_id}")]
    OnlySuperuserCanApprove {
        /// Task being approved.
        task_id: TaskId,
        /// Task owner whose role was checked.
        owner: UserId,
        /// Owner role on record, if any.
        owner_role: Option<Role>,
    },

    /// Approval requires the task to be under review.
    #[error("task {task_id} is not ready for approval (status {status})")]
    TaskIsNotReadyForApproval {
        /// Task being approved.
        task_id: TaskId,
        /// Status found.
        status: TaskStatus,
    },
}
