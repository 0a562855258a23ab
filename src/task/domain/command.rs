//! Commands accepted by the task lifecycle and their validation rules.

use super::{Difficulty, Priority, TaskId, TaskStatus, TaskValidationError, UserId};
use serde::{Deserialize, Serialize};

/// Minimum number of bytes a title or description must exceed.
const MIN_TEXT_LEN: usize = 2;

/// Validated fields shared by task creation and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    /// Task title; unique across all tasks.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Task priority.
    pub priority: Priority,
    /// Task difficulty.
    pub difficulty: Difficulty,
    /// Owner (assignee).
    pub user_id: UserId,
}

impl TaskFields {
    fn validate(
        title: &str,
        description: &str,
        user_id: UserId,
        priority: &str,
        difficulty: &str,
    ) -> Result<Self, TaskValidationError> {
        if title.len() <= MIN_TEXT_LEN {
            return Err(TaskValidationError::InvalidTitle);
        }
        if description.len() <= MIN_TEXT_LEN {
            return Err(TaskValidationError::InvalidDescription);
        }
        if !user_id.is_valid() {
            return Err(TaskValidationError::InvalidUserId);
        }
        let parsed_priority = Priority::try_from(priority)
            .map_err(|_| TaskValidationError::InvalidPriority(priority.to_owned()))?;
        let parsed_difficulty = Difficulty::try_from(difficulty)
            .map_err(|_| TaskValidationError::InvalidDifficulty(difficulty.to_owned()))?;

        Ok(Self {
            title: title.to_owned(),
            description: description.to_owned(),
            priority: parsed_priority,
            difficulty: parsed_difficulty,
            user_id,
        })
    }
}

/// Request to create a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskCommand {
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Priority name: `low`, `medium`, or `high`.
    pub priority: String,
    /// Difficulty name: `easy`, `medium`, or `hard`.
    pub difficulty: String,
    /// Owner (assignee).
    pub user_id: UserId,
}

impl CreateTaskCommand {
    /// Creates a command from raw field values.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: impl Into<String>,
        difficulty: impl Into<String>,
        user_id: UserId,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority: priority.into(),
            difficulty: difficulty.into(),
            user_id,
        }
    }

    /// Checks the field rules and returns the typed fields.
    ///
    /// Checks run in order: title, description, user, priority, difficulty;
    /// the first failure is reported.
    ///
    /// # Errors
    ///
    /// Returns the [`TaskValidationError`] of the first failing field.
    pub fn validate(&self) -> Result<TaskFields, TaskValidationError> {
        TaskFields::validate(
            &self.title,
            &self.description,
            self.user_id,
            &self.priority,
            &self.difficulty,
        )
    }
}

/// Request to overwrite an existing task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaskCommand {
    /// Task to update.
    pub id: TaskId,
    /// New title.
    pub title: String,
    /// New description.
    pub description: String,
    /// New priority name.
    pub priority: String,
    /// New difficulty name.
    pub difficulty: String,
    /// New status code; written as-is without transition checks.
    pub status: i16,
    /// New owner.
    pub user_id: UserId,
}

impl UpdateTaskCommand {
    /// Checks the field rules and returns the typed fields and status.
    ///
    /// A non-positive task identifier is reported as an invalid title.
    ///
    /// # Errors
    ///
    /// Returns the [`TaskValidationError`] of the first failing field.
    pub fn validate(&self) -> Result<(TaskFields, TaskStatus), TaskValidationError> {
        if !self.id.is_valid() {
            return Err(TaskValidationError::InvalidTitle);
        }
        let fields = TaskFields::validate(
            &self.title,
            &self.description,
            self.user_id,
            &self.priority,
            &self.difficulty,
        )?;
        let status = TaskStatus::try_from(self.status)
            .map_err(|_| TaskValidationError::InvalidStatus(self.status.to_string()))?;
        Ok((fields, status))
    }
}

/// Request by a user to submit their task for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitTaskCommand {
    /// Task to submit.
    pub task_id: TaskId,
    /// Submitting user.
    pub user_id: UserId,
}

/// Request to approve a task under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveTaskCommand {
    /// Task to approve.
    pub task_id: TaskId,
    /// Approving user. Approval authority is decided by the task owner's
    /// role, not by this user's.
    pub user_id: UserId,
}
