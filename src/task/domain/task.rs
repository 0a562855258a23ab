//! Task aggregate root and the lifecycle state machine.

use super::{ParseTaskAttributeError, TaskDomainError, TaskFields, TaskId, UserId};
use crate::access::domain::Role;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
///
/// Stored and serialized as a small integer starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum TaskStatus {
    /// Created and waiting for the assignee.
    Pending,
    /// Submitted by the assignee and awaiting approval.
    Reviewing,
    /// Approved.
    Done,
}

impl TaskStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Reviewing, Self::Done];

    /// Returns the storage code.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Pending => 1,
            Self::Reviewing => 2,
            Self::Done => 3,
        }
    }

    /// Returns the lowercase status name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::Done => "done",
        }
    }

    /// Returns whether the lifecycle permits moving from `self` to `next`.
    ///
    /// Only single forward steps exist; nothing leaves `Done`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Reviewing) | (Self::Reviewing, Self::Done)
        )
    }

    /// Returns whether no further transition exists.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done)
    }

    /// Parses a status from its code (`"1"`) or name (`"pending"`).
    ///
    /// # Errors
    ///
    /// Returns [`ParseTaskAttributeError`] for anything else.
    pub fn parse(value: &str) -> Result<Self, ParseTaskAttributeError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "1" | "pending" => Ok(Self::Pending),
            "2" | "reviewing" => Ok(Self::Reviewing),
            "3" | "done" => Ok(Self::Done),
            _ => Err(ParseTaskAttributeError::new("status", value)),
        }
    }
}

impl From<TaskStatus> for i16 {
    fn from(status: TaskStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i16> for TaskStatus {
    type Error = ParseTaskAttributeError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Pending),
            2 => Ok(Self::Reviewing),
            3 => Ok(Self::Done),
            _ => Err(ParseTaskAttributeError::new("status", value.to_string())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Medium priority.
    Medium,
    /// High priority.
    High,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParseTaskAttributeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseTaskAttributeError::new("priority", value)),
        }
    }
}

/// Task difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Easy.
    Easy,
    /// Medium.
    Medium,
    /// Hard.
    Hard,
}

impl Difficulty {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl TryFrom<&str> for Difficulty {
    type Error = ParseTaskAttributeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ParseTaskAttributeError::new("difficulty", value)),
        }
    }
}

/// Task aggregate root.
///
/// Serializes as a flat record with the status as its integer code. Tasks
/// are only built from validated commands or [`Task::from_persisted`], so
/// there is no way to decode one from untrusted input:
///
/// ```compile_fail
/// let task: taskdesk::task::domain::Task =
///     serde_json::from_str(r#"{"id":1,"title":"","user_id":0}"#).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    status: TaskStatus,
    priority: Priority,
    difficulty: Difficulty,
    user_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted difficulty.
    pub difficulty: Difficulty,
    /// Persisted owner.
    pub user_id: UserId,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A task that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Validated task fields.
    pub fields: TaskFields,
    /// Initial status; always [`TaskStatus::Pending`] from the lifecycle.
    pub status: TaskStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    /// Creates a pending task stamped with the current clock time.
    #[must_use]
    pub fn pending(fields: TaskFields, clock: &impl Clock) -> Self {
        Self {
            fields,
            status: TaskStatus::Pending,
            created_at: clock.utc(),
        }
    }

    /// Attaches the store-assigned identifier.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.fields.title,
            description: self.fields.description,
            status: self.status,
            priority: self.fields.priority,
            difficulty: self.fields.difficulty,
            user_id: self.fields.user_id,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            difficulty: data.difficulty,
            user_id: data.user_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the difficulty.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Returns the owner (assignee).
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Overwrites every mutable field, status included.
    ///
    /// This is the administrative update path; it does not consult the
    /// lifecycle transition rules.
    pub fn overwrite(&mut self, fields: TaskFields, status: TaskStatus, clock: &impl Clock) {
        self.title = fields.title;
        self.description = fields.description;
        self.priority = fields.priority;
        self.difficulty = fields.difficulty;
        self.user_id = fields.user_id;
        self.status = status;
        self.touch(clock);
    }

    /// Submits the task for review on behalf of `caller`.
    ///
    /// Ownership is checked before status, so a non-owner is always told
    /// they are not the assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::OnlyAssignedUserCanSubmit`] when `caller`
    /// is not the owner, or [`TaskDomainError::TaskIsNotPending`] when the
    /// task is not pending. The task is unchanged on error.
    pub fn submit(&mut self, caller: UserId, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if self.user_id != caller {
            return Err(TaskDomainError::OnlyAssignedUserCanSubmit {
                task_id: self.id,
                owner: self.user_id,
                caller,
            });
        }
        if self.status != TaskStatus::Pending {
            return Err(TaskDomainError::TaskIsNotPending {
                task_id: self.id,
                status: self.status,
            });
        }
        self.status = TaskStatus::Reviewing;
        self.touch(clock);
        Ok(())
    }

    /// Approves a task under review.
    ///
    /// `owner_role` is the role on record for the task's *owner*, not for
    /// the approving caller. Approval succeeds only when the owner is a
    /// `superuser` or a `user`. An approval rule keyed on the caller's role
    /// would reject a `user` caller and admit a `superuser` caller whatever
    /// the owner's role; that rule is not what this method enforces.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::OnlySuperuserCanApprove`] when the owner's
    /// role does not qualify, or [`TaskDomainError::TaskIsNotReadyForApproval`]
    /// when the task is not under review. The task is unchanged on error.
    pub fn approve(
        &mut self,
        owner_role: Option<Role>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !matches!(owner_role, Some(Role::Superuser | Role::User)) {
            return Err(TaskDomainError::OnlySuperuserCanApprove {
                task_id: self.id,
                owner: self.user_id,
                owner_role,
            });
        }
        if self.status != TaskStatus::Reviewing {
            return Err(TaskDomainError::TaskIsNotReadyForApproval {
                task_id: self.id,
                status: self.status,
            });
        }
        self.status = TaskStatus::Done;
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
