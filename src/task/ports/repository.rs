//! Repository port for task persistence, lookup, and owner role resolution.
//!
//! Writes happen through a [`TaskTransaction`] handed to the body of
//! [`TaskRepository::transaction`]. Every read a guard depends on and the
//! write it protects run against the same transaction, so a check cannot
//! be invalidated before the write lands.

use crate::access::domain::Role;
use crate::context::{OperationAborted, OperationContext};
use crate::pagination::PageWindow;
use crate::task::domain::{NewTask, Task, TaskId, TaskPage, TaskSearchFilter, TaskStatus, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Looks up the role on record for a user.
pub trait RoleResolver {
    /// Returns the user's role, or `None` when the user has no known role.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError`] when the lookup fails.
    fn resolve_user_role(&mut self, user_id: UserId) -> TaskRepositoryResult<Option<Role>>;
}

/// Unit of work scoped to one repository transaction.
///
/// Implementations check the operation context before every statement.
pub trait TaskTransaction: RoleResolver {
    /// Stores a new task and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTitle`] when another task
    /// already uses the title.
    fn insert(&mut self, task: NewTask) -> TaskRepositoryResult<Task>;

    /// Persists every mutable field of an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist or [`TaskRepositoryError::DuplicateTitle`] when the new title
    /// collides with another task.
    fn update(&mut self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    fn find_by_id(&mut self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task whose identifier equals `id` or whose title equals
    /// `title`. With `id` of `None` only the title is matched.
    fn find_by_title_or_id(
        &mut self,
        id: Option<TaskId>,
        title: &str,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Writes only the status and update timestamp of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    fn update_status(
        &mut self,
        id: TaskId,
        status: TaskStatus,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()>;

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    fn delete(&mut self, id: TaskId) -> TaskRepositoryResult<()>;
}

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Runs `body` inside one atomic transaction.
    ///
    /// The transaction commits only when `body` returns `Ok` and the context
    /// is still active. An error, a fired context, or a panic inside `body`
    /// leaves committed state untouched; panics resume on the caller after
    /// rollback.
    ///
    /// # Errors
    ///
    /// Returns the body's error, or a [`TaskRepositoryError`] converted into
    /// `E` when the transaction itself fails.
    async fn transaction<T, E, F>(&self, ctx: &OperationContext, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TaskRepositoryError> + Send + 'static;

    /// Finds a task by identifier outside any transaction.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(
        &self,
        ctx: &OperationContext,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the window of matching tasks, newest first, with the total
    /// match count.
    async fn search(
        &self,
        ctx: &OperationContext,
        filter: &TaskSearchFilter,
        window: PageWindow,
    ) -> TaskRepositoryResult<TaskPage>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// Another task already uses the title.
    #[error("duplicate task title: {0}")]
    DuplicateTitle(String),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The operation context fired before the work completed.
    #[error(transparent)]
    Aborted(#[from] OperationAborted),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
