//! Task lifecycle orchestration: CRUD, search, submission, and approval.

use super::guarded::guarded_mutation;
use crate::context::{OperationAborted, OperationContext};
use crate::error::{ErrorKind, ServiceError};
use crate::pagination::PaginationConfig;
use crate::task::{
    domain::{
        ApproveTaskCommand, CreateTaskCommand, NewTask, SearchTaskQuery, SearchTaskResult,
        SubmitTaskCommand, Task, TaskDomainError, TaskId, TaskValidationError,
        UpdateTaskCommand,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskTransaction},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// A command field failed validation.
    #[error(transparent)]
    Validation(#[from] TaskValidationError),

    /// A lifecycle guard rejected the operation.
    #[error(transparent)]
    Transition(#[from] TaskDomainError),

    /// The addressed task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Another task already uses the title.
    #[error("task already exists: {title}")]
    AlreadyExists {
        /// Title that collided.
        title: String,
    },

    /// The repository failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),
}

impl From<TaskRepositoryError> for TaskLifecycleError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::DuplicateTitle(title) => Self::AlreadyExists { title },
            TaskRepositoryError::NotFound(id) => Self::NotFound(id),
            other => Self::Repository(other),
        }
    }
}

impl ServiceError for TaskLifecycleError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::Conflict,
            Self::Transition(err) => match err {
                TaskDomainError::OnlyAssignedUserCanSubmit { .. }
                | TaskDomainError::OnlySuperuserCanApprove { .. } => ErrorKind::Forbidden,
                TaskDomainError::TaskIsNotPending { .. }
                | TaskDomainError::TaskIsNotReadyForApproval { .. } => ErrorKind::Conflict,
            },
            Self::Repository(_) => ErrorKind::Internal,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(err) => match err {
                TaskValidationError::InvalidTitle => "task.invalid-title",
                TaskValidationError::InvalidDescription => "task.invalid-description",
                TaskValidationError::InvalidUserId => "task.invalid-user-id",
                TaskValidationError::InvalidPriority(_) => "task.invalid-priority",
                TaskValidationError::InvalidDifficulty(_) => "task.invalid-difficulty",
                TaskValidationError::InvalidStatus(_) => "task.invalid-status",
            },
            Self::Transition(err) => match err {
                TaskDomainError::OnlyAssignedUserCanSubmit { .. } => {
                    "task.only-assigned-user-can-submit-the-task"
                }
                TaskDomainError::TaskIsNotPending { .. } => "task.is-not-pending",
                TaskDomainError::OnlySuperuserCanApprove { .. } => {
                    "task.only-superuser-can-approve-the-task"
                }
                TaskDomainError::TaskIsNotReadyForApproval { .. } => {
                    "task.is-not-ready-for-approval"
                }
            },
            Self::NotFound(_) => "task.not-found",
            Self::AlreadyExists { .. } => "task.already-exists",
            Self::Repository(TaskRepositoryError::Aborted(OperationAborted::Cancelled)) => {
                "task.operation-cancelled"
            }
            Self::Repository(TaskRepositoryError::Aborted(OperationAborted::DeadlineExceeded)) => {
                "task.deadline-exceeded"
            }
            Self::Repository(_) => "task.repository-failure",
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Every mutation runs its reads, its guard, and its write inside one
/// repository transaction.
#[derive(Clone)]
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync + 'static,
{
    repository: Arc<R>,
    clock: Arc<C>,
    pagination: PaginationConfig,
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a service with default pagination.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self::with_pagination(repository, clock, PaginationConfig::default())
    }

    /// Creates a service with explicit pagination defaults.
    #[must_use]
    pub const fn with_pagination(
        repository: Arc<R>,
        clock: Arc<C>,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            repository,
            clock,
            pagination,
        }
    }

    /// Creates a pending task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] for invalid fields and
    /// [`TaskLifecycleError::AlreadyExists`] when the title is taken.
    pub async fn create_task(
        &self,
        ctx: &OperationContext,
        command: &CreateTaskCommand,
    ) -> TaskLifecycleResult<Task> {
        let outcome = self.create_task_inner(ctx, command).await;
        match &outcome {
            Ok(task) => tracing::info!(task_id = %task.id(), title = task.title(), "task created"),
            Err(err) => log_failure("create_task", err),
        }
        outcome
    }

    async fn create_task_inner(
        &self,
        ctx: &OperationContext,
        command: &CreateTaskCommand,
    ) -> TaskLifecycleResult<Task> {
        let fields = command.validate()?;
        let clock = Arc::clone(&self.clock);

        guarded_mutation(
            &*self.repository,
            ctx,
            move |tx| {
                let existing = tx.find_by_title_or_id(None, &fields.title)?;
                Ok((fields, existing))
            },
            |_, (fields, existing)| {
                if existing.is_empty() {
                    Ok(fields)
                } else {
                    Err(TaskLifecycleError::AlreadyExists {
                        title: fields.title,
                    })
                }
            },
            move |tx, fields| Ok(tx.insert(NewTask::pending(fields, clock.as_ref()))?),
        )
        .await
    }

    /// Overwrites every mutable field of a task, status included.
    ///
    /// The status is written as given; the submit and approve guards do not
    /// apply to this path.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] for invalid fields,
    /// [`TaskLifecycleError::NotFound`] when neither the id nor the title
    /// matches a task, and [`TaskLifecycleError::AlreadyExists`] when the
    /// title belongs to a different task.
    pub async fn update_task(
        &self,
        ctx: &OperationContext,
        command: &UpdateTaskCommand,
    ) -> TaskLifecycleResult<Task> {
        let outcome = self.update_task_inner(ctx, command).await;
        match &outcome {
            Ok(task) => tracing::info!(
                task_id = %task.id(),
                status = %task.status(),
                "task updated"
            ),
            Err(err) => log_failure("update_task", err),
        }
        outcome
    }

    async fn update_task_inner(
        &self,
        ctx: &OperationContext,
        command: &UpdateTaskCommand,
    ) -> TaskLifecycleResult<Task> {
        let (fields, status) = command.validate()?;
        let id = command.id;
        let clock = Arc::clone(&self.clock);

        guarded_mutation(
            &*self.repository,
            ctx,
            move |tx| {
                let matches = tx.find_by_title_or_id(Some(id), &fields.title)?;
                Ok((fields, matches))
            },
            move |_, (fields, matches)| {
                let mut rows = matches.into_iter();
                match (rows.next(), rows.next()) {
                    (None, _) => Err(TaskLifecycleError::NotFound(id)),
                    (Some(task), None) if task.id() == id => Ok((task, fields)),
                    _ => Err(TaskLifecycleError::AlreadyExists {
                        title: fields.title,
                    }),
                }
            },
            move |tx, (mut task, fields)| {
                task.overwrite(fields, status, clock.as_ref());
                tx.update(&task)?;
                Ok(task)
            },
        )
        .await
    }

    /// Returns a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist.
    pub async fn get_task_by_id(
        &self,
        ctx: &OperationContext,
        id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        let found: TaskRepositoryResult<Option<Task>> = self.repository.find_by_id(ctx, id).await;
        let outcome = found
            .map_err(TaskLifecycleError::from)
            .and_then(|task| task.ok_or(TaskLifecycleError::NotFound(id)));
        if let Err(err) = &outcome {
            log_failure("get_task_by_id", err);
        }
        outcome
    }

    /// Deletes a task whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist.
    pub async fn delete_task(&self, ctx: &OperationContext, id: TaskId) -> TaskLifecycleResult<()> {
        let outcome = guarded_mutation(
            &*self.repository,
            ctx,
            move |tx| Ok(tx.find_by_id(id)?),
            move |_, found| found.ok_or(TaskLifecycleError::NotFound(id)),
            |tx, task| Ok(tx.delete(task.id())?),
        )
        .await;
        match &outcome {
            Ok(()) => tracing::info!(task_id = %id, "task deleted"),
            Err(err) => log_failure("delete_task", err),
        }
        outcome
    }

    /// Returns one page of matching tasks, newest first.
    ///
    /// `page` and `per_page` values of zero or less fall back to the
    /// service's pagination defaults.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] when the status filter is
    /// unknown.
    pub async fn search_tasks(
        &self,
        ctx: &OperationContext,
        query: &SearchTaskQuery,
    ) -> TaskLifecycleResult<SearchTaskResult> {
        let outcome = self.search_tasks_inner(ctx, query).await;
        match &outcome {
            Ok(result) => tracing::debug!(
                total_count = result.total_count,
                page = result.page,
                per_page = result.per_page,
                "task search served"
            ),
            Err(err) => log_failure("search_tasks", err),
        }
        outcome
    }

    async fn search_tasks_inner(
        &self,
        ctx: &OperationContext,
        query: &SearchTaskQuery,
    ) -> TaskLifecycleResult<SearchTaskResult> {
        let filter = query.to_filter()?;
        let window = self.pagination.window(query.page, query.per_page);
        let page = self.repository.search(ctx, &filter, window).await?;

        Ok(SearchTaskResult {
            total_count: page.total_count,
            tasks: page.tasks,
            page: window.page,
            per_page: window.per_page,
        })
    }

    /// Moves a pending task to review on behalf of its assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not
    /// exist, or [`TaskLifecycleError::Transition`] when the caller is not
    /// the assignee or the task is not pending.
    pub async fn submit_task(
        &self,
        ctx: &OperationContext,
        command: SubmitTaskCommand,
    ) -> TaskLifecycleResult<Task> {
        let SubmitTaskCommand { task_id, user_id } = command;
        let clock = Arc::clone(&self.clock);

        let outcome = guarded_mutation(
            &*self.repository,
            ctx,
            move |tx| require_task(tx, task_id),
            move |_, mut task| {
                task.submit(user_id, clock.as_ref())?;
                Ok(task)
            },
            write_status,
        )
        .await;
        match &outcome {
            Ok(task) => tracing::info!(
                task_id = %task_id,
                user_id = %user_id,
                status = %task.status(),
                "task submitted"
            ),
            Err(err) => log_failure("submit_task", err),
        }
        outcome
    }

    /// Completes a task under review.
    ///
    /// Approval is decided by the role on record for the task's owner; the
    /// approving caller's own role is not consulted here.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not
    /// exist, or [`TaskLifecycleError::Transition`] when the owner's role
    /// does not qualify or the task is not under review.
    pub async fn approve_task(
        &self,
        ctx: &OperationContext,
        command: ApproveTaskCommand,
    ) -> TaskLifecycleResult<Task> {
        let ApproveTaskCommand { task_id, user_id } = command;
        let clock = Arc::clone(&self.clock);

        let outcome = guarded_mutation(
            &*self.repository,
            ctx,
            move |tx| {
                let task = require_task(&mut *tx, task_id)?;
                let owner_role = tx.resolve_user_role(task.user_id())?;
                Ok((task, owner_role))
            },
            move |_, (mut task, owner_role)| {
                task.approve(owner_role, clock.as_ref())?;
                Ok(task)
            },
            write_status,
        )
        .await;
        match &outcome {
            Ok(task) => tracing::info!(
                task_id = %task_id,
                approver = %user_id,
                status = %task.status(),
                "task approved"
            ),
            Err(err) => log_failure("approve_task", err),
        }
        outcome
    }
}

fn require_task(tx: &mut dyn TaskTransaction, id: TaskId) -> TaskLifecycleResult<Task> {
    tx.find_by_id(id)?.ok_or(TaskLifecycleError::NotFound(id))
}

fn write_status(tx: &mut dyn TaskTransaction, task: Task) -> TaskLifecycleResult<Task> {
    tx.update_status(task.id(), task.status(), task.updated_at())?;
    Ok(task)
}

fn log_failure(operation: &'static str, err: &TaskLifecycleError) {
    if err.kind() == ErrorKind::Internal {
        tracing::error!(operation, code = err.code(), error = %err, "task operation failed");
    } else {
        tracing::warn!(operation, code = err.code(), error = %err, "task operation rejected");
    }
}
