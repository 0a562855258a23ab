//! `PostgreSQL` repository implementation for task lifecycle storage.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::{tasks, users},
};
use crate::access::domain::Role;
use crate::context::OperationContext;
use crate::pagination::PageWindow;
use crate::task::{
    domain::{
        Difficulty, NewTask, PersistedTaskData, Priority, Task, TaskId, TaskPage,
        TaskSearchFilter, TaskStatus, UserId,
    },
    ports::{
        RoleResolver, TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskTransaction,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool for `database_url`.
///
/// Accepts both URL (`postgres://...`) and key/value connection strings.
///
/// # Errors
///
/// Returns [`PoolError`] when the pool cannot open its initial connections.
pub fn build_pool(database_url: &str) -> Result<TaskPgPool, PoolError> {
    Pool::builder().build(ConnectionManager::new(database_url))
}

/// Name of the unique index backing title uniqueness.
const TITLE_UNIQUE_INDEX: &str = "idx_tasks_title_unique";

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, ctx: &OperationContext, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let op_ctx = ctx.clone();
        tokio::task::spawn_blocking(move || {
            op_ctx.ensure_active()?;
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

/// Error carried out of a Diesel transaction closure.
enum TransactionFailure<E> {
    Body(E),
    Store(DieselError),
}

impl<E> From<DieselError> for TransactionFailure<E> {
    fn from(err: DieselError) -> Self {
        Self::Store(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn transaction<T, E, F>(&self, ctx: &OperationContext, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TaskRepositoryError> + Send + 'static,
    {
        let pool = self.pool.clone();
        let op_ctx = ctx.clone();
        let joined = tokio::task::spawn_blocking(move || -> Result<T, E> {
            op_ctx.ensure_active().map_err(TaskRepositoryError::from)?;
            let mut pooled = pool.get().map_err(TaskRepositoryError::persistence)?;
            let connection: &mut PgConnection = &mut pooled;
            connection
                .transaction::<T, TransactionFailure<E>, _>(|conn| {
                    let mut unit_of_work = PgTaskTransaction {
                        connection: conn,
                        ctx: &op_ctx,
                    };
                    let value = body(&mut unit_of_work).map_err(TransactionFailure::Body)?;
                    op_ctx
                        .ensure_active()
                        .map_err(|aborted| {
                            TransactionFailure::Body(E::from(TaskRepositoryError::from(aborted)))
                        })?;
                    Ok(value)
                })
                .map_err(|failure| match failure {
                    TransactionFailure::Body(err) => err,
                    TransactionFailure::Store(err) => {
                        E::from(TaskRepositoryError::persistence(err))
                    }
                })
        })
        .await;

        // A panicking body leaves the transaction open; the pool discards
        // connections released while panicking, which rolls it back.
        match joined {
            Ok(result) => result,
            Err(join_error) if join_error.is_panic() => {
                std::panic::resume_unwind(join_error.into_panic())
            }
            Err(join_error) => Err(E::from(TaskRepositoryError::persistence(join_error))),
        }
    }

    async fn find_by_id(
        &self,
        ctx: &OperationContext,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(ctx, move |connection| find_task(connection, id))
            .await
    }

    async fn search(
        &self,
        ctx: &OperationContext,
        filter: &TaskSearchFilter,
        window: PageWindow,
    ) -> TaskRepositoryResult<TaskPage> {
        let search_filter = filter.clone();
        self.run_blocking(ctx, move |connection| {
            let total = filtered_tasks(&search_filter)
                .count()
                .get_result::<i64>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            let rows = filtered_tasks(&search_filter)
                .select(TaskRow::as_select())
                .order((tasks::created_at.desc(), tasks::id.desc()))
                .limit(window.limit())
                .offset(window.offset())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;

            Ok(TaskPage {
                tasks: rows
                    .into_iter()
                    .map(row_to_task)
                    .collect::<TaskRepositoryResult<Vec<_>>>()?,
                total_count: u64::try_from(total).map_err(TaskRepositoryError::persistence)?,
            })
        })
        .await
    }
}

struct PgTaskTransaction<'a> {
    connection: &'a mut PgConnection,
    ctx: &'a OperationContext,
}

impl RoleResolver for PgTaskTransaction<'_> {
    fn resolve_user_role(&mut self, user_id: UserId) -> TaskRepositoryResult<Option<Role>> {
        self.ctx.ensure_active()?;
        let role_name = users::table
            .find(user_id.value())
            .select(users::role)
            .first::<String>(&mut *self.connection)
            .optional()
            .map_err(TaskRepositoryError::persistence)?;
        Ok(role_name.and_then(|name| Role::try_from(name.as_str()).ok()))
    }
}

impl TaskTransaction for PgTaskTransaction<'_> {
    fn insert(&mut self, task: NewTask) -> TaskRepositoryResult<Task> {
        self.ctx.ensure_active()?;
        let new_row = to_new_row(&task);
        let row = diesel::insert_into(tasks::table)
            .values(&new_row)
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(&mut *self.connection)
            .map_err(|err| map_write_error(err, &new_row.title))?;
        row_to_task(row)
    }

    fn update(&mut self, task: &Task) -> TaskRepositoryResult<()> {
        self.ctx.ensure_active()?;
        let changeset = TaskChangeset {
            title: task.title().to_owned(),
            description: task.description().to_owned(),
            status: task.status().code(),
            priority: task.priority().as_str().to_owned(),
            difficulty: task.difficulty().as_str().to_owned(),
            user_id: task.user_id().value(),
            updated_at: task.updated_at(),
        };
        let affected = diesel::update(tasks::table.find(task.id().value()))
            .set(&changeset)
            .execute(&mut *self.connection)
            .map_err(|err| map_write_error(err, task.title()))?;
        ensure_affected(affected, task.id())
    }

    fn find_by_id(&mut self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.ctx.ensure_active()?;
        find_task(&mut *self.connection, id)
    }

    fn find_by_title_or_id(
        &mut self,
        id: Option<TaskId>,
        title: &str,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.ctx.ensure_active()?;
        let rows = match id {
            Some(task_id) => tasks::table
                .filter(tasks::id.eq(task_id.value()).or(tasks::title.eq(title)))
                .select(TaskRow::as_select())
                .load::<TaskRow>(&mut *self.connection),
            None => tasks::table
                .filter(tasks::title.eq(title))
                .select(TaskRow::as_select())
                .load::<TaskRow>(&mut *self.connection),
        }
        .map_err(TaskRepositoryError::persistence)?;
        rows.into_iter().map(row_to_task).collect()
    }

    fn update_status(
        &mut self,
        id: TaskId,
        status: TaskStatus,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()> {
        self.ctx.ensure_active()?;
        let affected = diesel::update(tasks::table.find(id.value()))
            .set((
                tasks::status.eq(status.code()),
                tasks::updated_at.eq(updated_at),
            ))
            .execute(&mut *self.connection)
            .map_err(TaskRepositoryError::persistence)?;
        ensure_affected(affected, id)
    }

    fn delete(&mut self, id: TaskId) -> TaskRepositoryResult<()> {
        self.ctx.ensure_active()?;
        let affected = diesel::delete(tasks::table.find(id.value()))
            .execute(&mut *self.connection)
            .map_err(TaskRepositoryError::persistence)?;
        ensure_affected(affected, id)
    }
}

fn find_task(connection: &mut PgConnection, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
    let row = tasks::table
        .find(id.value())
        .select(TaskRow::as_select())
        .first::<TaskRow>(connection)
        .optional()
        .map_err(TaskRepositoryError::persistence)?;
    row.map(row_to_task).transpose()
}

fn filtered_tasks(filter: &TaskSearchFilter) -> tasks::BoxedQuery<'static, Pg> {
    let mut query = tasks::table.into_boxed();
    if let Some(title) = &filter.title {
        query = query.filter(tasks::title.ilike(contains_pattern(title)));
    }
    if let Some(description) = &filter.description {
        query = query.filter(tasks::description.ilike(contains_pattern(description)));
    }
    if let Some(status) = filter.status {
        query = query.filter(tasks::status.eq(status.code()));
    }
    if let Some(priority) = &filter.priority {
        query = query.filter(tasks::priority.eq(priority.clone()));
    }
    if let Some(difficulty) = &filter.difficulty {
        query = query.filter(tasks::difficulty.eq(difficulty.clone()));
    }
    if let Some(user_id) = filter.user_id {
        query = query.filter(tasks::user_id.eq(user_id.value()));
    }
    query
}

// `\` is the default `LIKE` escape; `%` and `_` in user input match literally.
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len().saturating_add(2));
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

const fn ensure_affected(affected: usize, id: TaskId) -> TaskRepositoryResult<()> {
    if affected == 0 {
        return Err(TaskRepositoryError::NotFound(id));
    }
    Ok(())
}

fn to_new_row(task: &NewTask) -> NewTaskRow {
    NewTaskRow {
        title: task.fields.title.clone(),
        description: task.fields.description.clone(),
        status: task.status.code(),
        priority: task.fields.priority.as_str().to_owned(),
        difficulty: task.fields.difficulty.as_str().to_owned(),
        user_id: task.fields.user_id.value(),
        created_at: task.created_at,
        updated_at: task.created_at,
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        title,
        description,
        status: persisted_status,
        priority: persisted_priority,
        difficulty: persisted_difficulty,
        user_id,
        created_at,
        updated_at,
    } = row;

    let status =
        TaskStatus::try_from(persisted_status).map_err(TaskRepositoryError::persistence)?;
    let priority = Priority::try_from(persisted_priority.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let difficulty = Difficulty::try_from(persisted_difficulty.as_str())
        .map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::new(id),
        title,
        description,
        status,
        priority,
        difficulty,
        user_id: UserId::new(user_id),
        created_at,
        updated_at,
    }))
}

fn map_write_error(err: DieselError, title: &str) -> TaskRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_title_unique_violation(info.as_ref()) =>
        {
            TaskRepositoryError::DuplicateTitle(title.to_owned())
        }
        _ => TaskRepositoryError::persistence(err),
    }
}

fn is_title_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == TITLE_UNIQUE_INDEX)
}
