//! In-memory repository for task lifecycle tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::access::domain::Role;
use crate::context::OperationContext;
use crate::pagination::PageWindow;
use crate::task::{
    domain::{NewTask, PersistedTaskData, Task, TaskId, TaskPage, TaskSearchFilter, TaskStatus, UserId},
    ports::{
        RoleResolver, TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskTransaction,
    },
};

/// Thread-safe in-memory task repository.
///
/// Transactions are serialized behind a single mutex and run against a
/// working copy that replaces the committed state only on success.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<Mutex<InMemoryTaskState>>,
}

#[derive(Debug, Clone, Default)]
struct InMemoryTaskState {
    tasks: BTreeMap<TaskId, Task>,
    last_id: i64,
    user_roles: HashMap<UserId, String>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the role name stored for a user.
    ///
    /// Names that are not known roles resolve to no role.
    pub fn set_user_role(&self, user_id: UserId, role: impl Into<String>) {
        self.lock().user_roles.insert(user_id, role.into());
    }

    /// Returns the number of committed tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    /// Returns `true` when no task is committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().tasks.is_empty()
    }

    // A poisoned lock only means a transaction body panicked; committed
    // state is never modified in place, so it is still consistent.
    fn lock(&self) -> MutexGuard<'_, InMemoryTaskState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct InMemoryTaskTransaction<'a> {
    state: &'a mut InMemoryTaskState,
    ctx: &'a OperationContext,
}

impl InMemoryTaskTransaction<'_> {
    fn ensure_active(&self) -> TaskRepositoryResult<()> {
        Ok(self.ctx.ensure_active()?)
    }

    fn title_taken_by_other(&self, id: Option<TaskId>, title: &str) -> bool {
        self.state
            .tasks
            .values()
            .any(|task| task.title() == title && Some(task.id()) != id)
    }
}

impl RoleResolver for InMemoryTaskTransaction<'_> {
    fn resolve_user_role(&mut self, user_id: UserId) -> TaskRepositoryResult<Option<Role>> {
        self.ensure_active()?;
        Ok(self
            .state
            .user_roles
            .get(&user_id)
            .and_then(|name| Role::try_from(name.as_str()).ok()))
    }
}

impl TaskTransaction for InMemoryTaskTransaction<'_> {
    fn insert(&mut self, task: NewTask) -> TaskRepositoryResult<Task> {
        self.ensure_active()?;
        if self.title_taken_by_other(None, &task.fields.title) {
            return Err(TaskRepositoryError::DuplicateTitle(task.fields.title));
        }
        self.state.last_id = self.state.last_id.saturating_add(1);
        let stored = task.into_task(TaskId::new(self.state.last_id));
        self.state.tasks.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    fn update(&mut self, task: &Task) -> TaskRepositoryResult<()> {
        self.ensure_active()?;
        if !self.state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::NotFound(task.id()));
        }
        if self.title_taken_by_other(Some(task.id()), task.title()) {
            return Err(TaskRepositoryError::DuplicateTitle(task.title().to_owned()));
        }
        self.state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    fn find_by_id(&mut self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.ensure_active()?;
        Ok(self.state.tasks.get(&id).cloned())
    }

    fn find_by_title_or_id(
        &mut self,
        id: Option<TaskId>,
        title: &str,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.ensure_active()?;
        Ok(self
            .state
            .tasks
            .values()
            .filter(|task| Some(task.id()) == id || task.title() == title)
            .cloned()
            .collect())
    }

    fn update_status(
        &mut self,
        id: TaskId,
        status: TaskStatus,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()> {
        self.ensure_active()?;
        let stored = self
            .state
            .tasks
            .get(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        let data = PersistedTaskData {
            id,
            title: stored.title().to_owned(),
            description: stored.description().to_owned(),
            status,
            priority: stored.priority(),
            difficulty: stored.difficulty(),
            user_id: stored.user_id(),
            created_at: stored.created_at(),
            updated_at,
        };
        self.state.tasks.insert(id, Task::from_persisted(data));
        Ok(())
    }

    fn delete(&mut self, id: TaskId) -> TaskRepositoryResult<()> {
        self.ensure_active()?;
        self.state
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskRepositoryError::NotFound(id))
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn transaction<T, E, F>(&self, ctx: &OperationContext, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TaskRepositoryError> + Send + 'static,
    {
        ctx.ensure_active().map_err(TaskRepositoryError::from)?;
        let mut committed = self.lock();
        let mut working = committed.clone();
        let value = body(&mut InMemoryTaskTransaction {
            state: &mut working,
            ctx,
        })?;
        ctx.ensure_active().map_err(TaskRepositoryError::from)?;
        *committed = working;
        Ok(value)
    }

    async fn find_by_id(
        &self,
        ctx: &OperationContext,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<Task>> {
        ctx.ensure_active()?;
        Ok(self.lock().tasks.get(&id).cloned())
    }

    async fn search(
        &self,
        ctx: &OperationContext,
        filter: &TaskSearchFilter,
        window: PageWindow,
    ) -> TaskRepositoryResult<TaskPage> {
        ctx.ensure_active()?;
        let state = self.lock();
        let mut matching: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then(b.id().cmp(&a.id()))
        });

        Ok(TaskPage {
            total_count: u64::try_from(matching.len()).unwrap_or(u64::MAX),
            tasks: window.slice(&matching),
        })
    }
}
