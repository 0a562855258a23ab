//! Shared helpers for `PostgreSQL` integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool};
use eyre::Result;
use mockable::DefaultClock;
use rstest::fixture;
use taskdesk::context::OperationContext;
use taskdesk::task::{adapters::postgres::PostgresTaskRepository, services::TaskLifecycleService};

/// Variable naming the server the suite runs against.
pub const DATABASE_URL_VAR: &str = "TASKDESK_TEST_DATABASE_URL";

/// Schema migration applied to every test schema.
pub const CREATE_TASKS_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_tasks/up.sql");

static NEXT_SCHEMA: AtomicU32 = AtomicU32::new(0);

/// Lifecycle service backed by the `PostgreSQL` repository.
pub type PgService = TaskLifecycleService<PostgresTaskRepository, DefaultClock>;

#[derive(Debug)]
struct SearchPath(String);

impl CustomizeConnection<PgConnection, r2d2::Error> for SearchPath {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!("SET search_path TO {}", self.0))
            .map_err(r2d2::Error::QueryError)
    }
}

/// A migrated private schema plus a repository and service bound to it.
///
/// The schema is dropped when the value goes out of scope.
pub struct PgWorld {
    url: String,
    schema: String,
    /// Repository whose pool is scoped to the schema.
    pub repository: Arc<PostgresTaskRepository>,
    /// Service writing through `repository`.
    pub service: PgService,
    /// Context for each call.
    pub ctx: OperationContext,
}

impl PgWorld {
    fn create(url: String) -> Result<Self> {
        let schema = format!(
            "taskdesk_test_{}_{}",
            std::process::id(),
            NEXT_SCHEMA.fetch_add(1, Ordering::Relaxed)
        );
        let mut conn = PgConnection::establish(&url)?;
        conn.batch_execute(&format!(
            "DROP SCHEMA IF EXISTS {schema} CASCADE; CREATE SCHEMA {schema}; SET search_path TO {schema};"
        ))?;
        conn.batch_execute(CREATE_TASKS_SQL)?;

        let pool = Pool::builder()
            .max_size(4)
            .connection_customizer(Box::new(SearchPath(schema.clone())))
            .build(ConnectionManager::<PgConnection>::new(url.as_str()))?;
        let repository = Arc::new(PostgresTaskRepository::new(pool));
        Ok(Self {
            service: TaskLifecycleService::new(Arc::clone(&repository), Arc::new(DefaultClock)),
            repository,
            ctx: OperationContext::background(),
            url,
            schema,
        })
    }

    /// Records `role` for `user_id` in the schema's users table.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or insert fails.
    pub fn seed_user(&self, user_id: i64, role: &str) -> Result<()> {
        let mut conn = PgConnection::establish(&self.url)?;
        conn.batch_execute(&format!("SET search_path TO {}", self.schema))?;
        diesel::sql_query("INSERT INTO users (id, role) VALUES ($1, $2)")
            .bind::<diesel::sql_types::BigInt, _>(user_id)
            .bind::<diesel::sql_types::Text, _>(role)
            .execute(&mut conn)?;
        Ok(())
    }
}

impl Drop for PgWorld {
    fn drop(&mut self) {
        if let Ok(mut conn) = PgConnection::establish(&self.url) {
            drop(conn.batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema)));
        }
    }
}

/// Provides a migrated schema, or `None` when no test server is configured.
#[fixture]
pub fn pg_world() -> Result<Option<PgWorld>> {
    match std::env::var(DATABASE_URL_VAR) {
        Ok(url) if !url.trim().is_empty() => PgWorld::create(url).map(Some),
        _ => {
            eprintln!("{DATABASE_URL_VAR} is unset; skipping PostgreSQL test");
            Ok(None)
        }
    }
}
