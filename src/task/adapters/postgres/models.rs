//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Lifecycle status code.
    pub status: i16,
    /// Priority name.
    pub priority: String,
    /// Difficulty name.
    pub difficulty: String,
    /// Owning user.
    pub user_id: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Lifecycle status code.
    pub status: i16,
    /// Priority name.
    pub priority: String,
    /// Difficulty name.
    pub difficulty: String,
    /// Owning user.
    pub user_id: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset overwriting every mutable task column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct TaskChangeset {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Lifecycle status code.
    pub status: i16,
    /// Priority name.
    pub priority: String,
    /// Difficulty name.
    pub difficulty: String,
    /// Owning user.
    pub user_id: i64,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
