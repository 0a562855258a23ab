//! In-memory activity log.

use crate::activity::{
    domain::{ActivityLog, ActivityLogId, ActivitySearchQuery, ActivitySearchResult, NewActivity},
    ports::{ActivityLogError, ActivityLogResult, ActivityLogger},
};
use crate::pagination::PageWindow;
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Thread-safe append-only activity log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActivityLogger {
    entries: Arc<RwLock<Vec<ActivityLog>>>,
}

impl InMemoryActivityLogger {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every entry in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityLogError::Persistence`] if the lock is poisoned.
    pub fn entries(&self) -> ActivityLogResult<Vec<ActivityLog>> {
        let entries = self.entries.read().map_err(lock_error)?;
        Ok(entries.clone())
    }
}

fn lock_error(err: impl std::fmt::Display) -> ActivityLogError {
    ActivityLogError::persistence(std::io::Error::other(err.to_string()))
}

fn contains_ignore_case(haystack: &str, needle: Option<&String>) -> bool {
    needle.is_none_or(|value| haystack.to_lowercase().contains(&value.to_lowercase()))
}

fn matches(entry: &ActivityLog, query: &ActivitySearchQuery) -> bool {
    query.user_id.is_none_or(|user_id| entry.user_id == user_id)
        && contains_ignore_case(&entry.activity, query.activity.as_ref())
        && contains_ignore_case(&entry.action, query.action.as_ref())
        && contains_ignore_case(&entry.resource, query.resource.as_ref())
}

#[async_trait]
impl ActivityLogger for InMemoryActivityLogger {
    async fn log_activity(&self, activity: NewActivity) -> ActivityLogResult<ActivityLog> {
        activity.validate()?;
        let mut entries = self.entries.write().map_err(lock_error)?;
        let next_id = i64::try_from(entries.len())
            .map_err(ActivityLogError::persistence)?
            .saturating_add(1);
        let entry = ActivityLog::from_new(ActivityLogId(next_id), activity);
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn search(
        &self,
        query: &ActivitySearchQuery,
        window: PageWindow,
    ) -> ActivityLogResult<ActivitySearchResult> {
        let entries = self.entries.read().map_err(lock_error)?;
        let mut matching: Vec<ActivityLog> = entries
            .iter()
            .filter(|entry| matches(entry, query))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(ActivitySearchResult {
            total_count: u64::try_from(matching.len()).unwrap_or(u64::MAX),
            activities: window.slice(&matching),
            page: window.page,
            per_page: window.per_page,
        })
    }
}
