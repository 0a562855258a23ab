//! Activity log entries.

use crate::access::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store-assigned identifier of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLogId(pub i64);

/// Error returned when an activity command is incomplete.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("user_id, activity, action, and resource fields are required")]
pub struct ActivityValidationError;

/// Command describing one request to record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
    /// Caller that issued the request.
    pub user_id: UserId,
    /// HTTP method.
    pub activity: String,
    /// Route path.
    pub action: String,
    /// Original request URL including the query string.
    pub resource: String,
    /// Free-form details.
    pub details: String,
    /// When the request was received.
    pub created_at: DateTime<Utc>,
}

impl NewActivity {
    /// Checks that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityValidationError`] if the user identifier is not
    /// positive or the activity, action, or resource is empty.
    pub fn validate(&self) -> Result<(), ActivityValidationError> {
        let complete = self.user_id.is_valid()
            && !self.activity.is_empty()
            && !self.action.is_empty()
            && !self.resource.is_empty();
        if complete {
            Ok(())
        } else {
            Err(ActivityValidationError)
        }
    }
}

/// Persisted activity entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLog {
    /// Entry identifier.
    pub id: ActivityLogId,
    /// Caller that issued the request.
    pub user_id: UserId,
    /// HTTP method.
    pub activity: String,
    /// Route path.
    pub action: String,
    /// Original request URL.
    pub resource: String,
    /// Free-form details.
    pub details: String,
    /// When the request was received.
    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    /// Builds a persisted entry from a recorded command.
    #[must_use]
    pub fn from_new(id: ActivityLogId, activity: NewActivity) -> Self {
        Self {
            id,
            user_id: activity.user_id,
            activity: activity.activity,
            action: activity.action,
            resource: activity.resource,
            details: activity.details,
            created_at: activity.created_at,
        }
    }
}

/// Filters for searching the activity log.
///
/// Text filters match case-insensitive substrings; `page` and `per_page`
/// values of zero or less fall back to configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivitySearchQuery {
    /// Exact caller filter.
    pub user_id: Option<UserId>,
    /// Method filter.
    pub activity: Option<String>,
    /// Path filter.
    pub action: Option<String>,
    /// URL filter.
    pub resource: Option<String>,
    /// One-based page number.
    pub page: i64,
    /// Page size.
    pub per_page: i64,
}

/// One page of activity entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivitySearchResult {
    /// Matching entries across all pages.
    pub total_count: u64,
    /// Entries on this page, newest first.
    pub activities: Vec<ActivityLog>,
    /// Page number served.
    pub page: i64,
    /// Page size served.
    pub per_page: i64,
}
