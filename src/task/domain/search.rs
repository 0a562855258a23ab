//! Task search queries and result pages.

use super::{Task, TaskStatus, TaskValidationError, UserId};
use serde::{Deserialize, Serialize};

/// Search request as received from a caller.
///
/// Title and description match case-insensitive substrings; status,
/// priority, difficulty, and owner match exactly. `page` and `per_page`
/// values of zero or less fall back to configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchTaskQuery {
    /// Title substring.
    pub title: Option<String>,
    /// Description substring.
    pub description: Option<String>,
    /// Status code (`"1"`) or name (`"pending"`).
    pub status: Option<String>,
    /// Exact priority name.
    pub priority: Option<String>,
    /// Exact difficulty name.
    pub difficulty: Option<String>,
    /// Exact owner.
    pub user_id: Option<UserId>,
    /// One-based page number.
    pub page: i64,
    /// Page size.
    pub per_page: i64,
}

impl SearchTaskQuery {
    /// Converts the query into repository filters.
    ///
    /// Empty strings are treated as absent filters.
    ///
    /// # Errors
    ///
    /// Returns [`TaskValidationError::InvalidStatus`] when the status filter
    /// names no known status.
    pub fn to_filter(&self) -> Result<TaskSearchFilter, TaskValidationError> {
        let status = non_empty(self.status.as_ref())
            .map(|value| {
                TaskStatus::parse(&value)
                    .map_err(|_| TaskValidationError::InvalidStatus(value.clone()))
            })
            .transpose()?;

        Ok(TaskSearchFilter {
            title: non_empty(self.title.as_ref()),
            description: non_empty(self.description.as_ref()),
            status,
            priority: non_empty(self.priority.as_ref()),
            difficulty: non_empty(self.difficulty.as_ref()),
            user_id: self.user_id,
        })
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|text| !text.is_empty()).cloned()
}

/// Normalized filters passed to the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSearchFilter {
    /// Case-insensitive title substring.
    pub title: Option<String>,
    /// Case-insensitive description substring.
    pub description: Option<String>,
    /// Exact status.
    pub status: Option<TaskStatus>,
    /// Exact priority name.
    pub priority: Option<String>,
    /// Exact difficulty name.
    pub difficulty: Option<String>,
    /// Exact owner.
    pub user_id: Option<UserId>,
}

impl TaskSearchFilter {
    /// Returns whether `task` satisfies every filter.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        contains_ignore_case(task.title(), self.title.as_deref())
            && contains_ignore_case(task.description(), self.description.as_deref())
            && self.status.is_none_or(|status| task.status() == status)
            && self
                .priority
                .as_deref()
                .is_none_or(|priority| task.priority().as_str() == priority)
            && self
                .difficulty
                .as_deref()
                .is_none_or(|difficulty| task.difficulty().as_str() == difficulty)
            && self.user_id.is_none_or(|user_id| task.user_id() == user_id)
    }
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    needle.is_none_or(|value| haystack.to_lowercase().contains(&value.to_lowercase()))
}

/// Rows returned by a repository search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    /// Rows in the requested window, newest first.
    pub tasks: Vec<Task>,
    /// Matching rows across all windows.
    pub total_count: u64,
}

/// Search response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchTaskResult {
    /// Matching tasks across all pages.
    pub total_count: u64,
    /// Tasks on this page, newest first.
    #[serde(rename = "result")]
    pub tasks: Vec<Task>,
    /// Page number served.
    pub page: i64,
    /// Page size served.
    pub per_page: i64,
}
