//! Activity log records, commands, and search queries.

mod log;

pub use log::{
    ActivityLog, ActivityLogId, ActivitySearchQuery, ActivitySearchResult, ActivityValidationError,
    NewActivity,
};
