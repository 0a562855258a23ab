//! Activity log orchestration.

mod search;

pub use search::ActivitySearchService;
