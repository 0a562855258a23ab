//! Activity auditing for authenticated requests.
//!
//! The authorization gate records one entry per request that passes token
//! validation. Entries capture the HTTP method, the route path, and the
//! original URL so the audit trail can be searched later through
//! [`services::ActivitySearchService`].

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
