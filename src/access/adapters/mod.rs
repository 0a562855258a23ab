//! Adapter implementations for the authorization ports.

pub mod jwt;
pub mod memory;

pub use jwt::{HmacJwtCodec, TokenIssueError};
pub use memory::InMemoryTokenBlacklist;
