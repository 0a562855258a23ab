//! Adapter implementations for activity auditing.

pub mod memory;

pub use memory::InMemoryActivityLogger;
