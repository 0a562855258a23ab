//! Task lifecycle management.
//!
//! Tasks move through a fixed lifecycle, `Pending` → `Reviewing` → `Done`.
//! The assigned user submits a pending task for review and an approval
//! completes it. Plain CRUD and search operations sit alongside the state
//! machine; the generic update path may overwrite the status directly and
//! is not bound by the transition guards. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
