//! Role and permission model plus the request authorization gate.
//!
//! Every mutating call passes through the gate before it reaches the task
//! lifecycle: the bearer token is validated, checked against the blacklist,
//! and the caller's role is evaluated against the route's guard chain. The
//! module follows the same hexagonal layout as [`crate::task`]:
//!
//! - Static role and permission tables in [`domain`]
//! - Token validation and blacklist contracts in [`ports`]
//! - `jsonwebtoken` and in-memory implementations in [`adapters`]
//! - The composed gate in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
