//! Taskdesk: role-gated task lifecycle core.
//!
//! This crate provides the task lifecycle state machine, the role and
//! permission model, and the request authorization gate that sits in front
//! of every task operation.
//!
//! # Architecture
//!
//! Taskdesk follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, tokens, etc.)
//!
//! # Modules
//!
//! - [`access`]: Roles, permissions, tokens, and the authorization gate
//! - [`activity`]: Per-request activity log
//! - [`task`]: Task CRUD, search, and the submit/approve lifecycle
//! - [`api`]: Error mapping at the transport boundary

pub mod access;
pub mod activity;
pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod pagination;
pub mod task;
pub mod telemetry;
