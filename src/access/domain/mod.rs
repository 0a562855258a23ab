//! Domain model for roles, permissions, and authenticated principals.
//!
//! The permission tables are compile-time constants; nothing in this module
//! holds state or performs I/O.

mod error;
mod permission;
mod principal;
mod role;

pub use error::{ParsePermissionError, ParseRoleError};
pub use permission::{
    Permission, PermissionNamespace, has_permission, has_permission_by_name, has_task_permission,
    has_task_permission_by_name,
};
pub use principal::{Principal, TokenClaims, UserId};
pub use role::Role;
