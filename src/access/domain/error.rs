//! Error types for role and permission parsing.

use thiserror::Error;

/// Error returned while parsing a role name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

/// Error returned while parsing a permission name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown permission: {0}")]
pub struct ParsePermissionError(pub String);
