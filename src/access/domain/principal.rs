//! Authenticated callers and the token claims they are derived from.

use super::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Positive identifier of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wraps a raw user identifier without validation.
    ///
    /// Commands validate positivity themselves so that the failure is
    /// reported with the command's own error.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns `true` for identifiers greater than zero.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Identifier of the authenticated user.
    pub user_id: UserId,
    /// Role name as issued; may not be a known role.
    pub role: String,
    /// Expiry as seconds since the Unix epoch.
    pub exp: u64,
}

/// Caller identity established by the authorization gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: UserId,
    role_name: String,
}

impl Principal {
    /// Creates a principal from a user and a raw role name.
    #[must_use]
    pub fn new(user_id: UserId, role_name: impl Into<String>) -> Self {
        Self {
            user_id,
            role_name: role_name.into(),
        }
    }

    /// Returns the caller's user identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the role name exactly as carried by the token.
    #[must_use]
    pub fn role_name(&self) -> &str {
        &self.role_name
    }

    /// Returns the parsed role, or `None` when the name is not a known role.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        Role::try_from(self.role_name.as_str()).ok()
    }
}

impl From<TokenClaims> for Principal {
    fn from(claims: TokenClaims) -> Self {
        Self::new(claims.user_id, claims.role)
    }
}
