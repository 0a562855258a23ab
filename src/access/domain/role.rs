//! Caller roles.

use super::ParseRoleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named category of caller that determines baseline permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrator.
    Admin,
    /// Human resources.
    Hr,
    /// Team manager.
    Manager,
    /// Regular user.
    User,
    /// Unrestricted operator.
    Superuser,
}

impl Role {
    /// Every role, in table order.
    pub const ALL: [Self; 5] = [
        Self::Admin,
        Self::Hr,
        Self::Manager,
        Self::User,
        Self::Superuser,
    ];

    /// Returns the canonical role name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Hr => "hr",
            Self::Manager => "manager",
            Self::User => "user",
            Self::Superuser => "superuser",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(Self::Admin),
            "hr" => Ok(Self::Hr),
            "manager" => Ok(Self::Manager),
            "user" => Ok(Self::User),
            "superuser" => Ok(Self::Superuser),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::try_from(value)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
