//! Permissions and the static role-to-permission tables.
//!
//! Two independent namespaces exist: general resource permissions and
//! task-specific permissions. A missing entry means the permission is not
//! granted.

use super::{ParsePermissionError, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation a role may be allowed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Create a resource.
    Create,
    /// Read a resource.
    Read,
    /// Update a resource.
    Update,
    /// Delete a resource.
    Delete,
}

impl Permission {
    /// Every permission, in table order.
    pub const ALL: [Self; 4] = [Self::Create, Self::Read, Self::Update, Self::Delete];

    /// Returns the canonical permission name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl TryFrom<&str> for Permission {
    type Error = ParsePermissionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(ParsePermissionError(value.to_owned())),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table a permission is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionNamespace {
    /// Permissions over general resources (users, departments, logs).
    General,
    /// Permissions over tasks.
    Task,
}

impl PermissionNamespace {
    /// Returns whether `role` holds `permission` in this namespace.
    #[must_use]
    pub const fn allows(self, role: Role, permission: Permission) -> bool {
        let grants = match self {
            Self::General => general_grants(role),
            Self::Task => task_grants(role),
        };
        grants.contains(permission)
    }
}

/// Create/read/update/delete flags for one role.
#[derive(Debug, Clone, Copy)]
struct Grants {
    create: bool,
    read: bool,
    update: bool,
    delete: bool,
}

impl Grants {
    const fn contains(self, permission: Permission) -> bool {
        match permission {
            Permission::Create => self.create,
            Permission::Read => self.read,
            Permission::Update => self.update,
            Permission::Delete => self.delete,
        }
    }
}

const fn grants(create: bool, read: bool, update: bool, delete: bool) -> Grants {
    Grants {
        create,
        read,
        update,
        delete,
    }
}

const fn general_grants(role: Role) -> Grants {
    match role {
        Role::Admin => grants(true, true, true, false),
        Role::Hr => grants(true, true, false, false),
        Role::Manager | Role::User => grants(false, true, true, false),
        Role::Superuser => grants(true, true, true, true),
    }
}

const fn task_grants(role: Role) -> Grants {
    match role {
        Role::Admin | Role::Superuser => grants(true, true, true, true),
        Role::Hr | Role::User => grants(false, true, true, false),
        Role::Manager => grants(true, true, true, false),
    }
}

/// Returns whether `role` holds `permission` over general resources.
#[must_use]
pub const fn has_permission(role: Role, permission: Permission) -> bool {
    PermissionNamespace::General.allows(role, permission)
}

/// Returns whether `role` holds `permission` over tasks.
#[must_use]
pub const fn has_task_permission(role: Role, permission: Permission) -> bool {
    PermissionNamespace::Task.allows(role, permission)
}

/// String-keyed form of [`has_permission`].
///
/// Unknown role or permission names are denied.
#[must_use]
pub fn has_permission_by_name(role: &str, permission: &str) -> bool {
    lookup_by_name(PermissionNamespace::General, role, permission)
}

/// String-keyed form of [`has_task_permission`].
///
/// Unknown role or permission names are denied.
#[must_use]
pub fn has_task_permission_by_name(role: &str, permission: &str) -> bool {
    lookup_by_name(PermissionNamespace::Task, role, permission)
}

fn lookup_by_name(namespace: PermissionNamespace, role: &str, permission: &str) -> bool {
    match (Role::try_from(role), Permission::try_from(permission)) {
        (Ok(parsed_role), Ok(parsed_permission)) => namespace.allows(parsed_role, parsed_permission),
        _ => false,
    }
}
