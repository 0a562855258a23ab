//! Combinable route guards.
//!
//! A route carries a [`GuardChain`]; every guard in the chain must pass.
//! Role guards and permission guards are not alternatives: a route that
//! attaches both enforces both.

use crate::access::domain::{Permission, Principal, Role, has_permission, has_task_permission};

/// A single precondition on the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// The caller's role must be one of the listed roles.
    RequireRole(Vec<Role>),
    /// The caller's role must hold the permission in both the general and
    /// the task namespace.
    RequirePermission(Permission),
}

impl Guard {
    /// Returns whether `principal` satisfies this guard.
    ///
    /// A principal whose role name is not a known role satisfies nothing.
    #[must_use]
    pub fn admits(&self, principal: &Principal) -> bool {
        let Some(role) = principal.role() else {
            return false;
        };
        match self {
            Self::RequireRole(allowed) => allowed.contains(&role),
            Self::RequirePermission(permission) => {
                has_permission(role, *permission) && has_task_permission(role, *permission)
            }
        }
    }
}

/// Ordered guards evaluated with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardChain {
    guards: Vec<Guard>,
}

impl GuardChain {
    /// Creates an empty chain that admits any authenticated caller.
    #[must_use]
    pub const fn new() -> Self {
        Self { guards: Vec::new() }
    }

    /// Appends a role-membership guard.
    #[must_use]
    pub fn require_role(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.guards.push(Guard::RequireRole(roles.into_iter().collect()));
        self
    }

    /// Appends a permission guard.
    #[must_use]
    pub fn require_permission(mut self, permission: Permission) -> Self {
        self.guards.push(Guard::RequirePermission(permission));
        self
    }

    /// Returns the guards in evaluation order.
    #[must_use]
    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    /// Returns the first guard `principal` fails, if any.
    #[must_use]
    pub fn first_rejection(&self, principal: &Principal) -> Option<&Guard> {
        self.guards.iter().find(|guard| !guard.admits(principal))
    }
}

/// Task endpoints and the guards wired in front of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskRoute {
    /// `POST /tasks`
    Create,
    /// `GET /tasks`
    Search,
    /// `GET /tasks/:id`
    Get,
    /// `PUT /tasks/:id`
    Update,
    /// `DELETE /tasks/:id`
    Delete,
    /// `POST /tasks/:id/submit`
    Submit,
    /// `POST /tasks/:id/approve`
    Approve,
}

impl TaskRoute {
    /// Builds the guard chain for this route.
    #[must_use]
    pub fn guards(self) -> GuardChain {
        let superuser_only = [Role::Superuser];
        let user_or_superuser = [Role::User, Role::Superuser];
        let chain = GuardChain::new();
        match self {
            Self::Create => chain
                .require_role(superuser_only)
                .require_permission(Permission::Create),
            Self::Search | Self::Get => chain
                .require_role(user_or_superuser)
                .require_permission(Permission::Read),
            Self::Update | Self::Submit => chain
                .require_role(user_or_superuser)
                .require_permission(Permission::Update),
            Self::Delete => chain
                .require_role(superuser_only)
                .require_permission(Permission::Delete),
            Self::Approve => chain
                .require_role(superuser_only)
                .require_permission(Permission::Update),
        }
    }
}
