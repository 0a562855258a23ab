//! Request authorization gate.

use super::{Guard, GuardChain};
use crate::access::{
    domain::Principal,
    ports::{AuthTokenValidator, TokenBlacklist, TokenStoreError, TokenValidationError},
};
use crate::activity::{
    domain::NewActivity,
    ports::{ActivityLogError, ActivityLogger},
};
use crate::error::{ErrorKind, ServiceError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

const BEARER_PREFIX: &str = "Bearer ";

/// The parts of an inbound request the gate inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    authorization: Option<String>,
    method: String,
    path: String,
    original_url: String,
}

impl AuthorizationRequest {
    /// Creates a request for `method` on `path`.
    ///
    /// The original URL defaults to the path.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        let request_path = path.into();
        Self {
            authorization: None,
            method: method.into(),
            original_url: request_path.clone(),
            path: request_path,
        }
    }

    /// Sets the raw `Authorization` header value.
    #[must_use]
    pub fn with_authorization(mut self, header: impl Into<String>) -> Self {
        self.authorization = Some(header.into());
        self
    }

    /// Sets the original URL including any query string.
    #[must_use]
    pub fn with_original_url(mut self, url: impl Into<String>) -> Self {
        self.original_url = url.into();
        self
    }

    fn bearer_token(&self) -> AccessResult<&str> {
        let header = self
            .authorization
            .as_deref()
            .filter(|value| !value.is_empty())
            .ok_or(AccessError::MissingToken)?;
        header
            .strip_prefix(BEARER_PREFIX)
            .ok_or(AccessError::MalformedToken)
    }
}

/// Errors returned by the authorization gate.
#[derive(Debug, Error)]
pub enum AccessError {
    /// No `Authorization` header was supplied.
    #[error("missing or malformed token")]
    MissingToken,

    /// The header is not a bearer token.
    #[error("invalid token format")]
    MalformedToken,

    /// The bearer token failed validation.
    #[error("invalid or expired token")]
    InvalidToken(#[source] TokenValidationError),

    /// The bearer token has been revoked.
    #[error("token is blacklisted")]
    Blacklisted,

    /// The caller's role is not among the roles the route admits.
    #[error("access denied for role '{role}': insufficient role")]
    RoleNotAllowed {
        /// Role name carried by the token.
        role: String,
    },

    /// The caller's role lacks the permission the route requires.
    #[error("access denied for role '{role}': missing {permission} permission")]
    PermissionDenied {
        /// Role name carried by the token.
        role: String,
        /// Permission the route requires.
        permission: crate::access::domain::Permission,
    },

    /// The blacklist could not be queried.
    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),

    /// The request could not be recorded.
    #[error(transparent)]
    ActivityLog(#[from] ActivityLogError),
}

impl ServiceError for AccessError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingToken | Self::MalformedToken | Self::InvalidToken(_) | Self::Blacklisted => {
                ErrorKind::Unauthenticated
            }
            Self::RoleNotAllowed { .. } | Self::PermissionDenied { .. } => ErrorKind::Forbidden,
            Self::TokenStore(_) | Self::ActivityLog(_) => ErrorKind::Internal,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "auth.missing-token",
            Self::MalformedToken => "auth.malformed-token",
            Self::InvalidToken(_) => "auth.invalid-token",
            Self::Blacklisted => "auth.token-blacklisted",
            Self::RoleNotAllowed { .. } => "auth.role-not-allowed",
            Self::PermissionDenied { .. } => "auth.permission-denied",
            Self::TokenStore(_) => "auth.token-store-failure",
            Self::ActivityLog(_) => "activity.log-failure",
        }
    }
}

/// Result type for authorization gate operations.
pub type AccessResult<T> = Result<T, AccessError>;

/// Composes token validation, revocation lookup, activity logging, and the
/// route's guard chain in front of a service call.
#[derive(Clone)]
pub struct RequestAuthorizationGate<V, B, L, C>
where
    V: AuthTokenValidator,
    B: TokenBlacklist,
    L: ActivityLogger,
    C: Clock + Send + Sync,
{
    validator: Arc<V>,
    blacklist: Arc<B>,
    activity: Arc<L>,
    clock: Arc<C>,
}

impl<V, B, L, C> RequestAuthorizationGate<V, B, L, C>
where
    V: AuthTokenValidator,
    B: TokenBlacklist,
    L: ActivityLogger,
    C: Clock + Send + Sync,
{
    /// Creates a gate from its collaborators.
    #[must_use]
    pub const fn new(validator: Arc<V>, blacklist: Arc<B>, activity: Arc<L>, clock: Arc<C>) -> Self {
        Self {
            validator,
            blacklist,
            activity,
            clock,
        }
    }

    /// Authenticates the request and evaluates `guards` against the caller.
    ///
    /// Every request that authenticates is recorded in the activity log,
    /// including requests the guards then reject.
    ///
    /// # Errors
    ///
    /// Returns an [`AccessError`] of kind [`ErrorKind::Unauthenticated`]
    /// for missing, malformed, invalid, or revoked tokens, of kind
    /// [`ErrorKind::Forbidden`] when a guard rejects the caller, and of kind
    /// [`ErrorKind::Internal`] when the blacklist or activity log fails.
    pub async fn authorize(
        &self,
        request: &AuthorizationRequest,
        guards: &GuardChain,
    ) -> AccessResult<Principal> {
        let principal = self.authenticate(request).await?;
        self.record_activity(request, &principal).await?;

        if let Some(rejected) = guards.first_rejection(&principal) {
            tracing::warn!(
                user_id = %principal.user_id(),
                role = principal.role_name(),
                method = %request.method,
                path = %request.path,
                "request rejected by route guard"
            );
            return Err(rejection_error(rejected, &principal));
        }

        Ok(principal)
    }

    /// Validates the bearer token and checks it has not been revoked.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] for missing, malformed, invalid, or revoked
    /// tokens, or when the blacklist cannot be queried.
    pub async fn authenticate(&self, request: &AuthorizationRequest) -> AccessResult<Principal> {
        let token = request.bearer_token()?;
        let claims = self
            .validator
            .validate(token)
            .map_err(AccessError::InvalidToken)?;

        let revoked = self.blacklist.is_blacklisted(token).await.map_err(|err| {
            tracing::error!(error = %err, "token blacklist lookup failed");
            AccessError::TokenStore(err)
        })?;
        if revoked {
            return Err(AccessError::Blacklisted);
        }

        Ok(Principal::from(claims))
    }

    /// Revokes the request's bearer token after authenticating it.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] when the token does not authenticate or the
    /// blacklist cannot be written.
    pub async fn logout(&self, request: &AuthorizationRequest) -> AccessResult<Principal> {
        let principal = self.authenticate(request).await?;
        let token = request.bearer_token()?;
        self.blacklist.revoke(token).await?;
        tracing::info!(user_id = %principal.user_id(), "token revoked");
        Ok(principal)
    }

    async fn record_activity(
        &self,
        request: &AuthorizationRequest,
        principal: &Principal,
    ) -> AccessResult<()> {
        let activity = NewActivity {
            user_id: principal.user_id(),
            activity: request.method.clone(),
            action: request.path.clone(),
            resource: request.original_url.clone(),
            details: String::new(),
            created_at: self.clock.utc(),
        };
        self.activity.log_activity(activity).await.map_err(|err| {
            tracing::error!(error = %err, "failed to record activity");
            AccessError::ActivityLog(err)
        })?;
        Ok(())
    }
}

fn rejection_error(guard: &Guard, principal: &Principal) -> AccessError {
    let role = principal.role_name().to_owned();
    match guard {
        Guard::RequireRole(_) => AccessError::RoleNotAllowed { role },
        Guard::RequirePermission(permission) => AccessError::PermissionDenied {
            role,
            permission: *permission,
        },
    }
}
