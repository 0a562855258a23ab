//! Bearer token validation and revocation contracts.

use crate::access::domain::TokenClaims;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned while validating a bearer token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenValidationError {
    /// The token signature was valid but it has expired.
    #[error("token has expired")]
    Expired,
    /// The token could not be decoded or verified.
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Verifies bearer tokens and extracts their claims.
#[cfg_attr(test, mockall::automock)]
pub trait AuthTokenValidator: Send + Sync {
    /// Validates `token` and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenValidationError`] when the token is malformed, has a
    /// bad signature, or has expired.
    fn validate(&self, token: &str) -> Result<TokenClaims, TokenValidationError>;
}

/// Result type for token store operations.
pub type TokenStoreResult<T> = Result<T, TokenStoreError>;

/// Errors returned by token store implementations.
#[derive(Debug, Clone, Error)]
pub enum TokenStoreError {
    /// Persistence-layer failure.
    #[error("token store error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TokenStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Store of revoked tokens, populated on logout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Returns whether `token` has been revoked.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError`] when the store cannot be queried.
    async fn is_blacklisted(&self, token: &str) -> TokenStoreResult<bool>;

    /// Revokes `token`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError`] when the store cannot be written.
    async fn revoke(&self, token: &str) -> TokenStoreResult<()>;
}
