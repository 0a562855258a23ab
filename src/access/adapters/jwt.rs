//! HMAC-SHA256 JSON Web Token adapter.

use crate::access::{
    domain::{Role, TokenClaims, UserId},
    ports::{AuthTokenValidator, TokenValidationError},
};
use chrono::Duration;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use thiserror::Error;

/// Errors raised while issuing a token.
#[derive(Debug, Error)]
pub enum TokenIssueError {
    /// The configured lifetime pushes the expiry past the representable range.
    #[error("token lifetime {ttl} overflows the expiry timestamp")]
    ExpiryOutOfRange {
        /// Configured lifetime.
        ttl: Duration,
    },

    /// Signing the claims failed.
    #[error(transparent)]
    Encoding(#[from] JwtError),
}

/// Issues and validates HS256 tokens signed with a shared secret.
#[derive(Clone)]
pub struct HmacJwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for HmacJwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacJwtCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl HmacJwtCodec {
    /// Default token lifetime.
    pub const DEFAULT_TTL_HOURS: i64 = 72;

    /// Creates a codec for `secret` with the default lifetime.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttl(secret, Duration::hours(Self::DEFAULT_TTL_HOURS))
    }

    /// Creates a codec for `secret` issuing tokens valid for `ttl`.
    #[must_use]
    pub fn with_ttl(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issues a token for `user_id` acting as `role`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenIssueError::ExpiryOutOfRange`] when the lifetime cannot
    /// be added to the current time, or [`TokenIssueError::Encoding`] when
    /// signing fails.
    pub fn issue(
        &self,
        user_id: UserId,
        role: Role,
        clock: &impl Clock,
    ) -> Result<String, TokenIssueError> {
        let expires_at = clock
            .utc()
            .checked_add_signed(self.ttl)
            .ok_or(TokenIssueError::ExpiryOutOfRange { ttl: self.ttl })?;
        let claims = TokenClaims {
            user_id,
            role: role.as_str().to_owned(),
            exp: u64::try_from(expires_at.timestamp()).unwrap_or_default(),
        };
        Ok(self.encode_claims(&claims)?)
    }

    /// Signs arbitrary claims.
    ///
    /// # Errors
    ///
    /// Returns the underlying encoding error when signing fails.
    pub fn encode_claims(&self, claims: &TokenClaims) -> Result<String, JwtError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
    }
}

impl AuthTokenValidator for HmacJwtCodec {
    fn validate(&self, token: &str) -> Result<TokenClaims, TokenValidationError> {
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                JwtErrorKind::ExpiredSignature => TokenValidationError::Expired,
                _ => TokenValidationError::Invalid(err.to_string()),
            })
    }
}
