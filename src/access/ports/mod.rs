//! Port contracts consumed by the authorization gate.

pub mod token;

pub use token::{
    AuthTokenValidator, TokenBlacklist, TokenStoreError, TokenStoreResult, TokenValidationError,
};

#[cfg(test)]
pub use token::{MockAuthTokenValidator, MockTokenBlacklist};
