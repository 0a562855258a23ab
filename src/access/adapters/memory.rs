//! In-memory token blacklist.

use crate::access::ports::{TokenBlacklist, TokenStoreError, TokenStoreResult};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Thread-safe blacklist keyed by SHA-256 token fingerprints.
///
/// Raw tokens are never retained.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenBlacklist {
    fingerprints: Arc<RwLock<HashSet<[u8; 32]>>>,
}

impl InMemoryTokenBlacklist {
    /// Creates an empty blacklist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn fingerprint(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

fn lock_error(err: impl std::fmt::Display) -> TokenStoreError {
    TokenStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TokenBlacklist for InMemoryTokenBlacklist {
    async fn is_blacklisted(&self, token: &str) -> TokenStoreResult<bool> {
        let fingerprints = self.fingerprints.read().map_err(lock_error)?;
        Ok(fingerprints.contains(&fingerprint(token)))
    }

    async fn revoke(&self, token: &str) -> TokenStoreResult<()> {
        let mut fingerprints = self.fingerprints.write().map_err(lock_error)?;
        fingerprints.insert(fingerprint(token));
        Ok(())
    }
}
