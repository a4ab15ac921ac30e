//! In-memory token blacklist
//!
//! Tokens are stored as SHA-256 digests and kept only until their natural
//! expiry, after which the signature check alone rejects them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use ca_core::clock::{Clock, SystemClock};
use ca_core::errors::DomainResult;
use ca_core::services::token::TokenBlacklist;

/// Hashes a token for storage
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Blacklist held in process memory
pub struct InMemoryTokenBlacklist {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTokenBlacklist {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored revocations, expired or not
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryTokenBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryTokenBlacklist {
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> DomainResult<()> {
        if expires_at <= self.clock.now() {
            tracing::debug!(event = "revoke_skipped_expired", "Token already expired, not stored");
            return Ok(());
        }

        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token_digest(token), expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token: &str, now: DateTime<Utc>) -> DomainResult<bool> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .get(&token_digest(token))
            .is_some_and(|expires_at| now < *expires_at))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, expires_at| now < *expires_at);
        let removed = before - entries.len();

        if removed > 0 {
            tracing::info!(removed = removed, event = "blacklist_purged", "Purged expired revocations");
        }

        Ok(removed)
    }
}
