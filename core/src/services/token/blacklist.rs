//! Revocation list for session tokens

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::DomainResult;

/// Stores revoked tokens until they would have expired anyway
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Revoke a token until `expires_at`
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> DomainResult<()>;

    /// Check whether a token has been revoked
    async fn is_revoked(&self, token: &str, now: DateTime<Utc>) -> DomainResult<bool>;

    /// Drop entries that expired before `now`, returning how many were removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<usize>;
}
