//! Traits for challenge storage and code delivery

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::challenge::IdentityRecord;

/// Keyed store of per-identity challenge state
///
/// All mutation goes through [`ChallengeStore::with_record`], which runs the
/// closure while holding exclusive access to that identity's record. The
/// closure must not block or await.
pub trait ChallengeStore: Send + Sync {
    /// Run `f` on the record for `identity` atomically
    ///
    /// Expired parts of the record are purged against `now` before `f` runs,
    /// and a record left empty afterwards is removed.
    fn with_record<R, F>(&self, identity: &str, now: DateTime<Utc>, f: F) -> R
    where
        F: FnOnce(&mut IdentityRecord) -> R;

    /// Physically remove everything expired at `now`, returning the number of records dropped
    fn sweep(&self, now: DateTime<Utc>) -> usize;

    /// Number of identities with stored state
    fn len(&self) -> usize;

    /// Check if the store holds no state at all
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Out-of-band delivery of verification codes
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `code` to `identity`, returning a provider message id
    async fn dispatch(&self, identity: &str, code: &str) -> Result<String, String>;

    /// Provider name for logs
    fn provider_name(&self) -> &str;
}
