//! In-memory challenge store with per-shard locking
//!
//! Identities hash onto a fixed set of shards, each behind its own mutex, so
//! read-modify-write sequences on one identity are serialized while distinct
//! identities rarely contend.

use chrono::{DateTime, Utc};
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::{Mutex, MutexGuard, PoisonError};

use ca_core::domain::entities::IdentityRecord;
use ca_core::services::verification::ChallengeStore;

/// Default number of shards
pub const DEFAULT_SHARD_COUNT: usize = 16;

type Shard = HashMap<String, IdentityRecord>;

/// Sharded in-memory [`ChallengeStore`]
pub struct ShardedChallengeStore {
    shards: Vec<Mutex<Shard>>,
    hasher: RandomState,
}

impl ShardedChallengeStore {
    /// Create a store with `shard_count` shards (at least one)
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect();

        Self {
            shards,
            hasher: RandomState::new(),
        }
    }

    /// Number of shards
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_for(&self, identity: &str) -> MutexGuard<'_, Shard> {
        let index = (self.hasher.hash_one(identity) % self.shards.len() as u64) as usize;
        lock(&self.shards[index])
    }
}

impl Default for ShardedChallengeStore {
    fn default() -> Self {
        Self::new(DEFAULT_SHARD_COUNT)
    }
}

// Records are plain data, so a poisoned shard is still usable
fn lock(shard: &Mutex<Shard>) -> MutexGuard<'_, Shard> {
    shard.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ChallengeStore for ShardedChallengeStore {
    fn with_record<R, F>(&self, identity: &str, now: DateTime<Utc>, f: F) -> R
    where
        F: FnOnce(&mut IdentityRecord) -> R,
    {
        let mut shard = self.shard_for(identity);

        let record = shard.entry(identity.to_string()).or_default();
        record.purge_expired(now);
        let result = f(record);

        if record.is_empty() {
            shard.remove(identity);
        }

        result
    }

    fn sweep(&self, now: DateTime<Utc>) -> usize {
        self.shards
            .iter()
            .map(|shard| {
                let mut shard = lock(shard);
                let before = shard.len();
                shard.retain(|_, record| {
                    record.purge_expired(now);
                    !record.is_empty()
                });
                before - shard.len()
            })
            .sum()
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|shard| lock(shard).len()).sum()
    }
}
