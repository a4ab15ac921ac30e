//! Challenge store implementations

mod sharded;

pub use sharded::{ShardedChallengeStore, DEFAULT_SHARD_COUNT};
