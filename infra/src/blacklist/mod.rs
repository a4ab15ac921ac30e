//! Token blacklist implementations

mod memory;

pub use memory::{token_digest, InMemoryTokenBlacklist};
