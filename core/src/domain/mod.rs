//! Domain layer containing the auth entities.

pub mod entities;

pub use entities::{
    ChallengeEntry, ChallengeState, Claims, IdentityRecord, LoginAttemptCounter, TokenPurpose,
    UnknownPurpose,
};
