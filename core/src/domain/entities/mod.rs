//! Domain entities representing core auth objects.

pub mod challenge;
pub mod token;


// Re-export commonly used types
pub use challenge::{ChallengeEntry, ChallengeState, IdentityRecord, LoginAttemptCounter};
pub use token::{Claims, TokenPurpose, UnknownPurpose};
