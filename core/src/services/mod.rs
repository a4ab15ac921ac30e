//! Business services containing the auth domain logic.

pub mod sweeper;
pub mod token;
pub mod verification;

// Re-export commonly used types
pub use sweeper::{ChallengeSweeper, SweepResult, SweeperHandle};
pub use token::{
    AuthenticatedSession, RequestEnvelope, SessionAuthenticator, SessionCookie, TokenBlacklist,
    TokenCodec, TokenService, TokenServiceConfig,
};
pub use verification::{
    ChallengeStore, CodeAlphabet, CodeCheck, CodeGenerator, Notifier, SendCodeResult,
    VerificationService, VerificationServiceConfig,
};
