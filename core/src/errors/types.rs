//! Error types for token handling and verification challenges
//!
//! Callers only ever see the coarse variants; the fine-grained reasons
//! (`TokenRejection`, the internal verification outcomes) exist for logging.

use thiserror::Error;

/// Token failures visible to callers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Session expired. Please login again")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Token revoked")]
    Revoked,

    #[error("Token generation failed")]
    GenerationFailed,
}

impl TokenError {
    /// Stable error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::Expired => "EXPIRED_TOKEN",
            TokenError::Invalid => "INVALID_TOKEN",
            TokenError::Revoked => "REVOKED_TOKEN",
            TokenError::GenerationFailed => "TOKEN_GENERATION_FAILED",
        }
    }
}

/// Reason a presented token was rejected (telemetry only)
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    #[error("malformed token")]
    Malformed,

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("token expired")]
    Expired,

    #[error("unknown purpose flag")]
    UnknownPurpose,
}

impl From<TokenRejection> for TokenError {
    fn from(rejection: TokenRejection) -> Self {
        match rejection {
            TokenRejection::Expired => TokenError::Expired,
            // Forged and garbled tokens look the same from outside
            TokenRejection::Malformed
            | TokenRejection::SignatureMismatch
            | TokenRejection::UnknownPurpose => TokenError::Invalid,
        }
    }
}

/// Verification challenge errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("No active verification code")]
    NoActiveChallenge,

    #[error("Maximum attempts exceeded")]
    AttemptLimitExceeded,

    #[error("Failed to deliver verification code: {reason}")]
    DispatchFailed { reason: String },

    #[error("Verification code delivery timed out after {timeout_ms} ms")]
    DispatchTimedOut { timeout_ms: u64 },
}

impl VerificationError {
    /// Stable error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            VerificationError::NoActiveChallenge => "NO_ACTIVE_CHALLENGE",
            VerificationError::AttemptLimitExceeded => "ATTEMPT_LIMIT_EXCEEDED",
            VerificationError::DispatchFailed { .. } | VerificationError::DispatchTimedOut { .. } => {
                "DISPATCH_FAILED"
            }
        }
    }

    /// Message safe to show to the end user
    ///
    /// Wrong codes and exhausted attempts read the same.
    pub fn user_message(&self) -> &'static str {
        match self {
            VerificationError::NoActiveChallenge | VerificationError::AttemptLimitExceeded => {
                "Invalid verification code, request a new one"
            }
            VerificationError::DispatchFailed { .. } | VerificationError::DispatchTimedOut { .. } => {
                "Could not send the verification code, please try again"
            }
        }
    }
}
