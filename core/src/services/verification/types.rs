//! Types for verification service results

use chrono::{DateTime, Utc};

use crate::errors::VerificationError;

/// Result of sending a verification code
#[derive(Debug, Clone)]
pub struct SendCodeResult {
    /// Normalized identity the code was issued for
    pub identity: String,
    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,
    /// Message id returned by the notifier
    pub message_id: String,
    /// Notifier that delivered the code
    pub provider: String,
}

/// Detailed outcome of a code submission
///
/// Only for logging and metrics. Callers answering end users must collapse
/// everything except `Verified` into the same "invalid code" response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    /// Code matched; the challenge is consumed
    Verified,
    /// Code did not match
    WrongCode { attempts: u32, remaining: u32 },
    /// This submission used up the last attempt and locked the identity
    LockoutTriggered { attempts: u32, until: DateTime<Utc> },
    /// The identity was already locked out
    Locked { until: DateTime<Utc> },
    /// No live challenge for the identity
    NoActiveChallenge,
}

impl CodeCheck {
    pub fn is_verified(&self) -> bool {
        matches!(self, CodeCheck::Verified)
    }

    /// Error classification of a failed submission
    pub fn error(&self) -> Option<VerificationError> {
        match self {
            CodeCheck::Verified | CodeCheck::WrongCode { .. } => None,
            CodeCheck::LockoutTriggered { .. } | CodeCheck::Locked { .. } => {
                Some(VerificationError::AttemptLimitExceeded)
            }
            CodeCheck::NoActiveChallenge => Some(VerificationError::NoActiveChallenge),
        }
    }
}
