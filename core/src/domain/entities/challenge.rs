//! Verification challenge entities
//!
//! An [`IdentityRecord`] is everything the challenge store keeps for a single
//! identity: the pending challenge, an active lockout, and the independent
//! login-attempt counter. Expired parts are treated as absent and dropped by
//! [`IdentityRecord::purge_expired`] on every access.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

use crate::clock::saturating_add;

/// A one-time code bound to an identity
#[derive(Clone, PartialEq, Eq)]
pub struct ChallengeEntry {
    /// Identity (normalized email) the code was issued for
    pub identity: String,

    /// The code the user must submit
    pub code: String,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Expiration time
    pub expires_at: DateTime<Utc>,

    /// Failed submissions so far
    pub attempts: u32,
}

impl ChallengeEntry {
    /// Create a fresh challenge with zero attempts
    pub fn new(identity: &str, code: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            identity: identity.to_string(),
            code,
            created_at: now,
            expires_at: saturating_add(now, ttl),
            attempts: 0,
        }
    }

    /// Check if the challenge is past its expiry
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// Codes stay out of debug output and therefore out of logs
impl fmt::Debug for ChallengeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChallengeEntry")
            .field("identity", &self.identity)
            .field("code", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("attempts", &self.attempts)
            .finish()
    }
}

/// Windowed counter of plain-password login attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginAttemptCounter {
    pub count: u32,
    pub expires_at: DateTime<Utc>,
}

impl LoginAttemptCounter {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Per-identity state owned by the challenge store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityRecord {
    /// Pending challenge, if any
    pub challenge: Option<ChallengeEntry>,

    /// End of the active lockout, if any
    pub locked_until: Option<DateTime<Utc>>,

    /// Independent login-attempt counter
    pub login_attempts: Option<LoginAttemptCounter>,
}

impl IdentityRecord {
    /// Drop every component whose time has passed
    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        if self.challenge.as_ref().is_some_and(|c| c.is_expired_at(now)) {
            self.challenge = None;
        }
        if self.locked_until.is_some_and(|until| now >= until) {
            self.locked_until = None;
        }
        if self.login_attempts.is_some_and(|c| c.is_expired_at(now)) {
            self.login_attempts = None;
        }
    }

    /// Whether the identity is locked out at `now`
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// A record with nothing left in it can be removed from the store
    pub fn is_empty(&self) -> bool {
        self.challenge.is_none() && self.locked_until.is_none() && self.login_attempts.is_none()
    }

    /// Observable challenge state at `now`
    pub fn state(&self, now: DateTime<Utc>) -> ChallengeState {
        if let Some(until) = self.locked_until.filter(|until| now < *until) {
            return ChallengeState::Locked { until };
        }
        match &self.challenge {
            Some(entry) if !entry.is_expired_at(now) => ChallengeState::Pending {
                attempts: entry.attempts,
                expires_at: entry.expires_at,
            },
            _ => ChallengeState::NoChallenge,
        }
    }
}

/// Challenge state machine as seen from outside the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChallengeState {
    NoChallenge,
    Pending {
        attempts: u32,
        expires_at: DateTime<Utc>,
    },
    Locked {
        until: DateTime<Utc>,
    },
}
