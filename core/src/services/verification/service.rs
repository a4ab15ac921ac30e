//! Main verification service implementation

use chrono::Duration;
use constant_time_eq::constant_time_eq;
use std::sync::Arc;

use ca_shared::utils::{is_valid_email, mask_email, normalize_email};

use crate::clock::{saturating_add, Clock, SystemClock};
use crate::domain::entities::challenge::{ChallengeEntry, ChallengeState, LoginAttemptCounter};
use crate::errors::{DomainError, DomainResult, VerificationError};

use super::code_generator::CodeGenerator;
use super::config::VerificationServiceConfig;
use super::traits::{ChallengeStore, Notifier};
use super::types::{CodeCheck, SendCodeResult};

/// Verification service for email one-time codes
///
/// Owns no state of its own: every per-identity read-modify-write happens
/// inside [`ChallengeStore::with_record`], and the notifier is only called
/// after that closure has returned.
pub struct VerificationService<S: ChallengeStore, N: Notifier + ?Sized> {
    /// Per-identity challenge state
    store: Arc<S>,
    /// Out-of-band code delivery
    notifier: Arc<N>,
    /// Code source
    generator: CodeGenerator,
    /// Service configuration
    config: VerificationServiceConfig,
    /// Time source
    clock: Arc<dyn Clock>,
}

impl<S: ChallengeStore, N: Notifier + ?Sized> VerificationService<S, N> {
    /// Create a new verification service on the wall clock
    pub fn new(
        store: Arc<S>,
        notifier: Arc<N>,
        config: VerificationServiceConfig,
    ) -> DomainResult<Self> {
        Self::with_clock(store, notifier, config, Arc::new(SystemClock))
    }

    /// Create a new verification service reading time from `clock`
    pub fn with_clock(
        store: Arc<S>,
        notifier: Arc<N>,
        config: VerificationServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> DomainResult<Self> {
        if config.max_attempts == 0 {
            return Err(DomainError::Validation {
                message: "max_attempts must be at least 1".to_string(),
            });
        }
        for (field, value) in [
            ("code_ttl", config.code_ttl),
            ("lockout", config.lockout),
            ("login_attempt_window", config.login_attempt_window),
        ] {
            if value <= Duration::zero() {
                return Err(DomainError::Validation {
                    message: format!("{} must be positive", field),
                });
            }
        }
        let generator = CodeGenerator::new(config.code_length, &config.alphabet)?;

        Ok(Self {
            store,
            notifier,
            generator,
            config,
            clock,
        })
    }

    /// Service configuration
    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// Issue a fresh code for `identity` and deliver it
    ///
    /// Any pending code and any lockout are replaced. The code is stored
    /// before dispatch, so a delivery failure leaves it valid for a retry.
    ///
    /// # Returns
    ///
    /// * `Ok(SendCodeResult)` - Code stored and delivered
    /// * `Err(DomainError::Validation)` - Identity is not an email address
    /// * `Err(DomainError::Verification)` - `DispatchFailed` or `DispatchTimedOut`
    pub async fn send_code(&self, identity: &str) -> DomainResult<SendCodeResult> {
        let identity = normalize_email(identity);
        if !is_valid_email(&identity) {
            return Err(DomainError::Validation {
                message: format!("Invalid email address: {}", mask_email(&identity)),
            });
        }

        let now = self.clock.now();
        let code = self.generator.generate();
        let entry = ChallengeEntry::new(&identity, code.clone(), now, self.config.code_ttl);
        let expires_at = entry.expires_at;

        let superseded = self.store.with_record(&identity, now, move |record| {
            let superseded = record.challenge.is_some() || record.is_locked(now);
            record.challenge = Some(entry);
            record.locked_until = None;
            superseded
        });

        tracing::info!(
            identity = %mask_email(&identity),
            superseded = superseded,
            expires_at = %expires_at,
            event = "otp_generated",
            "Generated new verification code"
        );

        let provider = self.notifier.provider_name().to_string();
        let dispatch = self.notifier.dispatch(&identity, &code);

        match tokio::time::timeout(self.config.dispatch_timeout, dispatch).await {
            Ok(Ok(message_id)) => {
                tracing::info!(
                    identity = %mask_email(&identity),
                    provider = %provider,
                    message_id = %message_id,
                    event = "otp_dispatched",
                    "Verification code dispatched"
                );
                Ok(SendCodeResult {
                    identity,
                    expires_at,
                    message_id,
                    provider,
                })
            }
            Ok(Err(reason)) => {
                tracing::error!(
                    identity = %mask_email(&identity),
                    provider = %provider,
                    error = %reason,
                    event = "otp_dispatch_failed",
                    "Failed to dispatch verification code"
                );
                Err(VerificationError::DispatchFailed { reason }.into())
            }
            Err(_) => {
                let timeout_ms = u64::try_from(self.config.dispatch_timeout.as_millis())
                    .unwrap_or(u64::MAX);
                tracing::error!(
                    identity = %mask_email(&identity),
                    provider = %provider,
                    timeout_ms = timeout_ms,
                    event = "otp_dispatch_timeout",
                    "Verification code dispatch timed out"
                );
                Err(VerificationError::DispatchTimedOut { timeout_ms }.into())
            }
        }
    }

    /// Check a submitted code
    ///
    /// Wrong codes, exhausted attempts, lockouts and missing challenges all
    /// return `false`.
    pub fn validate_code(&self, identity: &str, code: &str) -> bool {
        self.check_code(identity, code).is_verified()
    }

    /// Check a submitted code and report the detailed outcome
    ///
    /// A match consumes the challenge. A mismatch counts one attempt; reaching
    /// `max_attempts` drops the challenge and locks the identity for the
    /// configured lockout.
    pub fn check_code(&self, identity: &str, code: &str) -> CodeCheck {
        let identity = normalize_email(identity);
        let now = self.clock.now();
        let max_attempts = self.config.max_attempts;
        let lockout = self.config.lockout;

        let outcome = self.store.with_record(&identity, now, |record| {
            if let Some(until) = record.locked_until.filter(|until| now < *until) {
                return CodeCheck::Locked { until };
            }

            let Some(entry) = record.challenge.as_mut() else {
                return CodeCheck::NoActiveChallenge;
            };

            if constant_time_eq(entry.code.as_bytes(), code.as_bytes()) {
                record.challenge = None;
                return CodeCheck::Verified;
            }

            entry.attempts += 1;
            let attempts = entry.attempts;
            if attempts >= max_attempts {
                let until = saturating_add(now, lockout);
                record.challenge = None;
                record.locked_until = Some(until);
                return CodeCheck::LockoutTriggered { attempts, until };
            }

            CodeCheck::WrongCode {
                attempts,
                remaining: max_attempts - attempts,
            }
        });

        let masked = mask_email(&identity);
        match outcome {
            CodeCheck::Verified => tracing::info!(
                identity = %masked,
                event = "otp_verified_success",
                "Verification code successfully verified"
            ),
            CodeCheck::WrongCode { attempts, remaining } => tracing::warn!(
                identity = %masked,
                attempts = attempts,
                remaining_attempts = remaining,
                event = "otp_verification_failed",
                "Verification code verification failed"
            ),
            CodeCheck::LockoutTriggered { attempts, until } => tracing::error!(
                identity = %masked,
                attempts = attempts,
                locked_until = %until,
                event = "max_attempts_exceeded",
                "Maximum verification attempts exceeded, identity locked"
            ),
            CodeCheck::Locked { until } => tracing::warn!(
                identity = %masked,
                locked_until = %until,
                event = "otp_rejected_locked",
                "Code submitted while identity is locked"
            ),
            CodeCheck::NoActiveChallenge => tracing::warn!(
                identity = %masked,
                event = "otp_no_active_challenge",
                "Code submitted without an active challenge"
            ),
        }

        outcome
    }

    /// Count a plain-password login attempt, returning the new count
    ///
    /// Independent of the code attempt counter. The window starts at the
    /// first attempt and the count resets once it passes.
    pub fn increment_login_attempts(&self, identity: &str) -> u32 {
        let identity = normalize_email(identity);
        let now = self.clock.now();
        let window = self.config.login_attempt_window;

        let count = self.store.with_record(&identity, now, |record| {
            let counter = record.login_attempts.get_or_insert(LoginAttemptCounter {
                count: 0,
                expires_at: saturating_add(now, window),
            });
            counter.count = counter.count.saturating_add(1);
            counter.count
        });

        tracing::debug!(
            identity = %mask_email(&identity),
            attempts = count,
            event = "login_attempt_recorded",
            "Recorded login attempt"
        );

        count
    }

    /// Clear the login-attempt counter (after a successful password login)
    pub fn reset_login_attempts(&self, identity: &str) {
        let identity = normalize_email(identity);
        self.store.with_record(&identity, self.clock.now(), |record| {
            record.login_attempts = None;
        });
    }

    /// Drop any pending code and lockout for `identity`
    ///
    /// Idempotent.
    pub fn invalidate_code(&self, identity: &str) {
        let identity = normalize_email(identity);
        let removed = self.store.with_record(&identity, self.clock.now(), |record| {
            let removed = record.challenge.is_some() || record.locked_until.is_some();
            record.challenge = None;
            record.locked_until = None;
            removed
        });

        if removed {
            tracing::info!(
                identity = %mask_email(&identity),
                event = "otp_invalidated",
                "Verification code invalidated"
            );
        }
    }

    /// Current challenge state of `identity`
    pub fn challenge_state(&self, identity: &str) -> ChallengeState {
        let identity = normalize_email(identity);
        let now = self.clock.now();
        self.store.with_record(&identity, now, |record| record.state(now))
    }

    /// Physically remove expired state, returning the number of records dropped
    pub fn sweep_expired(&self) -> usize {
        self.store.sweep(self.clock.now())
    }
}
