//! Configuration for the verification service

use ca_shared::{AuthConfig, MAX_DURATION_SECONDS};
use chrono::Duration;

use crate::errors::DomainError;

use super::code_generator::CodeAlphabet;

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Number of symbols in a code
    pub code_length: usize,
    /// Symbols codes are drawn from
    pub alphabet: CodeAlphabet,
    /// Lifetime of a pending code
    pub code_ttl: Duration,
    /// Wrong guesses that trigger a lockout
    pub max_attempts: u32,
    /// Lockout duration once `max_attempts` is reached
    pub lockout: Duration,
    /// Upper bound on a single notifier dispatch
    pub dispatch_timeout: std::time::Duration,
    /// Period of the background sweep (`None` disables it)
    pub sweep_interval: Option<std::time::Duration>,
    /// Window of the independent login-attempt counter
    pub login_attempt_window: Duration,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            alphabet: CodeAlphabet::Numeric,
            code_ttl: Duration::minutes(5),
            max_attempts: 5,
            lockout: Duration::minutes(15),
            dispatch_timeout: std::time::Duration::from_secs(5),
            sweep_interval: Some(std::time::Duration::from_secs(60)),
            login_attempt_window: Duration::minutes(5),
        }
    }
}

impl TryFrom<&AuthConfig> for VerificationServiceConfig {
    type Error = DomainError;

    fn try_from(auth: &AuthConfig) -> Result<Self, Self::Error> {
        let v = &auth.verification;

        if v.max_attempts == 0 {
            return Err(DomainError::Validation {
                message: "max_attempts must be at least 1".to_string(),
            });
        }

        Ok(Self {
            code_length: v.code_length,
            alphabet: CodeAlphabet::parse(&v.alphabet)?,
            code_ttl: seconds("code_ttl_seconds", v.code_ttl_seconds)?,
            max_attempts: v.max_attempts,
            lockout: seconds("lockout_seconds", v.lockout_seconds)?,
            dispatch_timeout: std::time::Duration::from_millis(v.dispatch_timeout_ms),
            sweep_interval: (v.sweep_interval_seconds > 0)
                .then(|| std::time::Duration::from_secs(v.sweep_interval_seconds)),
            login_attempt_window: seconds(
                "login_attempts.window_seconds",
                auth.login_attempts.window_seconds,
            )?,
        })
    }
}

fn seconds(field: &str, value: u64) -> Result<Duration, DomainError> {
    Some(value)
        .filter(|v| *v <= MAX_DURATION_SECONDS)
        .and_then(|v| i64::try_from(v).ok())
        .and_then(Duration::try_seconds)
        .filter(|d| *d > Duration::zero())
        .ok_or_else(|| DomainError::Validation {
            message: format!("{} out of range: {}", field, value),
        })
}
