//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Session tokens, cookies, verification codes and login attempts
//! - `environment` - Environment detection and logging configuration
//! - `notifier` - Verification code delivery
//!
//! [`AppConfig::load`] layers built-in defaults, an optional per-environment
//! TOML file and `CHAT_AUTH__*` environment variables.

pub mod auth;
pub mod environment;
pub mod notifier;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// Re-export commonly used types
pub use auth::{
    AuthConfig, CookieConfig, JwtConfig, LoginAttemptConfig, SameSite, VerificationConfig,
    MAX_DURATION_SECONDS,
};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use notifier::NotifierConfig;

/// Prefix of environment variables overriding configuration keys
pub const ENV_PREFIX: &str = "CHAT_AUTH";

/// Alphabet override, read verbatim so numeric alphabets keep leading zeros
const ALPHABET_ENV_VAR: &str = "CHAT_AUTH__AUTH__VERIFICATION__ALPHABET";

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Verification code delivery
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        let mut auth = AuthConfig::default();
        auth.cookie.secure = false;

        Self {
            environment: Environment::Development,
            auth,
            notifier: NotifierConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            auth: AuthConfig::default(),
            notifier: NotifierConfig {
                provider: String::from("http"),
                ..Default::default()
            },
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Baseline configuration for an environment before file/env overrides
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::production();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        }
    }

    /// Load configuration from `.env`, the environment's `.env.<env>` and
    /// TOML files and `CHAT_AUTH__*` variables, then validate it
    ///
    /// Variables already set in the process win over `.env`, which wins over
    /// `.env.<env>`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let env = Environment::from_env();
        env.load_env_file(Path::new("."));
        let file = env.config_file().to_string();
        Self::load_from(env, Some(&file))
    }

    /// Load configuration for a given environment and optional file
    pub fn load_from(env: Environment, file: Option<&str>) -> Result<Self, ConfigError> {
        let defaults = Self::for_environment(env);

        let mut builder = config::Config::builder().add_source(config::Config::try_from(&defaults)?);
        if let Some(path) = file {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        builder = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option(
                "auth.verification.alphabet",
                std::env::var(ALPHABET_ENV_VAR).ok(),
            )?;

        let loaded: AppConfig = builder.build()?.try_deserialize()?;
        loaded.validate()?;

        tracing::debug!(
            environment = %loaded.environment,
            notifier = %loaded.notifier.provider,
            "Configuration loaded"
        );

        Ok(loaded)
    }

    /// Reject values that would make the auth core insecure or inoperable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let jwt = &self.auth.jwt;
        if jwt.secret.trim().is_empty() {
            return Err(ConfigError::invalid("auth.jwt.secret", "must not be empty"));
        }
        if !self.environment.is_development() && jwt.is_using_default_secret() {
            return Err(ConfigError::invalid(
                "auth.jwt.secret",
                "the development secret cannot be used outside development",
            ));
        }
        check_duration("auth.jwt.login_token_ttl_seconds", jwt.login_token_ttl_seconds)?;
        check_duration("auth.jwt.reset_token_ttl_seconds", jwt.reset_token_ttl_seconds)?;

        let verification = &self.auth.verification;
        if verification.code_length == 0 {
            return Err(ConfigError::invalid(
                "auth.verification.code_length",
                "must be at least 1",
            ));
        }
        if verification.alphabet.is_empty() {
            return Err(ConfigError::invalid(
                "auth.verification.alphabet",
                "must not be empty",
            ));
        }
        if verification.max_attempts == 0 {
            return Err(ConfigError::invalid(
                "auth.verification.max_attempts",
                "must be at least 1",
            ));
        }
        check_duration("auth.verification.code_ttl_seconds", verification.code_ttl_seconds)?;
        check_duration("auth.verification.lockout_seconds", verification.lockout_seconds)?;
        check_duration(
            "auth.login_attempts.window_seconds",
            self.auth.login_attempts.window_seconds,
        )?;
        if verification.sweep_interval_seconds > MAX_DURATION_SECONDS {
            return Err(ConfigError::invalid(
                "auth.verification.sweep_interval_seconds",
                format!("must not exceed {} seconds", MAX_DURATION_SECONDS),
            ));
        }

        if self.notifier.provider == "http" && self.notifier.endpoint.is_none() {
            return Err(ConfigError::invalid(
                "notifier.endpoint",
                "required for the http provider",
            ));
        }

        Ok(())
    }
}

fn check_duration(field: &str, seconds: u64) -> Result<(), ConfigError> {
    if seconds == 0 {
        return Err(ConfigError::invalid(field, "must be positive"));
    }
    if seconds > MAX_DURATION_SECONDS {
        return Err(ConfigError::invalid(
            field,
            format!("must not exceed {} seconds", MAX_DURATION_SECONDS),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_config_is_valid() {
        let config = AppConfig::development();
        assert!(config.validate().is_ok());
        assert!(!config.auth.cookie.secure);
    }

    #[test]
    fn test_production_rejects_default_secret() {
        let mut config = AppConfig::production();
        config.notifier.endpoint = Some("https://mail.example.com/send".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "auth.jwt.secret"
        ));

        config.auth.jwt.secret = "a-real-production-secret-with-enough-entropy".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_code_length_rejected() {
        let mut config = AppConfig::development();
        config.auth.verification.code_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_lockout_and_window_rejected() {
        let mut config = AppConfig::development();
        config.auth.verification.lockout_seconds = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "auth.verification.lockout_seconds"
        ));

        let mut config = AppConfig::development();
        config.auth.login_attempts.window_seconds = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "auth.login_attempts.window_seconds"
        ));
    }

    #[test]
    fn test_oversized_lifetimes_rejected() {
        let mut config = AppConfig::development();
        config.auth.jwt.login_token_ttl_seconds = 10_000_000_000_000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "auth.jwt.login_token_ttl_seconds"
        ));

        let mut config = AppConfig::development();
        config.auth.verification.lockout_seconds = MAX_DURATION_SECONDS + 1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::development();
        config.auth.verification.code_ttl_seconds = MAX_DURATION_SECONDS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_http_notifier_requires_endpoint() {
        let mut config = AppConfig::development();
        config.notifier.provider = "http".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        temp_env::with_vars(
            [
                ("CHAT_AUTH__AUTH__VERIFICATION__MAX_ATTEMPTS", Some("7")),
                ("CHAT_AUTH__AUTH__JWT__SECRET", Some("override-secret")),
            ],
            || {
                let config = AppConfig::load_from(Environment::Development, None).unwrap();
                assert_eq!(config.auth.verification.max_attempts, 7);
                assert_eq!(config.auth.jwt.secret, "override-secret");
                assert_eq!(config.auth.verification.code_length, 6);
            },
        );
    }

    #[test]
    fn test_numeric_alphabet_keeps_leading_zero() {
        temp_env::with_vars(
            [
                (ALPHABET_ENV_VAR, Some("0123456789")),
                ("CHAT_AUTH__AUTH__VERIFICATION__CODE_LENGTH", Some("8")),
            ],
            || {
                let config = AppConfig::load_from(Environment::Development, None).unwrap();
                assert_eq!(config.auth.verification.alphabet, "0123456789");
                assert_eq!(config.auth.verification.code_length, 8);
            },
        );
    }

    #[test]
    fn test_alphabet_defaults_without_override() {
        temp_env::with_var_unset(ALPHABET_ENV_VAR, || {
            let config = AppConfig::load_from(Environment::Development, None).unwrap();
            assert_eq!(config.auth.verification.alphabet, "numeric");
        });
    }
}
