//! Shared utilities and common types for the ChatApp authentication core
//!
//! This crate provides common functionality used across the auth crates:
//! - Configuration types and the layered configuration loader
//! - Logging bootstrap
//! - Utility functions (email validation, masking for logs)

pub mod config;
pub mod logging;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, ConfigError, CookieConfig, Environment, JwtConfig, LogFormat,
    LoggingConfig, LoginAttemptConfig, NotifierConfig, SameSite, VerificationConfig,
    MAX_DURATION_SECONDS,
};
pub use utils::validation;
