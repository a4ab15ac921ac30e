//! # Infrastructure Layer
//!
//! Concrete collaborators for the ChatApp auth core:
//! - **Store**: sharded in-memory challenge store
//! - **Blacklist**: in-memory token revocation list
//! - **Notifier**: mock, console and HTTP mail relay delivery
//! - **Runtime**: wiring of all services from configuration

pub mod blacklist;
pub mod notifier;
pub mod runtime;
pub mod store;

// Re-export core types for convenience
pub use ca_core::errors::*;

pub use blacklist::InMemoryTokenBlacklist;
pub use notifier::{create_notifier, ConsoleNotifier, HttpMailNotifier, MockNotifier};
pub use runtime::{initialize, initialize_from_env, initialize_with, AuthRuntime, RuntimeVerificationService};
pub use store::ShardedChallengeStore;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Notifier delivery error
    #[error("Notifier error: {0}")]
    Notifier(String),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<ca_shared::ConfigError> for InfrastructureError {
    fn from(err: ca_shared::ConfigError) -> Self {
        InfrastructureError::Config(err.to_string())
    }
}

impl From<DomainError> for InfrastructureError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { message } => InfrastructureError::Config(message),
            other => InfrastructureError::General(other.to_string()),
        }
    }
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Internal {
            message: err.to_string(),
        }
    }
}
