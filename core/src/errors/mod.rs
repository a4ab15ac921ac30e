//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

pub use types::{TokenError, TokenRejection, VerificationError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Verification(#[from] VerificationError),
}

pub type DomainResult<T> = Result<T, DomainError>;
