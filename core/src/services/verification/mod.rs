//! Verification service module for email code challenges
//!
//! This module provides the verification code workflow:
//! - Code generation from a configurable alphabet
//! - Code storage and delivery through a notifier with a bounded timeout
//! - Code verification with attempt tracking and lockout
//! - An independent login-attempt counter

mod code_generator;
mod config;
mod service;
mod traits;
mod types;


pub use code_generator::{CodeAlphabet, CodeGenerator};
pub use config::VerificationServiceConfig;
pub use service::VerificationService;
pub use traits::{ChallengeStore, Notifier};
pub use types::{CodeCheck, SendCodeResult};
