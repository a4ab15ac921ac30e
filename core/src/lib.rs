//! # ChatApp Auth Core
//!
//! Domain layer of the ChatApp authentication core: signed session and
//! password-reset tokens, email verification-code challenges with attempt
//! limiting, and the traits concrete stores and notifiers plug into.

pub mod clock;
pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::*;
pub use errors::*;
pub use services::*;
