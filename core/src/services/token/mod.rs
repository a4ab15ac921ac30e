//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Token generation per purpose with configurable lifetimes
//! - Signature and expiry validation behind a single gate
//! - Token extraction from request cookies
//! - Session cookies, logout and revocation

mod blacklist;
mod codec;
mod config;
mod envelope;
mod service;
mod session;


pub use blacklist::TokenBlacklist;
pub use codec::TokenCodec;
pub use config::{decode_secret, TokenServiceConfig, BASE64_SECRET_PREFIX};
pub use envelope::RequestEnvelope;
pub use service::TokenService;
pub use session::{AuthenticatedSession, SessionAuthenticator, SessionCookie};
