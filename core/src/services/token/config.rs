//! Configuration for the token service

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ca_shared::{AuthConfig, MAX_DURATION_SECONDS};
use chrono::Duration;
use jsonwebtoken::Algorithm;
use std::collections::HashMap;
use std::fmt;

use crate::domain::entities::token::TokenPurpose;
use crate::errors::DomainError;

/// Prefix marking a base64-encoded signing secret
pub const BASE64_SECRET_PREFIX: &str = "base64:";

/// Configuration for the token service
#[derive(Clone)]
pub struct TokenServiceConfig {
    /// Signing secret bytes
    pub signing_secret: Vec<u8>,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Issuer written into and required from every token
    pub issuer: String,
    /// Audience written into and required from every token
    pub audience: String,
    /// Lifetime of a token, per purpose
    pub ttls: HashMap<TokenPurpose, Duration>,
    /// Name of the cookie carrying the session token
    pub cookie_name: String,
}

impl TokenServiceConfig {
    /// Create a configuration with default issuer, audience and lifetimes
    pub fn new(signing_secret: impl Into<Vec<u8>>) -> Self {
        let ttls = HashMap::from([
            (TokenPurpose::Login, Duration::days(1)),
            (TokenPurpose::PasswordReset, Duration::minutes(15)),
        ]);

        Self {
            signing_secret: signing_secret.into(),
            algorithm: Algorithm::HS256,
            issuer: "chatapp-auth".to_string(),
            audience: "chatapp".to_string(),
            ttls,
            cookie_name: "JWT-Token".to_string(),
        }
    }

    /// Override the lifetime of one purpose
    pub fn with_ttl(mut self, purpose: TokenPurpose, ttl: Duration) -> Self {
        self.ttls.insert(purpose, ttl);
        self
    }

    /// Lifetime configured for `purpose`
    pub fn ttl_for(&self, purpose: TokenPurpose) -> Option<Duration> {
        self.ttls.get(&purpose).copied()
    }
}

// Keep the secret out of logs
impl fmt::Debug for TokenServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenServiceConfig")
            .field("signing_secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttls", &self.ttls)
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

impl TryFrom<&AuthConfig> for TokenServiceConfig {
    type Error = DomainError;

    fn try_from(auth: &AuthConfig) -> Result<Self, Self::Error> {
        let jwt = &auth.jwt;
        let secret = decode_secret(&jwt.secret)?;

        let mut config = Self::new(secret)
            .with_ttl(TokenPurpose::Login, seconds(jwt.login_token_ttl_seconds)?)
            .with_ttl(TokenPurpose::PasswordReset, seconds(jwt.reset_token_ttl_seconds)?);
        config.issuer = jwt.issuer.clone();
        config.audience = jwt.audience.clone();
        config.cookie_name = auth.cookie.name.clone();

        Ok(config)
    }
}

/// Decode a configured secret, honouring the `base64:` prefix
pub fn decode_secret(raw: &str) -> Result<Vec<u8>, DomainError> {
    let bytes = match raw.strip_prefix(BASE64_SECRET_PREFIX) {
        Some(encoded) => STANDARD.decode(encoded.trim()).map_err(|e| DomainError::Validation {
            message: format!("JWT secret is not valid base64: {}", e),
        })?,
        None => raw.as_bytes().to_vec(),
    };

    if bytes.is_empty() {
        return Err(DomainError::Validation {
            message: "JWT secret must not be empty".to_string(),
        });
    }

    Ok(bytes)
}

fn seconds(value: u64) -> Result<Duration, DomainError> {
    Some(value)
        .filter(|v| *v <= MAX_DURATION_SECONDS)
        .and_then(|v| i64::try_from(v).ok())
        .and_then(Duration::try_seconds)
        .filter(|ttl| *ttl > Duration::zero())
        .ok_or_else(|| DomainError::Validation {
            message: format!("Token lifetime out of range: {} seconds", value),
        })
}
