//! Main token service implementation

use chrono::{DateTime, Utc};
use std::sync::Arc;

use ca_shared::utils::mask_email;

use crate::clock::{Clock, SystemClock};
use crate::domain::entities::token::{Claims, TokenPurpose};
use crate::errors::{DomainError, DomainResult, TokenError, TokenRejection};

use super::codec::TokenCodec;
use super::config::TokenServiceConfig;
use super::envelope::RequestEnvelope;

/// Issues and validates signed tokens
///
/// Holds no mutable state: the signing key is fixed at construction. Every
/// read path goes through [`TokenService::verify`], which always checks the
/// signature and the expiry together.
pub struct TokenService {
    codec: TokenCodec,
    config: TokenServiceConfig,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Creates a token service on the wall clock
    pub fn new(config: TokenServiceConfig) -> DomainResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a token service reading time from `clock`
    pub fn with_clock(config: TokenServiceConfig, clock: Arc<dyn Clock>) -> DomainResult<Self> {
        if config.signing_secret.is_empty() {
            return Err(DomainError::Validation {
                message: "JWT secret must not be empty".to_string(),
            });
        }
        if let Some(missing) = TokenPurpose::ALL
            .into_iter()
            .find(|purpose| config.ttl_for(*purpose).is_none())
        {
            return Err(DomainError::Validation {
                message: format!("No token lifetime configured for purpose '{}'", missing),
            });
        }

        Ok(Self {
            codec: TokenCodec::new(&config),
            config,
            clock,
        })
    }

    /// Service configuration
    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Generates a token binding `identity` to `purpose`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The encoded token
    /// * `Err(DomainError)` - Empty identity or signing failure
    pub fn generate(&self, identity: &str, purpose: TokenPurpose) -> DomainResult<String> {
        if identity.trim().is_empty() {
            return Err(DomainError::Validation {
                message: "Token subject must not be empty".to_string(),
            });
        }

        let ttl = self
            .config
            .ttl_for(purpose)
            .ok_or(DomainError::Token(TokenError::GenerationFailed))?;
        let claims = Claims::new(
            identity,
            purpose,
            self.clock.now(),
            ttl,
            &self.config.issuer,
            &self.config.audience,
        )?;

        let token = self.codec.encode(&claims)?;

        tracing::debug!(
            identity = %mask_email(identity),
            purpose = %purpose,
            jti = %claims.jti,
            event = "token_issued",
            "Issued token"
        );

        Ok(token)
    }

    /// Verifies signature and expiry and returns the claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenRejection> {
        let claims = self.codec.decode(token)?;
        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenRejection::Expired);
        }
        Ok(claims)
    }

    /// Checks whether a token is currently valid
    ///
    /// Never fails: untrusted input simply yields `false`.
    pub fn validate(&self, token: &str) -> bool {
        match self.verify(token) {
            Ok(_) => true,
            Err(reason) => {
                tracing::debug!(reason = %reason, event = "token_rejected", "Token rejected");
                false
            }
        }
    }

    /// Returns the verified claims of a token
    pub fn claims(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(token).map_err(|reason| {
            tracing::debug!(reason = %reason, event = "token_rejected", "Token rejected");
            TokenError::from(reason)
        })
    }

    /// Returns the identity bound to a fully valid token
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The identity
    /// * `Err(TokenError::Expired)` - Genuine token past its lifetime
    /// * `Err(TokenError::Invalid)` - Anything else
    pub fn get_identity(&self, token: &str) -> Result<String, TokenError> {
        self.claims(token).map(|claims| claims.sub)
    }

    /// Returns the identity only if the token was issued for `purpose`
    pub fn identity_for(&self, token: &str, purpose: TokenPurpose) -> Result<String, TokenError> {
        let claims = self.claims(token)?;
        if claims.purpose != purpose {
            tracing::warn!(
                expected = %purpose,
                actual = %claims.purpose,
                event = "token_purpose_mismatch",
                "Token presented for the wrong purpose"
            );
            return Err(TokenError::Invalid);
        }
        Ok(claims.sub)
    }

    /// Returns the expiry of a correctly signed token
    ///
    /// Expired tokens still report their expiry.
    pub fn get_expiration(&self, token: &str) -> Result<DateTime<Utc>, TokenError> {
        match self.codec.decode(token) {
            Ok(claims) => Ok(claims.expires_at()),
            Err(_) => Err(TokenError::Invalid),
        }
    }

    /// Pulls the token out of the configured cookie
    ///
    /// A missing cookie is not an error.
    pub fn extract_from_envelope<E: RequestEnvelope + ?Sized>(&self, envelope: &E) -> Option<String> {
        envelope
            .cookie(&self.config.cookie_name)
            .map(str::to_string)
    }
}
