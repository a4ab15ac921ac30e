//! Signing and verification of the compact token format

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;

use crate::domain::entities::token::{Claims, TokenPurpose};
use crate::errors::{TokenError, TokenRejection};

use super::config::TokenServiceConfig;

/// Claims as they arrive off the wire, before the purpose flag is checked
#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: String,
    purpose: String,
    iat: i64,
    exp: i64,
    iss: String,
    aud: String,
    jti: String,
}

impl TryFrom<RawClaims> for Claims {
    type Error = TokenRejection;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let purpose: TokenPurpose = raw
            .purpose
            .parse()
            .map_err(|_| TokenRejection::UnknownPurpose)?;

        Ok(Claims {
            sub: raw.sub,
            purpose,
            iat: raw.iat,
            exp: raw.exp,
            iss: raw.iss,
            aud: raw.aud,
            jti: raw.jti,
        })
    }
}

/// Encodes claims into signed tokens and verifies signatures
///
/// The codec checks signature, issuer and audience only. Expiry is judged by
/// `TokenService` against its clock.
pub struct TokenCodec {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec from the service configuration
    pub fn new(config: &TokenServiceConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(&config.signing_secret);
        let decoding_key = DecodingKey::from_secret(&config.signing_secret);

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Self {
            header: Header::new(config.algorithm),
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Sign claims into a token string
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&self.header, claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, event = "token_encode_failed", "Failed to sign token");
            TokenError::GenerationFailed
        })
    }

    /// Verify the signature and parse the claims
    pub fn decode(&self, token: &str) -> Result<Claims, TokenRejection> {
        let data = decode::<RawClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => TokenRejection::SignatureMismatch,
                ErrorKind::ExpiredSignature => TokenRejection::Expired,
                _ => TokenRejection::Malformed,
            },
        )?;

        Claims::try_from(data.claims)
    }
}
