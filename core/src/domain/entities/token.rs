//! Token entities for JWT-based session and password-reset tokens.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::TokenError;

/// Intent a token was issued for
///
/// The set is closed: a token carrying any other flag never validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenPurpose {
    /// Long-lived session token issued after a successful login
    #[serde(rename = "login")]
    Login,
    /// Short-lived token authorising a single password reset
    #[serde(rename = "resetPassword")]
    PasswordReset,
}

impl TokenPurpose {
    /// Every purpose flag, in declaration order
    pub const ALL: [TokenPurpose; 2] = [TokenPurpose::Login, TokenPurpose::PasswordReset];

    /// Wire representation of the flag
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Login => "login",
            TokenPurpose::PasswordReset => "resetPassword",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a purpose flag is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPurpose(pub String);

impl fmt::Display for UnknownPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown token purpose: {}", self.0)
    }
}

impl std::error::Error for UnknownPurpose {}

impl FromStr for TokenPurpose {
    type Err = UnknownPurpose;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TokenPurpose::ALL
            .into_iter()
            .find(|purpose| purpose.as_str() == s)
            .ok_or_else(|| UnknownPurpose(s.to_string()))
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity email)
    pub sub: String,

    /// Purpose flag
    pub purpose: TokenPurpose,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl Claims {
    /// Creates claims binding `identity` to `purpose` for `ttl` from `issued_at`
    ///
    /// Fails with `GenerationFailed` when the expiry is not representable.
    pub fn new(
        identity: &str,
        purpose: TokenPurpose,
        issued_at: DateTime<Utc>,
        ttl: Duration,
        issuer: &str,
        audience: &str,
    ) -> Result<Self, TokenError> {
        let expiry = issued_at
            .checked_add_signed(ttl)
            .ok_or(TokenError::GenerationFailed)?;

        Ok(Self {
            sub: identity.to_string(),
            purpose,
            iat: issued_at.timestamp(),
            exp: expiry.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
        })
    }

    /// Checks whether the claims are expired at `now` (`exp <= now`)
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Expiration as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Issue time as a timestamp
    pub fn issued_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.iat, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}
