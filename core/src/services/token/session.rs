//! Cookie-based session gate on top of the token service

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use ca_shared::utils::mask_email;
use ca_shared::{CookieConfig, SameSite};

use crate::clock::Clock;
use crate::domain::entities::token::TokenPurpose;
use crate::errors::{DomainResult, TokenError};

use super::blacklist::TokenBlacklist;
use super::envelope::RequestEnvelope;
use super::service::TokenService;

/// Identity established for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub identity: String,
    pub expires_at: DateTime<Utc>,
    pub token_id: String,
}

/// Attributes of a session cookie, renderable as a `Set-Cookie` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub max_age: i64,
}

impl SessionCookie {
    /// Render the header value
    pub fn to_header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}; Path={}; Max-Age={}; SameSite={}",
            self.name, self.value, self.path, self.max_age, self.same_site
        )?;
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        Ok(())
    }
}

/// Authenticates requests by their session cookie and handles logout
pub struct SessionAuthenticator<B: TokenBlacklist> {
    tokens: Arc<TokenService>,
    blacklist: Arc<B>,
    cookie: CookieConfig,
    clock: Arc<dyn Clock>,
}

impl<B: TokenBlacklist> SessionAuthenticator<B> {
    pub fn new(
        tokens: Arc<TokenService>,
        blacklist: Arc<B>,
        cookie: CookieConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens,
            blacklist,
            cookie,
            clock,
        }
    }

    /// Resolve the session carried by a request
    ///
    /// Returns `None` when the cookie is missing, revoked, invalid, expired,
    /// or holds a token issued for anything other than login.
    pub async fn authenticate<E: RequestEnvelope + ?Sized + Sync>(
        &self,
        envelope: &E,
    ) -> Option<AuthenticatedSession> {
        let token = self.tokens.extract_from_envelope(envelope)?;

        match self.blacklist.is_revoked(&token, self.clock.now()).await {
            Ok(false) => {}
            Ok(true) => {
                tracing::debug!(event = "revoked_token_presented", "Rejected revoked session token");
                return None;
            }
            Err(e) => {
                // Fail closed when the revocation list is unavailable
                tracing::error!(error = %e, event = "blacklist_lookup_failed", "Could not check token revocation");
                return None;
            }
        }

        let claims = self.tokens.claims(&token).ok()?;
        if claims.purpose != TokenPurpose::Login {
            tracing::warn!(
                identity = %mask_email(&claims.sub),
                purpose = %claims.purpose,
                event = "non_session_token_presented",
                "Rejected non-login token as session"
            );
            return None;
        }

        Some(AuthenticatedSession {
            expires_at: claims.expires_at(),
            identity: claims.sub,
            token_id: claims.jti,
        })
    }

    /// Issue a login token wrapped in a session cookie
    pub fn issue_session(&self, identity: &str) -> DomainResult<SessionCookie> {
        let token = self.tokens.generate(identity, TokenPurpose::Login)?;
        let max_age = self
            .tokens
            .config()
            .ttl_for(TokenPurpose::Login)
            .map(|ttl| ttl.num_seconds())
            .unwrap_or_default();

        tracing::info!(
            identity = %mask_email(identity),
            event = "session_issued",
            "Issued session cookie"
        );

        Ok(self.build_cookie(token, max_age))
    }

    /// Cookie that clears the session on the client
    pub fn expired_cookie(&self) -> SessionCookie {
        self.build_cookie(String::new(), 0)
    }

    /// Revoke the session carried by a request
    ///
    /// Returns `true` when a live token was revoked. Requests without a
    /// usable token are a no-op.
    pub async fn logout<E: RequestEnvelope + ?Sized + Sync>(&self, envelope: &E) -> DomainResult<bool> {
        let Some(token) = self.tokens.extract_from_envelope(envelope) else {
            return Ok(false);
        };

        let claims = match self.tokens.claims(&token) {
            Ok(claims) => claims,
            Err(TokenError::Expired) | Err(TokenError::Invalid) => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        self.blacklist.revoke(&token, claims.expires_at()).await?;

        tracing::info!(
            identity = %mask_email(&claims.sub),
            event = "session_revoked",
            "Session token revoked on logout"
        );

        Ok(true)
    }

    fn build_cookie(&self, value: String, max_age: i64) -> SessionCookie {
        SessionCookie {
            name: self.cookie.name.clone(),
            value,
            path: self.cookie.path.clone(),
            http_only: self.cookie.http_only,
            secure: self.cookie.secure,
            same_site: self.cookie.same_site,
            max_age,
        }
    }
}
