//! Authentication configuration: session tokens, cookies and verification codes

use serde::{Deserialize, Serialize};

/// Placeholder secret shipped in the defaults; refused outside development
pub const DEFAULT_JWT_SECRET: &str = "development-secret-please-change-in-production";

/// Upper bound for every configured lifetime, lockout and window (ten years)
pub const MAX_DURATION_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Token signing and lifetimes
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Session cookie attributes
    #[serde(default)]
    pub cookie: CookieConfig,

    /// Email verification challenge settings
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Password brute-force counter settings
    #[serde(default)]
    pub login_attempts: LoginAttemptConfig,
}

/// JWT signing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Signing secret. A `base64:` prefix marks a base64 encoded key.
    pub secret: String,

    /// Lifetime of login session tokens in seconds
    #[serde(default = "default_login_ttl")]
    pub login_token_ttl_seconds: u64,

    /// Lifetime of password reset tokens in seconds
    #[serde(default = "default_reset_ttl")]
    pub reset_token_ttl_seconds: u64,

    /// JWT issuer claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// JWT audience claim
    #[serde(default = "default_audience")]
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_JWT_SECRET.to_string(),
            login_token_ttl_seconds: default_login_ttl(),
            reset_token_ttl_seconds: default_reset_ttl(),
            issuer: default_issuer(),
            audience: default_audience(),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

/// `SameSite` cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CookieConfig {
    /// Cookie carrying the session token
    #[serde(default = "default_cookie_name")]
    pub name: String,

    #[serde(default = "default_cookie_path")]
    pub path: String,

    #[serde(default = "default_true")]
    pub http_only: bool,

    #[serde(default = "default_true")]
    pub secure: bool,

    #[serde(default = "default_same_site")]
    pub same_site: SameSite,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            path: default_cookie_path(),
            http_only: true,
            secure: true,
            same_site: default_same_site(),
        }
    }
}

/// Verification code challenge configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Number of characters in a generated code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// `numeric`, `alphanumeric`, or a literal set of characters
    #[serde(default = "default_alphabet")]
    pub alphabet: String,

    /// Seconds a code stays valid
    #[serde(default = "default_code_ttl")]
    pub code_ttl_seconds: u64,

    /// Wrong submissions allowed before lockout
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Seconds an identity stays locked after exhausting its attempts
    #[serde(default = "default_lockout")]
    pub lockout_seconds: u64,

    /// Upper bound on a single notifier dispatch
    #[serde(default = "default_dispatch_timeout")]
    pub dispatch_timeout_ms: u64,

    /// Period of the expired-entry sweep; 0 disables it
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            alphabet: default_alphabet(),
            code_ttl_seconds: default_code_ttl(),
            max_attempts: default_max_attempts(),
            lockout_seconds: default_lockout(),
            dispatch_timeout_ms: default_dispatch_timeout(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

/// Password login attempt counter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginAttemptConfig {
    /// Counter lifetime, measured from the first failed attempt
    #[serde(default = "default_login_window")]
    pub window_seconds: u64,
}

impl Default for LoginAttemptConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_login_window(),
        }
    }
}

fn default_login_ttl() -> u64 {
    86_400 // 1 day
}

fn default_reset_ttl() -> u64 {
    900 // 15 minutes
}

fn default_issuer() -> String {
    String::from("chatapp-auth")
}

fn default_audience() -> String {
    String::from("chatapp")
}

fn default_cookie_name() -> String {
    String::from("JWT-Token")
}

fn default_cookie_path() -> String {
    String::from("/")
}

fn default_true() -> bool {
    true
}

fn default_same_site() -> SameSite {
    SameSite::Lax
}

fn default_code_length() -> usize {
    6
}

fn default_alphabet() -> String {
    String::from("numeric")
}

fn default_code_ttl() -> u64 {
    300 // 5 minutes
}

fn default_max_attempts() -> u32 {
    5
}

fn default_lockout() -> u64 {
    900
}

fn default_dispatch_timeout() -> u64 {
    5_000
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_login_window() -> u64 {
    300
}
