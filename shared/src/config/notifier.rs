//! Verification code delivery configuration

use serde::{Deserialize, Serialize};

/// Notifier (email delivery) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    /// Delivery provider ("mock", "console", "http")
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Mail relay endpoint, required for the "http" provider
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token for the mail relay
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sender address
    #[serde(default = "default_sender")]
    pub sender: String,

    /// Subject line of verification emails
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: None,
            api_key: None,
            sender: default_sender(),
            subject: default_subject(),
        }
    }
}

fn default_provider() -> String {
    String::from("console")
}

fn default_sender() -> String {
    String::from("no-reply@chatapp.local")
}

fn default_subject() -> String {
    String::from("Verification Code")
}
