//! Mail relay notifier over HTTP
//!
//! Posts a JSON message to a relay endpoint. The relay owns the SMTP side;
//! any non-2xx response counts as a failed delivery.

use async_trait::async_trait;
use chrono::Duration;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use ca_core::services::verification::Notifier;
use ca_shared::utils::mask_email;

use super::email::VerificationEmail;
use crate::InfrastructureError;

/// Mail relay configuration
#[derive(Debug, Clone)]
pub struct HttpMailConfig {
    /// Relay endpoint receiving the POST
    pub endpoint: String,
    /// Bearer token, if the relay wants one
    pub api_key: Option<String>,
    /// Sender address
    pub sender: String,
    /// Subject line
    pub subject: String,
    /// Validity shown in the email body
    pub code_ttl: Duration,
    /// Timeout for a single request
    pub request_timeout: std::time::Duration,
}

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    to: &'a str,
    from: &'a str,
    subject: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct MailResponse {
    id: Option<String>,
}

/// Delivers verification codes through an HTTP mail relay
pub struct HttpMailNotifier {
    client: Client,
    config: HttpMailConfig,
}

impl HttpMailNotifier {
    pub fn new(config: HttpMailConfig) -> Result<Self, InfrastructureError> {
        if config.endpoint.trim().is_empty() {
            return Err(InfrastructureError::Config(
                "Mail relay endpoint must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent(concat!("chatapp-auth/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        info!(endpoint = %config.endpoint, "HTTP mail notifier initialized");

        Ok(Self { client, config })
    }

    /// Send the verification email, returning the relay's message id
    pub async fn send(&self, identity: &str, code: &str) -> Result<String, InfrastructureError> {
        let email = VerificationEmail::render(&self.config.subject, code, self.config.code_ttl);
        let payload = MailRequest {
            to: identity,
            from: &self.config.sender,
            subject: &email.subject,
            body: &email.body,
        };

        let mut request = self.client.post(&self.config.endpoint).json(&payload);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        debug!(identity = %mask_email(identity), "Posting verification email to relay");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            error!(
                identity = %mask_email(identity),
                status = status.as_u16(),
                event = "mail_relay_rejected",
                "Mail relay rejected the message"
            );
            return Err(InfrastructureError::Notifier(format!(
                "Mail relay returned {}",
                status
            )));
        }

        // The relay may answer with an empty body
        let message_id = response
            .json::<MailResponse>()
            .await
            .ok()
            .and_then(|body| body.id)
            .unwrap_or_else(|| format!("relay-{}", uuid::Uuid::new_v4()));

        Ok(message_id)
    }
}

#[async_trait]
impl Notifier for HttpMailNotifier {
    async fn dispatch(&self, identity: &str, code: &str) -> Result<String, String> {
        self.send(identity, code).await.map_err(|e| e.to_string())
    }

    fn provider_name(&self) -> &str {
        "http"
    }
}
