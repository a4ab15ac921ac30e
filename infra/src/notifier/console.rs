//! Console notifier for local development

use async_trait::async_trait;
use chrono::Duration;

use ca_core::services::verification::Notifier;
use ca_shared::utils::mask_email;

use super::email::VerificationEmail;

/// Prints verification emails to stdout instead of sending them
pub struct ConsoleNotifier {
    sender: String,
    subject: String,
    code_ttl: Duration,
}

impl ConsoleNotifier {
    pub fn new(sender: impl Into<String>, subject: impl Into<String>, code_ttl: Duration) -> Self {
        Self {
            sender: sender.into(),
            subject: subject.into(),
            code_ttl,
        }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn dispatch(&self, identity: &str, code: &str) -> Result<String, String> {
        let email = VerificationEmail::render(&self.subject, code, self.code_ttl);
        let message_id = format!("console-{}", uuid::Uuid::new_v4());

        println!(
            "\n===== EMAIL ({}) =====\nFrom: {}\nTo: {}\nSubject: {}\n\n{}\n======================\n",
            message_id, self.sender, identity, email.subject, email.body
        );

        tracing::info!(
            identity = %mask_email(identity),
            message_id = %message_id,
            "Verification email written to console"
        );

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "console"
    }
}
