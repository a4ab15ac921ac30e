//! Notifier module
//!
//! Delivery of verification codes:
//! - **Mock**: records codes in memory (tests, demos)
//! - **Console**: prints the email to stdout (development)
//! - **HTTP**: posts to a mail relay (production)

mod console;
mod email;
mod http;
mod mock;

use std::sync::Arc;

use ca_core::services::verification::Notifier;
use ca_shared::{NotifierConfig, VerificationConfig};
use chrono::Duration;

use crate::InfrastructureError;

pub use console::ConsoleNotifier;
pub use email::VerificationEmail;
pub use http::{HttpMailConfig, HttpMailNotifier};
pub use mock::MockNotifier;

/// Create the notifier named by `config.provider`
///
/// # Returns
///
/// * `Ok(Arc<dyn Notifier>)` - The notifier
/// * `Err(InfrastructureError::Config)` - Unknown provider or missing endpoint
pub fn create_notifier(
    config: &NotifierConfig,
    verification: &VerificationConfig,
) -> Result<Arc<dyn Notifier>, InfrastructureError> {
    let code_ttl = i64::try_from(verification.code_ttl_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| InfrastructureError::Config("code_ttl_seconds out of range".to_string()))?;

    let notifier: Arc<dyn Notifier> = match config.provider.as_str() {
        "mock" => Arc::new(MockNotifier::new()),
        "console" => Arc::new(ConsoleNotifier::new(
            config.sender.clone(),
            config.subject.clone(),
            code_ttl,
        )),
        "http" => {
            let endpoint = config.endpoint.clone().ok_or_else(|| {
                InfrastructureError::Config("HTTP notifier requires an endpoint".to_string())
            })?;
            Arc::new(HttpMailNotifier::new(HttpMailConfig {
                endpoint,
                api_key: config.api_key.clone(),
                sender: config.sender.clone(),
                subject: config.subject.clone(),
                code_ttl,
                request_timeout: std::time::Duration::from_millis(verification.dispatch_timeout_ms),
            })?)
        }
        other => {
            return Err(InfrastructureError::Config(format!(
                "Unknown notifier provider '{}'",
                other
            )))
        }
    };

    tracing::info!(provider = %notifier.provider_name(), "Notifier created");
    Ok(notifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_known_providers() {
        let verification = VerificationConfig::default();

        for provider in ["mock", "console"] {
            let config = NotifierConfig {
                provider: provider.to_string(),
                ..Default::default()
            };
            let notifier = create_notifier(&config, &verification).unwrap();
            assert_eq!(notifier.provider_name(), provider);
        }
    }

    #[test]
    fn test_http_provider_needs_endpoint() {
        let verification = VerificationConfig::default();
        let mut config = NotifierConfig {
            provider: "http".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            create_notifier(&config, &verification),
            Err(InfrastructureError::Config(_))
        ));

        config.endpoint = Some("http://localhost:8025/send".to_string());
        assert_eq!(
            create_notifier(&config, &verification).unwrap().provider_name(),
            "http"
        );
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = NotifierConfig {
            provider: "carrier-pigeon".to_string(),
            ..Default::default()
        };

        assert!(create_notifier(&config, &VerificationConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_mock_notifier_records_codes() {
        let notifier = MockNotifier::new();

        notifier.dispatch("a@x.com", "111111").await.unwrap();
        notifier.dispatch("a@x.com", "222222").await.unwrap();

        assert_eq!(notifier.last_code("a@x.com"), Some("222222".to_string()));
        assert_eq!(notifier.sent_count("a@x.com"), 2);

        notifier.set_should_fail(true);
        assert!(notifier.dispatch("a@x.com", "333333").await.is_err());
        assert_eq!(notifier.sent_count("a@x.com"), 2);
    }

    #[tokio::test]
    async fn test_console_notifier_never_fails() {
        let notifier = ConsoleNotifier::new("no-reply@x.com", "Code", Duration::minutes(5));

        let id = notifier.dispatch("a@x.com", "123456").await.unwrap();
        assert!(id.starts_with("console-"));
    }
}
