//! Integration tests for the wired auth runtime

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

use ca_core::{ChallengeState, ChallengeStore, ManualClock, TokenPurpose};
use ca_infra::{initialize, initialize_with, AuthRuntime, InfrastructureError, MockNotifier};
use ca_shared::{AppConfig, Environment};

const SECRET: &str = "runtime-integration-secret-0123456789abcdef";

fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.auth.jwt.secret = SECRET.to_string();
    config.notifier.provider = "mock".to_string();
    config
}

async fn runtime_with_mock(config: AppConfig) -> (AuthRuntime, Arc<MockNotifier>, Arc<ManualClock>) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    ));
    let notifier = Arc::new(MockNotifier::new());
    let runtime = initialize_with(config, notifier.clone(), clock.clone())
        .await
        .unwrap();

    (runtime, notifier, clock)
}

fn cookie_envelope(name: &str, value: &str) -> Vec<(String, String)> {
    vec![("Cookie".to_string(), format!("theme=dark; {}={}", name, value))]
}

#[tokio::test]
async fn test_login_flow_through_runtime() {
    let (runtime, notifier, _clock) = runtime_with_mock(test_config()).await;
    assert!(runtime.sweeper_running());

    let sent = runtime.verification.send_code("Alice@Example.com").await.unwrap();
    assert_eq!(sent.identity, "alice@example.com");
    assert_eq!(sent.provider, "mock");

    let code = notifier.last_code("alice@example.com").unwrap();
    assert!(runtime.verification.validate_code("alice@example.com", &code));

    let cookie = runtime.sessions.issue_session("alice@example.com").unwrap();
    assert_eq!(cookie.name, "JWT-Token");
    assert!(!cookie.secure);

    let envelope = cookie_envelope(&cookie.name, &cookie.value);
    let session = runtime.sessions.authenticate(&envelope).await.unwrap();
    assert_eq!(session.identity, "alice@example.com");

    assert!(runtime.sessions.logout(&envelope).await.unwrap());
    assert!(runtime.sessions.authenticate(&envelope).await.is_none());
    assert_eq!(runtime.blacklist.len(), 1);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_reset_token_not_accepted_as_session() {
    let (runtime, _notifier, _clock) = runtime_with_mock(test_config()).await;

    let reset = runtime
        .tokens
        .generate("bob@example.com", TokenPurpose::PasswordReset)
        .unwrap();
    let envelope = cookie_envelope("JWT-Token", &reset);

    assert!(runtime.sessions.authenticate(&envelope).await.is_none());
    assert_eq!(
        runtime
            .tokens
            .identity_for(&reset, TokenPurpose::PasswordReset)
            .unwrap(),
        "bob@example.com"
    );

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_expired_challenges_swept() {
    let (runtime, _notifier, clock) = runtime_with_mock(test_config()).await;

    runtime.verification.send_code("carol@example.com").await.unwrap();
    runtime.verification.send_code("dave@example.com").await.unwrap();
    assert_eq!(runtime.store.len(), 2);

    clock.advance(Duration::minutes(6));
    assert_eq!(runtime.verification.sweep_expired(), 2);
    assert!(runtime.store.is_empty());
    assert_eq!(
        runtime.verification.challenge_state("carol@example.com"),
        ChallengeState::NoChallenge
    );

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_sweeper_disabled_by_zero_interval() {
    let mut config = test_config();
    config.auth.verification.sweep_interval_seconds = 0;

    let (runtime, _notifier, _clock) = runtime_with_mock(config).await;
    assert!(!runtime.sweeper_running());

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_runtime_follows_configured_limits() {
    let mut config = test_config();
    config.auth.verification.max_attempts = 2;
    config.auth.verification.code_length = 8;

    let (runtime, notifier, _clock) = runtime_with_mock(config).await;

    runtime.verification.send_code("erin@example.com").await.unwrap();
    let code = notifier.last_code("erin@example.com").unwrap();
    assert_eq!(code.len(), 8);

    let wrong = if code == "00000000" { "11111111" } else { "00000000" };
    assert!(!runtime.verification.validate_code("erin@example.com", wrong));
    assert!(!runtime.verification.validate_code("erin@example.com", wrong));
    assert!(matches!(
        runtime.verification.challenge_state("erin@example.com"),
        ChallengeState::Locked { .. }
    ));
    assert!(!runtime.verification.validate_code("erin@example.com", &code));

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_initialize_builds_configured_notifier() {
    let mut config = test_config();
    config.auth.verification.sweep_interval_seconds = 0;

    let runtime = initialize(config).await.unwrap();
    let sent = runtime.verification.send_code("frank@example.com").await.unwrap();
    assert_eq!(sent.provider, "mock");

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_production_refuses_default_secret() {
    let mut config = AppConfig::for_environment(Environment::Production);
    config.notifier.provider = "mock".to_string();

    assert!(matches!(
        initialize(config).await,
        Err(InfrastructureError::Config(_))
    ));
}

#[tokio::test]
async fn test_http_notifier_requires_endpoint() {
    let mut config = test_config();
    config.notifier.provider = "http".to_string();
    config.notifier.endpoint = None;

    assert!(matches!(
        initialize(config).await,
        Err(InfrastructureError::Config(_))
    ));
}
