//! Integration tests for the login and password-reset flows

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use ca_core::{
        ChallengeState, ChallengeStore, IdentityRecord, ManualClock, Notifier,
        SessionAuthenticator, TokenBlacklist, TokenError, TokenPurpose, TokenService,
        TokenServiceConfig, VerificationService, VerificationServiceConfig,
    };
    use ca_core::errors::DomainResult;
    use ca_shared::CookieConfig;

    #[derive(Default)]
    struct MapStore {
        records: Mutex<HashMap<String, IdentityRecord>>,
    }

    impl ChallengeStore for MapStore {
        fn with_record<R, F>(&self, identity: &str, now: DateTime<Utc>, f: F) -> R
        where
            F: FnOnce(&mut IdentityRecord) -> R,
        {
            let mut records = self.records.lock().unwrap();
            let record = records.entry(identity.to_string()).or_default();
            record.purge_expired(now);
            let result = f(record);
            if record.is_empty() {
                records.remove(identity);
            }
            result
        }

        fn sweep(&self, now: DateTime<Utc>) -> usize {
            let mut records = self.records.lock().unwrap();
            let before = records.len();
            records.retain(|_, record| {
                record.purge_expired(now);
                !record.is_empty()
            });
            before - records.len()
        }

        fn len(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    #[derive(Default)]
    struct Inbox {
        last: Mutex<HashMap<String, String>>,
    }

    impl Inbox {
        fn code_for(&self, identity: &str) -> String {
            self.last.lock().unwrap().get(identity).cloned().unwrap()
        }
    }

    #[async_trait]
    impl Notifier for Inbox {
        async fn dispatch(&self, identity: &str, code: &str) -> Result<String, String> {
            self.last
                .lock()
                .unwrap()
                .insert(identity.to_string(), code.to_string());
            Ok("inbox".to_string())
        }

        fn provider_name(&self) -> &str {
            "inbox"
        }
    }

    #[derive(Default)]
    struct Revoked {
        tokens: Mutex<HashMap<String, DateTime<Utc>>>,
    }

    #[async_trait]
    impl TokenBlacklist for Revoked {
        async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> DomainResult<()> {
            self.tokens.lock().unwrap().insert(token.to_string(), expires_at);
            Ok(())
        }

        async fn is_revoked(&self, token: &str, now: DateTime<Utc>) -> DomainResult<bool> {
            Ok(self
                .tokens
                .lock()
                .unwrap()
                .get(token)
                .is_some_and(|until| now < *until))
        }

        async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<usize> {
            let mut tokens = self.tokens.lock().unwrap();
            let before = tokens.len();
            tokens.retain(|_, until| now < *until);
            Ok(before - tokens.len())
        }
    }

    struct App {
        tokens: Arc<TokenService>,
        verification: VerificationService<MapStore, Inbox>,
        sessions: SessionAuthenticator<Revoked>,
        inbox: Arc<Inbox>,
        clock: ManualClock,
    }

    fn app() -> App {
        let clock = ManualClock::starting_now();
        let config = TokenServiceConfig::new("integration-secret")
            .with_ttl(TokenPurpose::Login, Duration::seconds(3600));
        let tokens = Arc::new(TokenService::with_clock(config, Arc::new(clock.clone())).unwrap());
        let inbox = Arc::new(Inbox::default());
        let verification = VerificationService::with_clock(
            Arc::new(MapStore::default()),
            inbox.clone(),
            VerificationServiceConfig::default(),
            Arc::new(clock.clone()),
        )
        .unwrap();
        let sessions = SessionAuthenticator::new(
            tokens.clone(),
            Arc::new(Revoked::default()),
            CookieConfig::default(),
            Arc::new(clock.clone()),
        );

        App {
            tokens,
            verification,
            sessions,
            inbox,
            clock,
        }
    }

    fn request(cookie_value: &str) -> Vec<(String, String)> {
        vec![("Cookie".to_string(), format!("JWT-Token={}", cookie_value))]
    }

    #[tokio::test]
    async fn test_login_flow_end_to_end() {
        let app = app();

        app.verification.send_code("a@x.com").await.unwrap();
        let code = app.inbox.code_for("a@x.com");
        assert!(app.verification.validate_code("a@x.com", &code));

        let cookie = app.sessions.issue_session("a@x.com").unwrap();
        assert_eq!(cookie.max_age, 3600);

        let session = app.sessions.authenticate(&request(&cookie.value)).await.unwrap();
        assert_eq!(session.identity, "a@x.com");

        // Downstream services validate the same token as a pure function
        assert!(app.tokens.validate(&cookie.value));
        assert_eq!(app.tokens.get_identity(&cookie.value).unwrap(), "a@x.com");

        app.clock.advance(Duration::seconds(3600));
        assert!(app.sessions.authenticate(&request(&cookie.value)).await.is_none());
        assert_eq!(app.tokens.get_identity(&cookie.value), Err(TokenError::Expired));
    }

    #[tokio::test]
    async fn test_logout_then_reuse_is_rejected() {
        let app = app();
        let cookie = app.sessions.issue_session("a@x.com").unwrap();

        assert!(app.sessions.logout(&request(&cookie.value)).await.unwrap());

        assert!(app.sessions.authenticate(&request(&cookie.value)).await.is_none());
        assert_eq!(app.sessions.expired_cookie().max_age, 0);
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let app = app();

        app.verification.send_code("a@x.com").await.unwrap();
        let code = app.inbox.code_for("a@x.com");
        assert!(app.verification.validate_code("a@x.com", &code));

        let reset = app.tokens.generate("a@x.com", TokenPurpose::PasswordReset).unwrap();
        assert_eq!(
            app.tokens.identity_for(&reset, TokenPurpose::PasswordReset).unwrap(),
            "a@x.com"
        );

        // A reset token never opens a session
        assert!(app.sessions.authenticate(&request(&reset)).await.is_none());

        app.clock.advance(Duration::minutes(15));
        assert_eq!(
            app.tokens.identity_for(&reset, TokenPurpose::PasswordReset),
            Err(TokenError::Expired)
        );
    }

    #[tokio::test]
    async fn test_brute_force_scenario() {
        let app = app();

        app.verification.send_code("a@x.com").await.unwrap();
        let code = app.inbox.code_for("a@x.com");
        let wrong = if code == "000000" { "111111" } else { "000000" };

        for _ in 0..5 {
            assert!(!app.verification.validate_code("a@x.com", wrong));
        }
        assert!(!app.verification.validate_code("a@x.com", &code));
        assert!(matches!(
            app.verification.challenge_state("a@x.com"),
            ChallengeState::Locked { .. }
        ));

        app.verification.send_code("a@x.com").await.unwrap();
        let fresh = app.inbox.code_for("a@x.com");
        assert!(app.verification.validate_code("a@x.com", &fresh));
    }
}
