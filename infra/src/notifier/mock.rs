//! Mock notifier for development and tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use ca_core::services::verification::Notifier;

/// Notifier that records codes instead of sending them
#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<HashMap<String, Vec<String>>>,
    should_fail: AtomicBool,
    latency: Option<Duration>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every dispatch by `latency`
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Make subsequent dispatches fail
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Most recent code sent to `identity`
    pub fn last_code(&self, identity: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identity)
            .and_then(|codes| codes.last().cloned())
    }

    /// Number of codes sent to `identity`
    pub fn sent_count(&self, identity: &str) -> usize {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identity)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn dispatch(&self, identity: &str, code: &str) -> Result<String, String> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.should_fail.load(Ordering::SeqCst) {
            return Err("Simulated delivery failure".to_string());
        }

        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(identity.to_string())
            .or_default()
            .push(code.to_string());

        Ok(format!("mock-{}", uuid::Uuid::new_v4()))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
