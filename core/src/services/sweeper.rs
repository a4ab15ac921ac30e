//! Periodic removal of expired challenge state and revocations
//!
//! Expiry is always enforced lazily on read; the sweeper only bounds memory
//! when many identities request codes and never come back.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::services::token::TokenBlacklist;
use crate::services::verification::ChallengeStore;

/// Result of one sweep cycle
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepResult {
    /// Identity records removed from the challenge store
    pub challenges_removed: usize,
    /// Revocation entries removed from the blacklist
    pub revocations_removed: usize,
    /// Errors encountered during the cycle
    pub errors: Vec<String>,
}

impl SweepResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_removed(&self) -> usize {
        self.challenges_removed + self.revocations_removed
    }
}

/// Background sweeper over a challenge store and, optionally, a token blacklist
pub struct ChallengeSweeper<S: ChallengeStore + 'static> {
    store: Arc<S>,
    blacklist: Option<Arc<dyn TokenBlacklist>>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl<S: ChallengeStore + 'static> ChallengeSweeper<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            store,
            blacklist: None,
            clock,
            interval,
        }
    }

    /// Also purge expired revocations on every cycle
    pub fn with_blacklist(mut self, blacklist: Arc<dyn TokenBlacklist>) -> Self {
        self.blacklist = Some(blacklist);
        self
    }

    /// Run a single sweep cycle
    pub async fn run_once(&self) -> SweepResult {
        let now = self.clock.now();
        let mut result = SweepResult {
            challenges_removed: self.store.sweep(now),
            ..Default::default()
        };

        if let Some(blacklist) = &self.blacklist {
            match blacklist.purge_expired(now).await {
                Ok(count) => result.revocations_removed = count,
                Err(e) => {
                    error!(error = %e, event = "blacklist_sweep_failed", "Failed to purge token blacklist");
                    result.errors.push(format!("Blacklist sweep error: {}", e));
                }
            }
        }

        debug!(
            challenges_removed = result.challenges_removed,
            revocations_removed = result.revocations_removed,
            remaining = self.store.len(),
            event = "sweep_completed",
            "Sweep cycle completed"
        );

        result
    }

    /// Start sweeping on a tokio task
    ///
    /// The first cycle runs one full interval after start.
    pub fn start(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let interval = self.interval;

        let task = tokio::spawn(async move {
            info!(
                interval_seconds = interval.as_secs(),
                "Challenge sweeper started"
            );

            let start = tokio::time::Instant::now() + interval;
            let mut timer = tokio::time::interval_at(start, interval);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = timer.tick() => {
                        let result = self.run_once().await;
                        if !result.is_success() {
                            error!(errors = ?result.errors, "Sweep completed with errors");
                        }
                    }
                }
            }

            info!("Challenge sweeper stopped");
        });

        SweeperHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

/// Handle to a running sweeper
pub struct SweeperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait for the task to finish
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            if !e.is_cancelled() {
                error!(error = %e, "Challenge sweeper task failed");
            }
        }
    }

    /// Check if the sweeper task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if self.shutdown.is_some() {
            self.task.abort();
        }
    }
}
