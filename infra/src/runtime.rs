//! Runtime wiring
//!
//! Builds every auth service from an [`AppConfig`] and owns the background
//! sweeper, so the lifetime of all shared state is tied to one value.

use std::sync::Arc;

use ca_core::clock::{Clock, SystemClock};
use ca_core::services::sweeper::{ChallengeSweeper, SweeperHandle};
use ca_core::services::token::{SessionAuthenticator, TokenBlacklist, TokenService, TokenServiceConfig};
use ca_core::services::verification::{Notifier, VerificationService, VerificationServiceConfig};
use ca_shared::logging::init_tracing;
use ca_shared::AppConfig;

use crate::blacklist::InMemoryTokenBlacklist;
use crate::notifier::create_notifier;
use crate::store::ShardedChallengeStore;
use crate::InfrastructureError;

/// Verification service as wired by the runtime
pub type RuntimeVerificationService = VerificationService<ShardedChallengeStore, dyn Notifier>;

/// All auth services of a running process
pub struct AuthRuntime {
    pub config: AppConfig,
    pub tokens: Arc<TokenService>,
    pub verification: Arc<RuntimeVerificationService>,
    pub sessions: Arc<SessionAuthenticator<InMemoryTokenBlacklist>>,
    pub store: Arc<ShardedChallengeStore>,
    pub blacklist: Arc<InMemoryTokenBlacklist>,
    sweeper: Option<SweeperHandle>,
}

impl AuthRuntime {
    /// Whether the background sweeper is running
    pub fn sweeper_running(&self) -> bool {
        self.sweeper.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stop background tasks
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.shutdown().await;
        }
        tracing::info!("Auth runtime stopped");
    }
}

/// Load configuration from the environment, install logging, and initialize
pub async fn initialize_from_env() -> Result<AuthRuntime, InfrastructureError> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging);
    initialize(config).await
}

/// Initialize all services on the wall clock
pub async fn initialize(config: AppConfig) -> Result<AuthRuntime, InfrastructureError> {
    let notifier = create_notifier(&config.notifier, &config.auth.verification)?;
    initialize_with(config, notifier, Arc::new(SystemClock)).await
}

/// Initialize all services with an explicit notifier and clock
///
/// Must be called inside a tokio runtime when the sweeper is enabled.
pub async fn initialize_with(
    config: AppConfig,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
) -> Result<AuthRuntime, InfrastructureError> {
    tracing::info!(environment = %config.environment, "Initializing auth runtime...");

    config.validate()?;
    if config.auth.jwt.is_using_default_secret() {
        tracing::warn!("Using the default JWT secret; set CHAT_AUTH__AUTH__JWT__SECRET");
    }

    let token_config = TokenServiceConfig::try_from(&config.auth)?;
    let verification_config = VerificationServiceConfig::try_from(&config.auth)?;
    let sweep_interval = verification_config.sweep_interval;

    let store = Arc::new(ShardedChallengeStore::default());
    let blacklist = Arc::new(InMemoryTokenBlacklist::with_clock(clock.clone()));
    let tokens = Arc::new(TokenService::with_clock(token_config, clock.clone())?);
    let verification = Arc::new(VerificationService::with_clock(
        store.clone(),
        notifier,
        verification_config,
        clock.clone(),
    )?);
    let sessions = Arc::new(SessionAuthenticator::new(
        tokens.clone(),
        blacklist.clone(),
        config.auth.cookie.clone(),
        clock.clone(),
    ));

    let sweeper = sweep_interval.map(|interval| {
        let revocations: Arc<dyn TokenBlacklist> = blacklist.clone();
        ChallengeSweeper::new(store.clone(), clock, interval)
            .with_blacklist(revocations)
            .start()
    });

    tracing::info!(
        sweeper = sweeper.is_some(),
        "Auth runtime initialized successfully"
    );

    Ok(AuthRuntime {
        config,
        tokens,
        verification,
        sessions,
        store,
        blacklist,
        sweeper,
    })
}
