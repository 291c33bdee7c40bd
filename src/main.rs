//! Lottery Risk Engine - Entry Point
//!
//! Initializes configuration, logging, the exposure ledger and the
//! bet journal, then serves the bet API until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Build the risk evaluator and its hot-reload watcher
//! 4. Create the exposure ledger, bet journal and metrics
//! 5. Open the current round, replaying its journaled bets
//! 6. Spawn the HTTP API (bets, simulator, rounds, probes, metrics)
//! 7. Spawn the config watcher
//! 8. Wait for SIGINT → drain readiness → stop tasks → exit

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::{RwLock, broadcast};
use tracing::{error, info};

use lottery_risk_engine::adapters::http::{self, ApiState};
use lottery_risk_engine::adapters::memory::InMemoryExposureStore;
use lottery_risk_engine::adapters::metrics::{HealthState, MetricsRegistry};
use lottery_risk_engine::adapters::persistence::FileJournal;
use lottery_risk_engine::config::hot_reload::ConfigWatcher;
use lottery_risk_engine::config::loader::load_config;
use lottery_risk_engine::domain::Round;
use lottery_risk_engine::usecases::{BetDesk, RoundManager};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&config_path).context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.service.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        capital = %config.pool.initial_capital,
        bind = %config.api.bind_address,
        "Starting lottery risk engine"
    );

    // ── 3. Evaluator + hot reload ───────────────────────────
    let evaluator = Arc::new(config.evaluator().context("Invalid payout table")?);
    let (mut watcher, evaluator_rx) = ConfigWatcher::new(&config_path, evaluator);

    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    // ── 4. Ledger, journal, metrics ─────────────────────────
    let store = Arc::new(InMemoryExposureStore::new());
    let journal = Arc::new(
        FileJournal::from_data_dir(&config.persistence.data_dir)
            .await
            .context("Failed to open bet journal")?,
    );
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);
    let health = HealthState::new();

    // ── 5. Open (or resume) the current round ───────────────
    let round = Arc::new(RwLock::new(Round::open(config.rounds.first_round_id)));
    let rounds = RoundManager::new(
        Arc::clone(&store),
        Arc::clone(&journal),
        Arc::clone(&round),
        Arc::clone(&metrics),
        config.pool.initial_capital,
        config.rounds.required_confirmations,
    );
    rounds.start().await.context("Failed to open current round")?;

    let desk = BetDesk::new(
        store,
        journal,
        evaluator_rx,
        round,
        Arc::clone(&metrics),
        config.ledger.max_commit_attempts,
    );

    // ── 6. HTTP API ─────────────────────────────────────────
    let state = Arc::new(ApiState {
        desk: Arc::new(desk),
        rounds: Arc::new(rounds),
        metrics,
        health: health.clone(),
        limiter: http::bet_limiter(&config.rate_limits),
        metrics_enabled: config.metrics.enabled,
    });
    let api_shutdown = shutdown_tx.subscribe();
    let bind_address = config.api.bind_address.clone();
    let api_handle = tokio::spawn(async move {
        if let Err(e) = http::serve(&bind_address, state, api_shutdown).await {
            error!(error = %e, "Bet API failed");
        }
    });

    // ── 7. Config watcher ───────────────────────────────────
    let watcher_shutdown = shutdown_tx.subscribe();
    let watcher_handle = tokio::spawn(async move {
        if let Err(e) = watcher.run(watcher_shutdown).await {
            error!(error = %e, "Config watcher failed");
        }
    });

    info!("All tasks spawned, desk is accepting bets");

    // ── 8. Wait for SIGINT ──────────────────────────────────
    signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("SIGINT received, initiating graceful shutdown");

    health.mark_draining();
    let _ = shutdown_tx.send(());

    let _ = tokio::time::timeout(Duration::from_secs(30), api_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), watcher_handle).await;

    info!("Shutdown complete");
    Ok(())
}
