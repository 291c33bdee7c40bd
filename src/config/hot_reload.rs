//! Config Hot-Reload - Watch config.toml for Payout Table Changes
//!
//! Periodically re-reads config.toml and compares it with the last
//! version seen. If the file changed and still validates, the rebuilt
//! `RiskEvaluator` is broadcast via a `tokio::sync::watch` channel so
//! the bet desk picks up new allocations and payouts without a restart.
//! An invalid edit is logged and ignored; the current table stays live.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

use crate::domain::RiskEvaluator;

/// Default poll interval.
const RELOAD_INTERVAL: Duration = Duration::from_secs(60);

/// Watches config.toml for changes and broadcasts rebuilt evaluators.
///
/// Polls the file (not a filesystem watcher, which has portability
/// issues across Linux/macOS/Docker volumes) and hashes its contents
/// to detect edits.
pub struct ConfigWatcher {
    /// Path to config.toml.
    config_path: PathBuf,
    /// Watch channel sender for evaluator updates.
    evaluator_tx: watch::Sender<Arc<RiskEvaluator>>,
    /// Hash of the last file contents seen.
    last_hash: Option<u64>,
    /// Poll interval.
    interval: Duration,
}

impl ConfigWatcher {
    /// Create a new config watcher.
    ///
    /// Returns the watcher and a receiver the bet desk reads the
    /// current evaluator from.
    pub fn new(
        config_path: impl Into<PathBuf>,
        initial: Arc<RiskEvaluator>,
    ) -> (Self, watch::Receiver<Arc<RiskEvaluator>>) {
        let (evaluator_tx, evaluator_rx) = watch::channel(initial);

        let watcher = Self {
            config_path: config_path.into(),
            evaluator_tx,
            last_hash: None,
            interval: RELOAD_INTERVAL,
        };

        (watcher, evaluator_rx)
    }

    /// Override the poll interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the watcher loop until shutdown.
    #[instrument(skip(self, shutdown_rx), fields(path = %self.config_path.display()))]
    pub async fn run(
        &mut self,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        info!(
            interval_secs = self.interval.as_secs(),
            "Config watcher started"
        );

        self.last_hash = self.compute_hash().await;

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("Config watcher shutting down");
                    return Ok(());
                }
                () = tokio::time::sleep(self.interval) => {
                    self.check_and_reload().await;
                }
            }
        }
    }

    /// Check if the file has changed and reload if so.
    ///
    /// Returns `true` when a new evaluator was published.
    async fn check_and_reload(&mut self) -> bool {
        let new_hash = self.compute_hash().await;

        if new_hash == self.last_hash {
            debug!("Config unchanged");
            return false;
        }

        info!("Config change detected, reloading payout table");

        let rebuilt = super::loader::load_config(&self.config_path)
            .and_then(|config| config.evaluator().map_err(anyhow::Error::from));

        match rebuilt {
            Ok(evaluator) => {
                self.last_hash = new_hash;
                for entry in evaluator.table().iter() {
                    info!(
                        bet_type = %entry.bet_type,
                        allocation = %entry.allocation_fraction,
                        base = %entry.base_payout,
                        tier1 = %entry.tier1_payout,
                        tier2 = %entry.tier2_payout,
                        "Payout entry"
                    );
                }
                self.evaluator_tx.send_replace(Arc::new(evaluator));
                info!("Payout table reloaded");
                true
            }
            Err(e) => {
                // Remember the bad version so it is reported once, not every poll.
                self.last_hash = new_hash;
                warn!(
                    error = %format!("{e:#}"),
                    "Rejected config reload, keeping current table"
                );
                false
            }
        }
    }

    /// Hash of the config file contents, `None` if unreadable.
    async fn compute_hash(&self) -> Option<u64> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let content = tokio::fs::read_to_string(&self.config_path)
            .await
            .ok()?;

        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        Some(hasher.finish())
    }
}
