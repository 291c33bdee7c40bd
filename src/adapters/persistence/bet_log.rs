//! Bet Log - Append-only JSONL Bet Records
//!
//! Persists committed bets to one JSONL file per round, named
//! `bets/<round_id>.jsonl`. Each line is a self-contained JSON record
//! for easy parsing, streaming, and crash recovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::ports::journal::BetRecord;

/// Append-only JSONL bet log partitioned by round.
pub struct BetLog {
    /// Directory holding the per-round files.
    bets_dir: PathBuf,
    /// Serializes appends so concurrent bets never interleave lines.
    write_lock: Mutex<()>,
}

impl BetLog {
    /// Create a new bet log in the given data directory.
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let bets_dir = data_dir.as_ref().join("bets");

        fs::create_dir_all(&bets_dir)
            .await
            .context("Failed to create bets directory")?;

        Ok(Self {
            bets_dir,
            write_lock: Mutex::new(()),
        })
    }

    fn round_path(&self, round_id: u64) -> PathBuf {
        self.bets_dir.join(format!("{round_id}.jsonl"))
    }

    /// Append a bet to its round's JSONL file.
    #[instrument(skip(self, record), fields(bet_id = %record.id, round_id = record.round_id))]
    pub async fn append_bet(&self, record: &BetRecord) -> Result<()> {
        let path = self.round_path(record.round_id);

        let mut json = serde_json::to_string(record)
            .context("Failed to serialize bet record")?;
        json.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .context("Failed to open bet log file")?;

        file.write_all(json.as_bytes())
            .await
            .context("Failed to write bet record")?;

        file.flush().await.context("Failed to flush bet log")?;

        Ok(())
    }

    /// Load all bets of a round, oldest first.
    #[instrument(skip(self))]
    pub async fn load_round(&self, round_id: u64) -> Result<Vec<BetRecord>> {
        let path = self.round_path(round_id);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mut bets = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<BetRecord>(line) {
                Ok(record) => bets.push(record),
                Err(e) => {
                    warn!(
                        file = %path.display(),
                        error = %e,
                        "Skipping malformed bet record"
                    );
                }
            }
        }

        bets.sort_by_key(|b| b.placed_at);
        info!(count = bets.len(), "Loaded bet records");
        Ok(bets)
    }

    /// Check if the bets directory is writable.
    pub async fn is_healthy(&self) -> bool {
        let test_path = self.bets_dir.join(".health_check");
        let result = fs::write(&test_path, b"ok").await;
        let _ = fs::remove_file(&test_path).await;
        result.is_ok()
    }
}
