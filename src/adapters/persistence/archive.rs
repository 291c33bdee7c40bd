//! Round Archive Store - Atomic JSON Snapshots of Announced Rounds
//!
//! Saves one `rounds/<round_id>.json` per announced round using atomic
//! writes (write to tmp file, then rename), so an archive is always
//! either absent or complete.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, instrument};

use crate::ports::journal::RoundArchive;

/// Atomic JSON archive store.
pub struct ArchiveStore {
    /// Directory holding the archives.
    rounds_dir: PathBuf,
}

impl ArchiveStore {
    /// Create a new archive store in the given data directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let rounds_dir = data_dir.as_ref().join("rounds");
        fs::create_dir_all(&rounds_dir)
            .await
            .context("Failed to create rounds directory")?;

        Ok(Self { rounds_dir })
    }

    fn archive_path(&self, round_id: u64) -> PathBuf {
        self.rounds_dir.join(format!("{round_id}.json"))
    }

    /// Save an archive atomically (tmp → rename).
    #[instrument(skip(self, archive), fields(round_id = archive.round.id))]
    pub async fn save(&self, archive: &RoundArchive) -> Result<()> {
        let path = self.archive_path(archive.round.id);
        let tmp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(archive)
            .context("Failed to serialize round archive")?;

        fs::write(&tmp_path, &json)
            .await
            .context("Failed to write tmp archive file")?;

        fs::rename(&tmp_path, &path)
            .await
            .context("Failed to rename archive file")?;

        info!(
            path = %path.display(),
            exposures = archive.exposures.len(),
            winning_bets = archive.winning_bets,
            "Round archive saved"
        );

        Ok(())
    }

    /// Load a round's archive. `None` if the round was never archived.
    #[instrument(skip(self))]
    pub async fn load(&self, round_id: u64) -> Result<Option<RoundArchive>> {
        let path = self.archive_path(round_id);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .await
            .context("Failed to read archive file")?;

        let archive: RoundArchive =
            serde_json::from_str(&json).context("Failed to parse archive JSON")?;

        Ok(Some(archive))
    }

    /// Check if the archive directory is reachable.
    pub async fn is_healthy(&self) -> bool {
        fs::metadata(&self.rounds_dir).await.is_ok()
    }
}
