//! Journal Implementation - Concrete Adapter for the BetJournal Port
//!
//! Wraps `BetLog` (JSONL append-only files) and `ArchiveStore` (atomic
//! JSON snapshots) into a single struct implementing `BetJournal`.
//! The usecases layer only knows the trait, never files or JSON.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use super::archive::ArchiveStore;
use super::bet_log::BetLog;
use crate::ports::journal::{BetJournal, BetRecord, RoundArchive};

/// File-backed bet journal.
pub struct FileJournal {
    /// JSONL bet log.
    bet_log: BetLog,
    /// Round archive store.
    archives: ArchiveStore,
}

impl FileJournal {
    /// Create a new journal from existing log and archive instances.
    pub const fn new(bet_log: BetLog, archives: ArchiveStore) -> Self {
        Self { bet_log, archives }
    }

    /// Create a journal rooted at a data directory.
    pub async fn from_data_dir(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        let bet_log = BetLog::new(data_dir).await?;
        let archives = ArchiveStore::new(data_dir).await?;
        Ok(Self::new(bet_log, archives))
    }
}

#[async_trait]
impl BetJournal for FileJournal {
    async fn record_bet(&self, record: &BetRecord) -> Result<()> {
        self.bet_log.append_bet(record).await
    }

    async fn load_bets(&self, round_id: u64) -> Result<Vec<BetRecord>> {
        self.bet_log.load_round(round_id).await
    }

    async fn save_archive(&self, archive: &RoundArchive) -> Result<()> {
        self.archives.save(archive).await
    }

    async fn load_archive(&self, round_id: u64) -> Result<Option<RoundArchive>> {
        self.archives.load(round_id).await
    }

    async fn is_healthy(&self) -> bool {
        self.bet_log.is_healthy().await && self.archives.is_healthy().await
    }
}
