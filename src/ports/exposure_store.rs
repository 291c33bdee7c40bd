//! Exposure Store Port - Per-number Ledger Interface
//!
//! Owns the mutable state the risk engine reads: each round's pool and
//! the cumulative stake per (round, bet type, number). Commits are
//! compare-and-swap on a per-key version so two concurrent bets on
//! the same number can never both pass a check made against the same
//! stale exposure.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{ExposureKey, PoolState};

/// Cumulative stake on one number plus its commit version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExposureSnapshot {
  /// Sum of accepted gross wagers.
  pub cumulative_amount: Decimal,
  /// Incremented on every commit; 0 for a number never wagered on.
  pub version: u64,
}

/// Result of a conditional commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
  /// Stake added; carries the new snapshot.
  Committed(ExposureSnapshot),
  /// Version moved since it was read; carries the current snapshot.
  Conflict(ExposureSnapshot),
}

/// Trait for exposure ledger providers.
#[async_trait]
pub trait ExposureStore: Send + Sync + 'static {
  /// Start a round with the given capital and zero sales.
  async fn open_round(&self, round_id: u64, capital: Decimal) -> anyhow::Result<()>;

  /// Current pool of a round.
  async fn pool(&self, round_id: u64) -> anyhow::Result<PoolState>;

  /// Current exposure on one number (zero if never wagered on).
  async fn get(&self, key: &ExposureKey) -> anyhow::Result<ExposureSnapshot>;

  /// Add `amount` to the number and to the round's sales, only if the
  /// number's version still equals `expected_version`.
  async fn increment_if_unchanged(
    &self,
    key: &ExposureKey,
    expected_version: u64,
    amount: Decimal,
  ) -> anyhow::Result<CommitOutcome>;

  /// All exposure rows of a round, sorted by key.
  async fn round_exposures(
    &self,
    round_id: u64,
  ) -> anyhow::Result<Vec<(ExposureKey, ExposureSnapshot)>>;

  /// Drop a round's pool and exposure rows.
  async fn reset_round(&self, round_id: u64) -> anyhow::Result<()>;

  /// Check if the store is reachable.
  async fn is_healthy(&self) -> bool;
}
