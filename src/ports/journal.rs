//! Journal Port - Bet Audit Trail and Round Archives
//!
//! Defines traits for persisting accepted bets and announced rounds.
//! No database dependency - append-only JSONL for bets and atomic
//! JSON snapshots for round archives, optimized for audit trails
//! and crash recovery.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
  BetType, EvaluationRequest, EvaluationResult, EvaluationStatus, PayoutTier, PoolState, Round,
};

/// A committed bet with its full risk breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetRecord {
  /// Unique bet identifier.
  pub id: Uuid,
  /// Round the bet belongs to.
  pub round_id: u64,
  pub bet_type: BetType,
  /// Number as submitted by the bettor.
  pub number: String,
  /// Gross wager.
  pub amount: Decimal,
  /// Referrer commission.
  pub commission: Decimal,
  /// Wager after commission.
  pub net_amount: Decimal,
  /// Accepted or warning (rejected bets are never journaled).
  pub status: EvaluationStatus,
  pub tier: PayoutTier,
  /// Multiplier locked in for this bet.
  pub applied_payout: Decimal,
  /// Limit on the number at evaluation time.
  pub current_limit: Decimal,
  /// Usage ratio after this bet.
  pub usage_ratio: Decimal,
  /// Limit left after this bet.
  pub remaining_limit: Decimal,
  /// Commit time.
  pub placed_at: DateTime<Utc>,
}

impl BetRecord {
  /// Build the record for a bet about to be journaled.
  pub fn new(round_id: u64, request: &EvaluationRequest, result: &EvaluationResult) -> Self {
    Self {
      id: Uuid::new_v4(),
      round_id,
      bet_type: request.bet_type,
      number: request.number.clone(),
      amount: result.amount,
      commission: result.commission,
      net_amount: result.net_amount,
      status: result.status,
      tier: result.tier,
      applied_payout: result.applied_payout,
      current_limit: result.current_limit,
      usage_ratio: result.usage_ratio,
      remaining_limit: result.remaining_limit,
      placed_at: Utc::now(),
    }
  }

  /// Amount owed if this bet wins.
  pub fn payout(&self) -> Decimal {
    self.amount * self.applied_payout
  }
}

/// Cumulative stake on one number at announcement time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureRow {
  pub bet_type: BetType,
  pub number: String,
  pub cumulative_amount: Decimal,
}

/// Snapshot of an announced round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundArchive {
  /// Round with its result and confirmations.
  pub round: Round,
  /// Pool at announcement.
  pub pool: PoolState,
  /// Exposure rows before reset.
  pub exposures: Vec<ExposureRow>,
  /// Number of journaled bets that won.
  pub winning_bets: usize,
  /// Sum of payouts owed on winning bets.
  pub total_payout: Decimal,
}

/// Trait for bet journal providers.
///
/// Uses JSONL (JSON Lines) for bets: each line is a self-contained
/// record, easy to stream and to recover from partial writes.
#[async_trait]
pub trait BetJournal: Send + Sync + 'static {
  /// Append a committed bet.
  async fn record_bet(&self, record: &BetRecord) -> anyhow::Result<()>;

  /// Load all bets of a round, oldest first.
  async fn load_bets(&self, round_id: u64) -> anyhow::Result<Vec<BetRecord>>;

  /// Save the archive of an announced round.
  async fn save_archive(&self, archive: &RoundArchive) -> anyhow::Result<()>;

  /// Load the archive of a round, if announced.
  async fn load_archive(&self, round_id: u64) -> anyhow::Result<Option<RoundArchive>>;

  /// Check if the journal is writable.
  async fn is_healthy(&self) -> bool;
}
