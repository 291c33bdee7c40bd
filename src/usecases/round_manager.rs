//! Round Manager - Draw Announcement and Round Rollover
//!
//! Closes the open round once enough admins confirm the draw:
//! 1. Verify the announced round is the current one
//! 2. Record the result with its distinct confirmations
//! 3. Score journaled bets against the result
//! 4. Archive the round (pool, exposure rows, payouts)
//! 5. Reset the round's ledger and open the next round
//!
//! On start it rebuilds the open round's ledger from the bet journal.

use std::sync::Arc;

use rust_decimal::Decimal;
use anyhow::anyhow;
use tracing::{info, instrument, warn};

use super::SharedRound;
use crate::adapters::metrics::MetricsRegistry;
use crate::domain::{DrawResult, EngineError, ExposureKey, Round};
use crate::ports::exposure_store::{CommitOutcome, ExposureStore};
use crate::ports::journal::{BetJournal, ExposureRow, RoundArchive};

/// Round lifecycle use case.
pub struct RoundManager<S: ExposureStore, J: BetJournal> {
  store: Arc<S>,
  journal: Arc<J>,
  round: SharedRound,
  metrics: Arc<MetricsRegistry>,
  /// Capital seeded into every new round.
  capital: Decimal,
  /// Distinct admins needed to announce.
  required_confirmations: usize,
}

impl<S: ExposureStore, J: BetJournal> RoundManager<S, J> {
  /// Create a new round manager.
  pub fn new(
    store: Arc<S>,
    journal: Arc<J>,
    round: SharedRound,
    metrics: Arc<MetricsRegistry>,
    capital: Decimal,
    required_confirmations: usize,
  ) -> Self {
    Self {
      store,
      journal,
      round,
      metrics,
      capital,
      required_confirmations,
    }
  }

  /// Open the ledger for the current round and replay its journaled bets.
  ///
  /// Rounds that already have an archive are never reopened: the manager
  /// moves past them to the first unannounced round.
  pub async fn start(&self) -> Result<(), EngineError> {
    let mut round = self.round.write().await;
    let configured = round.id;
    while self.journal.load_archive(round.id).await?.is_some() {
      *round = Round::open(round.id + 1);
    }
    if round.id != configured {
      warn!(
        configured,
        resumed = round.id,
        "Configured round already announced, resuming after it"
      );
    }

    self.store.open_round(round.id, self.capital).await?;

    let bets = self.journal.load_bets(round.id).await?;
    for bet in &bets {
      let key = ExposureKey::new(round.id, bet.bet_type, &bet.number);
      let snapshot = self.store.get(&key).await?;
      if let CommitOutcome::Conflict(_) = self
        .store
        .increment_if_unchanged(&key, snapshot.version, bet.amount)
        .await?
      {
        return Err(anyhow!("ledger changed while replaying bet {} on {key}", bet.id).into());
      }
    }

    let pool = self.store.pool(round.id).await?;
    self.metrics.observe_pool(&pool);
    info!(
      round_id = round.id,
      capital = %self.capital,
      replayed_bets = bets.len(),
      total_sales = %pool.total_sales,
      "Round opened"
    );
    Ok(())
  }

  /// Announce the draw for `round_id` and roll over to the next round.
  ///
  /// Takes the round's write lock, so in-flight placements finish first
  /// and no bet lands between the archive and the reset.
  #[instrument(skip(self, result, confirmations))]
  pub async fn announce(
    &self,
    round_id: u64,
    result: DrawResult,
    confirmations: &[String],
  ) -> Result<RoundArchive, EngineError> {
    let mut current = self.round.write().await;
    if current.id != round_id {
      return Err(EngineError::RoundMismatch {
        requested: round_id,
        current: current.id,
      });
    }

    let mut announced = current.clone();
    announced.announce(result.clone(), confirmations, self.required_confirmations)?;

    let pool = self.store.pool(round_id).await?;
    let exposures = self
      .store
      .round_exposures(round_id)
      .await?
      .into_iter()
      .map(|(key, snapshot)| ExposureRow {
        bet_type: key.bet_type,
        number: key.number,
        cumulative_amount: snapshot.cumulative_amount,
      })
      .collect();

    let bets = self.journal.load_bets(round_id).await?;
    let winners: Vec<_> = bets
      .iter()
      .filter(|bet| result.is_winner(bet.bet_type, &bet.number))
      .collect();
    let total_payout: Decimal = winners.iter().map(|bet| bet.payout()).sum();

    let archive = RoundArchive {
      round: announced,
      pool,
      exposures,
      winning_bets: winners.len(),
      total_payout,
    };
    self.journal.save_archive(&archive).await?;

    self.store.reset_round(round_id).await?;
    let next = Round::open(round_id + 1);
    self.store.open_round(next.id, self.capital).await?;
    *current = next;

    self.metrics.rounds_announced.inc();
    self.metrics.observe_pool(&self.store.pool(current.id).await?);

    info!(
      round_id,
      top = %result.top,
      bottom = %result.bottom,
      bets = bets.len(),
      winning_bets = archive.winning_bets,
      total_payout = %archive.total_payout,
      total_pot = %archive.pool.total_pot(),
      next_round = current.id,
      "Round announced"
    );

    Ok(archive)
  }
}
