//! Bet Desk - Evaluate-then-commit Bet Placement
//!
//! The single entry point every caller goes through:
//! - Validates the bet shape (amount, digit count)
//! - Reads the round pool and the number's exposure
//! - Runs the pure risk evaluation
//! - Commits accepted bets with a version compare-and-swap,
//!   re-reading and re-evaluating on conflict (bounded)
//! - Journals committed bets
//!
//! Also serves what-if simulations that never touch the ledger.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use super::SharedRound;
use crate::adapters::metrics::MetricsRegistry;
use crate::domain::{
  EngineError, EvaluationRequest, EvaluationResult, EvaluationStatus, InputError, PoolState,
  RiskEvaluator, Round, check_figure,
};
use crate::ports::exposure_store::{CommitOutcome, ExposureStore};
use crate::ports::journal::{BetJournal, BetRecord};

/// Outcome of a placement attempt.
#[derive(Debug, Clone, Serialize)]
pub struct Placement {
  /// Round the bet was evaluated in.
  pub round_id: u64,
  /// Evaluation that decided the outcome.
  pub result: EvaluationResult,
  /// Journaled bet; `None` when rejected.
  pub bet: Option<BetRecord>,
  /// Evaluate-and-commit attempts used.
  pub attempts: u32,
}

/// What-if inputs for a simulation. Unset fields come from the ledger.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SimulationOverrides {
  pub capital: Option<Decimal>,
  pub total_sales: Option<Decimal>,
  pub current_exposure: Option<Decimal>,
}

impl SimulationOverrides {
  /// Every set figure must be non-negative and within `MAX_FIGURE`.
  pub fn validate(&self) -> Result<(), InputError> {
    let figures = [
      ("capital", self.capital),
      ("total_sales", self.total_sales),
      ("current_exposure", self.current_exposure),
    ];
    for (field, value) in figures {
      if let Some(value) = value {
        check_figure(field, value)?;
      }
    }
    Ok(())
  }
}

/// Current round with its pool.
#[derive(Debug, Clone, Serialize)]
pub struct RoundView {
  pub round: Round,
  pub pool: PoolState,
}

/// Bet placement use case.
pub struct BetDesk<S: ExposureStore, J: BetJournal> {
  /// Exposure ledger.
  store: Arc<S>,
  /// Bet audit trail.
  journal: Arc<J>,
  /// Current evaluator (hot-reloadable).
  evaluator: watch::Receiver<Arc<RiskEvaluator>>,
  /// Round currently accepting bets.
  round: SharedRound,
  /// Metrics sink.
  metrics: Arc<MetricsRegistry>,
  /// Evaluate-and-commit attempts before giving up.
  max_commit_attempts: u32,
}

impl<S: ExposureStore, J: BetJournal> BetDesk<S, J> {
  /// Create a new bet desk.
  pub fn new(
    store: Arc<S>,
    journal: Arc<J>,
    evaluator: watch::Receiver<Arc<RiskEvaluator>>,
    round: SharedRound,
    metrics: Arc<MetricsRegistry>,
    max_commit_attempts: u32,
  ) -> Self {
    Self {
      store,
      journal,
      evaluator,
      round,
      metrics,
      max_commit_attempts: max_commit_attempts.max(1),
    }
  }

  /// Place a bet.
  ///
  /// Rejected bets return `Ok` with a `Rejected` result and no ledger
  /// change. Only malformed input, a closed round, an exhausted retry
  /// budget or a ledger failure are errors.
  #[instrument(skip(self, request), fields(bet_type = %request.bet_type, number = %request.number, amount = %request.amount))]
  pub async fn place(&self, request: &EvaluationRequest) -> Result<Placement, EngineError> {
    if let Err(e) = request.validate() {
      self.metrics.invalid_bets.inc();
      return Err(e.into());
    }

    // Held across evaluate+commit so an announcement waits for in-flight bets.
    let round = self.round.read().await;
    if !round.is_open() {
      return Err(EngineError::RoundNotOpen { round_id: round.id });
    }

    let key = request.exposure_key(round.id);
    let evaluator = Arc::clone(&self.evaluator.borrow());

    for attempt in 1..=self.max_commit_attempts {
      let pool = self.store.pool(round.id).await?;
      let exposure = self.store.get(&key).await?;
      let result = evaluator.evaluate(request, &pool, exposure.cumulative_amount);

      if result.status == EvaluationStatus::Rejected {
        self.metrics.observe_evaluation(request.bet_type, &result);
        warn!(
          %key,
          limit = %result.current_limit,
          projected = %result.projected_amount,
          remaining = %result.remaining_limit,
          "Bet rejected: number over its limit"
        );
        return Ok(Placement {
          round_id: round.id,
          result,
          bet: None,
          attempts: attempt,
        });
      }

      match self
        .store
        .increment_if_unchanged(&key, exposure.version, request.amount)
        .await?
      {
        CommitOutcome::Committed(updated) => {
          self.metrics.observe_evaluation(request.bet_type, &result);
          self.metrics.observe_pool(&PoolState::new(
            pool.capital,
            pool.total_sales + request.amount,
          ));

          let record = BetRecord::new(round.id, request, &result);
          if let Err(e) = self.journal.record_bet(&record).await {
            // Ledger already holds the stake; exposure stays conservative.
            error!(%key, bet_id = %record.id, error = %e, "Committed bet could not be journaled");
            return Err(e.into());
          }

          if result.status == EvaluationStatus::Warning {
            info!(
              %key,
              tier = ?result.tier,
              payout = %result.applied_payout,
              usage = %result.usage_percent,
              "Bet accepted at reduced payout"
            );
          } else {
            debug!(%key, cumulative = %updated.cumulative_amount, "Bet accepted");
          }

          return Ok(Placement {
            round_id: round.id,
            result,
            bet: Some(record),
            attempts: attempt,
          });
        }
        CommitOutcome::Conflict(current) => {
          self
            .metrics
            .commit_conflicts
            .with_label_values(&[request.bet_type.code()])
            .inc();
          debug!(
            %key,
            attempt,
            seen = exposure.version,
            now = current.version,
            "Exposure changed during evaluation, retrying"
          );
        }
      }
    }

    warn!(%key, attempts = self.max_commit_attempts, "Giving up on contended number");
    Err(EngineError::CommitConflict {
      key: key.to_string(),
      attempts: self.max_commit_attempts,
    })
  }

  /// Evaluate a bet without committing it.
  ///
  /// Overrides replace the ledger's pool or exposure figures, which is how
  /// the admin simulator explores what-if scenarios.
  pub async fn simulate(
    &self,
    request: &EvaluationRequest,
    overrides: SimulationOverrides,
  ) -> Result<EvaluationResult, EngineError> {
    request.validate()?;
    overrides.validate()?;

    let round_id = self.round.read().await.id;
    let ledger_pool = self.store.pool(round_id).await?;
    let pool = PoolState::new(
      overrides.capital.unwrap_or(ledger_pool.capital),
      overrides.total_sales.unwrap_or(ledger_pool.total_sales),
    );
    let exposure = match overrides.current_exposure {
      Some(amount) => amount,
      None => {
        self
          .store
          .get(&request.exposure_key(round_id))
          .await?
          .cumulative_amount
      }
    };

    let evaluator = Arc::clone(&self.evaluator.borrow());
    Ok(evaluator.evaluate(request, &pool, exposure))
  }

  /// Current round and its pool.
  pub async fn current_round(&self) -> Result<RoundView, EngineError> {
    let round = self.round.read().await.clone();
    let pool = self.store.pool(round.id).await?;
    Ok(RoundView { round, pool })
  }

  /// Whether both ports report healthy.
  pub async fn is_healthy(&self) -> bool {
    self.store.is_healthy().await && self.journal.is_healthy().await
  }
}
