//! Prometheus Metrics Registry - Bet Desk Observability
//!
//! Registers the desk's metrics and renders them in the text
//! exposition format for the `/metrics` endpoint. Covers evaluation
//! outcomes, usage distribution, commit conflicts and pool size.

use anyhow::Context;
use prometheus::{
    Encoder, Gauge, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::domain::{BetType, EvaluationResult, PoolState};

/// Centralized Prometheus metrics for the desk.
///
/// All metrics follow the naming convention `lottery_risk_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Evaluations by bet type and status.
    pub evaluations: IntCounterVec,
    /// Usage ratio after each evaluation.
    pub usage_ratio: HistogramVec,
    /// Ledger commit conflicts by bet type.
    pub commit_conflicts: IntCounterVec,
    /// Bets refused before evaluation.
    pub invalid_bets: IntCounter,
    /// Total pot of the open round.
    pub total_pot: Gauge,
    /// Sales of the open round.
    pub total_sales: Gauge,
    /// Rounds announced since start.
    pub rounds_announced: IntCounter,
}

impl MetricsRegistry {
    /// Create and register all metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let evaluations = IntCounterVec::new(
            Opts::new(
                "lottery_risk_evaluations_total",
                "Risk evaluations by bet type and outcome",
            ),
            &["bet_type", "status"],
        )?;

        let usage_ratio = HistogramVec::new(
            HistogramOpts::new(
                "lottery_risk_usage_ratio",
                "Per-number usage ratio after the evaluated bet",
            )
            .buckets(vec![0.25, 0.5, 0.7, 0.85, 1.0, 1.5, 3.0]),
            &["bet_type"],
        )?;

        let commit_conflicts = IntCounterVec::new(
            Opts::new(
                "lottery_risk_commit_conflicts_total",
                "Optimistic ledger commits that lost a race",
            ),
            &["bet_type"],
        )?;

        let invalid_bets = IntCounter::new(
            "lottery_risk_invalid_bets_total",
            "Bets refused by input validation",
        )?;

        let total_pot = Gauge::new(
            "lottery_risk_total_pot",
            "Capital plus sales of the open round",
        )?;

        let total_sales = Gauge::new(
            "lottery_risk_total_sales",
            "Gross wagers accepted in the open round",
        )?;

        let rounds_announced = IntCounter::new(
            "lottery_risk_rounds_announced_total",
            "Rounds announced since start",
        )?;

        registry.register(Box::new(evaluations.clone()))?;
        registry.register(Box::new(usage_ratio.clone()))?;
        registry.register(Box::new(commit_conflicts.clone()))?;
        registry.register(Box::new(invalid_bets.clone()))?;
        registry.register(Box::new(total_pot.clone()))?;
        registry.register(Box::new(total_sales.clone()))?;
        registry.register(Box::new(rounds_announced.clone()))?;

        Ok(Self {
            registry,
            evaluations,
            usage_ratio,
            commit_conflicts,
            invalid_bets,
            total_pot,
            total_sales,
            rounds_announced,
        })
    }

    /// Record one evaluation outcome.
    pub fn observe_evaluation(&self, bet_type: BetType, result: &EvaluationResult) {
        self.evaluations
            .with_label_values(&[bet_type.code(), result.status.as_str()])
            .inc();
        self.usage_ratio
            .with_label_values(&[bet_type.code()])
            .observe(to_f64(result.usage_ratio));
    }

    /// Update the pool gauges.
    pub fn observe_pool(&self, pool: &PoolState) {
        self.total_pot.set(to_f64(pool.total_pot()));
        self.total_sales.set(to_f64(pool.total_sales));
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics are not UTF-8")
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
