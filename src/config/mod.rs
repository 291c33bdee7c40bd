//! Configuration Module - TOML-based Service Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! The payout table and risk thresholds are operator-editable and
//! externalized here - nothing is hardcoded in the domain layer
//! beyond the canonical fallback table.

pub mod hot_reload;
pub mod loader;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::domain::{BetTypeConfig, ConfigError, PayoutTable, RiskEvaluator, RiskPolicy};

/// Top-level service configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the desk accepts a single bet.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Service identity and metadata.
  pub service: ServiceConfig,
  /// Operator capital backing each round.
  pub pool: PoolConfig,
  /// Commission rate and usage thresholds.
  #[serde(default)]
  pub risk: RiskConfig,
  /// Per-bet-type allocation and payout tiers. Empty = canonical table.
  #[serde(default)]
  pub bet_types: Vec<BetTypeConfig>,
  /// Ledger commit behaviour.
  #[serde(default)]
  pub ledger: LedgerConfig,
  /// Bet placement rate limiting.
  #[serde(default)]
  pub rate_limits: RateLimitConfig,
  /// HTTP API.
  #[serde(default)]
  pub api: ApiConfig,
  /// Metrics and monitoring.
  #[serde(default)]
  pub metrics: MetricsConfig,
  /// Persistence configuration.
  #[serde(default)]
  pub persistence: PersistenceConfig,
  /// Round lifecycle.
  #[serde(default)]
  pub rounds: RoundConfig,
}

impl AppConfig {
  /// Build the validated payout table.
  pub fn payout_table(&self) -> Result<PayoutTable, ConfigError> {
    if self.bet_types.is_empty() {
      return Ok(PayoutTable::canonical());
    }
    PayoutTable::new(self.bet_types.iter().copied())
  }

  /// Build the evaluator shared by every caller.
  pub fn evaluator(&self) -> Result<RiskEvaluator, ConfigError> {
    RiskEvaluator::new(self.payout_table()?, self.risk.policy())
  }
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Human-readable service name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Pool configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
  /// Operator reserve placed behind every new round.
  pub initial_capital: Decimal,
}

/// Risk policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
  /// Commission on referred bets (0.08 = 8%).
  #[serde(default = "default_commission_rate")]
  pub referrer_commission_rate: Decimal,
  /// Usage ratio above which tier-1 payouts apply.
  #[serde(default = "default_tier1_threshold")]
  pub tier1_threshold: Decimal,
  /// Usage ratio above which tier-2 payouts apply.
  #[serde(default = "default_tier2_threshold")]
  pub tier2_threshold: Decimal,
  /// Usage ratio above which bets are rejected.
  #[serde(default = "default_reject_threshold")]
  pub reject_threshold: Decimal,
}

impl RiskConfig {
  pub const fn policy(&self) -> RiskPolicy {
    RiskPolicy {
      referrer_commission_rate: self.referrer_commission_rate,
      tier1_threshold: self.tier1_threshold,
      tier2_threshold: self.tier2_threshold,
      reject_threshold: self.reject_threshold,
    }
  }
}

impl Default for RiskConfig {
  fn default() -> Self {
    Self {
      referrer_commission_rate: default_commission_rate(),
      tier1_threshold: default_tier1_threshold(),
      tier2_threshold: default_tier2_threshold(),
      reject_threshold: default_reject_threshold(),
    }
  }
}

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
  /// Evaluate-and-commit attempts before reporting a conflict.
  #[serde(default = "default_commit_attempts")]
  pub max_commit_attempts: u32,
}

impl Default for LedgerConfig {
  fn default() -> Self {
    Self {
      max_commit_attempts: default_commit_attempts(),
    }
  }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
  /// Sustained bet placements per second.
  #[serde(default = "default_bets_per_second")]
  pub max_bets_per_second: u32,
  /// Burst allowance above the sustained rate.
  #[serde(default = "default_burst")]
  pub burst: u32,
}

impl Default for RateLimitConfig {
  fn default() -> Self {
    Self {
      max_bets_per_second: default_bets_per_second(),
      burst: default_burst(),
    }
  }
}

/// HTTP API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Bind address for the bet API, health and metrics.
  #[serde(default = "default_bind_address")]
  pub bind_address: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      bind_address: default_bind_address(),
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Expose Prometheus metrics on `/metrics`.
  #[serde(default = "default_true")]
  pub enabled: bool,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self { enabled: true }
  }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
  /// Directory for bet journals and round archives.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
    }
  }
}

/// Round lifecycle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RoundConfig {
  /// Distinct admin confirmations needed to announce a result.
  #[serde(default = "default_confirmations")]
  pub required_confirmations: usize,
  /// Id of the round opened at startup.
  #[serde(default = "default_first_round")]
  pub first_round_id: u64,
}

impl Default for RoundConfig {
  fn default() -> Self {
    Self {
      required_confirmations: default_confirmations(),
      first_round_id: default_first_round(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

const fn default_true() -> bool {
  true
}

fn default_commission_rate() -> Decimal {
  dec!(0.08)
}

fn default_tier1_threshold() -> Decimal {
  dec!(0.70)
}

fn default_tier2_threshold() -> Decimal {
  dec!(0.85)
}

fn default_reject_threshold() -> Decimal {
  dec!(1.0)
}

const fn default_commit_attempts() -> u32 {
  3
}

const fn default_bets_per_second() -> u32 {
  200
}

const fn default_burst() -> u32 {
  50
}

fn default_bind_address() -> String {
  "0.0.0.0:8080".to_string()
}

fn default_data_dir() -> String {
  "data".to_string()
}

const fn default_confirmations() -> usize {
  2
}

const fn default_first_round() -> u64 {
  1
}
