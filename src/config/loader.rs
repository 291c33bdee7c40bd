//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.
//! A bad payout table is fatal here: the desk never starts
//! accepting bets for an unconfigured or inconsistent bet type.

use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
  let path = path.as_ref();

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    service = %config.service.name,
    capital = %config.pool.initial_capital,
    custom_table = !config.bet_types.is_empty(),
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - A complete payout table whose allocations sum to 1
/// - Strictly decreasing payout tiers per bet type
/// - Ordered usage thresholds and a sane commission rate
/// - Positive capital, retry, rate-limit and confirmation settings
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.service.name.trim().is_empty(),
    "service.name must not be empty"
  );

  anyhow::ensure!(
    config.pool.initial_capital > Decimal::ZERO,
    "pool.initial_capital must be positive, got {}",
    config.pool.initial_capital
  );

  // Payout table + thresholds
  config
    .evaluator()
    .context("Invalid payout table or risk thresholds")?;

  // Ledger
  anyhow::ensure!(
    (1..=10).contains(&config.ledger.max_commit_attempts),
    "ledger.max_commit_attempts must be in [1, 10], got {}",
    config.ledger.max_commit_attempts
  );

  // Rate limits
  anyhow::ensure!(
    config.rate_limits.max_bets_per_second > 0,
    "rate_limits.max_bets_per_second must be positive"
  );
  anyhow::ensure!(
    config.rate_limits.burst > 0,
    "rate_limits.burst must be positive"
  );

  // Rounds
  anyhow::ensure!(
    config.rounds.required_confirmations >= 2,
    "rounds.required_confirmations must be at least 2, got {}",
    config.rounds.required_confirmations
  );

  anyhow::ensure!(
    !config.api.bind_address.is_empty(),
    "api.bind_address must not be empty"
  );
  anyhow::ensure!(
    !config.persistence.data_dir.is_empty(),
    "persistence.data_dir must not be empty"
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::BetType;
  use rust_decimal_macros::dec;

  const MINIMAL: &str = r#"
[service]
name = "desk-test"

[pool]
initial_capital = 500000
"#;

  const CUSTOM_TABLE: &str = r#"
[service]
name = "desk-test"

[pool]
initial_capital = 500000

[risk]
referrer_commission_rate = 0.05

[[bet_types]]
bet_type = "three_digit_top"
allocation_fraction = 0.30
base_payout = 850
tier1_payout = 750
tier2_payout = 650

[[bet_types]]
bet_type = "TOD3"
allocation_fraction = 0.20
base_payout = 120
tier1_payout = 100
tier2_payout = 80

[[bet_types]]
bet_type = "two_digit_top"
allocation_fraction = 0.20
base_payout = 90
tier1_payout = 80
tier2_payout = 70

[[bet_types]]
bet_type = "two_digit_bottom"
allocation_fraction = 0.15
base_payout = 90
tier1_payout = 80
tier2_payout = 70

[[bet_types]]
bet_type = "run_top"
allocation_fraction = 0.05
base_payout = 3.2
tier1_payout = 3.0
tier2_payout = 2.8

[[bet_types]]
bet_type = "run_bottom"
allocation_fraction = 0.10
base_payout = 4.2
tier1_payout = 4.0
tier2_payout = 3.8
"#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = parse_config(MINIMAL).unwrap();
    assert_eq!(config.service.log_level, "info");
    assert_eq!(config.ledger.max_commit_attempts, 3);
    assert_eq!(config.rounds.required_confirmations, 2);
    assert_eq!(config.risk.tier2_threshold, dec!(0.85));
    let table = config.payout_table().unwrap();
    assert_eq!(table.get(BetType::ThreeDigitTop).base_payout, dec!(800));
  }

  #[test]
  fn test_custom_table_parsed() {
    let config = parse_config(CUSTOM_TABLE).unwrap();
    let table = config.payout_table().unwrap();
    assert_eq!(table.get(BetType::ThreeDigitTop).base_payout, dec!(850));
    assert_eq!(table.get(BetType::RunTop).base_payout, dec!(3.2));
    assert_eq!(config.risk.policy().referrer_commission_rate, dec!(0.05));
  }

  #[test]
  fn test_allocation_sum_is_fatal() {
    let broken = CUSTOM_TABLE.replace("allocation_fraction = 0.10", "allocation_fraction = 0.05");
    let err = parse_config(&broken).unwrap_err();
    assert!(format!("{err:#}").contains("sum to 1"));
  }

  #[test]
  fn test_missing_bet_type_is_fatal() {
    let cut = CUSTOM_TABLE
      .split("[[bet_types]]\nbet_type = \"run_bottom\"")
      .next()
      .unwrap()
      .to_string();
    assert!(parse_config(&cut).is_err());
  }

  #[test]
  fn test_single_confirmation_rejected() {
    let config = format!("{MINIMAL}\n[rounds]\nrequired_confirmations = 1\n");
    assert!(parse_config(&config).is_err());
  }
}
