//! Payout and allocation table.
//!
//! One `BetTypeConfig` per bet type. The table is validated once when it is
//! built; evaluation never re-checks it.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::bet_type::BetType;
use super::error::ConfigError;

/// Allocation and payout tiers for one bet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetTypeConfig {
    /// Bet type this entry applies to.
    pub bet_type: BetType,
    /// Share of the total pot reserved for this bet type.
    pub allocation_fraction: Decimal,
    /// Payout multiplier below the first usage threshold.
    pub base_payout: Decimal,
    /// Payout multiplier between the first and second thresholds.
    pub tier1_payout: Decimal,
    /// Payout multiplier between the second threshold and the limit.
    pub tier2_payout: Decimal,
}

impl BetTypeConfig {
    /// Check the per-entry invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allocation_fraction <= Decimal::ZERO || self.allocation_fraction > Decimal::ONE {
            return Err(ConfigError::AllocationOutOfRange {
                bet_type: self.bet_type,
                fraction: self.allocation_fraction,
            });
        }
        if !(self.base_payout > self.tier1_payout
            && self.tier1_payout > self.tier2_payout
            && self.tier2_payout > Decimal::ZERO)
        {
            return Err(ConfigError::PayoutOrder {
                bet_type: self.bet_type,
                base: self.base_payout,
                tier1: self.tier1_payout,
                tier2: self.tier2_payout,
            });
        }
        Ok(())
    }
}

/// Validated payout table covering every bet type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutTable {
    entries: BTreeMap<BetType, BetTypeConfig>,
}

impl PayoutTable {
    /// Build a table from config entries.
    ///
    /// Rejects duplicates, missing bet types, entries violating their own
    /// invariants, and allocations that do not sum to exactly 1.
    pub fn new(configs: impl IntoIterator<Item = BetTypeConfig>) -> Result<Self, ConfigError> {
        let mut entries = BTreeMap::new();
        for config in configs {
            config.validate()?;
            if entries.insert(config.bet_type, config).is_some() {
                return Err(ConfigError::DuplicateBetType(config.bet_type));
            }
        }

        if let Some(missing) = BetType::ALL.iter().find(|t| !entries.contains_key(*t)) {
            return Err(ConfigError::MissingBetType(*missing));
        }

        let total: Decimal = entries.values().map(|c| c.allocation_fraction).sum();
        if total != Decimal::ONE {
            return Err(ConfigError::AllocationSum(total));
        }

        Ok(Self { entries })
    }

    /// The canonical table used when no `[[bet_types]]` are configured.
    pub fn canonical() -> Self {
        let entry = |bet_type, allocation_fraction, base_payout, tier1_payout, tier2_payout| {
            BetTypeConfig {
                bet_type,
                allocation_fraction,
                base_payout,
                tier1_payout,
                tier2_payout,
            }
        };
        let entries = [
            entry(BetType::ThreeDigitTop, dec!(0.30), dec!(800), dec!(700), dec!(600)),
            entry(BetType::ThreeDigitAnyOrder, dec!(0.15), dec!(120), dec!(100), dec!(80)),
            entry(BetType::TwoDigitTop, dec!(0.20), dec!(90), dec!(80), dec!(70)),
            entry(BetType::TwoDigitBottom, dec!(0.20), dec!(90), dec!(80), dec!(70)),
            entry(BetType::RunTop, dec!(0.075), dec!(3.2), dec!(3.0), dec!(2.8)),
            entry(BetType::RunBottom, dec!(0.075), dec!(4.2), dec!(4.0), dec!(3.8)),
        ];
        Self {
            entries: entries.into_iter().map(|c| (c.bet_type, c)).collect(),
        }
    }

    /// Config for a bet type.
    pub fn get(&self, bet_type: BetType) -> &BetTypeConfig {
        // Construction guarantees every bet type is present.
        &self.entries[&bet_type]
    }

    /// All entries in bet-type order.
    pub fn iter(&self) -> impl Iterator<Item = &BetTypeConfig> {
        self.entries.values()
    }
}

impl Default for PayoutTable {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_entries() -> Vec<BetTypeConfig> {
        PayoutTable::canonical().iter().copied().collect()
    }

    #[test]
    fn test_canonical_table_is_valid() {
        let table = PayoutTable::new(canonical_entries()).unwrap();
        assert_eq!(table, PayoutTable::canonical());
        assert_eq!(table.get(BetType::ThreeDigitTop).base_payout, dec!(800));
    }

    #[test]
    fn test_missing_bet_type_rejected() {
        let mut entries = canonical_entries();
        entries.retain(|c| c.bet_type != BetType::RunBottom);
        assert_eq!(
            PayoutTable::new(entries),
            Err(ConfigError::MissingBetType(BetType::RunBottom))
        );
    }

    #[test]
    fn test_duplicate_bet_type_rejected() {
        let mut entries = canonical_entries();
        entries.push(entries[0]);
        assert_eq!(
            PayoutTable::new(entries),
            Err(ConfigError::DuplicateBetType(BetType::ThreeDigitTop))
        );
    }

    #[test]
    fn test_allocation_sum_enforced() {
        let mut entries = canonical_entries();
        entries[0].allocation_fraction = dec!(0.25);
        assert_eq!(
            PayoutTable::new(entries),
            Err(ConfigError::AllocationSum(dec!(0.95)))
        );
    }

    #[test]
    fn test_payout_order_enforced() {
        let mut entries = canonical_entries();
        entries[2].tier1_payout = entries[2].base_payout;
        assert!(matches!(
            PayoutTable::new(entries),
            Err(ConfigError::PayoutOrder { bet_type: BetType::TwoDigitTop, .. })
        ));
    }

    #[test]
    fn test_zero_allocation_rejected_at_load() {
        let mut entries = canonical_entries();
        entries[5].allocation_fraction = Decimal::ZERO;
        assert!(matches!(
            PayoutTable::new(entries),
            Err(ConfigError::AllocationOutOfRange { .. })
        ));
    }
}
