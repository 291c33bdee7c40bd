//! Risk and payout evaluation.
//!
//! Decides, for one numbers bet, whether it is accepted, accepted at a
//! reduced payout, or rejected, given the round's pool and the amount
//! already wagered on the same number.
//!
//! The per-number limit is the largest cumulative stake whose base payout
//! still fits in the bet type's share of the pot:
//!
//!   limit = floor((capital + total_sales) * allocation / base_payout)
//!
//! Usage above the tier thresholds degrades the payout; usage above the
//! reject threshold refuses the bet. Thresholds are exclusive: a ratio
//! exactly on a threshold stays in the better tier.
//!
//! Everything here is pure. The ledger owns the state and decides what to
//! commit.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::bet::EvaluationRequest;
use super::error::ConfigError;
use super::payout::{BetTypeConfig, PayoutTable};

/// Commission rate and usage thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskPolicy {
    /// Commission deducted from bets placed through a referrer.
    pub referrer_commission_rate: Decimal,
    /// Usage ratio above which the tier-1 payout applies.
    pub tier1_threshold: Decimal,
    /// Usage ratio above which the tier-2 payout applies.
    pub tier2_threshold: Decimal,
    /// Usage ratio above which bets are rejected.
    pub reject_threshold: Decimal,
}

impl RiskPolicy {
    /// Check threshold ordering and the commission range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.referrer_commission_rate < Decimal::ZERO
            || self.referrer_commission_rate >= Decimal::ONE
        {
            return Err(ConfigError::CommissionRate(self.referrer_commission_rate));
        }
        if !(self.tier1_threshold > Decimal::ZERO
            && self.tier1_threshold < self.tier2_threshold
            && self.tier2_threshold <= self.reject_threshold)
        {
            return Err(ConfigError::Thresholds {
                tier1: self.tier1_threshold,
                tier2: self.tier2_threshold,
                reject: self.reject_threshold,
            });
        }
        Ok(())
    }
}

impl Default for RiskPolicy {
    /// 8% referrer commission, tiers at 70% / 85%, reject above 100%.
    fn default() -> Self {
        Self {
            referrer_commission_rate: dec!(0.08),
            tier1_threshold: dec!(0.70),
            tier2_threshold: dec!(0.85),
            reject_threshold: dec!(1.0),
        }
    }
}

/// Operator reserve and sales of the open round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolState {
    /// Operator's standing reserve.
    pub capital: Decimal,
    /// Gross wagers accepted so far in the round.
    pub total_sales: Decimal,
}

impl PoolState {
    pub const fn new(capital: Decimal, total_sales: Decimal) -> Self {
        Self {
            capital,
            total_sales,
        }
    }

    /// Capital plus sales. Recomputed on every call since sales keep growing.
    pub fn total_pot(&self) -> Decimal {
        self.capital + self.total_sales
    }
}

/// Outcome class of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    /// Accepted at the base payout.
    Accepted,
    /// Accepted at a reduced payout.
    Warning,
    /// Refused; the number is over its limit.
    Rejected,
}

impl EvaluationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Warning => "warning",
            Self::Rejected => "rejected",
        }
    }

    /// Whether the ledger should record the bet.
    pub const fn is_accepted(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

impl std::fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payout tier selected by usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutTier {
    Base,
    Tier1,
    Tier2,
    /// No payout; bet rejected.
    Closed,
}

/// Why a bet was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionReason {
    /// Threshold the usage ratio exceeded.
    pub threshold: Decimal,
    /// Usage ratio the bet would have produced.
    pub usage_ratio: Decimal,
    /// Amount by which the projected stake exceeds the limit.
    pub overshoot: Decimal,
}

/// Full breakdown of one evaluation, including every intermediate value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub status: EvaluationStatus,
    pub tier: PayoutTier,
    /// Multiplier the bet is paid at if it wins (0 when rejected).
    pub applied_payout: Decimal,
    /// Gross wager as submitted.
    pub amount: Decimal,
    /// Referrer commission deducted from the wager.
    pub commission: Decimal,
    /// Wager after commission. Informational; limits use the gross amount.
    pub net_amount: Decimal,
    pub total_pot: Decimal,
    pub allocation_fraction: Decimal,
    pub base_payout: Decimal,
    /// Maximum cumulative stake on this number.
    pub current_limit: Decimal,
    /// Stake on this number before this bet.
    pub current_exposure: Decimal,
    /// Stake on this number if this bet is committed.
    pub projected_amount: Decimal,
    pub usage_ratio: Decimal,
    /// `usage_ratio` as a percentage, two decimals.
    pub usage_percent: Decimal,
    /// `current_limit - projected_amount`; negative when over the limit.
    pub remaining_limit: Decimal,
    /// Present only when rejected.
    pub rejection: Option<RejectionReason>,
}

/// Evaluate one bet against the pool and the number's current exposure.
///
/// Never fails: a zero allocation or zero base payout yields a zero limit
/// and a zero usage ratio. Input shape (positive amount, digit count) is
/// checked by the caller.
pub fn evaluate(
    request: &EvaluationRequest,
    pool: &PoolState,
    current_exposure: Decimal,
    config: &BetTypeConfig,
    policy: &RiskPolicy,
) -> EvaluationResult {
    let amount = request.amount;
    let commission = if request.has_referrer {
        amount * policy.referrer_commission_rate
    } else {
        Decimal::ZERO
    };
    let net_amount = amount - commission;

    let total_pot = pool.total_pot();
    let current_limit = if config.base_payout.is_zero() {
        Decimal::ZERO
    } else {
        (total_pot * config.allocation_fraction / config.base_payout).floor()
    };

    let projected_amount = current_exposure + amount;
    let usage_ratio = if current_limit > Decimal::ZERO {
        projected_amount / current_limit
    } else {
        Decimal::ZERO
    };
    let remaining_limit = current_limit - projected_amount;

    let (status, tier, applied_payout) = if usage_ratio > policy.reject_threshold {
        (EvaluationStatus::Rejected, PayoutTier::Closed, Decimal::ZERO)
    } else if usage_ratio > policy.tier2_threshold {
        (EvaluationStatus::Warning, PayoutTier::Tier2, config.tier2_payout)
    } else if usage_ratio > policy.tier1_threshold {
        (EvaluationStatus::Warning, PayoutTier::Tier1, config.tier1_payout)
    } else {
        (EvaluationStatus::Accepted, PayoutTier::Base, config.base_payout)
    };

    let rejection = (status == EvaluationStatus::Rejected).then(|| RejectionReason {
        threshold: policy.reject_threshold,
        usage_ratio,
        overshoot: -remaining_limit,
    });

    EvaluationResult {
        status,
        tier,
        applied_payout,
        amount,
        commission,
        net_amount,
        total_pot,
        allocation_fraction: config.allocation_fraction,
        base_payout: config.base_payout,
        current_limit,
        current_exposure,
        projected_amount,
        usage_ratio,
        usage_percent: (usage_ratio * Decimal::ONE_HUNDRED).round_dp(2),
        remaining_limit,
        rejection,
    }
}

/// Shared evaluator binding a payout table to a policy.
///
/// Every caller (simulator, admin panel, bet desk) goes through this.
#[derive(Debug, Clone, Default)]
pub struct RiskEvaluator {
    table: PayoutTable,
    policy: RiskPolicy,
}

impl RiskEvaluator {
    /// Build an evaluator. The table is already validated; the policy is
    /// checked here.
    pub fn new(table: PayoutTable, policy: RiskPolicy) -> Result<Self, ConfigError> {
        policy.validate()?;
        Ok(Self { table, policy })
    }

    pub fn evaluate(
        &self,
        request: &EvaluationRequest,
        pool: &PoolState,
        current_exposure: Decimal,
    ) -> EvaluationResult {
        evaluate(
            request,
            pool,
            current_exposure,
            self.table.get(request.bet_type),
            &self.policy,
        )
    }

    pub const fn table(&self) -> &PayoutTable {
        &self.table
    }

    pub const fn policy(&self) -> &RiskPolicy {
        &self.policy
    }
}
