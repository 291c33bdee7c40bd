//! Error types for the bet desk.
//!
//! Taxonomy:
//! - Configuration errors: caught at load or reload time, never mid-request
//! - Input errors: malformed bets, rejected before evaluation
//! - Transient errors: ledger commit conflicts, safe to retry
//! - Round errors: bets or announcements against the wrong round state
//!
//! A risk rejection is NOT an error; it is an `EvaluationStatus`.

use rust_decimal::Decimal;
use thiserror::Error;

use super::bet_type::BetType;

/// Invalid payout table or risk policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("bet type {0} has no payout configuration")]
    MissingBetType(BetType),

    #[error("bet type {0} is configured more than once")]
    DuplicateBetType(BetType),

    #[error("allocation fraction for {bet_type} must be in (0, 1], got {fraction}")]
    AllocationOutOfRange { bet_type: BetType, fraction: Decimal },

    #[error("allocation fractions must sum to 1, got {0}")]
    AllocationSum(Decimal),

    #[error("payouts for {bet_type} must satisfy base > tier1 > tier2 > 0, got {base} / {tier1} / {tier2}")]
    PayoutOrder {
        bet_type: BetType,
        base: Decimal,
        tier1: Decimal,
        tier2: Decimal,
    },

    #[error("thresholds must satisfy 0 < tier1 < tier2 <= reject, got {tier1} / {tier2} / {reject}")]
    Thresholds {
        tier1: Decimal,
        tier2: Decimal,
        reject: Decimal,
    },

    #[error("referrer commission rate must be in [0, 1), got {0}")]
    CommissionRate(Decimal),
}

/// Malformed bet request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("amount {amount} exceeds the maximum of {max}")]
    AmountTooLarge { amount: Decimal, max: Decimal },

    #[error("{field} must be in [0, {max}], got {value}")]
    FigureOutOfRange {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },

    #[error("number {number:?} must contain only digits")]
    NonDigit { number: String },

    #[error("number {number:?} must have {expected} digits for {bet_type}")]
    WrongDigitCount {
        number: String,
        bet_type: BetType,
        expected: usize,
    },
}

/// Top-level error for bet placement and round management.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid bet: {0}")]
    InvalidInput(#[from] InputError),

    #[error("exposure on {key} changed concurrently; gave up after {attempts} attempts")]
    CommitConflict { key: String, attempts: u32 },

    #[error("round {round_id} is not open for bets")]
    RoundNotOpen { round_id: u64 },

    #[error("round {requested} is not the current round ({current})")]
    RoundMismatch { requested: u64, current: u64 },

    #[error("announcement needs {required} distinct confirmations, got {got}")]
    InsufficientConfirmations { required: usize, got: usize },

    #[error("invalid draw result: {0}")]
    InvalidResult(String),

    #[error(transparent)]
    Ledger(#[from] anyhow::Error),
}

impl EngineError {
    /// Whether the caller may retry the same request unchanged.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::CommitConflict { .. })
    }
}
