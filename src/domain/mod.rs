//! Domain layer - Core business logic and models.
//!
//! Pure risk and payout logic for the bet desk. No I/O here
//! (hexagonal architecture inner ring); the ledger, journal and
//! HTTP surface live behind ports and adapters.

pub mod bet;
pub mod bet_type;
pub mod error;
pub mod payout;
pub mod risk;
pub mod round;

// Re-export core types for convenience
pub use bet::{EvaluationRequest, ExposureKey, MAX_FIGURE, check_figure};
pub use bet_type::BetType;
pub use error::{ConfigError, EngineError, InputError};
pub use payout::{BetTypeConfig, PayoutTable};
pub use risk::{
    evaluate, EvaluationResult, EvaluationStatus, PayoutTier, PoolState, RejectionReason,
    RiskEvaluator, RiskPolicy,
};
pub use round::{DrawResult, Round, RoundStatus};
