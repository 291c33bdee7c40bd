//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates the pure risk engine with the ledger and journal ports.
//! Each use case is a self-contained business operation.
//!
//! Use cases:
//! - `BetDesk`: Evaluate, commit and journal bets; what-if simulation
//! - `RoundManager`: Draw announcement, archiving and rollover

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::Round;

pub mod bet_desk;
pub mod round_manager;

pub use bet_desk::{BetDesk, Placement, RoundView, SimulationOverrides};
pub use round_manager::RoundManager;

/// Round shared between the desk (read) and the round manager (write).
pub type SharedRound = Arc<RwLock<Round>>;
