//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `ExposureStore`: Round pool and per-number exposure ledger
//! - `BetJournal`: Bet audit trail and round archives (JSONL-based)

pub mod exposure_store;
pub mod journal;
