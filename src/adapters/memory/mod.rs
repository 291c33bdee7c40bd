//! In-memory Adapters
//!
//! Process-local implementation of the exposure ledger. Suitable for a
//! single desk instance; a shared database ledger would implement the
//! same port.

pub mod exposure;

pub use exposure::InMemoryExposureStore;
