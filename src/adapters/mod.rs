//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! infrastructure, and exposes the use cases over HTTP. Each sub-module
//! groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `http`: axum bet API, simulator, rounds, probes
//! - `memory`: process-local exposure ledger
//! - `metrics`: Prometheus metrics export and health state
//! - `persistence`: JSONL bet journal and round archives

pub mod http;
pub mod memory;
pub mod metrics;
pub mod persistence;
