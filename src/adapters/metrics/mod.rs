//! Metrics and Monitoring Adapters
//!
//! Prometheus metrics for the desk and the health flags behind
//! the `/live` and `/ready` endpoints.

pub mod health;
pub mod prometheus;

pub use health::HealthState;
pub use prometheus::MetricsRegistry;
