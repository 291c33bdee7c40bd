//! Health State - Liveness and Readiness
//!
//! Shared flags polled by the `/live` and `/ready` endpoints.
//! Readiness drops during graceful shutdown or when a port
//! reports itself unhealthy.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared health state polled by readiness probes.
#[derive(Debug, Clone)]
pub struct HealthState {
    /// Whether the desk accepts bets (false while shutting down).
    accepting: Arc<AtomicBool>,
}

impl HealthState {
    /// Create a new health state (accepting by default).
    pub fn new() -> Self {
        Self {
            accepting: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Stop advertising readiness.
    pub fn mark_draining(&self) {
        self.accepting.store(false, Ordering::Relaxed);
    }

    /// Whether the process is not shutting down.
    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Relaxed)
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draining_is_shared_across_clones() {
        let health = HealthState::new();
        let probe = health.clone();
        assert!(probe.is_accepting());
        health.mark_draining();
        assert!(!probe.is_accepting());
    }
}
