//! Relay pool statistics
//!
//! Counters describing the lifecycle of pool members.

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Statistics for the relay pool
#[derive(Debug, Default)]
pub struct PoolStats {
    /// Tunnel connections established
    pub dialed: AtomicUsize,
    /// Tunnel connections that failed to establish
    pub dial_failures: AtomicUsize,
    /// Members whose tunnel has terminated
    pub closed: AtomicUsize,
}

impl PoolStats {
    /// Create new pool stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an established tunnel
    pub fn record_dialed(&self) {
        self.dialed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed dial
    pub fn record_dial_failure(&self) {
        self.dial_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a member termination
    pub fn record_closed(&self) {
        self.closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current stats snapshot
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            dialed: self.dialed.load(Ordering::Relaxed),
            dial_failures: self.dial_failures.load(Ordering::Relaxed),
            closed: self.closed.load(Ordering::Relaxed),
        }
    }

    /// Log pool health status
    ///
    /// Counters are cumulative over every association the pool has served.
    pub fn log_health(&self) {
        let stats = self.snapshot();
        debug!(
            "Relay pool health: dialed={}, dial_failures={}, closed={}",
            stats.dialed, stats.dial_failures, stats.closed
        );
    }
}

/// Snapshot of pool statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStatsSnapshot {
    /// Tunnel connections established
    pub dialed: usize,
    /// Tunnel connections that failed to establish
    pub dial_failures: usize,
    /// Members whose tunnel has terminated
    pub closed: usize,
}
