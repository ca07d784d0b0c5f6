//! RAII guard for pool members
//!
//! Marks a member closed when its task ends, however it ends.

use super::stats::PoolStats;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Guard that flags a member as closed on drop
pub struct ClosedGuard {
    closed: Arc<AtomicBool>,
    stats: Option<Arc<PoolStats>>,
}

impl ClosedGuard {
    /// Create a guard for the `closed` flag
    pub fn new(closed: Arc<AtomicBool>) -> Self {
        ClosedGuard {
            closed,
            stats: None,
        }
    }

    /// Also record the closure in `stats`
    pub fn with_stats(mut self, stats: Arc<PoolStats>) -> Self {
        self.stats = Some(stats);
        self
    }
}

impl Drop for ClosedGuard {
    fn drop(&mut self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            if let Some(stats) = &self.stats {
                stats.record_closed();
            }
        }
    }
}
