//! Shared health state for the /health endpoint.
//! Updated by the analyze handler after every served analysis.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Shared service counters. Updated by handlers, read by /health.
pub struct HealthState {
    started_at: Instant,
    /// Analyses that produced a response.
    analyses_served: AtomicU64,
    /// Requests that ended in an error response.
    analyses_failed: AtomicU64,
    /// Nanosecond timestamp of the last served analysis (0 = none).
    last_analysis_at_ns: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            analyses_served: AtomicU64::new(0),
            analyses_failed: AtomicU64::new(0),
            last_analysis_at_ns: AtomicU64::new(0),
        }
    }

    pub fn record_served(&self, at_ns: u64) {
        self.analyses_served.fetch_add(1, Ordering::Relaxed);
        self.last_analysis_at_ns.store(at_ns, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.analyses_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn analyses_served(&self) -> u64 {
        self.analyses_served.load(Ordering::Relaxed)
    }

    pub fn analyses_failed(&self) -> u64 {
        self.analyses_failed.load(Ordering::Relaxed)
    }

    pub fn last_analysis_at_ns(&self) -> u64 {
        self.last_analysis_at_ns.load(Ordering::Relaxed)
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}
