//! Metrics snapshot

use crate::cache::CacheStats;
use serde::{Deserialize, Serialize};
use tessera_recorder::RecordingSummary;

/// Point-in-time view of cache effectiveness
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Counters since construction or the last `reset()`; all zero when
    /// metrics are disabled
    pub cache: CacheStats,
    pub hit_rate: f64,
    pub size: usize,
    pub capacity: usize,
    pub target_hit_rate: f64,
    /// Interpolations created by the manager that are still alive
    pub active_interpolations: usize,
    /// Present only while a recording window is open
    pub recording: Option<RecordingSummary>,
}

impl Metrics {
    /// Whether the observed hit rate reaches the advisory target
    pub fn meets_target(&self) -> bool {
        self.hit_rate >= self.target_hit_rate
    }

    /// Fraction of capacity in use
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.size as f64 / self.capacity as f64
        }
    }
}
