//! Transform manager configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache, batching and recording parameters fixed at construction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Maximum number of cached results before LRU eviction
    pub max_entries: usize,
    /// Lifetime of a cached result, measured from its creation
    pub ttl: Duration,
    /// Whether hit/miss statistics are collected
    pub enable_metrics: bool,
    /// Hit rate the host hopes to reach. Reported, never enforced.
    pub target_hit_rate: f64,
    /// Points processed between cooperative yields in batch transforms
    pub batch_chunk_size: usize,
    /// Records the performance recorder retains. `None` keeps all of them
    /// until reset. Recording summaries count every record regardless.
    pub record_capacity: Option<usize>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl ManagerConfig {
    /// Interactive use: a few thousand hot points, a short lifetime
    pub fn standard() -> Self {
        Self {
            max_entries: 4096,
            ttl: Duration::from_secs(30),
            enable_metrics: true,
            target_hit_rate: 0.8,
            batch_chunk_size: 256,
            record_capacity: None,
        }
    }

    /// Low-memory hosts
    pub fn minimal() -> Self {
        Self {
            max_entries: 256,
            ttl: Duration::from_secs(5),
            enable_metrics: false,
            target_hit_rate: 0.5,
            batch_chunk_size: 64,
            record_capacity: Some(1_000),
        }
    }

    /// Small and long-lived so tests can reason about eviction
    pub fn testing() -> Self {
        Self {
            max_entries: 16,
            ttl: Duration::from_secs(3600),
            enable_metrics: true,
            target_hit_rate: 0.8,
            batch_chunk_size: 4,
            record_capacity: None,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.enable_metrics = enabled;
        self
    }

    pub fn with_target_hit_rate(mut self, rate: f64) -> Self {
        self.target_hit_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Zero is raised to one
    pub fn with_batch_chunk_size(mut self, size: usize) -> Self {
        self.batch_chunk_size = size.max(1);
        self
    }

    pub fn with_record_capacity(mut self, capacity: Option<usize>) -> Self {
        self.record_capacity = capacity;
        self
    }
}
