//! Performance records.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Microseconds since the recording session was created or last reset.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub fn since(elapsed: Duration) -> Self {
        Self(u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX))
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }
}

/// One measured operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    /// Operation name, usually the transform kind (e.g. `"canvas_to_grid"`).
    pub operation: String,
    /// How long the operation took.
    pub duration: Duration,
    /// Whether the result came from the cache.
    pub cache_hit: bool,
    /// When the operation completed.
    pub timestamp: Timestamp,
}

impl PerformanceRecord {
    pub fn new(
        operation: impl Into<String>,
        duration: Duration,
        cache_hit: bool,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            operation: operation.into(),
            duration,
            cache_hit,
            timestamp,
        }
    }
}
