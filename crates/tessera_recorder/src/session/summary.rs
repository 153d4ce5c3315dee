//! Aggregate statistics over recorded operations.

use crate::record::PerformanceRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Timing statistics for one operation name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationSummary {
    pub count: usize,
    pub cache_hits: usize,
    pub total: Duration,
    pub mean: Duration,
    pub max: Duration,
}

impl OperationSummary {
    pub fn hit_rate(&self) -> f64 {
        ratio(self.cache_hits, self.count)
    }
}

/// Aggregate view of a set of performance records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordingSummary {
    pub count: usize,
    pub cache_hits: usize,
    /// Fraction of records served from cache, 0 when empty.
    pub hit_rate: f64,
    pub total: Duration,
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
    /// 95th percentile (nearest rank).
    pub p95: Duration,
    /// Per-operation breakdown, ordered by name.
    pub operations: BTreeMap<String, OperationSummary>,
}

impl RecordingSummary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a PerformanceRecord>,
    {
        let records: Vec<_> = records.into_iter().collect();
        let mut summary = Self::default();
        for record in &records {
            summary.add(record);
        }
        summary.with_percentile(records)
    }

    /// Fold one record into the running totals.
    ///
    /// Counts, sums, extremes and means stay exact. `p95` is left untouched
    /// and is refreshed by [`with_percentile`](Self::with_percentile).
    pub fn add(&mut self, record: &PerformanceRecord) {
        let duration = record.duration;
        self.min = if self.count == 0 {
            duration
        } else {
            self.min.min(duration)
        };
        self.max = self.max.max(duration);
        self.count += 1;
        self.total += duration;
        if record.cache_hit {
            self.cache_hits += 1;
        }
        self.hit_rate = ratio(self.cache_hits, self.count);
        self.mean = mean(self.total, self.count);

        let op = self.operations.entry(record.operation.clone()).or_default();
        op.count += 1;
        op.total += duration;
        op.max = op.max.max(duration);
        if record.cache_hit {
            op.cache_hits += 1;
        }
        op.mean = mean(op.total, op.count);
    }

    /// Set `p95` from a sample of records, typically the ones still held
    /// after older ones were evicted.
    pub fn with_percentile<'a, I>(mut self, sample: I) -> Self
    where
        I: IntoIterator<Item = &'a PerformanceRecord>,
    {
        let mut durations: Vec<Duration> = sample.into_iter().map(|r| r.duration).collect();
        self.p95 = if durations.is_empty() {
            Duration::ZERO
        } else {
            durations.sort_unstable();
            // Nearest rank: ceil(0.95 * n), 1-based
            let rank = (durations.len() * 95).div_ceil(100).max(1);
            durations[rank - 1]
        };
        self
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn mean(total: Duration, count: usize) -> Duration {
    match u32::try_from(count) {
        Ok(0) => Duration::ZERO,
        Ok(n) => total / n,
        Err(_) => Duration::from_secs_f64(total.as_secs_f64() / count as f64),
    }
}
