//! Recording session state machine.

use super::config::RecordingConfig;
use super::summary::RecordingSummary;
use crate::record::{PerformanceRecord, Timestamp};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// State of the recording session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Not recording. Records collected so far are kept.
    Idle,
    /// Appending records.
    Recording,
}

/// Statistics for a recording session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Total records appended since the last reset.
    pub total_records: u64,
    /// Records dropped due to buffer overflow.
    pub records_dropped: u64,
    /// Number of times recording was started.
    pub recording_windows: u64,
    /// Timestamp of the last record.
    pub last_record_time: Option<Timestamp>,
}

/// A session that accumulates performance records across start/stop windows.
pub struct RecordingSession {
    config: RecordingConfig,
    state: SessionState,
    /// Timestamps are measured from here.
    epoch: Instant,
    /// Retained records, oldest first.
    records: VecDeque<PerformanceRecord>,
    /// Running aggregates over every record, evicted ones included.
    totals: RecordingSummary,
    stats: SessionStats,
}

impl RecordingSession {
    /// Create a new recording session with the given configuration.
    pub fn new(config: RecordingConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
            epoch: Instant::now(),
            records: VecDeque::new(),
            totals: RecordingSummary::default(),
            stats: SessionStats::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &RecordingConfig {
        &self.config
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    /// Start (or resume) appending records.
    pub fn start(&mut self) {
        if self.state == SessionState::Idle {
            self.state = SessionState::Recording;
            self.stats.recording_windows += 1;
            tracing::debug!(
                window = self.stats.recording_windows,
                records = self.records.len(),
                "performance recording started"
            );
        }
    }

    /// Stop appending records. Nothing recorded so far is lost.
    pub fn stop(&mut self) {
        if self.state == SessionState::Recording {
            self.state = SessionState::Idle;
            tracing::debug!(records = self.records.len(), "performance recording stopped");
        }
    }

    /// Drop every record and statistic and go back to idle.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.epoch = Instant::now();
        self.records.clear();
        self.totals = RecordingSummary::default();
        self.stats = SessionStats::default();
    }

    /// Time since the session was created or reset.
    pub fn current_timestamp(&self) -> Timestamp {
        Timestamp::since(self.epoch.elapsed())
    }

    /// Append a record if recording. Returns whether it was kept.
    ///
    /// While recording, every record reaches the summary totals even when
    /// the retained log is bounded.
    pub fn record(&mut self, operation: &str, duration: Duration, cache_hit: bool) -> bool {
        if self.state != SessionState::Recording {
            return false;
        }

        let timestamp = self.current_timestamp();
        let record = PerformanceRecord::new(operation, duration, cache_hit, timestamp);
        self.totals.add(&record);
        self.stats.total_records += 1;

        let kept = match self.config.max_records {
            Some(0) => {
                self.stats.records_dropped += 1;
                false
            }
            Some(max) => {
                // Ring buffer: remove oldest if at capacity
                if self.records.len() >= max {
                    self.records.pop_front();
                    self.stats.records_dropped += 1;
                }
                true
            }
            None => true,
        };
        if kept {
            self.records.push_back(record);
        }
        self.stats.last_record_time = Some(timestamp);
        kept
    }

    pub fn records(&self) -> &VecDeque<PerformanceRecord> {
        &self.records
    }

    /// Records with a timestamp in `[start, end]`.
    pub fn records_in_range(&self, start: Timestamp, end: Timestamp) -> Vec<&PerformanceRecord> {
        self.records
            .iter()
            .filter(|r| r.timestamp >= start && r.timestamp <= end)
            .collect()
    }

    /// Totals cover every record since the last reset. `p95` is taken
    /// over the retained records only.
    pub fn summary(&self) -> RecordingSummary {
        self.totals.clone().with_percentile(&self.records)
    }

    /// Export all recorded data.
    pub fn export(&self) -> RecordingExport {
        RecordingExport {
            config: self.config.clone(),
            records: self.records.iter().cloned().collect(),
            stats: self.stats.clone(),
            summary: self.summary(),
        }
    }
}

/// Exported recording data for offline analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordingExport {
    pub config: RecordingConfig,
    pub records: Vec<PerformanceRecord>,
    pub stats: SessionStats,
    pub summary: RecordingSummary,
}

impl RecordingExport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Thread-safe wrapper around RecordingSession.
pub struct SharedRecordingSession {
    inner: RwLock<RecordingSession>,
}

impl SharedRecordingSession {
    pub fn new(config: RecordingConfig) -> Self {
        Self {
            inner: RwLock::new(RecordingSession::new(config)),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.read().state()
    }

    pub fn is_recording(&self) -> bool {
        self.inner.read().is_recording()
    }

    pub fn start(&self) {
        self.inner.write().start();
    }

    pub fn stop(&self) {
        self.inner.write().stop();
    }

    pub fn reset(&self) {
        self.inner.write().reset();
    }

    pub fn record(&self, operation: &str, duration: Duration, cache_hit: bool) -> bool {
        // Cheap read-locked check keeps the hot path free of write locks
        if !self.is_recording() {
            return false;
        }
        self.inner.write().record(operation, duration, cache_hit)
    }

    pub fn stats(&self) -> SessionStats {
        self.inner.read().stats().clone()
    }

    pub fn summary(&self) -> RecordingSummary {
        self.inner.read().summary()
    }

    pub fn export(&self) -> RecordingExport {
        self.inner.read().export()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_transitions() {
        let mut session = RecordingSession::new(RecordingConfig::minimal());
        assert_eq!(session.state(), SessionState::Idle);

        session.start();
        assert_eq!(session.state(), SessionState::Recording);
        session.start();
        assert_eq!(session.stats().recording_windows, 1);

        session.stop();
        assert_eq!(session.state(), SessionState::Idle);

        session.start();
        assert_eq!(session.stats().recording_windows, 2);

        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.stats(), &SessionStats::default());
    }

    #[test]
    fn test_records_accumulate_across_windows() {
        let mut session = RecordingSession::new(RecordingConfig::minimal());

        assert!(!session.record("ignored", Duration::from_micros(1), false));

        session.start();
        session.record("screen_to_canvas", Duration::from_micros(4), false);
        session.stop();

        assert!(!session.record("ignored", Duration::from_micros(1), false));

        session.start();
        session.record("screen_to_canvas", Duration::from_micros(1), true);
        session.stop();

        let export = session.export();
        assert_eq!(export.records.len(), 2);
        assert!(!export.records[0].cache_hit);
        assert!(export.records[1].cache_hit);
        assert!(export.records[0].timestamp <= export.records[1].timestamp);
    }

    #[test]
    fn test_ring_buffer_drops_oldest() {
        let mut session =
            RecordingSession::new(RecordingConfig::minimal().with_max_records(Some(5)));
        session.start();

        for i in 0..7 {
            session.record(&format!("op{}", i), Duration::from_micros(i), i % 2 == 0);
        }

        assert_eq!(session.records().len(), 5);
        assert_eq!(session.records()[0].operation, "op2");
        assert_eq!(session.stats().records_dropped, 2);
        assert_eq!(session.stats().total_records, 7);

        let summary = session.summary();
        assert_eq!(summary.count, 7);
        assert_eq!(summary.cache_hits, 4);
        assert_eq!(summary.min, Duration::ZERO);
        assert_eq!(summary.total, Duration::from_micros(21));
        assert_eq!(summary.operations.len(), 7);
        assert_eq!(summary.p95, Duration::from_micros(6));
        assert_eq!(session.export().summary.count, 7);

        session.reset();
        assert!(session.summary().is_empty());
    }

    #[test]
    fn test_unbounded_by_default() {
        let mut session = RecordingSession::new(RecordingConfig::standard());
        session.start();
        for _ in 0..25_000 {
            session.record("screen_to_canvas", Duration::from_nanos(50), true);
        }

        assert_eq!(session.records().len(), 25_000);
        assert_eq!(session.stats().records_dropped, 0);
        assert_eq!(session.summary().count, 25_000);
    }

    #[test]
    fn test_zero_capacity_still_counts() {
        let mut session =
            RecordingSession::new(RecordingConfig::minimal().with_max_records(Some(0)));
        session.start();

        assert!(!session.record("canvas_to_grid", Duration::from_micros(3), false));
        assert!(session.records().is_empty());
        assert_eq!(session.stats().records_dropped, 1);
        assert_eq!(session.summary().count, 1);
        assert_eq!(session.summary().p95, Duration::ZERO);
    }

    #[test]
    fn test_records_in_range() {
        let mut session = RecordingSession::new(RecordingConfig::minimal());
        session.start();
        session.record("a", Duration::from_micros(1), false);

        let all = session.records_in_range(Timestamp::from_micros(0), Timestamp::from_micros(u64::MAX));
        assert_eq!(all.len(), 1);
        let none = session.records_in_range(
            Timestamp::from_micros(u64::MAX - 1),
            Timestamp::from_micros(u64::MAX),
        );
        assert!(none.is_empty());
    }

    #[test]
    fn test_export_json_round_trip() {
        let shared = SharedRecordingSession::new(RecordingConfig::minimal().with_label("bench"));
        shared.start();
        shared.record("canvas_to_grid", Duration::from_micros(7), false);
        shared.record("canvas_to_grid", Duration::from_micros(1), true);

        let export = shared.export();
        let json = export.to_json().unwrap();
        let back = RecordingExport::from_json(&json).unwrap();
        assert_eq!(back, export);
        assert_eq!(back.config.label, "bench");
        assert_eq!(back.summary.count, 2);
    }
}
