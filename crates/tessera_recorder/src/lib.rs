//! Tessera Performance Recorder
//!
//! Records the duration and cache outcome of coordinate transformations so
//! hosts can profile their input and render paths.
//!
//! # Features
//!
//! - **Start/stop Windows**: records accumulate across windows until reset
//! - **Optional Bound**: ring buffer with drop accounting, totals kept exact
//! - **Summaries**: hit rate, mean and tail latency, per-operation breakdown
//! - **Export**: serde-serialisable snapshot with JSON helpers
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use tessera_recorder::{RecordingConfig, SharedRecordingSession};
//!
//! let session = SharedRecordingSession::new(RecordingConfig::minimal());
//! session.start();
//! session.record("canvas_to_grid", Duration::from_micros(3), false);
//! session.stop();
//!
//! assert_eq!(session.summary().count, 1);
//! ```

pub mod record;
pub mod session;

pub use record::{PerformanceRecord, Timestamp};
pub use session::{
    OperationSummary, RecordingConfig, RecordingExport, RecordingSession, RecordingSummary,
    SessionState, SessionStats, SharedRecordingSession,
};
