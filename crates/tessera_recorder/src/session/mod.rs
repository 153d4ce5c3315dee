//! Session management for performance recordings.
//!
//! - `RecordingSession` - start/stop state machine over a bounded record buffer
//! - `RecordingConfig` - buffer sizing presets
//! - `RecordingSummary` - aggregate timings computed on demand

mod config;
mod recording;
mod summary;

pub use config::*;
pub use recording::*;
pub use summary::*;
