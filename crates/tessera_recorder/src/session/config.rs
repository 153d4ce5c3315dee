//! Recording configuration presets.

use serde::{Deserialize, Serialize};

/// Configuration for a recording session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Maximum number of records kept, oldest evicted first. `None` keeps
    /// every record until the session is reset. Summaries count evicted
    /// records either way.
    pub max_records: Option<usize>,
    /// Label attached to exports.
    pub label: String,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl RecordingConfig {
    /// Keeps every record for profiling an interactive session.
    pub fn standard() -> Self {
        Self {
            max_records: None,
            label: "tessera".to_string(),
        }
    }

    /// Small buffer for always-on recording.
    pub fn minimal() -> Self {
        Self {
            max_records: Some(1_000),
            label: "tessera".to_string(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_max_records(mut self, max: Option<usize>) -> Self {
        self.max_records = max;
        self
    }
}
