//! Error types for the transform manager

use tessera_core::ConfigurationError;
use thiserror::Error;

/// Errors returned by [`TransformManager`](crate::TransformManager) operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("transform manager has been disposed")]
    Disposed,

    #[error("batch cancelled after {completed} points")]
    Cancelled { completed: usize },
}

/// Result type for transform manager operations
pub type Result<T> = std::result::Result<T, TransformError>;
