//! Configuration error types

use thiserror::Error;

/// A coordinate system configuration that cannot produce valid transforms
///
/// Every variant names the offending parameter so the host can decide
/// whether to ignore a transient state (mid-resize) or surface a diagnostic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A size, ratio or factor that must be strictly positive
    #[error("{parameter} must be positive, got {value}")]
    NonPositive { parameter: &'static str, value: f64 },

    /// NaN or infinite input
    #[error("{parameter} must be finite")]
    NonFinite { parameter: &'static str },

    /// Grid width or height of zero cells
    #[error("{parameter} must be at least one cell")]
    ZeroGridDimension { parameter: &'static str },

    /// Grid width or height too large for `i32` cell indices
    #[error("{parameter} of {value} cells exceeds the maximum of {max}")]
    GridDimensionTooLarge {
        parameter: &'static str,
        value: u32,
        max: u32,
    },

    /// Zoom level outside the configured bounds
    #[error("zoom {zoom} is outside the allowed range [{min}, {max}]")]
    ZoomOutOfRange { zoom: f64, min: f64, max: f64 },

    /// Zoom bounds that are inverted or non-positive
    #[error("invalid zoom bounds [{min}, {max}]")]
    InvalidZoomBounds { min: f64, max: f64 },

    /// Parameters so small that the derived matrix cannot be inverted
    #[error("{parameter} produces a singular transform")]
    Singular { parameter: &'static str },

    /// A zoom factor that is zero, negative or not finite
    #[error("zoom factor must be a positive finite number, got {factor}")]
    InvalidFactor { factor: f64 },
}

impl ConfigurationError {
    /// The configuration parameter this error refers to
    pub fn parameter(&self) -> &'static str {
        match self {
            ConfigurationError::NonPositive { parameter, .. }
            | ConfigurationError::NonFinite { parameter }
            | ConfigurationError::ZeroGridDimension { parameter }
            | ConfigurationError::GridDimensionTooLarge { parameter, .. }
            | ConfigurationError::Singular { parameter } => parameter,
            ConfigurationError::ZoomOutOfRange { .. } | ConfigurationError::InvalidFactor { .. } => {
                "zoom"
            }
            ConfigurationError::InvalidZoomBounds { .. } => "zoom_bounds",
        }
    }
}

/// Result type for coordinate system operations
pub type Result<T> = std::result::Result<T, ConfigurationError>;
