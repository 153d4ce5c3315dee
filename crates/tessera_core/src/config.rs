//! Coordinate system configuration
//!
//! A `CoordinateSystemConfig` is an immutable snapshot of everything needed to
//! derive the transformation matrices. Changing anything means building a new
//! value with one of the `with_*` methods and handing it to
//! [`CoordinateSystem::configure`](crate::CoordinateSystem::configure).

use crate::error::{ConfigurationError, Result};
use crate::geometry::{Rect, Size, Vec2, WorkspaceRect};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::hash::Hasher;

/// Default lower zoom bound
pub const DEFAULT_MIN_ZOOM: f64 = 0.1;

/// Default upper zoom bound
pub const DEFAULT_MAX_ZOOM: f64 = 10.0;

/// Largest grid width or height; cell indices must fit a `GridPoint`
pub const MAX_GRID_DIMENSION: u32 = i32::MAX as u32;

/// Zoom and pan, the part of the configuration driven by gestures
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub zoom: f64,
    pub pan: Vec2,
}

impl ViewState {
    pub const fn new(zoom: f64, pan: Vec2) -> Self {
        Self { zoom, pan }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(1.0, Vec2::ZERO)
    }
}

/// Configuration for a coordinate system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystemConfig {
    /// Physical pixels per logical pixel.
    pub device_pixel_ratio: f64,
    /// Canvas (viewport) size in logical pixels.
    pub canvas_size: Size,
    /// Edge length of one grid cell at zoom 1, in logical pixels.
    pub cell_size: f64,
    /// Number of grid columns.
    pub grid_width: u32,
    /// Number of grid rows.
    pub grid_height: u32,
    /// Workspace rectangle that the canvas rectangle maps onto.
    pub workspace_bounds: WorkspaceRect,
    /// Current zoom level.
    pub zoom: f64,
    /// Smallest allowed zoom level.
    pub min_zoom: f64,
    /// Largest allowed zoom level.
    pub max_zoom: f64,
    /// Pan offset in canvas units.
    pub pan: Vec2,
}

impl Default for CoordinateSystemConfig {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            canvas_size: Size::new(800.0, 600.0),
            cell_size: 50.0,
            grid_width: 10,
            grid_height: 8,
            workspace_bounds: Rect::new(0.0, 0.0, 800.0, 600.0),
            zoom: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            pan: Vec2::ZERO,
        }
    }
}

impl CoordinateSystemConfig {
    /// Create a configuration for a canvas and grid, with the workspace
    /// matching the canvas rectangle and the view reset.
    pub fn new(canvas_size: Size, cell_size: f64, grid_width: u32, grid_height: u32) -> Self {
        Self {
            canvas_size,
            cell_size,
            grid_width,
            grid_height,
            workspace_bounds: canvas_size.to_rect(),
            ..Self::default()
        }
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    pub fn with_canvas_size(mut self, size: Size) -> Self {
        self.canvas_size = size;
        self
    }

    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_grid(mut self, width: u32, height: u32) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    pub fn with_workspace_bounds(mut self, bounds: WorkspaceRect) -> Self {
        self.workspace_bounds = bounds;
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_zoom_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_zoom = min;
        self.max_zoom = max;
        self
    }

    pub fn with_pan(mut self, pan: Vec2) -> Self {
        self.pan = pan;
        self
    }

    pub fn with_view(mut self, view: ViewState) -> Self {
        self.zoom = view.zoom;
        self.pan = view.pan;
        self
    }

    pub fn view(&self) -> ViewState {
        ViewState::new(self.zoom, self.pan)
    }

    /// Canvas size of one cell at the current zoom
    pub fn scaled_cell_size(&self) -> f64 {
        self.cell_size * self.zoom
    }

    /// Clamp a zoom level into this configuration's bounds
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Check that every field can produce invertible matrices.
    pub fn validate(&self) -> Result<()> {
        positive("device_pixel_ratio", self.device_pixel_ratio)?;
        positive("canvas_width", self.canvas_size.width)?;
        positive("canvas_height", self.canvas_size.height)?;
        positive("cell_size", self.cell_size)?;

        grid_dimension("grid_width", self.grid_width)?;
        grid_dimension("grid_height", self.grid_height)?;

        finite("workspace_x", self.workspace_bounds.x)?;
        finite("workspace_y", self.workspace_bounds.y)?;
        positive("workspace_width", self.workspace_bounds.width)?;
        positive("workspace_height", self.workspace_bounds.height)?;

        if !(self.min_zoom.is_finite()
            && self.max_zoom.is_finite()
            && self.min_zoom > 0.0
            && self.min_zoom <= self.max_zoom)
        {
            return Err(ConfigurationError::InvalidZoomBounds {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if !(self.zoom >= self.min_zoom && self.zoom <= self.max_zoom) {
            return Err(ConfigurationError::ZoomOutOfRange {
                zoom: self.zoom,
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }

        finite("pan_x", self.pan.x)?;
        finite("pan_y", self.pan.y)?;
        Ok(())
    }

    /// Stable hash over the bit patterns of every field.
    ///
    /// Two configurations with the same fingerprint derive identical matrices.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        for value in [
            self.device_pixel_ratio,
            self.canvas_size.width,
            self.canvas_size.height,
            self.cell_size,
            self.workspace_bounds.x,
            self.workspace_bounds.y,
            self.workspace_bounds.width,
            self.workspace_bounds.height,
            self.zoom,
            self.min_zoom,
            self.max_zoom,
            self.pan.x,
            self.pan.y,
        ] {
            // -0.0 and 0.0 produce the same transforms
            hasher.write_u64((value + 0.0).to_bits());
        }
        hasher.write_u32(self.grid_width);
        hasher.write_u32(self.grid_height);
        hasher.finish()
    }
}

fn finite(parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::NonFinite { parameter })
    }
}

fn positive(parameter: &'static str, value: f64) -> Result<()> {
    finite(parameter, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositive { parameter, value })
    }
}

fn grid_dimension(parameter: &'static str, value: u32) -> Result<()> {
    if value == 0 {
        Err(ConfigurationError::ZeroGridDimension { parameter })
    } else if value > MAX_GRID_DIMENSION {
        Err(ConfigurationError::GridDimensionTooLarge {
            parameter,
            value,
            max: MAX_GRID_DIMENSION,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(CoordinateSystemConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_sizes() {
        let err = CoordinateSystemConfig::default()
            .with_cell_size(0.0)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::NonPositive {
                parameter: "cell_size",
                value: 0.0
            }
        );
        assert_eq!(err.parameter(), "cell_size");

        let err = CoordinateSystemConfig::default()
            .with_canvas_size(Size::new(800.0, -1.0))
            .validate()
            .unwrap_err();
        assert_eq!(err.parameter(), "canvas_height");
    }

    #[test]
    fn test_rejects_zero_grid() {
        let err = CoordinateSystemConfig::default()
            .with_grid(0, 4)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::ZeroGridDimension {
                parameter: "grid_width"
            }
        );
    }

    #[test]
    fn test_rejects_grid_wider_than_cell_indices() {
        let err = CoordinateSystemConfig::default()
            .with_grid(u32::MAX, 1)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::GridDimensionTooLarge {
                parameter: "grid_width",
                value: u32::MAX,
                max: MAX_GRID_DIMENSION,
            }
        );

        let err = CoordinateSystemConfig::default()
            .with_grid(4, MAX_GRID_DIMENSION + 1)
            .validate()
            .unwrap_err();
        assert_eq!(err.parameter(), "grid_height");

        assert!(CoordinateSystemConfig::default()
            .with_grid(MAX_GRID_DIMENSION, 1)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_rejects_zoom_out_of_range() {
        let err = CoordinateSystemConfig::default()
            .with_zoom(12.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::ZoomOutOfRange { .. }));

        let err = CoordinateSystemConfig::default()
            .with_zoom(f64::NAN)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::ZoomOutOfRange { .. }));

        let err = CoordinateSystemConfig::default()
            .with_zoom_bounds(2.0, 1.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidZoomBounds { .. }));
    }

    #[test]
    fn test_rejects_non_finite_pan() {
        let err = CoordinateSystemConfig::default()
            .with_pan(Vec2::new(f64::INFINITY, 0.0))
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigurationError::NonFinite { parameter: "pan_x" });
    }

    #[test]
    fn test_fingerprint_tracks_changes() {
        let a = CoordinateSystemConfig::default();
        let b = a.clone().with_pan(Vec2::new(0.0, -0.0));
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = a.clone().with_zoom(2.0);
        assert_ne!(a.fingerprint(), c.fingerprint());

        let d = a.clone().with_grid(8, 10);
        assert_ne!(a.fingerprint(), d.fingerprint());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = CoordinateSystemConfig::default()
            .with_device_pixel_ratio(2.0)
            .with_zoom(1.5);
        let json = serde_json::to_string(&config).unwrap();
        let back: CoordinateSystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
