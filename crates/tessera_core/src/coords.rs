//! Coordinate system
//!
//! Converts points between screen, canvas, grid and workspace space and
//! answers geometric queries about the current view.
//!
//! All matrices are derived eagerly from the configuration in
//! [`CoordinateSystem::configure`], which is the single invalidation point.
//! Every transform is a pure function of the current configuration and its
//! input, so results can be cached by the transform manager.
//!
//! # Example
//!
//! ```rust
//! use tessera_core::{CanvasPoint, CoordinateSystem, CoordinateSystemConfig, GridPoint};
//!
//! let system = CoordinateSystem::new(CoordinateSystemConfig::default()).unwrap();
//!
//! assert_eq!(system.canvas_to_grid(CanvasPoint::new(125.0, 75.0)), Some(GridPoint::new(2, 1)));
//! assert_eq!(system.grid_to_canvas(GridPoint::new(2, 1)), CanvasPoint::new(100.0, 50.0));
//! ```

use crate::config::{CoordinateSystemConfig, ViewState};
use crate::error::{ConfigurationError, Result};
use crate::geometry::{
    Affine2D, CanvasPoint, CanvasRect, GridPoint, GridRect, Mat4, Rect, ScreenPoint, Vec2,
    WorkspacePoint,
};
use std::sync::Arc;

/// Continuous grid coordinates within this relative distance of an integer
/// are treated as lying on that cell boundary before flooring.
pub const GRID_SNAP_EPSILON: f64 = 1e-9;

/// The matrices derived from one configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformMatrices {
    pub screen_to_canvas: Affine2D,
    pub canvas_to_screen: Affine2D,
    pub canvas_to_grid: Affine2D,
    pub grid_to_canvas: Affine2D,
    pub canvas_to_workspace: Affine2D,
    pub workspace_to_canvas: Affine2D,
}

impl TransformMatrices {
    /// Derive every matrix for a validated configuration
    pub fn derive(config: &CoordinateSystemConfig) -> Result<Self> {
        let dpr = config.device_pixel_ratio;
        let canvas_to_screen = Affine2D::scale(dpr, dpr);
        let screen_to_canvas = canvas_to_screen
            .inverse()
            .ok_or(ConfigurationError::Singular {
                parameter: "device_pixel_ratio",
            })?;

        let cell = config.scaled_cell_size();
        let grid_to_canvas =
            Affine2D::translation(config.pan.x, config.pan.y).then(&Affine2D::scale(cell, cell));
        let canvas_to_grid = grid_to_canvas
            .inverse()
            .ok_or(ConfigurationError::Singular {
                parameter: "cell_size",
            })?;

        let bounds = &config.workspace_bounds;
        let canvas = config.canvas_size;
        let canvas_to_workspace = Affine2D::translation(bounds.x, bounds.y).then(&Affine2D::scale(
            bounds.width / canvas.width,
            bounds.height / canvas.height,
        ));
        let workspace_to_canvas =
            canvas_to_workspace
                .inverse()
                .ok_or(ConfigurationError::Singular {
                    parameter: "workspace_bounds",
                })?;

        Ok(Self {
            screen_to_canvas,
            canvas_to_screen,
            canvas_to_grid,
            grid_to_canvas,
            canvas_to_workspace,
            workspace_to_canvas,
        })
    }
}

/// Maps points between the four coordinate spaces of the puzzle board
#[derive(Clone, Debug)]
pub struct CoordinateSystem {
    config: Arc<CoordinateSystemConfig>,
    matrices: TransformMatrices,
}

impl CoordinateSystem {
    /// Create a coordinate system from an initial configuration
    pub fn new(config: CoordinateSystemConfig) -> Result<Self> {
        config.validate()?;
        let matrices = TransformMatrices::derive(&config)?;
        Ok(Self {
            config: Arc::new(config),
            matrices,
        })
    }

    /// Replace the active configuration.
    ///
    /// On error the previous configuration and matrices stay in effect.
    pub fn configure(&mut self, config: CoordinateSystemConfig) -> Result<()> {
        if let Err(err) = config.validate() {
            tracing::warn!(error = %err, "rejected coordinate system configuration");
            return Err(err);
        }
        let matrices = TransformMatrices::derive(&config)?;

        tracing::debug!(
            zoom = config.zoom,
            pan_x = config.pan.x,
            pan_y = config.pan.y,
            grid_width = config.grid_width,
            grid_height = config.grid_height,
            "coordinate system configured"
        );

        self.config = Arc::new(config);
        self.matrices = matrices;
        Ok(())
    }

    pub fn config(&self) -> &CoordinateSystemConfig {
        &self.config
    }

    /// Shared handle to the active configuration snapshot
    pub fn config_arc(&self) -> Arc<CoordinateSystemConfig> {
        Arc::clone(&self.config)
    }

    pub fn matrices(&self) -> &TransformMatrices {
        &self.matrices
    }

    // =========================================================================
    // Point transforms
    // =========================================================================

    pub fn screen_to_canvas(&self, point: ScreenPoint) -> CanvasPoint {
        self.matrices.screen_to_canvas.apply(point.x, point.y).into()
    }

    pub fn canvas_to_screen(&self, point: CanvasPoint) -> ScreenPoint {
        self.matrices.canvas_to_screen.apply(point.x, point.y).into()
    }

    /// Fractional grid coordinates, without flooring or bounds checks
    pub fn canvas_to_grid_f(&self, point: CanvasPoint) -> Vec2 {
        let (x, y) = self.matrices.canvas_to_grid.apply(point.x, point.y);
        Vec2::new(x, y)
    }

    /// The cell under a canvas point, or `None` when the point lies outside
    /// the grid.
    pub fn canvas_to_grid(&self, point: CanvasPoint) -> Option<GridPoint> {
        let cell = self.canvas_to_grid_f(point);
        let col = snap_floor(cell.x);
        let row = snap_floor(cell.y);

        if !(col.is_finite() && row.is_finite()) {
            return None;
        }
        if col < 0.0
            || row < 0.0
            || col >= self.config.grid_width as f64
            || row >= self.config.grid_height as f64
        {
            return None;
        }
        Some(GridPoint::new(col as i32, row as i32))
    }

    /// Canvas position of a cell's top-left corner. Cells outside the grid
    /// are allowed.
    pub fn grid_to_canvas(&self, point: GridPoint) -> CanvasPoint {
        self.matrices
            .grid_to_canvas
            .apply(point.col as f64, point.row as f64)
            .into()
    }

    pub fn canvas_to_workspace(&self, point: CanvasPoint) -> WorkspacePoint {
        self.matrices
            .canvas_to_workspace
            .apply(point.x, point.y)
            .into()
    }

    pub fn workspace_to_canvas(&self, point: WorkspacePoint) -> CanvasPoint {
        self.matrices
            .workspace_to_canvas
            .apply(point.x, point.y)
            .into()
    }

    // =========================================================================
    // Composite transforms
    // =========================================================================

    pub fn screen_to_grid(&self, point: ScreenPoint) -> Option<GridPoint> {
        self.canvas_to_grid(self.screen_to_canvas(point))
    }

    pub fn grid_to_screen(&self, point: GridPoint) -> ScreenPoint {
        self.canvas_to_screen(self.grid_to_canvas(point))
    }

    pub fn screen_to_workspace(&self, point: ScreenPoint) -> WorkspacePoint {
        self.canvas_to_workspace(self.screen_to_canvas(point))
    }

    pub fn workspace_to_screen(&self, point: WorkspacePoint) -> ScreenPoint {
        self.canvas_to_screen(self.workspace_to_canvas(point))
    }

    pub fn workspace_to_grid(&self, point: WorkspacePoint) -> Option<GridPoint> {
        self.canvas_to_grid(self.workspace_to_canvas(point))
    }

    pub fn grid_to_workspace(&self, point: GridPoint) -> WorkspacePoint {
        self.canvas_to_workspace(self.grid_to_canvas(point))
    }

    // =========================================================================
    // Geometric queries
    // =========================================================================

    /// Canvas rectangle covered by one cell
    pub fn grid_cell_to_canvas_bounds(&self, point: GridPoint) -> CanvasRect {
        let origin = self.grid_to_canvas(point);
        let size = self.config.scaled_cell_size();
        Rect::new(origin.x, origin.y, size, size)
    }

    pub fn grid_cell_center(&self, point: GridPoint) -> CanvasPoint {
        let (x, y) = self
            .matrices
            .grid_to_canvas
            .apply(point.col as f64 + 0.5, point.row as f64 + 0.5);
        CanvasPoint::new(x, y)
    }

    /// Cells at least partially inside the canvas viewport, clamped to the grid
    pub fn visible_grid_bounds(&self) -> GridRect {
        self.visible_grid_bounds_with_margin(0)
    }

    /// Visible cells extended by `margin` cells on every side (overscan)
    pub fn visible_grid_bounds_with_margin(&self, margin: u32) -> GridRect {
        let viewport = self.config.canvas_size.to_rect();

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for (x, y) in viewport.corners() {
            let cell = self.canvas_to_grid_f(CanvasPoint::new(x, y));
            min_x = min_x.min(cell.x);
            min_y = min_y.min(cell.y);
            max_x = max_x.max(cell.x);
            max_y = max_y.max(cell.y);
        }

        let margin = margin as f64;
        let grid_w = self.config.grid_width as f64;
        let grid_h = self.config.grid_height as f64;

        let left = (snap_floor(min_x) - margin).clamp(0.0, grid_w);
        let top = (snap_floor(min_y) - margin).clamp(0.0, grid_h);
        let right = (snap_ceil(max_x) + margin).clamp(0.0, grid_w);
        let bottom = (snap_ceil(max_y) + margin).clamp(0.0, grid_h);

        GridRect::new(left as i32, top as i32, right as i32, bottom as i32)
    }

    /// The grid→screen transform as a 4x4 matrix for rendering
    pub fn render_matrix(&self) -> Mat4 {
        Mat4::from_affine(
            &self
                .matrices
                .canvas_to_screen
                .then(&self.matrices.grid_to_canvas),
        )
    }

    // =========================================================================
    // View operations
    // =========================================================================

    pub fn view_state(&self) -> ViewState {
        self.config.view()
    }

    /// Apply a zoom and pan pair. Zoom is clamped into the configured bounds.
    pub fn set_view(&mut self, view: ViewState) -> Result<()> {
        let zoom = self.config.clamp_zoom(view.zoom);
        let config = (*self.config)
            .clone()
            .with_view(ViewState::new(zoom, view.pan));
        self.configure(config)
    }

    /// Multiply the zoom by `factor`, keeping whatever lies under the canvas
    /// point `focal` in place.
    pub fn apply_zoom(&mut self, factor: f64, focal: CanvasPoint) -> Result<()> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(ConfigurationError::InvalidFactor { factor });
        }
        if !focal.is_finite() {
            return Err(ConfigurationError::NonFinite {
                parameter: "focal_point",
            });
        }

        let config = &self.config;
        let new_zoom = config.clamp_zoom(config.zoom * factor);

        // Fractional cell under the focal point must not move
        let anchor = self.canvas_to_grid_f(focal);
        let new_cell = config.cell_size * new_zoom;
        let pan = Vec2::new(focal.x - anchor.x * new_cell, focal.y - anchor.y * new_cell);

        self.set_view(ViewState::new(new_zoom, pan))
    }

    /// Zoom around a focal point given in screen pixels
    pub fn apply_zoom_at_screen(&mut self, factor: f64, focal: ScreenPoint) -> Result<()> {
        let focal = self.screen_to_canvas(focal);
        self.apply_zoom(factor, focal)
    }

    /// Shift the pan offset by `delta` canvas units
    pub fn apply_pan(&mut self, delta: Vec2) -> Result<()> {
        let view = self.view_state();
        self.set_view(ViewState::new(view.zoom, view.pan + delta))
    }

    /// Keep the zoom and move the centre of `point` to the canvas centre
    pub fn center_on_grid_point(&mut self, point: GridPoint) -> Result<()> {
        let config = &self.config;
        let cell = config.scaled_cell_size();
        let (cx, cy) = config.canvas_size.to_rect().center();
        let pan = Vec2::new(
            cx - (point.col as f64 + 0.5) * cell,
            cy - (point.row as f64 + 0.5) * cell,
        );
        self.set_view(ViewState::new(config.zoom, pan))
    }

    /// Largest zoom that shows the whole grid, centred in the canvas
    pub fn fit_grid_to_view(&mut self) -> Result<()> {
        let config = &self.config;
        let grid_w = config.grid_width as f64 * config.cell_size;
        let grid_h = config.grid_height as f64 * config.cell_size;
        let zoom = config.clamp_zoom(
            (config.canvas_size.width / grid_w).min(config.canvas_size.height / grid_h),
        );
        let pan = Vec2::new(
            (config.canvas_size.width - grid_w * zoom) / 2.0,
            (config.canvas_size.height - grid_h * zoom) / 2.0,
        );
        self.set_view(ViewState::new(zoom, pan))
    }

    /// Zoom 1 (clamped into bounds) with no pan
    pub fn reset_view(&mut self) -> Result<()> {
        self.set_view(ViewState::default())
    }
}

/// Floor, treating values within [`GRID_SNAP_EPSILON`] of an integer as that
/// integer.
fn snap_floor(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() <= GRID_SNAP_EPSILON * value.abs().max(1.0) {
        nearest
    } else {
        value.floor()
    }
}

fn snap_ceil(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() <= GRID_SNAP_EPSILON * value.abs().max(1.0) {
        nearest
    } else {
        value.ceil()
    }
}
