//! Tessera Core
//!
//! Coordinate transformation engine for a grid-based puzzle board:
//!
//! - **Point Types**: distinct value types for screen, canvas, grid and workspace space
//! - **Configuration**: immutable `CoordinateSystemConfig` snapshots, validated up front
//! - **Matrices**: affine transforms derived once per configuration
//! - **Coordinate System**: pure point transforms, view operations and visibility queries
//!
//! # Example
//!
//! ```rust
//! use tessera_core::{CanvasPoint, CoordinateSystem, CoordinateSystemConfig, ScreenPoint};
//!
//! let config = CoordinateSystemConfig::default().with_device_pixel_ratio(2.0);
//! let mut system = CoordinateSystem::new(config).unwrap();
//!
//! // A touch at (250, 150) device pixels lands on cell (2, 1)
//! let cell = system.screen_to_grid(ScreenPoint::new(250.0, 150.0));
//! assert_eq!(cell.map(|c| (c.col, c.row)), Some((2, 1)));
//!
//! // Zoom towards the cursor; the cell under it stays put
//! system.apply_zoom(2.0, CanvasPoint::new(125.0, 75.0)).unwrap();
//! assert_eq!(system.screen_to_grid(ScreenPoint::new(250.0, 150.0)), cell);
//! ```

pub mod config;
pub mod coords;
pub mod error;
pub mod geometry;

pub use config::{
    CoordinateSystemConfig, ViewState, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, MAX_GRID_DIMENSION,
};
pub use coords::{CoordinateSystem, TransformMatrices, GRID_SNAP_EPSILON};
pub use error::{ConfigurationError, Result};
pub use geometry::{
    Affine2D, CanvasPoint, CanvasRect, GridPoint, GridRect, Mat4, Rect, ScreenPoint, Size, Vec2,
    WorkspacePoint, WorkspaceRect,
};
