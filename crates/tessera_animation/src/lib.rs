//! Tessera Animation System
//!
//! Easing curves and pull-based interpolation for placement, snap and view
//! animations.
//!
//! # Features
//!
//! - **Easing**: linear, ease-in/out, cubic, bounce, elastic and custom bezier curves
//! - **Typed Interpolation**: points in every continuous space, zoom, view state, matrices
//! - **Pull-based Frames**: finite, restartable iterators the render loop pulls from
//! - **Cancellation**: shared tokens that stop a sequence without side effects
//! - **Pacing**: async frame delivery at a target frame rate

pub mod cancel;
pub mod easing;
pub mod interpolation;
pub mod paced;
pub mod values;

pub use cancel::CancelToken;
pub use easing::{Easing, UnknownEasing};
pub use interpolation::{Frame, Frames, Interpolation, MIN_FPS};
pub use paced::PacedFrames;
pub use values::Interpolate;
