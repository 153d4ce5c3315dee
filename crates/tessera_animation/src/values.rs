//! Animatable value types
//!
//! Provides the `Interpolate` trait and implementations for points in every
//! continuous coordinate space, zoom scalars, view states and matrices.

use tessera_core::{Affine2D, CanvasPoint, Mat4, ScreenPoint, Vec2, ViewState, WorkspacePoint};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f64) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool;
}

fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

// ============================================================================
// Scalars
// ============================================================================

impl Interpolate for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        lerp_f64(*self, *other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self - other).abs() < epsilon
    }
}

// ============================================================================
// Points and vectors
// ============================================================================

macro_rules! impl_interpolate_xy {
    ($($ty:ty),*) => {
        $(
            impl Interpolate for $ty {
                fn lerp(&self, other: &Self, t: f64) -> Self {
                    Self::new(lerp_f64(self.x, other.x, t), lerp_f64(self.y, other.y, t))
                }

                fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
                    (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
                }
            }
        )*
    };
}

impl_interpolate_xy!(ScreenPoint, CanvasPoint, WorkspacePoint, Vec2);

// ============================================================================
// View state (zoom + pan)
// ============================================================================

impl Interpolate for ViewState {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        ViewState::new(
            lerp_f64(self.zoom, other.zoom, t),
            Interpolate::lerp(&self.pan, &other.pan, t),
        )
    }

    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.zoom - other.zoom).abs() < epsilon
            && Interpolate::approx_eq(&self.pan, &other.pan, epsilon)
    }
}

// ============================================================================
// Matrices (element-wise)
// ============================================================================

impl Interpolate for Affine2D {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        let mut elements = self.elements;
        for (e, o) in elements.iter_mut().zip(other.elements) {
            *e = lerp_f64(*e, o, t);
        }
        Affine2D { elements }
    }

    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| (a - b).abs() < epsilon)
    }
}

impl Interpolate for Mat4 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        let mut cols = self.cols;
        for (col, other_col) in cols.iter_mut().zip(other.cols) {
            for (e, o) in col.iter_mut().zip(other_col) {
                *e = lerp_f64(*e, o, t);
            }
        }
        Mat4 { cols }
    }

    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.cols
            .iter()
            .flatten()
            .zip(other.cols.iter().flatten())
            .all(|(a, b)| (a - b).abs() < epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_interpolation() {
        assert!((0.0_f64.lerp(&1.0, 0.5) - 0.5).abs() < 1e-12);
        assert!((10.0_f64.lerp(&20.0, 0.25) - 12.5).abs() < 1e-12);
    }

    #[test]
    fn test_point_interpolation() {
        let a = CanvasPoint::new(0.0, 0.0);
        let b = CanvasPoint::new(10.0, 20.0);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid, CanvasPoint::new(5.0, 10.0));
    }

    #[test]
    fn test_view_state_interpolation() {
        let a = ViewState::new(1.0, Vec2::new(0.0, 0.0));
        let b = ViewState::new(3.0, Vec2::new(-100.0, 50.0));
        let mid = a.lerp(&b, 0.5);
        assert!(Interpolate::approx_eq(
            &mid,
            &ViewState::new(2.0, Vec2::new(-50.0, 25.0)),
            1e-12
        ));
    }

    #[test]
    fn test_matrix_interpolation() {
        let a = Affine2D::IDENTITY;
        let b = Affine2D::translation(10.0, 0.0).then(&Affine2D::scale(3.0, 3.0));
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.apply(1.0, 1.0), (7.0, 2.0));

        let m = Mat4::IDENTITY.lerp(&Mat4::from_affine(&b), 1.0);
        assert!(m.approx_eq(&Mat4::from_affine(&b), 1e-12));
    }
}
