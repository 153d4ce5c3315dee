//! Geometry value types for the four coordinate spaces
//!
//! Every coordinate space gets its own point type so a canvas position can
//! never be passed where a screen position is expected. Floating-point spaces
//! use `f64`; grid space is integer cell indices.
//!
//! # Spaces
//!
//! - **Screen**: physical device pixels, as reported by input events
//! - **Canvas**: device-independent logical pixels used for layout
//! - **Grid**: integer `(col, row)` cell indices of the puzzle board
//! - **Workspace**: continuous coordinates of the free-form drag area

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Points
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! float_point {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub x: f64,
            pub y: f64,
        }

        impl $name {
            pub const ZERO: $name = $name { x: 0.0, y: 0.0 };

            pub const fn new(x: f64, y: f64) -> Self {
                Self { x, y }
            }

            /// Both coordinates are finite (not NaN or infinite)
            pub fn is_finite(&self) -> bool {
                self.x.is_finite() && self.y.is_finite()
            }

            /// Relative comparison: each axis within `epsilon * max(1, |a|, |b|)`
            pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
                approx_eq_f64(self.x, other.x, epsilon) && approx_eq_f64(self.y, other.y, epsilon)
            }
        }

        impl From<(f64, f64)> for $name {
            fn from((x, y): (f64, f64)) -> Self {
                Self { x, y }
            }
        }
    };
}

float_point! {
    /// A point in physical device pixels
    ScreenPoint
}

float_point! {
    /// A point in logical canvas pixels
    CanvasPoint
}

float_point! {
    /// A point in the continuous workspace area
    WorkspacePoint
}

/// A puzzle cell, addressed by column and row
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    pub col: i32,
    pub row: i32,
}

impl GridPoint {
    pub const ORIGIN: GridPoint = GridPoint { col: 0, row: 0 };

    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

impl From<(i32, i32)> for GridPoint {
    fn from((col, row): (i32, i32)) -> Self {
        Self { col, row }
    }
}

pub(crate) fn approx_eq_f64(a: f64, b: f64, epsilon: f64) -> bool {
    let scale = 1.0_f64.max(a.abs()).max(b.abs());
    (a - b).abs() <= epsilon * scale
}

// ─────────────────────────────────────────────────────────────────────────────
// Vectors, sizes and rectangles
// ─────────────────────────────────────────────────────────────────────────────

/// 2D displacement (pan offsets, gesture deltas)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Convert to a Rect at the origin (0, 0)
    pub const fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Axis-aligned rectangle with position and size
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Rectangle in canvas space
pub type CanvasRect = Rect;

/// Rectangle in workspace space
pub type WorkspaceRect = Rect;

impl Rect {
    pub const ZERO: Rect = Rect::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Corners in clockwise order starting at the top-left
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x, self.y),
            (self.right(), self.y),
            (self.right(), self.bottom()),
            (self.x, self.bottom()),
        ]
    }
}

/// A half-open range of grid cells: `left..right` columns, `top..bottom` rows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl GridRect {
    pub const EMPTY: GridRect = GridRect {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    pub fn cell_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn contains(&self, cell: GridPoint) -> bool {
        cell.col >= self.left && cell.col < self.right && cell.row >= self.top && cell.row < self.bottom
    }

    /// Iterate cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = GridPoint> {
        let (left, right) = (self.left, self.right);
        (self.top..self.bottom)
            .flat_map(move |row| (left..right).map(move |col| GridPoint::new(col, row)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Matrices
// ─────────────────────────────────────────────────────────────────────────────

/// 2D affine transformation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Affine2D {
    /// Matrix elements [a, b, c, d, tx, ty]
    /// | a  c  tx |
    /// | b  d  ty |
    /// | 0  0   1 |
    pub elements: [f64; 6],
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2D {
    pub const IDENTITY: Affine2D = Affine2D {
        elements: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    pub fn translation(x: f64, y: f64) -> Self {
        Self {
            elements: [1.0, 0.0, 0.0, 1.0, x, y],
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            elements: [sx, 0.0, 0.0, sy, 0.0, 0.0],
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, tx, ty] = self.elements;
        (a * x + c * y + tx, b * x + d * y + ty)
    }

    /// Concatenate this transform with another (self * other)
    /// The resulting transform first applies `other`, then `self`.
    pub fn then(&self, other: &Affine2D) -> Affine2D {
        let [a1, b1, c1, d1, tx1, ty1] = self.elements;
        let [a2, b2, c2, d2, tx2, ty2] = other.elements;

        Affine2D {
            elements: [
                a1 * a2 + c1 * b2,
                b1 * a2 + d1 * b2,
                a1 * c2 + c1 * d2,
                b1 * c2 + d1 * d2,
                a1 * tx2 + c1 * ty2 + tx1,
                b1 * tx2 + d1 * ty2 + ty1,
            ],
        }
    }

    pub fn determinant(&self) -> f64 {
        let [a, b, c, d, _, _] = self.elements;
        a * d - b * c
    }

    /// Returns `None` if the transform is singular or its inverse would
    /// not be finite
    pub fn inverse(&self) -> Option<Affine2D> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }

        let [a, b, c, d, tx, ty] = self.elements;
        let inv_det = 1.0 / det;
        let elements = [
            d * inv_det,
            -b * inv_det,
            -c * inv_det,
            a * inv_det,
            (c * ty - d * tx) * inv_det,
            (b * tx - a * ty) * inv_det,
        ];
        elements
            .iter()
            .all(|v| v.is_finite())
            .then_some(Affine2D { elements })
    }
}

/// 4x4 transformation matrix (column-major)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    pub cols: [[f64; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    pub fn scale(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [x, 0.0, 0.0, 0.0],
                [0.0, y, 0.0, 0.0],
                [0.0, 0.0, z, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Embed a 2D affine transform in the XY plane
    pub fn from_affine(affine: &Affine2D) -> Self {
        let [a, b, c, d, tx, ty] = affine.elements;
        Self {
            cols: [
                [a, b, 0.0, 0.0],
                [c, d, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [tx, ty, 0.0, 1.0],
            ],
        }
    }

    /// Multiply two matrices
    pub fn mul(&self, other: &Mat4) -> Mat4 {
        let mut result = [[0.0f64; 4]; 4];
        for (i, col) in result.iter_mut().enumerate() {
            for (j, cell) in col.iter_mut().enumerate() {
                for k in 0..4 {
                    *cell += self.cols[k][j] * other.cols[i][k];
                }
            }
        }
        Mat4 { cols: result }
    }

    /// Transform a point on the z = 0 plane
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        let c = &self.cols;
        let w = c[0][3] * x + c[1][3] * y + c[3][3];
        let px = c[0][0] * x + c[1][0] * y + c[3][0];
        let py = c[0][1] * x + c[1][1] * y + c[3][1];
        if w != 0.0 && w != 1.0 {
            (px / w, py / w)
        } else {
            (px, py)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affine_inverse_round_trip() {
        let m = Affine2D::translation(12.5, -3.0).then(&Affine2D::scale(2.0, 4.0));
        let inv = m.inverse().unwrap();
        let (x, y) = m.apply(7.0, 9.0);
        let (bx, by) = inv.apply(x, y);
        assert!(approx_eq_f64(bx, 7.0, 1e-12));
        assert!(approx_eq_f64(by, 9.0, 1e-12));
    }

    #[test]
    fn test_affine_then_order() {
        // Scale first, then translate
        let m = Affine2D::translation(10.0, 0.0).then(&Affine2D::scale(2.0, 2.0));
        assert_eq!(m.apply(1.0, 1.0), (12.0, 2.0));
    }

    #[test]
    fn test_singular_affine_has_no_inverse() {
        assert!(Affine2D::scale(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_tiny_scale_is_invertible() {
        // det = 1e-16, below f64::EPSILON but perfectly representable
        let m = Affine2D::scale(1e-8, 1e-8);
        let inv = m.inverse().unwrap();
        let (x, y) = inv.apply(3e-8, 5e-8);
        assert!(approx_eq_f64(x, 3.0, 1e-12));
        assert!(approx_eq_f64(y, 5.0, 1e-12));

        assert!(Affine2D::scale(1e-200, 1e-200).inverse().is_none());
    }

    #[test]
    fn test_mat4_from_affine_matches_affine() {
        let affine = Affine2D::translation(5.0, 6.0).then(&Affine2D::scale(3.0, 0.5));
        let mat = Mat4::from_affine(&affine);
        assert_eq!(mat.transform_point(2.0, 4.0), affine.apply(2.0, 4.0));

        let combined = Mat4::translation(1.0, 1.0, 0.0).mul(&Mat4::scale(2.0, 2.0, 1.0));
        assert_eq!(combined.transform_point(3.0, 3.0), (7.0, 7.0));
    }

    #[test]
    fn test_grid_rect_cells_row_major() {
        let rect = GridRect::new(1, 2, 3, 4);
        let cells: Vec<_> = rect.cells().collect();
        assert_eq!(
            cells,
            vec![
                GridPoint::new(1, 2),
                GridPoint::new(2, 2),
                GridPoint::new(1, 3),
                GridPoint::new(2, 3),
            ]
        );
        assert_eq!(rect.cell_count(), 4);
        assert!(rect.contains(GridPoint::new(2, 3)));
        assert!(!rect.contains(GridPoint::new(3, 3)));
        assert!(GridRect::EMPTY.is_empty());
    }

    #[test]
    fn test_point_approx_eq_is_relative() {
        let a = CanvasPoint::new(1e6, 1.0);
        let b = CanvasPoint::new(1e6 + 1e-4, 1.0);
        assert!(a.approx_eq(&b, 1e-9));
        assert!(!a.approx_eq(&CanvasPoint::new(1e6 + 1.0, 1.0), 1e-9));
    }
}
