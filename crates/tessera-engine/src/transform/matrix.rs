use core::ops::{Mul, MulAssign};

use crate::coords::{Rect, Vector2};

const IDENTITY_MATRIX: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0, //
];

/// 3x3 affine transform of the plane, packed into a column-major 4x4 buffer.
///
/// Layout (indices into `matrix`):
///
/// ```text
/// | 0  4  8  12 |     | a00 a01  0  a02 |
/// | 1  5  9  13 |  =  | a10 a11  0  a12 |
/// | 2  6  10 14 |     |  0   0   1   0  |
/// | 3  7  11 15 |     | a20 a21  0  a22 |
/// ```
///
/// Only the nine affine coefficients are ever written; the z row/column keeps
/// the identity pattern so the buffer can be handed to a backend unchanged.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: [f32; 16],
}

impl Transform {
    pub const IDENTITY: Transform = Transform { matrix: IDENTITY_MATRIX };

    #[inline]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// Builds a transform from the nine coefficients of a 3x3 matrix (row-major
    /// argument order).
    ///
    /// Every other constructor and operation goes through here.
    #[allow(clippy::too_many_arguments)]
    pub const fn from_affine_3x3(
        a00: f32,
        a01: f32,
        a02: f32,
        a10: f32,
        a11: f32,
        a12: f32,
        a20: f32,
        a21: f32,
        a22: f32,
    ) -> Self {
        Self {
            matrix: [
                a00, a10, 0.0, a20, //
                a01, a11, 0.0, a21, //
                0.0, 0.0, 1.0, 0.0, //
                a02, a12, 0.0, a22, //
            ],
        }
    }

    /// Column-major 4x4 buffer, ready for a backend matrix load.
    #[inline]
    pub fn matrix(&self) -> &[f32; 16] {
        &self.matrix
    }

    /// Closed-form inverse.
    ///
    /// A zero determinant yields the identity. No epsilon is applied: a tiny
    /// but non-zero determinant is still inverted.
    pub fn inverse(&self) -> Transform {
        let m = &self.matrix;
        let det = m[0] * (m[15] * m[5] - m[7] * m[13]) - m[1] * (m[15] * m[4] - m[7] * m[12])
            + m[3] * (m[13] * m[4] - m[5] * m[12]);

        if det == 0.0 {
            return Transform::IDENTITY;
        }

        Transform::from_affine_3x3(
            (m[15] * m[5] - m[7] * m[13]) / det,
            -(m[15] * m[4] - m[7] * m[12]) / det,
            (m[13] * m[4] - m[5] * m[12]) / det,
            -(m[15] * m[1] - m[3] * m[13]) / det,
            (m[15] * m[0] - m[3] * m[12]) / det,
            -(m[13] * m[0] - m[1] * m[12]) / det,
            (m[7] * m[1] - m[3] * m[5]) / det,
            -(m[7] * m[0] - m[3] * m[4]) / det,
            (m[5] * m[0] - m[1] * m[4]) / det,
        )
    }

    #[inline]
    pub fn transform_point_xy(&self, x: f32, y: f32) -> Vector2 {
        let m = &self.matrix;
        Vector2::new(m[0] * x + m[4] * y + m[12], m[1] * x + m[5] * y + m[13])
    }

    #[inline]
    pub fn transform_point(&self, point: Vector2) -> Vector2 {
        self.transform_point_xy(point.x, point.y)
    }

    /// Axis-aligned bounding box of the four transformed corners.
    ///
    /// Under rotation this is larger than the exact transformed shape.
    pub fn transform_rect(&self, rect: Rect) -> Rect {
        let points = [
            self.transform_point_xy(rect.left, rect.top),
            self.transform_point_xy(rect.left, rect.bottom()),
            self.transform_point_xy(rect.right(), rect.top),
            self.transform_point_xy(rect.right(), rect.bottom()),
        ];

        let mut left = points[0].x;
        let mut top = points[0].y;
        let mut right = points[0].x;
        let mut bottom = points[0].y;
        for p in &points[1..] {
            left = left.min(p.x);
            right = right.max(p.x);
            top = top.min(p.y);
            bottom = bottom.max(p.y);
        }

        Rect::new(left, top, right - left, bottom - top)
    }

    /// Right-multiplies by `other`: the result applies `other` first, then the
    /// previous `self`.
    pub fn combine(&mut self, other: &Transform) -> &mut Self {
        let a = &self.matrix;
        let b = &other.matrix;
        *self = Transform::from_affine_3x3(
            a[0] * b[0] + a[4] * b[1] + a[12] * b[3],
            a[0] * b[4] + a[4] * b[5] + a[12] * b[7],
            a[0] * b[12] + a[4] * b[13] + a[12] * b[15],
            a[1] * b[0] + a[5] * b[1] + a[13] * b[3],
            a[1] * b[4] + a[5] * b[5] + a[13] * b[7],
            a[1] * b[12] + a[5] * b[13] + a[13] * b[15],
            a[3] * b[0] + a[7] * b[1] + a[15] * b[3],
            a[3] * b[4] + a[7] * b[5] + a[15] * b[7],
            a[3] * b[12] + a[7] * b[13] + a[15] * b[15],
        );
        self
    }

    pub fn translate_xy(&mut self, x: f32, y: f32) -> &mut Self {
        let translation = Transform::from_affine_3x3(
            1.0, 0.0, x, //
            0.0, 1.0, y, //
            0.0, 0.0, 1.0,
        );
        self.combine(&translation)
    }

    #[inline]
    pub fn translate(&mut self, offset: Vector2) -> &mut Self {
        self.translate_xy(offset.x, offset.y)
    }

    /// Rotates by `angle` degrees (counter-clockwise in a +Y-up frame).
    pub fn rotate(&mut self, angle: f32) -> &mut Self {
        let (sin, cos) = angle.to_radians().sin_cos();
        let rotation = Transform::from_affine_3x3(
            cos, -sin, 0.0, //
            sin, cos, 0.0, //
            0.0, 0.0, 1.0,
        );
        self.combine(&rotation)
    }

    /// Rotates by `angle` degrees around `center`, folded into a single matrix.
    pub fn rotate_about(&mut self, angle: f32, center: Vector2) -> &mut Self {
        let (sin, cos) = angle.to_radians().sin_cos();
        let rotation = Transform::from_affine_3x3(
            cos,
            -sin,
            center.x * (1.0 - cos) + center.y * sin,
            sin,
            cos,
            center.y * (1.0 - cos) - center.x * sin,
            0.0,
            0.0,
            1.0,
        );
        self.combine(&rotation)
    }

    pub fn scale_xy(&mut self, scale_x: f32, scale_y: f32) -> &mut Self {
        let scaling = Transform::from_affine_3x3(
            scale_x, 0.0, 0.0, //
            0.0, scale_y, 0.0, //
            0.0, 0.0, 1.0,
        );
        self.combine(&scaling)
    }

    #[inline]
    pub fn scale(&mut self, factors: Vector2) -> &mut Self {
        self.scale_xy(factors.x, factors.y)
    }

    /// Scales by `factors` keeping `center` fixed, folded into a single matrix.
    pub fn scale_about(&mut self, factors: Vector2, center: Vector2) -> &mut Self {
        let scaling = Transform::from_affine_3x3(
            factors.x,
            0.0,
            center.x * (1.0 - factors.x),
            0.0,
            factors.y,
            center.y * (1.0 - factors.y),
            0.0,
            0.0,
            1.0,
        );
        self.combine(&scaling)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Transform;

    /// `a * b` applies `b` first, then `a`.
    fn mul(mut self, rhs: Transform) -> Transform {
        self.combine(&rhs);
        self
    }
}

impl MulAssign for Transform {
    fn mul_assign(&mut self, rhs: Transform) {
        self.combine(&rhs);
    }
}
