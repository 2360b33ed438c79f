use std::cell::Cell;

use crate::coords::Vector2;

use super::{normalize_degrees, Transform};

/// Position, rotation, scale and origin of a scene object.
///
/// The model transform and its inverse are derived lazily: mutators only set
/// the dirty flags, and the matrices are rebuilt on the next read. Each cache
/// has its own flag so reading the forward transform does not pay for an
/// inversion.
#[derive(Debug, Clone)]
pub struct Transformable {
    origin: Vector2,
    position: Vector2,
    /// Degrees, always in `[0, 360)`.
    rotation: f32,
    scale: Vector2,

    transform: Cell<Transform>,
    transform_dirty: Cell<bool>,
    inverse: Cell<Transform>,
    inverse_dirty: Cell<bool>,
}

impl Transformable {
    pub fn new() -> Self {
        Self {
            origin: Vector2::zero(),
            position: Vector2::zero(),
            rotation: 0.0,
            scale: Vector2::splat(1.0),
            transform: Cell::new(Transform::IDENTITY),
            transform_dirty: Cell::new(true),
            inverse: Cell::new(Transform::IDENTITY),
            inverse_dirty: Cell::new(true),
        }
    }

    #[inline]
    fn invalidate(&mut self) {
        self.transform_dirty.set(true);
        self.inverse_dirty.set(true);
    }

    pub fn set_position(&mut self, position: Vector2) {
        self.position = position;
        self.invalidate();
    }

    #[inline]
    pub fn set_position_xy(&mut self, x: f32, y: f32) {
        self.set_position(Vector2::new(x, y));
    }

    /// Sets the rotation in degrees, folded into `[0, 360)`.
    pub fn set_rotation(&mut self, angle: f32) {
        self.rotation = normalize_degrees(angle);
        self.invalidate();
    }

    pub fn set_scale(&mut self, factors: Vector2) {
        self.scale = factors;
        self.invalidate();
    }

    #[inline]
    pub fn set_scale_xy(&mut self, x: f32, y: f32) {
        self.set_scale(Vector2::new(x, y));
    }

    /// Sets the local point that position, rotation and scale are relative to.
    pub fn set_origin(&mut self, origin: Vector2) {
        self.origin = origin;
        self.invalidate();
    }

    #[inline]
    pub fn set_origin_xy(&mut self, x: f32, y: f32) {
        self.set_origin(Vector2::new(x, y));
    }

    #[inline]
    pub fn position(&self) -> Vector2 {
        self.position
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    #[inline]
    pub fn scale(&self) -> Vector2 {
        self.scale
    }

    #[inline]
    pub fn origin(&self) -> Vector2 {
        self.origin
    }

    pub fn move_by(&mut self, offset: Vector2) {
        self.set_position(self.position + offset);
    }

    pub fn rotate(&mut self, angle: f32) {
        self.set_rotation(self.rotation + angle);
    }

    /// Multiplies the current scale component-wise.
    pub fn scale_by(&mut self, factors: Vector2) {
        self.set_scale(Vector2::new(self.scale.x * factors.x, self.scale.y * factors.y));
    }

    /// Model transform: scale and rotate around `origin`, then place `origin`
    /// at `position`.
    pub fn transform(&self) -> Transform {
        if self.transform_dirty.get() {
            let (sine, cosine) = (-self.rotation).to_radians().sin_cos();
            let sxc = self.scale.x * cosine;
            let syc = self.scale.y * cosine;
            let sxs = self.scale.x * sine;
            let sys = self.scale.y * sine;
            let tx = -self.origin.x * sxc - self.origin.y * sys + self.position.x;
            let ty = self.origin.x * sxs - self.origin.y * syc + self.position.y;

            self.transform.set(Transform::from_affine_3x3(
                sxc, sys, tx, //
                -sxs, syc, ty, //
                0.0, 0.0, 1.0,
            ));
            self.transform_dirty.set(false);
        }

        self.transform.get()
    }

    pub fn inverse_transform(&self) -> Transform {
        if self.inverse_dirty.get() {
            self.inverse.set(self.transform().inverse());
            self.inverse_dirty.set(false);
        }

        self.inverse.get()
    }
}

impl Default for Transformable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn approx_point(a: Vector2, b: Vector2) -> bool {
        (a.x - b.x).abs() <= EPS && (a.y - b.y).abs() <= EPS
    }

    #[test]
    fn new_is_identity() {
        assert_eq!(Transformable::new().transform(), Transform::IDENTITY);
    }

    #[test]
    fn rotation_is_normalized() {
        let mut t = Transformable::new();
        t.set_rotation(360.0);
        assert_eq!(t.rotation(), 0.0);
        t.set_rotation(-10.0);
        assert_eq!(t.rotation(), 350.0);
        t.rotate(20.0);
        assert_eq!(t.rotation(), 10.0);
    }

    #[test]
    fn origin_lands_on_position() {
        let mut t = Transformable::new();
        t.set_origin_xy(8.0, 8.0);
        t.set_position_xy(100.0, 50.0);
        t.set_rotation(73.0);
        t.set_scale_xy(2.0, 3.0);
        assert!(approx_point(
            t.transform().transform_point(Vector2::new(8.0, 8.0)),
            Vector2::new(100.0, 50.0)
        ));
    }

    #[test]
    fn translation_and_scale() {
        let mut t = Transformable::new();
        t.set_position_xy(10.0, 20.0);
        t.set_scale_xy(2.0, 4.0);
        assert_eq!(
            t.transform().transform_point(Vector2::new(1.0, 1.0)),
            Vector2::new(12.0, 24.0)
        );
    }

    #[test]
    fn rotation_matches_negated_matrix_convention() {
        // The model transform negates the stored angle before building the matrix.
        let mut t = Transformable::new();
        t.set_rotation(90.0);
        let p = t.transform().transform_point(Vector2::new(1.0, 0.0));
        assert!(approx_point(p, Vector2::new(0.0, 1.0)), "{p:?}");
    }

    #[test]
    fn cache_refreshes_after_mutation() {
        let mut t = Transformable::new();
        let before = t.transform();
        t.move_by(Vector2::new(5.0, 0.0));
        let after = t.transform();
        assert_ne!(before, after);
        assert_eq!(after.transform_point(Vector2::zero()), Vector2::new(5.0, 0.0));

        t.scale_by(Vector2::new(2.0, 2.0));
        assert_eq!(t.scale(), Vector2::new(2.0, 2.0));
        assert_eq!(t.transform().transform_point(Vector2::new(1.0, 0.0)), Vector2::new(7.0, 0.0));
    }

    #[test]
    fn inverse_round_trips_points() {
        let mut t = Transformable::new();
        t.set_origin_xy(4.0, 2.0);
        t.set_position_xy(-30.0, 12.0);
        t.set_rotation(215.0);
        t.set_scale_xy(1.5, 0.75);

        let p = Vector2::new(3.0, -9.0);
        let q = t.inverse_transform().transform_point(t.transform().transform_point(p));
        assert!(approx_point(p, q), "{q:?}");
    }

    #[test]
    fn inverse_cache_follows_mutation() {
        let mut t = Transformable::new();
        t.set_position_xy(1.0, 1.0);
        let first = t.inverse_transform();
        t.set_position_xy(2.0, 2.0);
        assert_ne!(first, t.inverse_transform());
        assert_eq!(t.inverse_transform().transform_point(Vector2::new(2.0, 2.0)), Vector2::zero());
    }
}
