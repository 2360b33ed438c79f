//! Camera: which part of the scene is visible and where it lands on the target.

use std::cell::Cell;

use crate::coords::{Rect, Vector2};
use crate::transform::{normalize_degrees, Transform};

/// 2D camera defined by a centered rectangle in scene space, a rotation and a
/// viewport.
///
/// The viewport is expressed as fractions of the render target's size
/// (`{0, 0, 1, 1}` covers the whole target). The projection transform maps
/// scene coordinates to clip space (`[-1, 1]`, +Y up) and is derived lazily,
/// like [`Transformable`](crate::transform::Transformable).
#[derive(Debug, Clone)]
pub struct View {
    center: Vector2,
    size: Vector2,
    /// Degrees, always in `[0, 360)`.
    rotation: f32,
    viewport: Rect,

    transform: Cell<Transform>,
    transform_dirty: Cell<bool>,
    inverse: Cell<Transform>,
    inverse_dirty: Cell<bool>,
}

impl View {
    /// Zero-sized view at the origin with a full-target viewport.
    ///
    /// Call [`reset`](Self::reset) or set a size before rendering with it.
    pub fn new() -> Self {
        Self {
            center: Vector2::zero(),
            size: Vector2::zero(),
            rotation: 0.0,
            viewport: Rect::new(0.0, 0.0, 1.0, 1.0),
            transform: Cell::new(Transform::IDENTITY),
            transform_dirty: Cell::new(true),
            inverse: Cell::new(Transform::IDENTITY),
            inverse_dirty: Cell::new(true),
        }
    }

    /// View looking exactly at `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        let mut view = Self::new();
        view.reset(rect);
        view
    }

    #[inline]
    fn invalidate(&mut self) {
        self.transform_dirty.set(true);
        self.inverse_dirty.set(true);
    }

    /// Points the view at `rect`: center at its centroid, size equal to its
    /// extents, rotation cleared. The viewport is left untouched.
    pub fn reset(&mut self, rect: Rect) {
        self.center = Vector2::new(rect.left + rect.width / 2.0, rect.top + rect.height / 2.0);
        self.size = rect.size();
        self.rotation = 0.0;
        self.invalidate();
    }

    pub fn set_center(&mut self, center: Vector2) {
        self.center = center;
        self.invalidate();
    }

    pub fn set_size(&mut self, size: Vector2) {
        self.size = size;
        self.invalidate();
    }

    pub fn set_rotation(&mut self, angle: f32) {
        self.rotation = normalize_degrees(angle);
        self.invalidate();
    }

    /// Viewport as fractions of the target size. Does not affect the projection.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    #[inline]
    pub fn center(&self) -> Vector2 {
        self.center
    }

    #[inline]
    pub fn size(&self) -> Vector2 {
        self.size
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    #[inline]
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn move_by(&mut self, offset: Vector2) {
        self.set_center(self.center + offset);
    }

    pub fn rotate(&mut self, angle: f32) {
        self.set_rotation(self.rotation + angle);
    }

    /// Scales the visible area; `factor > 1` shows more of the scene.
    pub fn zoom(&mut self, factor: f32) {
        self.set_size(self.size * factor);
    }

    /// Viewport in target pixels for a target of `target_size`.
    ///
    /// The half-pixel offset on the left/top edges is part of the contract.
    pub fn viewport_in_target_space(&self, target_size: Vector2) -> Rect {
        let (w, h) = (target_size.x, target_size.y);
        Rect::new(
            0.5 + w * self.viewport.left,
            0.5 + h * self.viewport.top,
            w * self.viewport.width,
            h * self.viewport.height,
        )
    }

    /// Projection transform (scene space to clip space).
    ///
    /// Unlike `Transformable`, the stored rotation is used without negation.
    pub fn transform(&self) -> Transform {
        if self.transform_dirty.get() {
            let (sine, cosine) = self.rotation.to_radians().sin_cos();
            let (cx, cy) = (self.center.x, self.center.y);
            let tx = -cx * cosine - cy * sine + cx;
            let ty = cx * sine - cy * cosine + cy;

            // Y is flipped: scene +Y is down, clip +Y is up.
            let a = 2.0 / self.size.x;
            let b = -2.0 / self.size.y;
            let c = -a * cx;
            let d = -b * cy;

            self.transform.set(Transform::from_affine_3x3(
                a * cosine,
                a * sine,
                a * tx + c,
                -b * sine,
                b * cosine,
                b * ty + d,
                0.0,
                0.0,
                1.0,
            ));
            self.transform_dirty.set(false);
        }

        self.transform.get()
    }

    /// Clip space back to scene space.
    pub fn inverse_transform(&self) -> Transform {
        if self.inverse_dirty.get() {
            self.inverse.set(self.transform().inverse());
            self.inverse_dirty.set(false);
        }

        self.inverse.get()
    }
}

impl Default for View {
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
    fn reset_centers_on_rect() {
        let view = View::from_rect(Rect::new(0.0, 0.0, 800.0, 600.0));
        assert_eq!(view.center(), Vector2::new(400.0, 300.0));
        assert_eq!(view.size(), Vector2::new(800.0, 600.0));
        assert_eq!(view.rotation(), 0.0);
    }

    #[test]
    fn reset_clears_rotation() {
        let mut view = View::new();
        view.set_rotation(45.0);
        view.reset(Rect::new(10.0, 10.0, 20.0, 20.0));
        assert_eq!(view.rotation(), 0.0);
        assert_eq!(view.center(), Vector2::new(20.0, 20.0));
    }

    #[test]
    fn default_viewport_in_target_space() {
        let view = View::from_rect(Rect::new(0.0, 0.0, 800.0, 600.0));
        assert_eq!(
            view.viewport_in_target_space(Vector2::new(800.0, 600.0)),
            Rect::new(0.5, 0.5, 800.0, 600.0)
        );
    }

    #[test]
    fn split_viewport_in_target_space() {
        let mut view = View::new();
        view.set_viewport(Rect::new(0.5, 0.0, 0.5, 0.5));
        assert_eq!(
            view.viewport_in_target_space(Vector2::new(800.0, 600.0)),
            Rect::new(400.5, 0.5, 400.0, 300.0)
        );
    }

    #[test]
    fn projection_flips_y() {
        let mut view = View::new();
        view.set_center(Vector2::zero());
        view.set_size(Vector2::new(2.0, 2.0));
        let t = view.transform();
        assert_eq!(t.transform_point(Vector2::new(1.0, 1.0)), Vector2::new(1.0, -1.0));
        assert_eq!(t.transform_point(Vector2::new(-1.0, -1.0)), Vector2::new(-1.0, 1.0));
    }

    #[test]
    fn projection_maps_rect_corners_to_clip_corners() {
        let view = View::from_rect(Rect::new(0.0, 0.0, 800.0, 600.0));
        let t = view.transform();
        assert!(approx_point(t.transform_point(Vector2::new(0.0, 0.0)), Vector2::new(-1.0, 1.0)));
        assert!(approx_point(
            t.transform_point(Vector2::new(800.0, 600.0)),
            Vector2::new(1.0, -1.0)
        ));
        assert!(approx_point(t.transform_point(Vector2::new(400.0, 300.0)), Vector2::zero()));
    }

    #[test]
    fn rotation_keeps_center_at_clip_origin() {
        let mut view = View::from_rect(Rect::new(100.0, 50.0, 200.0, 100.0));
        view.set_rotation(30.0);
        let t = view.transform();
        assert!(approx_point(t.transform_point(view.center()), Vector2::zero()));
    }

    #[test]
    fn rotation_uses_positive_angle() {
        let mut view = View::new();
        view.set_size(Vector2::new(2.0, 2.0));
        view.set_rotation(90.0);
        // With a = 1 and b = -1 the matrix is [0 1; 1 0].
        let p = view.transform().transform_point(Vector2::new(0.0, 1.0));
        assert!(approx_point(p, Vector2::new(1.0, 0.0)), "{p:?}");
    }

    #[test]
    fn rotation_is_normalized() {
        let mut view = View::new();
        view.set_rotation(360.0);
        assert_eq!(view.rotation(), 0.0);
        view.rotate(-10.0);
        assert_eq!(view.rotation(), 350.0);
    }

    #[test]
    fn zoom_scales_size_uniformly() {
        let mut view = View::from_rect(Rect::new(0.0, 0.0, 100.0, 50.0));
        view.zoom(2.0);
        assert_eq!(view.size(), Vector2::new(200.0, 100.0));
        assert_eq!(view.center(), Vector2::new(50.0, 25.0));
    }

    #[test]
    fn move_invalidates_projection() {
        let mut view = View::from_rect(Rect::new(0.0, 0.0, 2.0, 2.0));
        let before = view.transform();
        view.move_by(Vector2::new(1.0, 0.0));
        assert_ne!(before, view.transform());
        let origin = view.transform().transform_point(Vector2::new(2.0, 1.0));
        assert!(approx_point(origin, Vector2::zero()));
    }

    #[test]
    fn inverse_maps_clip_back_to_scene() {
        let mut view = View::from_rect(Rect::new(0.0, 0.0, 800.0, 600.0));
        view.set_rotation(12.0);
        let scene = Vector2::new(123.0, 456.0);
        let clip = view.transform().transform_point(scene);
        assert!(approx_point(view.inverse_transform().transform_point(clip), scene));
    }
}
