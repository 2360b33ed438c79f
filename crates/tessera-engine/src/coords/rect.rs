use super::Vector2;

/// Axis-aligned rectangle given by its top-left corner and signed extents.
///
/// Width and height may be negative. Queries compare the literal edges
/// (`left`, `left + width`, ...) and never normalize the extents first.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[inline]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    #[inline]
    pub const fn from_position_size(position: Vector2, size: Vector2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    #[inline]
    pub fn position(self) -> Vector2 {
        Vector2::new(self.left, self.top)
    }

    #[inline]
    pub fn size(self) -> Vector2 {
        Vector2::new(self.width, self.height)
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.top + self.height
    }

    /// Half-open containment: `[left, right) x [top, bottom)`.
    #[inline]
    pub fn contains(self, p: Vector2) -> bool {
        p.x >= self.left && p.x < self.right() && p.y >= self.top && p.y < self.bottom()
    }

    /// Inclusive overlap test. Rectangles that only share an edge intersect.
    #[inline]
    pub fn intersects_with(self, other: Rect) -> bool {
        self.left <= other.right()
            && self.right() >= other.left
            && self.top <= other.bottom()
            && self.bottom() >= other.top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::new(x, y, w, h)
    }

    // ── contains ──────────────────────────────────────────────────────────

    #[test]
    fn contains_interior_point() {
        assert!(r(0.0, 0.0, 10.0, 10.0).contains(Vector2::new(5.0, 5.0)));
    }

    #[test]
    fn contains_top_left_inclusive() {
        assert!(r(0.0, 0.0, 10.0, 10.0).contains(Vector2::new(0.0, 0.0)));
    }

    #[test]
    fn contains_bottom_right_exclusive() {
        assert!(!r(0.0, 0.0, 10.0, 10.0).contains(Vector2::new(10.0, 10.0)));
    }

    #[test]
    fn contains_nothing_with_negative_extent() {
        assert!(!r(10.0, 0.0, -4.0, 5.0).contains(Vector2::new(8.0, 1.0)));
    }

    // ── intersects_with ───────────────────────────────────────────────────

    #[test]
    fn intersects_overlapping() {
        assert!(r(0.0, 0.0, 10.0, 10.0).intersects_with(r(5.0, 5.0, 10.0, 10.0)));
    }

    #[test]
    fn intersects_touching_edge() {
        // Inclusive bounds: a shared edge counts as overlap.
        assert!(r(0.0, 0.0, 10.0, 10.0).intersects_with(r(10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn intersects_disjoint() {
        assert!(!r(0.0, 0.0, 5.0, 5.0).intersects_with(r(20.0, 20.0, 5.0, 5.0)));
    }

    #[test]
    fn intersects_uses_literal_signed_extents() {
        // Normalized, `a` would be [6, 10] and overlap `b`; the literal edges do not.
        let a = r(10.0, 0.0, -4.0, 5.0);
        let b = r(7.0, 0.0, 1.0, 5.0);
        assert!(!a.intersects_with(b));
    }

    #[test]
    fn intersects_is_symmetric() {
        let rects = [
            r(0.0, 0.0, 10.0, 10.0),
            r(5.0, 5.0, 10.0, 10.0),
            r(10.0, 0.0, 10.0, 10.0),
            r(20.0, 20.0, 5.0, 5.0),
            r(10.0, 0.0, -4.0, 5.0),
            r(7.0, 0.0, 1.0, 5.0),
            r(-3.0, -3.0, -2.0, 8.0),
            r(0.0, 0.0, 0.0, 0.0),
        ];
        for a in rects {
            for b in rects {
                assert_eq!(a.intersects_with(b), b.intersects_with(a), "{a:?} vs {b:?}");
            }
        }
    }
}
