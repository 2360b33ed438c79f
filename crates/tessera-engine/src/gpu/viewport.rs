//! Viewport handling for the wgpu backend.
//!
//! wgpu viewports must lie inside the render target, while a view may project
//! partly (or entirely) off-screen. The backend therefore renders with the
//! full surface as viewport, folds the requested viewport into clip space and
//! clips to its visible part with a scissor rectangle.

use crate::transform::Transform;

/// Viewport as received from the render target: pixels, bottom-left origin.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct PixelViewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Top-left origin scissor rectangle, inside the surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct ViewportMapping {
    /// Maps the viewport's clip space onto the surface's clip space.
    pub clip_adjust: Transform,
    pub scissor: ScissorRect,
}

/// Resolves `viewport` against a surface of `surface` pixels.
///
/// `None` as input means the whole surface. Returns `None` when nothing of the
/// viewport is visible.
pub(crate) fn map_viewport(
    viewport: Option<PixelViewport>,
    surface: (u32, u32),
) -> Option<ViewportMapping> {
    let (sw, sh) = (i64::from(surface.0), i64::from(surface.1));
    let vp = viewport.unwrap_or(PixelViewport {
        x: 0,
        y: 0,
        width: surface.0 as i32,
        height: surface.1 as i32,
    });
    if sw == 0 || sh == 0 || vp.width <= 0 || vp.height <= 0 {
        return None;
    }

    let (x, w, h) = (i64::from(vp.x), i64::from(vp.width), i64::from(vp.height));
    let top = sh - (i64::from(vp.y) + h);

    let x0 = x.clamp(0, sw);
    let x1 = (x + w).clamp(0, sw);
    let y0 = top.clamp(0, sh);
    let y1 = (top + h).clamp(0, sh);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    let (swf, shf) = (sw as f32, sh as f32);
    let (xf, topf, wf, hf) = (x as f32, top as f32, w as f32, h as f32);
    let clip_adjust = Transform::from_affine_3x3(
        wf / swf, 0.0, (2.0 * xf + wf) / swf - 1.0, //
        0.0, hf / shf, 1.0 - (2.0 * topf + hf) / shf, //
        0.0, 0.0, 1.0,
    );

    Some(ViewportMapping {
        clip_adjust,
        scissor: ScissorRect {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vector2;

    const EPS: f32 = 1e-5;

    fn vp(x: i32, y: i32, width: i32, height: i32) -> Option<PixelViewport> {
        Some(PixelViewport { x, y, width, height })
    }

    fn close(a: Vector2, b: Vector2) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn full_surface_is_identity() {
        let m = map_viewport(vp(0, 0, 800, 600), (800, 600)).unwrap();
        assert_eq!(m.scissor, ScissorRect { x: 0, y: 0, width: 800, height: 600 });
        assert!(close(m.clip_adjust.transform_point_xy(0.3, -0.7), Vector2::new(0.3, -0.7)));

        assert_eq!(map_viewport(None, (800, 600)), Some(m));
    }

    #[test]
    fn bottom_left_quadrant_flips_to_top_left_origin() {
        let m = map_viewport(vp(0, 0, 400, 300), (800, 600)).unwrap();
        assert_eq!(m.scissor, ScissorRect { x: 0, y: 300, width: 400, height: 300 });
        assert!(close(m.clip_adjust.transform_point_xy(-1.0, -1.0), Vector2::new(-1.0, -1.0)));
        assert!(close(m.clip_adjust.transform_point_xy(1.0, 1.0), Vector2::new(0.0, 0.0)));
    }

    #[test]
    fn partly_off_screen_is_clipped() {
        let m = map_viewport(vp(-100, 0, 400, 600), (800, 600)).unwrap();
        assert_eq!(m.scissor, ScissorRect { x: 0, y: 0, width: 300, height: 600 });
        // The left clip edge stays 100 px off-screen.
        assert!(close(m.clip_adjust.transform_point_xy(-1.0, 0.0), Vector2::new(-1.25, 0.0)));
    }

    #[test]
    fn invisible_viewports_are_skipped() {
        assert_eq!(map_viewport(vp(900, 0, 100, 100), (800, 600)), None);
        assert_eq!(map_viewport(vp(0, 0, 0, 100), (800, 600)), None);
        assert_eq!(map_viewport(None, (0, 0)), None);
    }
}
