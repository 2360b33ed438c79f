use crate::coords::{Color, Vector2};

/// One drawable point: position, color and texture coordinates.
///
/// Texture coordinates are in texture pixels; the render target installs a
/// texture matrix that normalizes them.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vertex {
    pub position: Vector2,
    pub color: Color,
    pub tex_coords: Vector2,
}

impl Vertex {
    #[inline]
    pub const fn new(position: Vector2, color: Color, tex_coords: Vector2) -> Self {
        Self { position, color, tex_coords }
    }

    /// Untextured vertex.
    #[inline]
    pub const fn colored(position: Vector2, color: Color) -> Self {
        Self::new(position, color, Vector2::zero())
    }
}
