use crate::coords::{Color, Vector2};
use crate::texture::Texture;

use super::states::PrimitiveType;
use super::vertex::Vertex;

/// Blend function operand.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
}

/// Matrix slot addressed by [`GraphicsBackend::load_matrix`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MatrixMode {
    ModelView,
    Projection,
    Texture,
}

/// Vertex data handed to [`GraphicsBackend::draw_primitives`].
#[derive(Debug, Copy, Clone)]
pub enum VertexSource<'a> {
    /// Caller vertices, positions still in model space.
    Immediate(&'a [Vertex]),
    /// Small batch already transformed on the host. The three slices have the
    /// same length.
    PreTransformed {
        positions: &'a [Vector2],
        colors: &'a [Color],
        tex_coords: &'a [Vector2],
    },
}

impl VertexSource<'_> {
    pub fn len(&self) -> usize {
        match self {
            VertexSource::Immediate(vertices) => vertices.len(),
            VertexSource::PreTransformed { positions, .. } => positions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_pre_transformed(&self) -> bool {
        matches!(self, VertexSource::PreTransformed { .. })
    }

    /// Reassembled vertex at `index`.
    pub fn vertex(&self, index: usize) -> Vertex {
        match self {
            VertexSource::Immediate(vertices) => vertices[index],
            VertexSource::PreTransformed { positions, colors, tex_coords } => {
                Vertex::new(positions[index], colors[index], tex_coords[index])
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Vertex> + '_ {
        (0..self.len()).map(move |i| self.vertex(i))
    }
}

/// Graphics API capability consumed by [`RenderTarget`](super::RenderTarget).
///
/// Calls are assumed to succeed; a backend that hits an unrecoverable device
/// error is expected to abort rather than report it here.
pub trait GraphicsBackend {
    /// One-time fixed state: depth test, lighting and face culling off,
    /// texturing and blending on.
    fn init_persistent_state(&mut self);

    fn clear(&mut self, color: Color);

    fn set_blend_function(&mut self, src: BlendFactor, dst: BlendFactor);

    /// Loads a column-major 4x4 matrix into the given slot.
    fn load_matrix(&mut self, mode: MatrixMode, matrix: &[f32; 16]);

    /// Viewport in target pixels, bottom-left origin.
    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// Binds `texture`, or unbinds when `None`.
    fn bind_texture(&mut self, texture: Option<&Texture>);

    fn draw_primitives(&mut self, primitive: PrimitiveType, vertices: VertexSource<'_>);
}
