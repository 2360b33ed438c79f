use crate::texture::Texture;
use crate::transform::Transform;

use super::backend::BlendFactor;

/// How a drawn pixel is combined with the pixel already in the target.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlendMode {
    /// `src * src.a + dst * (1 - src.a)`
    #[default]
    Alpha,
    /// `src * src.a + dst`
    Add,
    /// `src * dst`
    Multiply,
    /// `src`
    None,
}

impl BlendMode {
    /// Source and destination factors for the backend blend function.
    pub const fn factors(self) -> (BlendFactor, BlendFactor) {
        match self {
            BlendMode::Alpha => (BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
            BlendMode::Add => (BlendFactor::SrcAlpha, BlendFactor::One),
            BlendMode::Multiply => (BlendFactor::DstColor, BlendFactor::Zero),
            BlendMode::None => (BlendFactor::One, BlendFactor::Zero),
        }
    }
}

/// How a vertex batch is assembled into primitives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PrimitiveType {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
    /// Independent quads, four vertices each.
    Quads,
}

/// Per-draw configuration: blend mode, model transform and texture.
///
/// The texture is borrowed, never owned.
#[derive(Debug, Copy, Clone, Default)]
pub struct RenderStates<'a> {
    pub blend_mode: BlendMode,
    pub transform: Transform,
    pub texture: Option<&'a Texture>,
}

impl RenderStates<'static> {
    /// Alpha blending, identity transform, no texture.
    pub const DEFAULT: Self = Self {
        blend_mode: BlendMode::Alpha,
        transform: Transform::IDENTITY,
        texture: None,
    };
}

impl<'a> RenderStates<'a> {
    #[inline]
    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    #[inline]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[inline]
    pub fn with_texture(mut self, texture: &'a Texture) -> Self {
        self.texture = Some(texture);
        self
    }
}
