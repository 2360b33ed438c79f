//! Textured quad drawable.

use crate::coords::{Color, Rect, Vector2};
use crate::render::{Drawable, GraphicsBackend, PrimitiveType, RenderStates, RenderTarget, Vertex};
use crate::texture::Texture;
use crate::transform::Transformable;

/// A rectangle of a texture drawn as one quad.
///
/// Local geometry spans `(0, 0)..(rect.width, rect.height)`; placement comes
/// from the sprite's [`Transformable`], reachable through
/// [`transformable`](Self::transformable) and
/// [`transformable_mut`](Self::transformable_mut).
#[derive(Debug, Clone)]
pub struct Sprite<'a> {
    texture: Option<&'a Texture>,
    texture_rect: Rect,
    vertices: [Vertex; 4],
    transformable: Transformable,
}

impl<'a> Sprite<'a> {
    /// Sprite showing all of `texture`, tinted white.
    pub fn new(texture: &'a Texture) -> Self {
        let mut sprite = Self::empty();
        sprite.set_texture(texture);
        sprite
    }

    /// Untextured sprite with an empty rectangle.
    pub fn empty() -> Self {
        Self {
            texture: None,
            texture_rect: Rect::default(),
            vertices: [Vertex::colored(Vector2::zero(), Color::WHITE); 4],
            transformable: Transformable::new(),
        }
    }

    /// Switches to `texture` and resets the source rectangle to cover it.
    pub fn set_texture(&mut self, texture: &'a Texture) {
        let size = texture.size();
        self.set_texture_rect(Rect::new(0.0, 0.0, size.x, size.y));
        self.texture = Some(texture);
    }

    #[inline]
    pub fn texture(&self) -> Option<&'a Texture> {
        self.texture
    }

    /// Selects the sub-rectangle of the texture to display, in pixels.
    ///
    /// Geometry is rebuilt only when `rect` differs from the current one.
    pub fn set_texture_rect(&mut self, rect: Rect) {
        if rect == self.texture_rect {
            return;
        }
        self.texture_rect = rect;
        self.update_positions();
        self.update_tex_coords();
    }

    #[inline]
    pub fn texture_rect(&self) -> Rect {
        self.texture_rect
    }

    pub fn set_color(&mut self, color: Color) {
        for vertex in &mut self.vertices {
            vertex.color = color;
        }
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.vertices[0].color
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex; 4] {
        &self.vertices
    }

    #[inline]
    pub fn transformable(&self) -> &Transformable {
        &self.transformable
    }

    #[inline]
    pub fn transformable_mut(&mut self) -> &mut Transformable {
        &mut self.transformable
    }

    /// Bounds in the sprite's own coordinate space.
    pub fn local_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.texture_rect.width.abs(), self.texture_rect.height.abs())
    }

    /// Bounds after applying the sprite's transform.
    pub fn global_bounds(&self) -> Rect {
        self.transformable.transform().transform_rect(self.local_bounds())
    }

    fn update_positions(&mut self) {
        let Rect { width, height, .. } = self.texture_rect;
        self.vertices[0].position = Vector2::new(0.0, 0.0);
        self.vertices[1].position = Vector2::new(0.0, height);
        self.vertices[2].position = Vector2::new(width, height);
        self.vertices[3].position = Vector2::new(width, 0.0);
    }

    fn update_tex_coords(&mut self) {
        let rect = self.texture_rect;
        let (left, right) = (rect.left, rect.right());
        let (top, bottom) = (rect.top, rect.bottom());
        self.vertices[0].tex_coords = Vector2::new(left, top);
        self.vertices[1].tex_coords = Vector2::new(left, bottom);
        self.vertices[2].tex_coords = Vector2::new(right, bottom);
        self.vertices[3].tex_coords = Vector2::new(right, top);
    }
}

impl Default for Sprite<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

impl Drawable for Sprite<'_> {
    fn draw<B: GraphicsBackend>(&self, target: &mut RenderTarget<B>, states: RenderStates<'_>) {
        // The sprite's texture may be borrowed for less time than the caller's states.
        let mut states = RenderStates { texture: self.texture, ..states };
        states.transform.combine(&self.transformable.transform());
        target.render(&self.vertices, PrimitiveType::Quads, &states);
    }
}
