use crate::coords::{Color, Rect, Vector2};
use crate::texture::{CoordinateType, Texture};
use crate::transform::Transform;
use crate::view::View;

use super::backend::{GraphicsBackend, MatrixMode, VertexSource};
use super::drawable::Drawable;
use super::states::{BlendMode, PrimitiveType, RenderStates};
use super::vertex::Vertex;

/// Largest batch that is transformed on the host instead of uploading its
/// model-view matrix.
pub const VERTEX_CACHE_SIZE: usize = 4;

/// What the backend currently holds, as last set by this target.
#[derive(Debug)]
struct StatesCache {
    /// Persistent backend state initialized.
    backend_ready: bool,
    /// View (viewport + projection) must be reapplied before the next draw.
    view_changed: bool,
    last_blend_mode: BlendMode,
    /// Cache identity of the bound texture; 0 when none.
    last_texture_id: u64,
    /// Previous draw went through the pre-transform cache, so the backend
    /// model-view matrix is identity.
    use_vertex_cache: bool,

    positions: [Vector2; VERTEX_CACHE_SIZE],
    colors: [Color; VERTEX_CACHE_SIZE],
    tex_coords: [Vector2; VERTEX_CACHE_SIZE],
}

impl Default for StatesCache {
    fn default() -> Self {
        Self {
            backend_ready: false,
            view_changed: false,
            last_blend_mode: BlendMode::Alpha,
            last_texture_id: 0,
            use_vertex_cache: false,
            positions: [Vector2::zero(); VERTEX_CACHE_SIZE],
            colors: [Color::TRANSPARENT; VERTEX_CACHE_SIZE],
            tex_coords: [Vector2::zero(); VERTEX_CACHE_SIZE],
        }
    }
}

/// Render pipeline bound to one backend and one pixel area.
///
/// Owns the active [`View`] (copied in by [`set_view`](Self::set_view)) and a
/// default view covering the whole target. Each [`render`](Self::render) call
/// applies only the state that differs from what the backend already holds.
///
/// Batches of up to [`VERTEX_CACHE_SIZE`] vertices are transformed on the host
/// and drawn with an identity model-view matrix (fast path); larger batches
/// are submitted untouched with the requested transform loaded (slow path).
pub struct RenderTarget<B> {
    backend: B,
    size: Vector2,
    view: View,
    default_view: View,
    cache: StatesCache,
}

impl<B: GraphicsBackend> RenderTarget<B> {
    /// Creates a target of `size` pixels. The active view starts as the
    /// default view.
    pub fn new(backend: B, size: Vector2) -> Self {
        let default_view = View::from_rect(Rect::new(0.0, 0.0, size.x, size.y));
        Self {
            backend,
            size,
            view: default_view.clone(),
            default_view,
            cache: StatesCache::default(),
        }
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn clear(&mut self, color: Color) {
        self.backend.clear(color);
    }

    /// Copies `view` in as the active view. Later changes to the caller's
    /// `view` have no effect until it is set again.
    pub fn set_view(&mut self, view: &View) {
        self.view = view.clone();
        self.cache.view_changed = true;
    }

    #[inline]
    pub fn view(&self) -> &View {
        &self.view
    }

    #[inline]
    pub fn default_view(&self) -> &View {
        &self.default_view
    }

    /// Resizes the target.
    ///
    /// Only the default view is re-pointed at the new area; the active view
    /// keeps its scene rectangle, but its viewport is recomputed in pixels on
    /// the next draw.
    pub fn set_size(&mut self, size: Vector2) {
        log::debug!("render target resized to {}x{}", size.x, size.y);
        self.size = size;
        self.default_view.reset(Rect::new(0.0, 0.0, size.x, size.y));
        self.cache.view_changed = true;
    }

    #[inline]
    pub fn size(&self) -> Vector2 {
        self.size
    }

    /// `view`'s viewport in this target's pixels (top-left origin).
    #[inline]
    pub fn viewport(&self, view: &View) -> Rect {
        view.viewport_in_target_space(self.size)
    }

    /// Converts a target pixel into scene coordinates seen through `view`.
    pub fn map_pixel_to_coords(&self, pixel: Vector2, view: &View) -> Vector2 {
        let vp = self.pixel_viewport(view);
        let normalized = Vector2::new(
            -1.0 + 2.0 * (pixel.x - vp.left) / vp.width,
            1.0 - 2.0 * (pixel.y - vp.top) / vp.height,
        );
        view.inverse_transform().transform_point(normalized)
    }

    /// Converts scene coordinates seen through `view` into a target pixel.
    pub fn map_coords_to_pixel(&self, point: Vector2, view: &View) -> Vector2 {
        let vp = self.pixel_viewport(view);
        let normalized = view.transform().transform_point(point);
        Vector2::new(
            (normalized.x + 1.0) / 2.0 * vp.width + vp.left,
            (1.0 - normalized.y) / 2.0 * vp.height + vp.top,
        )
    }

    // Viewport truncated to whole pixels, as handed to the backend.
    fn pixel_viewport(&self, view: &View) -> Rect {
        let vp = self.viewport(view);
        Rect::new(vp.left.trunc(), vp.top.trunc(), vp.width.trunc(), vp.height.trunc())
    }

    pub fn draw<D: Drawable>(&mut self, drawable: &D, states: RenderStates<'_>) {
        drawable.draw(self, states);
    }

    /// Submits `vertices` as `primitive` with `states` against the active view.
    ///
    /// An empty batch is a no-op and touches no backend state.
    pub fn render(
        &mut self,
        vertices: &[Vertex],
        primitive: PrimitiveType,
        states: &RenderStates<'_>,
    ) {
        if vertices.is_empty() {
            return;
        }

        if !self.cache.backend_ready {
            self.reset_states();
        }

        let use_vertex_cache = vertices.len() <= VERTEX_CACHE_SIZE;
        if use_vertex_cache {
            for (i, vertex) in vertices.iter().enumerate() {
                self.cache.positions[i] = states.transform.transform_point(vertex.position);
                self.cache.colors[i] = vertex.color;
                self.cache.tex_coords[i] = vertex.tex_coords;
            }

            // Already in scene space; the backend only needs identity, and it
            // still has it if the previous draw was pre-transformed too.
            if !self.cache.use_vertex_cache {
                self.apply_transform(&Transform::IDENTITY);
            }
        } else {
            self.apply_transform(&states.transform);
        }

        if self.cache.view_changed {
            self.apply_current_view();
        }

        if states.blend_mode != self.cache.last_blend_mode {
            self.apply_blend_mode(states.blend_mode);
        }

        let texture_id = states.texture.map_or(0, Texture::cache_id);
        if texture_id != self.cache.last_texture_id {
            self.apply_texture(states.texture);
        }

        let count = vertices.len();
        let source = if use_vertex_cache {
            VertexSource::PreTransformed {
                positions: &self.cache.positions[..count],
                colors: &self.cache.colors[..count],
                tex_coords: &self.cache.tex_coords[..count],
            }
        } else {
            VertexSource::Immediate(vertices)
        };
        self.backend.draw_primitives(primitive, source);

        self.cache.use_vertex_cache = use_vertex_cache;
    }

    /// Initializes persistent backend state and reapplies every cached state
    /// (alpha blending, identity transform, no texture, active view).
    ///
    /// Runs automatically before the first draw; call it again if something
    /// else touched the backend in between.
    pub fn reset_states(&mut self) {
        log::debug!("initializing backend render states");

        self.backend.init_persistent_state();
        self.cache.backend_ready = true;

        self.apply_blend_mode(BlendMode::Alpha);
        self.apply_transform(&Transform::IDENTITY);
        self.apply_texture(None);
        self.cache.use_vertex_cache = false;

        self.cache.view_changed = true;
    }

    fn apply_current_view(&mut self) {
        let viewport = self.viewport(&self.view);
        // Backend viewports have a bottom-left origin.
        let top = self.size.y - (viewport.top + viewport.height);
        self.backend.set_viewport(
            viewport.left as i32,
            top as i32,
            viewport.width as i32,
            viewport.height as i32,
        );
        self.backend.load_matrix(MatrixMode::Projection, self.view.transform().matrix());
        log::trace!("view applied: viewport {:?}", viewport);

        self.cache.view_changed = false;
    }

    fn apply_blend_mode(&mut self, mode: BlendMode) {
        let (src, dst) = mode.factors();
        self.backend.set_blend_function(src, dst);
        log::trace!("blend mode {:?}", mode);

        self.cache.last_blend_mode = mode;
    }

    fn apply_transform(&mut self, transform: &Transform) {
        self.backend.load_matrix(MatrixMode::ModelView, transform.matrix());
    }

    fn apply_texture(&mut self, texture: Option<&Texture>) {
        self.backend.bind_texture(texture);
        let matrix = match texture {
            Some(texture) => texture.coordinate_matrix(CoordinateType::Pixels),
            None => *Transform::IDENTITY.matrix(),
        };
        self.backend.load_matrix(MatrixMode::Texture, &matrix);
        log::trace!("texture bound: {:?}", texture.map(Texture::handle));

        self.cache.last_texture_id = texture.map_or(0, Texture::cache_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{BackendCall, BlendFactor, RecordingBackend};
    use crate::texture::TextureHandle;

    fn target() -> RenderTarget<RecordingBackend> {
        RenderTarget::new(RecordingBackend::new(), Vector2::new(800.0, 600.0))
    }

    fn batch(n: usize) -> Vec<Vertex> {
        (0..n)
            .map(|i| Vertex::colored(Vector2::new(i as f32, 2.0 * i as f32), Color::WHITE))
            .collect()
    }

    fn translated(x: f32, y: f32) -> Transform {
        let mut t = Transform::identity();
        t.translate_xy(x, y);
        t
    }

    fn model_view_loads(calls: &[BackendCall]) -> Vec<[f32; 16]> {
        calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::LoadMatrix(MatrixMode::ModelView, m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    fn count(calls: &[BackendCall], pred: impl Fn(&BackendCall) -> bool) -> usize {
        calls.iter().filter(|c| pred(c)).count()
    }

    fn texture(id: u64) -> Texture {
        Texture::from_handle(TextureHandle(id), Vector2::new(16.0, 16.0), false)
    }

    // ── no-op and first draw ──────────────────────────────────────────────

    #[test]
    fn empty_batch_issues_no_calls() {
        let mut t = target();
        t.render(&[], PrimitiveType::Triangles, &RenderStates::DEFAULT);
        assert!(t.backend().calls().is_empty());
    }

    #[test]
    fn first_draw_initializes_once() {
        let mut t = target();
        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT);
        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT);

        let calls = t.backend().calls();
        assert_eq!(count(calls, |c| matches!(c, BackendCall::InitPersistentState)), 1);
        assert_eq!(calls[0], BackendCall::InitPersistentState);
        assert_eq!(
            calls[1],
            BackendCall::SetBlendFunction(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)
        );
        assert_eq!(count(calls, |c| matches!(c, BackendCall::DrawPrimitives { .. })), 2);
    }

    #[test]
    fn first_draw_applies_default_view() {
        let mut t = target();
        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT);

        let calls = t.backend().calls();
        assert!(calls.contains(&BackendCall::SetViewport { x: 0, y: 0, width: 800, height: 600 }));
        let projection = *t.default_view().transform().matrix();
        assert!(calls.contains(&BackendCall::LoadMatrix(MatrixMode::Projection, projection)));
    }

    #[test]
    fn draw_is_last_call() {
        let mut t = target();
        t.render(&batch(2), PrimitiveType::Lines, &RenderStates::DEFAULT);
        assert!(matches!(
            t.backend().calls().last(),
            Some(BackendCall::DrawPrimitives { primitive: PrimitiveType::Lines, .. })
        ));
    }

    // ── fast path / slow path ─────────────────────────────────────────────

    #[test]
    fn four_vertices_are_pre_transformed() {
        let mut t = target();
        let states = RenderStates::DEFAULT.with_transform(translated(10.0, 20.0));
        let vertices = batch(4);
        t.render(&vertices, PrimitiveType::Quads, &states);

        let Some(BackendCall::DrawPrimitives { pre_transformed, vertices: sent, .. }) =
            t.backend().calls().last()
        else {
            panic!("expected a draw call");
        };
        assert!(*pre_transformed);
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[3].position, Vector2::new(13.0, 26.0));
        assert_eq!(sent[3].color, Color::WHITE);

        // Only identity is ever loaded as model-view on the fast path.
        for m in model_view_loads(t.backend().calls()) {
            assert_eq!(m, *Transform::IDENTITY.matrix());
        }
    }

    #[test]
    fn five_vertices_load_the_transform() {
        let mut t = target();
        let transform = translated(10.0, 20.0);
        let vertices = batch(5);
        let states = RenderStates::DEFAULT.with_transform(transform);
        t.render(&vertices, PrimitiveType::TriangleFan, &states);

        let calls = t.backend().calls();
        let Some(BackendCall::DrawPrimitives { pre_transformed, vertices: sent, .. }) = calls.last()
        else {
            panic!("expected a draw call");
        };
        assert!(!*pre_transformed);
        assert_eq!(sent, &vertices);
        assert_eq!(model_view_loads(calls).last(), Some(transform.matrix()));
    }

    #[test]
    fn repeated_fast_path_loads_identity_once() {
        let mut t = target();
        t.render(&batch(5), PrimitiveType::Points, &RenderStates::DEFAULT);
        t.backend_mut().take_calls();

        t.render(&batch(4), PrimitiveType::Points, &RenderStates::DEFAULT);
        assert_eq!(
            model_view_loads(&t.backend_mut().take_calls()),
            vec![*Transform::IDENTITY.matrix()]
        );

        let moved = RenderStates::DEFAULT.with_transform(translated(1.0, 1.0));
        t.render(&batch(4), PrimitiveType::Points, &moved);
        t.render(&batch(1), PrimitiveType::Points, &RenderStates::DEFAULT);
        assert!(model_view_loads(&t.backend_mut().take_calls()).is_empty());
    }

    #[test]
    fn slow_path_loads_transform_every_draw() {
        let mut t = target();
        t.render(&batch(4), PrimitiveType::Points, &RenderStates::DEFAULT);
        t.backend_mut().take_calls();

        let a = translated(1.0, 0.0);
        let b = translated(2.0, 0.0);
        t.render(&batch(5), PrimitiveType::Points, &RenderStates::DEFAULT.with_transform(a));
        t.render(&batch(6), PrimitiveType::Points, &RenderStates::DEFAULT.with_transform(b));
        assert_eq!(model_view_loads(t.backend().calls()), vec![*a.matrix(), *b.matrix()]);
    }

    #[test]
    fn switching_back_to_fast_path_reloads_identity() {
        let mut t = target();
        t.render(&batch(4), PrimitiveType::Points, &RenderStates::DEFAULT);
        let moved = RenderStates::DEFAULT.with_transform(translated(3.0, 3.0));
        t.render(&batch(5), PrimitiveType::Points, &moved);
        t.backend_mut().take_calls();

        t.render(&batch(4), PrimitiveType::Points, &RenderStates::DEFAULT);
        assert_eq!(model_view_loads(t.backend().calls()), vec![*Transform::IDENTITY.matrix()]);
    }

    // ── blend mode ────────────────────────────────────────────────────────

    #[test]
    fn blend_mode_applied_only_on_change() {
        let mut t = target();
        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT);
        t.backend_mut().take_calls();

        let add = RenderStates::DEFAULT.with_blend_mode(BlendMode::Add);
        t.render(&batch(3), PrimitiveType::Triangles, &add);
        t.render(&batch(3), PrimitiveType::Triangles, &add);
        let opaque = RenderStates::DEFAULT.with_blend_mode(BlendMode::None);
        t.render(&batch(3), PrimitiveType::Triangles, &opaque);

        let blends: Vec<_> = t
            .backend()
            .calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::SetBlendFunction(..)))
            .cloned()
            .collect();
        assert_eq!(
            blends,
            vec![
                BackendCall::SetBlendFunction(BlendFactor::SrcAlpha, BlendFactor::One),
                BackendCall::SetBlendFunction(BlendFactor::One, BlendFactor::Zero),
            ]
        );
    }

    // ── textures ──────────────────────────────────────────────────────────

    #[test]
    fn same_texture_twice_binds_once() {
        let tex = texture(3);
        let mut t = target();
        let states = RenderStates::DEFAULT.with_texture(&tex);
        t.render(&batch(4), PrimitiveType::Quads, &states);
        t.render(&batch(4), PrimitiveType::Quads, &states);

        let binds: Vec<_> = t
            .backend()
            .calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::BindTexture(Some(_))))
            .collect();
        assert_eq!(binds, vec![&BackendCall::BindTexture(Some(TextureHandle(3)))]);
    }

    #[test]
    fn texture_bind_loads_pixel_matrix() {
        let tex = texture(9);
        let mut t = target();
        t.render(&batch(4), PrimitiveType::Quads, &RenderStates::DEFAULT.with_texture(&tex));

        let calls = t.backend().calls();
        let bind = calls
            .iter()
            .position(|c| *c == BackendCall::BindTexture(Some(TextureHandle(9))))
            .expect("texture bound");
        assert_eq!(
            calls[bind + 1],
            BackendCall::LoadMatrix(
                MatrixMode::Texture,
                tex.coordinate_matrix(CoordinateType::Pixels)
            )
        );
    }

    #[test]
    fn switching_textures_and_back_to_none() {
        let a = texture(1);
        let b = texture(2);
        let mut t = target();
        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT);
        t.backend_mut().take_calls();

        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT.with_texture(&a));
        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT.with_texture(&b));
        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT);
        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT);

        let binds: Vec<_> = t
            .backend()
            .calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::BindTexture(_)))
            .cloned()
            .collect();
        assert_eq!(
            binds,
            vec![
                BackendCall::BindTexture(Some(TextureHandle(1))),
                BackendCall::BindTexture(Some(TextureHandle(2))),
                BackendCall::BindTexture(None),
            ]
        );
        assert!(t.backend().calls().contains(&BackendCall::LoadMatrix(
            MatrixMode::Texture,
            *Transform::IDENTITY.matrix()
        )));
    }

    // ── views ─────────────────────────────────────────────────────────────

    #[test]
    fn view_applied_only_after_change() {
        let mut t = target();
        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT);
        t.backend_mut().take_calls();

        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT);
        assert_eq!(count(t.backend().calls(), |c| matches!(c, BackendCall::SetViewport { .. })), 0);

        let mut view = View::from_rect(Rect::new(0.0, 0.0, 400.0, 300.0));
        view.set_viewport(Rect::new(0.5, 0.5, 0.5, 0.5));
        t.set_view(&view);
        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT);
        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT);

        let calls = t.backend().calls();
        let viewports: Vec<_> =
            calls.iter().filter(|c| matches!(c, BackendCall::SetViewport { .. })).collect();
        // left = 400.5, top = 300.5 -> bottom-left y = 600 - 600.5 = -0.5.
        assert_eq!(
            viewports,
            vec![&BackendCall::SetViewport { x: 400, y: 0, width: 400, height: 300 }]
        );
        let projection = *view.transform().matrix();
        assert!(calls.contains(&BackendCall::LoadMatrix(MatrixMode::Projection, projection)));
    }

    #[test]
    fn set_view_copies_the_view() {
        let mut t = target();
        let mut view = View::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        t.set_view(&view);
        view.move_by(Vector2::new(50.0, 50.0));
        assert_eq!(t.view().center(), Vector2::new(50.0, 50.0));
    }

    #[test]
    fn resize_resets_default_view_only() {
        let mut t = target();
        let custom = View::from_rect(Rect::new(10.0, 10.0, 20.0, 20.0));
        t.set_view(&custom);
        t.set_size(Vector2::new(1024.0, 768.0));

        assert_eq!(t.size(), Vector2::new(1024.0, 768.0));
        assert_eq!(t.default_view().center(), Vector2::new(512.0, 384.0));
        assert_eq!(t.default_view().size(), Vector2::new(1024.0, 768.0));
        assert_eq!(t.view().center(), Vector2::new(20.0, 20.0));

        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT);
        assert!(t
            .backend()
            .calls()
            .contains(&BackendCall::SetViewport { x: 0, y: 0, width: 1024, height: 768 }));
    }

    #[test]
    fn viewport_in_target_space() {
        let t = target();
        assert_eq!(t.viewport(t.default_view()), Rect::new(0.5, 0.5, 800.0, 600.0));
    }

    #[test]
    fn pixel_coordinate_mapping_round_trips() {
        let t = target();
        let view = t.default_view().clone();
        let coords = t.map_pixel_to_coords(Vector2::new(0.0, 0.0), &view);
        assert!(coords.x.abs() < 1e-3 && coords.y.abs() < 1e-3, "{coords:?}");

        let mut zoomed = view.clone();
        zoomed.zoom(0.5);
        let pixel = Vector2::new(200.0, 150.0);
        let scene = t.map_pixel_to_coords(pixel, &zoomed);
        assert!((scene.x - 300.0).abs() < 1e-3 && (scene.y - 225.0).abs() < 1e-3, "{scene:?}");
        let back = t.map_coords_to_pixel(scene, &zoomed);
        assert!((back.x - pixel.x).abs() < 1e-3 && (back.y - pixel.y).abs() < 1e-3, "{back:?}");
    }

    // ── misc ──────────────────────────────────────────────────────────────

    #[test]
    fn clear_forwards_color() {
        let mut t = target();
        t.clear(Color::BLUE);
        assert_eq!(t.backend().calls(), &[BackendCall::Clear(Color::BLUE)]);
    }

    #[test]
    fn reset_states_reapplies_everything() {
        let tex = texture(5);
        let mut t = target();
        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT.with_texture(&tex));
        t.reset_states();
        t.backend_mut().take_calls();

        // The texture was unbound by the reset, so it must be bound again.
        t.render(&batch(3), PrimitiveType::Triangles, &RenderStates::DEFAULT.with_texture(&tex));
        let calls = t.backend().calls();
        assert!(calls.contains(&BackendCall::BindTexture(Some(TextureHandle(5)))));
        assert_eq!(count(calls, |c| matches!(c, BackendCall::SetViewport { .. })), 1);
    }
}
