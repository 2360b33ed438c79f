use winit::window::Window;

use crate::coords::Vector2;
use crate::gpu::WgpuBackend;
use crate::render::RenderTarget;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
pub struct FrameCtx<'a> {
    pub target: &'a mut RenderTarget<WgpuBackend>,
    pub window: &'a Window,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_> {
    /// Drawable size in physical pixels.
    #[inline]
    pub fn size(&self) -> Vector2 {
        self.target.size()
    }
}
