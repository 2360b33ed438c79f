use winit::event::WindowEvent;

use crate::gpu::WgpuBackend;
use crate::render::RenderTarget;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application driven by [`Runtime`](crate::window::Runtime).
pub trait App {
    /// Called once the window and GPU are up, before the first frame.
    ///
    /// Upload textures here through `target.backend_mut()`. An error stops the
    /// runtime.
    fn on_init(&mut self, target: &mut RenderTarget<WgpuBackend>) -> anyhow::Result<()> {
        let _ = target;
        Ok(())
    }

    /// Raw window events, before the runtime handles them.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per redraw. The target has already been cleared to the
    /// configured colour; everything drawn is presented when this returns.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;
}
