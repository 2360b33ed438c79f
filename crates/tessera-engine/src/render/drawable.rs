use super::backend::GraphicsBackend;
use super::states::RenderStates;
use super::target::RenderTarget;

/// Something that knows how to submit itself to a render target.
pub trait Drawable {
    fn draw<B: GraphicsBackend>(&self, target: &mut RenderTarget<B>, states: RenderStates<'_>);
}
