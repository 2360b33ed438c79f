//! wgpu implementation of the render backend, plus device and surface setup.
//!
//! [`GpuContext`] owns the adapter, device, queue and window surface.
//! [`WgpuBackend`] implements [`GraphicsBackend`](crate::render::GraphicsBackend)
//! by emulating the fixed-function state in uniforms: each draw snapshots the
//! projection, model-view and texture matrices, blend pair, viewport and bound
//! texture. A frame's draws are then encoded into one render pass.

mod backend;
mod context;
mod frame;
mod init;
mod pipeline;
mod surface;
mod topology;
mod viewport;

pub use backend::WgpuBackend;
pub use context::{GpuContext, GpuFrame};
pub use init::{GpuInit, SurfaceErrorAction};
