//! Draw-call pipeline.
//!
//! Callers build vertex batches plus a [`RenderStates`] descriptor and hand
//! them to a [`RenderTarget`]. The target tracks what the backend already has
//! (blend pair, bound texture, model-view matrix, view) and only issues the
//! calls needed to bring it up to date before submitting the batch.
//!
//! Backends implement [`GraphicsBackend`], a fixed-function style capability
//! set. [`RecordingBackend`] keeps every call for inspection.

mod backend;
mod drawable;
mod recording;
mod states;
mod target;
mod vertex;

pub use backend::{BlendFactor, GraphicsBackend, MatrixMode, VertexSource};
pub use drawable::Drawable;
pub use recording::{BackendCall, RecordingBackend};
pub use states::{BlendMode, PrimitiveType, RenderStates};
pub use target::{RenderTarget, VERTEX_CACHE_SIZE};
pub use vertex::Vertex;
