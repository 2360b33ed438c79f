//! Textures as seen by the render pipeline: an opaque backend handle, a size
//! and a process-unique cache identity.
//!
//! Pixel upload is delegated to a [`TextureUploader`] (usually the graphics
//! backend).

mod error;
mod resource;

pub use error::TextureError;
pub use resource::{CoordinateType, Sampling, Texture, TextureHandle, TextureUploader};
