//! Coordinate and geometry value types shared by the transform algebra,
//! views and the render pipeline.
//!
//! Scene space:
//! - Origin top-left
//! - +X right, +Y down
//!
//! Views map scene space to clip space; render targets map clip space to
//! target pixels through the view's viewport.

mod color;
mod rect;
mod vector2;

pub use color::Color;
pub use rect::Rect;
pub use vector2::Vector2;
