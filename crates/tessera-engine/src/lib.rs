//! Tessera: a small 2D rendering engine.
//!
//! Geometry ([`coords`], [`transform`]), cameras ([`view`]) and textures
//! ([`texture`]) feed a state-caching draw pipeline ([`render`]) that talks to
//! a fixed-function style backend. [`gpu`] provides that backend on wgpu and
//! [`window`] runs it inside a winit window.

pub mod coords;
pub mod transform;
pub mod view;

pub mod render;
pub mod sprite;
pub mod texture;

pub mod core;
pub mod gpu;
pub mod logging;
pub mod time;
pub mod window;
