//! Timing utilities.
//!
//! A [`Clock`] measures wall time since it was started or last restarted;
//! the window runtime restarts one per frame and hands the application a
//! [`FrameTime`] snapshot.

mod clock;

pub use clock::{Clock, FrameTime};
