use std::time::{Duration, Instant};

/// Monotonic stopwatch.
#[derive(Debug, Clone)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    /// Starts a clock at the current instant.
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    /// Time elapsed since creation or the last [`restart`](Self::restart).
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns the elapsed time and starts counting again from zero.
    pub fn restart(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.start);
        self.start = now;
        elapsed
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame.
    pub dt: f32,

    /// Frame counter, starting at 0.
    pub frame_index: u64,
}

impl FrameTime {
    /// Longest delta handed out; longer stalls (debugger, minimized window)
    /// are clamped so simulations do not jump.
    pub const MAX_DT: Duration = Duration::from_millis(250);

    pub fn new(elapsed: Duration, frame_index: u64) -> Self {
        Self {
            dt: elapsed.min(Self::MAX_DT).as_secs_f32(),
            frame_index,
        }
    }
}
