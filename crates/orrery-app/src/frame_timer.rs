//! Wall-clock frame timing.
//!
//! Frame deltas are clamped so a stall (debugger, window drag) cannot feed
//! the simulation a multi-second step.

use std::time::Instant;

use tracing::warn;

/// Maximum frame time handed to the simulation, in seconds.
pub const MAX_FRAME_TIME: f64 = 0.25; // 4 FPS minimum

/// Interval over which the frame rate is averaged.
const FPS_WINDOW: f64 = 1.0;

/// Clamps a measured frame time to `[0, MAX_FRAME_TIME]`.
#[must_use]
pub fn clamp_frame_time(frame_time: f64) -> f64 {
    if !frame_time.is_finite() || frame_time < 0.0 {
        return 0.0;
    }
    if frame_time > MAX_FRAME_TIME {
        warn!(
            "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
            frame_time * 1000.0,
            MAX_FRAME_TIME * 1000.0
        );
        return MAX_FRAME_TIME;
    }
    frame_time
}

/// Measures clamped frame deltas and a rolling frame rate.
#[derive(Debug)]
pub struct FrameTimer {
    previous: Option<Instant>,
    frame_count: u64,
    window_time: f64,
    window_frames: u32,
    fps: Option<f64>,
}

impl FrameTimer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            previous: None,
            frame_count: 0,
            window_time: 0.0,
            window_frames: 0,
            fps: None,
        }
    }

    /// Measures the time since the previous call. The first call returns 0.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let frame_time = self
            .previous
            .map_or(0.0, |previous| now.duration_since(previous).as_secs_f64());
        self.previous = Some(now);
        self.advance(frame_time)
    }

    /// Records an explicit frame time and returns it clamped.
    pub fn advance(&mut self, frame_time: f64) -> f64 {
        self.frame_count += 1;
        self.window_time += frame_time.max(0.0);
        self.window_frames += 1;
        if self.window_time >= FPS_WINDOW {
            self.fps = Some(f64::from(self.window_frames) / self.window_time);
            self.window_time = 0.0;
            self.window_frames = 0;
        }
        clamp_frame_time(frame_time)
    }

    /// Frame rate measured over the last completed window, taken once.
    pub fn take_fps(&mut self) -> Option<f64> {
        self.fps.take()
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
