//! Where finished frames go.

use tracing::{debug, info, trace};

use orrery_sim::{FrameEvent, FrameOutput};

use crate::uniforms::{BodyInstance, FrameUniforms};

/// A presentation backend, so the frame loop can run without a GPU.
pub trait FrameSink {
    /// Consume one frame. `uniforms` is `output` already packed.
    fn present(&mut self, output: &FrameOutput<'_>, uniforms: &FrameUniforms);
}

/// Packs `output` and hands it to `sink`.
pub fn submit(sink: &mut dyn FrameSink, output: &FrameOutput<'_>) -> FrameUniforms {
    let uniforms = FrameUniforms::from_output(output);
    sink.present(output, &uniforms);
    uniforms
}

/// Sink that reports frames through `tracing` instead of drawing them.
///
/// Frame events are logged at `debug` (or `info` when `events_at_info` is
/// set); a one-line summary is logged every `summary_interval` frames.
#[derive(Debug, Clone)]
pub struct LogSink {
    events_at_info: bool,
    summary_interval: u64,
    frames: u64,
    events: u64,
    last_simulated_time: f64,
}

impl LogSink {
    #[must_use]
    pub fn new(events_at_info: bool, summary_interval: u64) -> Self {
        Self {
            events_at_info,
            summary_interval: summary_interval.max(1),
            frames: 0,
            events: 0,
            last_simulated_time: 0.0,
        }
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frame events seen so far.
    #[must_use]
    pub fn events(&self) -> u64 {
        self.events
    }

    #[must_use]
    pub fn last_simulated_time(&self) -> f64 {
        self.last_simulated_time
    }

    fn log_event(&self, event: &FrameEvent) {
        if self.events_at_info {
            info!(frame = self.frames, "{event:?}");
        } else {
            debug!(frame = self.frames, "{event:?}");
        }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(false, 60)
    }
}

impl FrameSink for LogSink {
    fn present(&mut self, output: &FrameOutput<'_>, uniforms: &FrameUniforms) {
        for event in &output.events {
            self.log_event(event);
        }
        self.events += output.events.len() as u64;
        self.last_simulated_time = output.simulated_time;

        if self.frames % self.summary_interval == 0 {
            let eye = output.camera_position;
            debug!(
                frame = self.frames,
                t = output.simulated_time,
                clock = ?output.clock_state,
                camera = ?output.camera_mode,
                "eye ({:.2}, {:.2}, {:.2})",
                eye.x,
                eye.y,
                eye.z
            );
        }
        trace!(
            instances = uniforms.instances.len(),
            bytes = uniforms.instances.len() * std::mem::size_of::<BodyInstance>(),
            orbit_vertices = uniforms.orbit_vertices.len(),
            "frame packed"
        );
        self.frames += 1;
    }
}
