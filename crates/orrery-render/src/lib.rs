//! Renderer-facing side of the orrery.
//!
//! A [`FrameOutput`](orrery_sim::FrameOutput) is packed into GPU-ready
//! plain-old-data records ([`FrameUniforms`]) and handed to a [`FrameSink`].
//! No graphics API is touched here; a backend implements [`FrameSink`] and
//! uploads the records with `bytemuck::cast_slice`.

pub mod sink;
pub mod uniforms;

pub use sink::{FrameSink, LogSink, submit};
pub use uniforms::{
    BodyInstance, CameraUniform, FrameUniforms, INSTANCE_EMISSIVE, INSTANCE_SHADOWED,
    LightUniform, ORBIT_PATH_SEGMENTS,
};
