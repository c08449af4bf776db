//! Scene animation and camera-lock state machine for the Orrery.
//!
//! Each frame the [`Orrery`] advances the [`SimulationClock`], resolves every
//! [`CelestialBody`] transform from its orbital parameters in parent-first
//! order, checks sun/planet/moon alignment with the [`EclipseDetector`], and
//! drives the [`CameraController`]. The result is a [`FrameOutput`] holding
//! everything a renderer needs; no graphics API is touched here.

pub mod body;
pub mod camera;
pub mod clock;
pub mod controls;
pub mod eclipse;
pub mod error;
pub mod frame;
pub mod kinematics;
pub mod scenario;
pub mod scene;

pub use body::{BodyId, CelestialBody, MeshHandle, OrbitParams, TextureHandle};
pub use camera::{
    CameraController, CameraMode, CameraSettings, CameraState, FreeView, MIN_ORBIT_GAP, OrbitView,
    PITCH_LIMIT, Projection,
};
pub use clock::{ClockSettings, ClockState, EclipseEvent, SimulationClock};
pub use controls::{Command, FrameInput, Movement};
pub use eclipse::{DEFAULT_ECLIPSE_THRESHOLD, EclipseDetector, EclipseKind};
pub use error::SceneError;
pub use frame::{
    BodyFrame, Features, FrameEvent, FrameOutput, Orrery, OrrerySettings, RejectReason,
};
pub use scenario::{BodyDef, EclipseRoles, ScenarioDef};
pub use scene::{EclipseBodies, Light, OrbitPath, Scene};
