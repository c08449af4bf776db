//! Celestial bodies: orbital parameters, opaque render handles, and the
//! per-frame state derived by the scene graph.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Stable index of a body inside its [`Scene`](crate::Scene) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

impl BodyId {
    /// Index into the scene's body arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Texture reference handed to the renderer untouched (usually a file path).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureHandle(pub String);

impl TextureHandle {
    /// Creates a handle from anything string-like.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }
}

/// Sphere tessellation request for the renderer. The mesh itself is unit-sized;
/// the body radius is applied through the model matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshHandle {
    /// Latitude subdivisions.
    pub rings: u32,
    /// Longitude subdivisions.
    pub sectors: u32,
}

impl Default for MeshHandle {
    fn default() -> Self {
        Self {
            rings: 64,
            sectors: 64,
        }
    }
}

/// Circular-orbit and spin parameters of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitParams {
    /// Distance from the parent's origin. Zero keeps the body at the parent.
    pub orbit_radius: f32,
    /// Orbital angular speed in radians per simulated second (signed).
    pub orbit_speed: f32,
    /// Self-rotation speed in radians per simulated second (signed).
    pub rotation_speed: f32,
    /// Unit spin axis in the body's local frame.
    pub rotation_axis: Vec3,
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self {
            orbit_radius: 0.0,
            orbit_speed: 0.0,
            rotation_speed: 0.0,
            rotation_axis: Vec3::Y,
        }
    }
}

/// A simulated body owned by the scene arena.
#[derive(Debug, Clone)]
pub struct CelestialBody {
    /// Unique name.
    pub name: String,
    /// Display radius (> 0).
    pub radius: f32,
    /// Orbit and spin parameters.
    pub orbit: OrbitParams,
    /// Parent resolved at load time.
    pub parent: Option<BodyId>,
    /// Texture pass-through.
    pub texture: TextureHandle,
    /// Mesh pass-through.
    pub mesh: MeshHandle,
    /// Drawn unlit; the first emissive body also positions the light.
    pub emissive: bool,
    pub(crate) frame: Mat4,
    pub(crate) world: Mat4,
    pub(crate) spin_angle: f32,
    pub(crate) visual_scale: f32,
    pub(crate) shadowed: bool,
}

impl CelestialBody {
    pub(crate) fn new(
        name: String,
        radius: f32,
        orbit: OrbitParams,
        texture: TextureHandle,
        mesh: MeshHandle,
        emissive: bool,
    ) -> Self {
        Self {
            name,
            radius,
            orbit,
            parent: None,
            texture,
            mesh,
            emissive,
            frame: Mat4::IDENTITY,
            world: Mat4::IDENTITY,
            spin_angle: 0.0,
            visual_scale: 1.0,
            shadowed: false,
        }
    }

    /// Unscaled world transform resolved this frame, spin included.
    #[must_use]
    pub fn world_transform(&self) -> Mat4 {
        self.world
    }

    /// World transform without this body's own spin. Children orbit in
    /// this frame, so a spinning planet does not drag its moons along.
    #[must_use]
    pub fn orbit_frame(&self) -> Mat4 {
        self.frame
    }

    /// World-space position resolved this frame.
    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }

    /// Accumulated spin angle in radians, in `[0, 2π)`.
    #[must_use]
    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    /// Draw-time scale multiplier (eclipse growth effect), 1.0 normally.
    #[must_use]
    pub fn visual_scale(&self) -> f32 {
        self.visual_scale
    }

    /// Whether the body currently sits in an eclipse shadow.
    #[must_use]
    pub fn is_shadowed(&self) -> bool {
        self.shadowed
    }

    /// Transform handed to the renderer: world transform scaled by radius and
    /// visual scale. The scale is never inherited by children.
    #[must_use]
    pub fn model_matrix(&self) -> Mat4 {
        self.world * Mat4::from_scale(Vec3::splat(self.radius * self.visual_scale))
    }
}
