//! Free-fly / body-locked camera state machine.
//!
//! Angles follow the usual yaw/pitch convention: yaw −90° with zero pitch
//! looks down −Z. In free mode the pair describes the look direction; in
//! locked mode it describes where the eye sits relative to the target, so the
//! look direction is its negation.

use glam::{Mat4, Vec2, Vec3};
use tracing::{debug, info, warn};

use crate::body::BodyId;
use crate::controls::FrameInput;
use crate::error::SceneError;
use crate::scene::Scene;

/// Pitch limit (±89°) in radians for both modes.
pub const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Smallest gap kept between a locked eye and the target's surface.
pub const MIN_ORBIT_GAP: f32 = 0.01;

/// Camera tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Free-fly speed in scene units per second.
    pub move_speed: f32,
    /// Look sensitivity in degrees per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// Initial vertical field of view in degrees.
    pub zoom: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub near: f32,
    pub far: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Closest the locked eye gets to the target's surface.
    pub orbit_distance_min: f32,
    /// Farthest the locked eye gets from the target's center.
    pub orbit_distance_max: f32,
    /// Orbit distance change per scroll line.
    pub orbit_zoom_step: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            move_speed: 2.5,
            mouse_sensitivity: 0.1,
            zoom: 45.0,
            zoom_min: 1.0,
            zoom_max: 45.0,
            near: 0.1,
            far: 100.0,
            aspect_ratio: 16.0 / 9.0,
            orbit_distance_min: 0.5,
            orbit_distance_max: 80.0,
            orbit_zoom_step: 0.5,
        }
    }
}

impl CameraSettings {
    /// Returns settings the controller can run on. Non-finite or
    /// non-positive values fall back to the defaults, inverted zoom and
    /// orbit bounds are swapped, `far` stays beyond `near`, and the orbit
    /// gap is at least [`MIN_ORBIT_GAP`].
    #[must_use]
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        let mut zoom_min = positive_or(self.zoom_min, defaults.zoom_min, "zoom_min");
        let mut zoom_max = positive_or(self.zoom_max, defaults.zoom_max, "zoom_max");
        if zoom_min > zoom_max {
            warn!("zoom_min {zoom_min} exceeds zoom_max {zoom_max}, swapping");
            std::mem::swap(&mut zoom_min, &mut zoom_max);
        }
        let zoom = if self.zoom.is_finite() {
            self.zoom.clamp(zoom_min, zoom_max)
        } else {
            defaults.zoom.clamp(zoom_min, zoom_max)
        };

        let near = positive_or(self.near, defaults.near, "near");
        let mut far = positive_or(self.far, defaults.far, "far");
        if far <= near {
            warn!("Far plane {far} is not beyond near plane {near}");
            far = near * 1000.0;
        }

        let orbit_distance_min = if self.orbit_distance_min.is_finite() {
            self.orbit_distance_min.max(MIN_ORBIT_GAP)
        } else {
            defaults.orbit_distance_min
        };
        if orbit_distance_min != self.orbit_distance_min {
            warn!(
                "orbit_distance_min {} raised to {orbit_distance_min}",
                self.orbit_distance_min
            );
        }

        Self {
            move_speed: positive_or(self.move_speed, defaults.move_speed, "move_speed"),
            mouse_sensitivity: if self.mouse_sensitivity.is_finite() {
                self.mouse_sensitivity
            } else {
                defaults.mouse_sensitivity
            },
            zoom,
            zoom_min,
            zoom_max,
            near,
            far,
            aspect_ratio: positive_or(self.aspect_ratio, defaults.aspect_ratio, "aspect_ratio"),
            orbit_distance_min,
            orbit_distance_max: positive_or(
                self.orbit_distance_max,
                defaults.orbit_distance_max,
                "orbit_distance_max",
            ),
            orbit_zoom_step: positive_or(
                self.orbit_zoom_step,
                defaults.orbit_zoom_step,
                "orbit_zoom_step",
            ),
        }
    }
}

fn positive_or(value: f32, fallback: f32, name: &str) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!("Camera {name} must be finite and positive, got {value}; using {fallback}");
        fallback
    }
}

/// Which mode is active, without the mode's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Free,
    LockedTo(BodyId),
}

/// Free-fly fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeView {
    pub position: Vec3,
    /// Radians.
    pub yaw: f32,
    /// Radians, within ±[`PITCH_LIMIT`].
    pub pitch: f32,
}

/// Locked-mode fields. The eye sits at
/// `target + distance · direction(yaw, pitch)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitView {
    pub target: BodyId,
    pub distance: f32,
    /// Radians.
    pub yaw: f32,
    /// Radians, within ±[`PITCH_LIMIT`].
    pub pitch: f32,
}

/// Exactly one mode is active at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraState {
    Free(FreeView),
    Locked(OrbitView),
}

/// Right-handed perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    /// OpenGL-style right-handed perspective matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_y_degrees.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }
}

/// Unit vector for a yaw/pitch pair.
#[must_use]
pub fn direction_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
}

/// Inverse of [`direction_from_angles`], with pitch clamped to ±[`PITCH_LIMIT`].
/// A zero vector maps to the default forward (yaw −90°, pitch 0).
#[must_use]
pub fn angles_from_direction(direction: Vec3) -> (f32, f32) {
    let Some(d) = direction.try_normalize() else {
        return (-std::f32::consts::FRAC_PI_2, 0.0);
    };
    let pitch = d.y.clamp(-1.0, 1.0).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT);
    let yaw = d.z.atan2(d.x);
    (yaw, pitch)
}

/// Owns the camera state and applies per-frame input to it.
#[derive(Debug, Clone)]
pub struct CameraController {
    settings: CameraSettings,
    state: CameraState,
    zoom: f32,
    aspect_ratio: f32,
    /// Set by a lock transition; drops mouse motion for the rest of the frame.
    discard_look: bool,
}

impl CameraController {
    /// Free camera at `position` looking down −Z. `settings` pass through
    /// [`CameraSettings::validated`] first.
    #[must_use]
    pub fn new(settings: CameraSettings, position: Vec3) -> Self {
        let settings = settings.validated();
        Self {
            settings,
            state: CameraState::Free(FreeView {
                position,
                yaw: -std::f32::consts::FRAC_PI_2,
                pitch: 0.0,
            }),
            zoom: settings.zoom,
            aspect_ratio: settings.aspect_ratio,
            discard_look: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    #[must_use]
    pub fn mode(&self) -> CameraMode {
        match self.state {
            CameraState::Free(_) => CameraMode::Free,
            CameraState::Locked(orbit) => CameraMode::LockedTo(orbit.target),
        }
    }

    /// Current vertical field of view in degrees.
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Updates the aspect ratio from a surface size. Zero sizes are ignored.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    #[must_use]
    pub fn projection(&self) -> Projection {
        Projection {
            fov_y_degrees: self.zoom,
            aspect_ratio: self.aspect_ratio,
            near: self.settings.near,
            far: self.settings.far,
        }
    }

    /// Unit look direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        match self.state {
            CameraState::Free(view) => direction_from_angles(view.yaw, view.pitch),
            CameraState::Locked(orbit) => -direction_from_angles(orbit.yaw, orbit.pitch),
        }
    }

    /// Eye position in world space. Locked mode reads the target's position
    /// as last resolved by `scene`.
    #[must_use]
    pub fn eye(&self, scene: &Scene) -> Vec3 {
        match self.state {
            CameraState::Free(view) => view.position,
            CameraState::Locked(orbit) => {
                target_position(scene, orbit.target)
                    + orbit.distance * direction_from_angles(orbit.yaw, orbit.pitch)
            }
        }
    }

    /// View matrix for the current mode.
    #[must_use]
    pub fn view_matrix(&self, scene: &Scene) -> Mat4 {
        match self.state {
            CameraState::Free(view) => {
                Mat4::look_to_rh(view.position, self.forward(), Vec3::Y)
            }
            CameraState::Locked(orbit) => {
                Mat4::look_at_rh(self.eye(scene), target_position(scene, orbit.target), Vec3::Y)
            }
        }
    }

    /// Locks onto `target`, keeping the current look direction.
    ///
    /// The orbit direction becomes the reverse of the current forward vector
    /// and the distance is the current eye-to-target distance, clamped.
    /// Mouse motion is discarded for the rest of the frame. An unknown target
    /// leaves the state untouched.
    pub fn lock_onto(&mut self, target: BodyId, scene: &Scene) -> Result<(), SceneError> {
        let body = scene
            .body(target)
            .ok_or_else(|| SceneError::UnknownBody(format!("#{}", target.index())))?;
        let eye = self.eye(scene);
        let forward = self.forward();
        let (yaw, pitch) = angles_from_direction(-forward);
        let distance = self.clamp_distance(eye.distance(body.world_position()), body.radius);
        self.state = CameraState::Locked(OrbitView {
            target,
            distance,
            yaw,
            pitch,
        });
        self.discard_look = true;
        info!("Camera locked onto {} at distance {distance:.2}", body.name);
        Ok(())
    }

    /// Locks onto the next entry of the scene's lockable list, wrapping.
    /// Returns the new target, or `None` if the list is empty.
    pub fn cycle_target(&mut self, scene: &Scene) -> Option<BodyId> {
        let lockable = scene.lockable();
        let next = match self.state {
            CameraState::Locked(orbit) => lockable
                .iter()
                .position(|&id| id == orbit.target)
                .map_or(0, |i| (i + 1) % lockable.len()),
            CameraState::Free(_) => 0,
        };
        let target = *lockable.get(next)?;
        self.lock_onto(target, scene).ok()?;
        Some(target)
    }

    /// Returns to free-fly at the current locked eye with the current look
    /// direction. Returns `false` if already free.
    pub fn release(&mut self, scene: &Scene) -> bool {
        let CameraState::Locked(_) = self.state else {
            return false;
        };
        let position = self.eye(scene);
        let (yaw, pitch) = angles_from_direction(self.forward());
        self.state = CameraState::Free(FreeView {
            position,
            yaw,
            pitch,
        });
        info!("Camera released at ({:.2}, {:.2}, {:.2})", position.x, position.y, position.z);
        true
    }

    /// Applies one frame of movement, mouse and scroll input.
    ///
    /// Movement keys only act in free mode.
    pub fn update(&mut self, input: &FrameInput, dt: f32, scene: &Scene) {
        let look = if std::mem::take(&mut self.discard_look) {
            Vec2::ZERO
        } else {
            input.mouse_delta * self.settings.mouse_sensitivity.to_radians()
        };

        match &mut self.state {
            CameraState::Free(view) => {
                view.yaw += look.x;
                view.pitch = (view.pitch - look.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);

                if !input.movement.is_idle() && dt > 0.0 {
                    let front = direction_from_angles(view.yaw, view.pitch);
                    let right = front.cross(Vec3::Y).normalize_or_zero();
                    let mut dir = Vec3::ZERO;
                    if input.movement.forward {
                        dir += front;
                    }
                    if input.movement.backward {
                        dir -= front;
                    }
                    if input.movement.right {
                        dir += right;
                    }
                    if input.movement.left {
                        dir -= right;
                    }
                    // Opposing keys cancel out.
                    if let Some(dir) = dir.try_normalize() {
                        view.position += dir * self.settings.move_speed * dt;
                    }
                }

                if input.scroll != 0.0 {
                    self.zoom = (self.zoom - input.scroll)
                        .clamp(self.settings.zoom_min, self.settings.zoom_max);
                }
            }
            CameraState::Locked(orbit) => {
                orbit.yaw += look.x;
                orbit.pitch = (orbit.pitch + look.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);

                if input.scroll != 0.0 {
                    let radius = scene.body(orbit.target).map_or(0.0, |b| b.radius);
                    let (min, max) = orbit_bounds(&self.settings, radius);
                    orbit.distance = (orbit.distance - input.scroll * self.settings.orbit_zoom_step)
                        .clamp(min, max);
                    debug!("Orbit distance {:.2}", orbit.distance);
                }
            }
        }
    }

    fn clamp_distance(&self, distance: f32, radius: f32) -> f32 {
        let (min, max) = orbit_bounds(&self.settings, radius);
        if distance.is_finite() {
            distance.clamp(min, max)
        } else {
            max
        }
    }
}

/// Locked distance range for a target of `radius`. The lower bound stays
/// strictly outside the surface.
fn orbit_bounds(settings: &CameraSettings, radius: f32) -> (f32, f32) {
    let min = radius.max(0.0) + settings.orbit_distance_min.max(MIN_ORBIT_GAP);
    (min, settings.orbit_distance_max.max(min))
}

fn target_position(scene: &Scene, target: BodyId) -> Vec3 {
    scene.body(target).map_or(Vec3::ZERO, |b| b.world_position())
}
