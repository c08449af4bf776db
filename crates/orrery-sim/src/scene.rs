//! Body arena with parent links resolved to indices.
//!
//! The structure is fixed once [`Scene::from_scenario`] succeeds: parent links
//! are validated, a parent-first resolution order is computed, and names are
//! mapped to [`BodyId`]s. Only the per-frame derived fields of each body
//! change afterwards.

use std::collections::HashMap;

use glam::{Mat4, Vec3};
use tracing::{debug, info};

use crate::body::{BodyId, CelestialBody, OrbitParams};
use crate::error::SceneError;
use crate::kinematics::{advance_spin, orbit_frame, orbit_position, resolve_transform};
use crate::scenario::ScenarioDef;

/// Point light parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
}

/// Bodies playing the sun, planet and moon roles in eclipse tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EclipseBodies {
    pub sun: BodyId,
    pub planet: BodyId,
    pub moon: BodyId,
}

/// Circle traced by a body's orbit, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPath {
    pub body: BodyId,
    /// Parent's orbit frame (identity for roots); the circle lies in this
    /// frame's XZ plane.
    pub frame: Mat4,
    pub radius: f32,
}

impl OrbitPath {
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.frame.w_axis.truncate()
    }

    /// Unit normal of the orbit plane.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.frame.y_axis.truncate().normalize_or_zero()
    }

    /// `segments` points evenly spaced around the circle, without repeating
    /// the first point.
    #[must_use]
    pub fn points(&self, segments: usize) -> Vec<Vec3> {
        let orbit = OrbitParams {
            orbit_radius: self.radius,
            orbit_speed: 1.0,
            ..OrbitParams::default()
        };
        (0..segments)
            .map(|i| {
                let phase = std::f64::consts::TAU * i as f64 / segments as f64;
                self.frame.transform_point3(orbit_position(&orbit, phase))
            })
            .collect()
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// The validated body arena plus ambient scene state.
#[derive(Debug, Clone)]
pub struct Scene {
    bodies: Vec<CelestialBody>,
    order: Vec<BodyId>,
    by_name: HashMap<String, BodyId>,
    lockable: Vec<BodyId>,
    eclipse: Option<EclipseBodies>,
    initial_camera_position: Vec3,
    light: Light,
    light_source: Option<BodyId>,
}

impl Scene {
    /// Validates `def` and builds the arena, resolved at simulated time zero.
    pub fn from_scenario(def: &ScenarioDef) -> Result<Self, SceneError> {
        let mut bodies = Vec::with_capacity(def.bodies.len());
        let mut by_name = HashMap::with_capacity(def.bodies.len());

        for (index, body) in def.bodies.iter().enumerate() {
            if by_name.insert(body.name.clone(), BodyId(index)).is_some() {
                return Err(SceneError::DuplicateBody(body.name.clone()));
            }
            if !body.radius.is_finite() || body.radius <= 0.0 {
                return Err(SceneError::InvalidRadius {
                    body: body.name.clone(),
                    radius: body.radius,
                });
            }
            if !body.orbit_radius.is_finite() || body.orbit_radius < 0.0 {
                return Err(SceneError::InvalidOrbitRadius {
                    body: body.name.clone(),
                    orbit_radius: body.orbit_radius,
                });
            }
            let rotation_axis = Vec3::from(body.rotation_axis)
                .try_normalize()
                .ok_or_else(|| SceneError::ZeroRotationAxis(body.name.clone()))?;

            bodies.push(CelestialBody::new(
                body.name.clone(),
                body.radius,
                OrbitParams {
                    orbit_radius: body.orbit_radius,
                    orbit_speed: body.orbit_speed,
                    rotation_speed: body.rotation_speed,
                    rotation_axis,
                },
                body.texture.clone(),
                body.mesh,
                body.emissive,
            ));
        }

        for (body, def_body) in bodies.iter_mut().zip(&def.bodies) {
            if let Some(parent) = &def_body.parent {
                let id = by_name
                    .get(parent)
                    .copied()
                    .ok_or_else(|| SceneError::UnknownParent {
                        body: def_body.name.clone(),
                        parent: parent.clone(),
                    })?;
                body.parent = Some(id);
            }
        }

        let order = resolution_order(&bodies)?;

        let lockable = match &def.lockable {
            Some(names) => names
                .iter()
                .map(|name| {
                    by_name
                        .get(name)
                        .copied()
                        .ok_or_else(|| SceneError::UnknownLockable(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => (0..bodies.len()).map(BodyId).collect(),
        };

        let eclipse = match &def.eclipse {
            Some(roles) => {
                let role = |role: &'static str, name: &str| {
                    by_name
                        .get(name)
                        .copied()
                        .ok_or_else(|| SceneError::UnknownEclipseBody {
                            role,
                            name: name.to_string(),
                        })
                };
                Some(EclipseBodies {
                    sun: role("sun", &roles.sun)?,
                    planet: role("planet", &roles.planet)?,
                    moon: role("moon", &roles.moon)?,
                })
            }
            None => match (by_name.get("Sun"), by_name.get("Earth"), by_name.get("Moon")) {
                (Some(&sun), Some(&planet), Some(&moon)) => Some(EclipseBodies { sun, planet, moon }),
                _ => None,
            },
        };

        let light_source = bodies.iter().position(|b| b.emissive).map(BodyId);

        let mut scene = Self {
            bodies,
            order,
            by_name,
            lockable,
            eclipse,
            initial_camera_position: Vec3::from(def.initial_camera_position),
            light: Light {
                position: Vec3::from(def.light_position),
                color: Vec3::from(def.light_color),
            },
            light_source,
        };
        scene.resolve(0.0, 0.0);

        info!(
            "Scene loaded: {} bodies, {} lockable, eclipse roles {}",
            scene.bodies.len(),
            scene.lockable.len(),
            if scene.eclipse.is_some() { "assigned" } else { "absent" }
        );
        Ok(scene)
    }

    /// Recomputes every body's spin and world transform, parents first.
    pub fn resolve(&mut self, simulated_time: f64, sim_dt: f64) {
        for &id in &self.order {
            let parent_frame = self.bodies[id.index()]
                .parent
                .map_or(Mat4::IDENTITY, |p| self.bodies[p.index()].frame);
            let body = &mut self.bodies[id.index()];
            body.spin_angle = advance_spin(body.spin_angle, body.orbit.rotation_speed, sim_dt);
            body.frame = orbit_frame(&body.orbit, parent_frame, simulated_time);
            body.world =
                resolve_transform(&body.orbit, parent_frame, simulated_time, body.spin_angle);
        }
    }

    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&CelestialBody> {
        self.bodies.get(id.index())
    }

    pub(crate) fn body_mut(&mut self, id: BodyId) -> Option<&mut CelestialBody> {
        self.bodies.get_mut(id.index())
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<BodyId> {
        self.by_name.get(name).copied()
    }

    /// Like [`find`](Self::find) but reports the missing name.
    pub fn lookup(&self, name: &str) -> Result<BodyId, SceneError> {
        self.find(name)
            .ok_or_else(|| SceneError::UnknownBody(name.to_string()))
    }

    /// Bodies in definition order.
    #[must_use]
    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    /// Bodies with their ids, in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &CelestialBody)> {
        self.bodies.iter().enumerate().map(|(i, b)| (BodyId(i), b))
    }

    /// Parent-first order used by [`resolve`](Self::resolve).
    #[must_use]
    pub fn resolution_order(&self) -> &[BodyId] {
        &self.order
    }

    #[must_use]
    pub fn lockable(&self) -> &[BodyId] {
        &self.lockable
    }

    #[must_use]
    pub fn eclipse_bodies(&self) -> Option<EclipseBodies> {
        self.eclipse
    }

    #[must_use]
    pub fn initial_camera_position(&self) -> Vec3 {
        self.initial_camera_position
    }

    /// Light placed at the first emissive body, or the static position when
    /// no body is emissive.
    #[must_use]
    pub fn light(&self) -> Light {
        let position = self
            .light_source
            .and_then(|id| self.body(id))
            .map_or(self.light.position, CelestialBody::world_position);
        Light {
            position,
            color: self.light.color,
        }
    }

    /// Orbit circles for every body with a non-zero orbit radius.
    #[must_use]
    pub fn orbit_paths(&self) -> Vec<OrbitPath> {
        self.iter()
            .filter(|(_, b)| b.orbit.orbit_radius > 0.0)
            .map(|(id, b)| OrbitPath {
                body: id,
                frame: b
                    .parent
                    .map_or(Mat4::IDENTITY, |p| self.bodies[p.index()].frame),
                radius: b.orbit.orbit_radius,
            })
            .collect()
    }
}

/// Parent-first order over the forest. Roots keep definition order.
fn resolution_order(bodies: &[CelestialBody]) -> Result<Vec<BodyId>, SceneError> {
    let mut marks = vec![Mark::Unvisited; bodies.len()];
    let mut order = Vec::with_capacity(bodies.len());

    for start in 0..bodies.len() {
        let mut chain = Vec::new();
        let mut cursor = Some(start);
        while let Some(i) = cursor {
            match marks[i] {
                Mark::Done => break,
                Mark::Visiting => return Err(SceneError::ParentCycle(bodies[i].name.clone())),
                Mark::Unvisited => {
                    marks[i] = Mark::Visiting;
                    chain.push(i);
                    cursor = bodies[i].parent.map(BodyId::index);
                }
            }
        }
        for &i in chain.iter().rev() {
            marks[i] = Mark::Done;
            order.push(BodyId(i));
        }
    }

    debug!("Resolution order: {:?}", order);
    Ok(order)
}
