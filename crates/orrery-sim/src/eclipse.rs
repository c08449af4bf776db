//! Sun/planet/moon alignment test.
//!
//! Both eclipse kinds use the same line-to-point distance: with rays `a` and
//! `b` cast from a reference body, `|a × b| / |a|` is how far the tip of `b`
//! sits from the line through `a`. An eclipse needs that distance under the
//! threshold plus an ordering check that puts the occluder between the light
//! and the shadowed body.

use std::fmt;

use glam::Vec3;

/// Default perpendicular-distance threshold in scene units.
pub const DEFAULT_ECLIPSE_THRESHOLD: f32 = 0.3;

/// Which alignment was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EclipseKind {
    /// The moon passes between the sun and the planet.
    Solar,
    /// The planet passes between the sun and the moon.
    Lunar,
}

impl fmt::Display for EclipseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solar => write!(f, "solar"),
            Self::Lunar => write!(f, "lunar"),
        }
    }
}

/// Distance of the tip of `b` from the infinite line along `a`.
///
/// Returns `None` when `a` is (near) zero length or the result is not
/// finite, so degenerate geometry never leaks NaN into callers.
#[must_use]
pub fn perpendicular_distance(a: Vec3, b: Vec3) -> Option<f32> {
    let len = a.length();
    if !len.is_finite() || len <= f32::EPSILON {
        return None;
    }
    let distance = a.cross(b).length() / len;
    distance.is_finite().then_some(distance)
}

/// Geometric eclipse predicate with a configurable threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipseDetector {
    /// Maximum perpendicular distance that still counts as aligned.
    pub threshold: f32,
}

impl Default for EclipseDetector {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ECLIPSE_THRESHOLD,
        }
    }
}

impl EclipseDetector {
    /// Creates a detector with the given threshold.
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Tests one specific kind of eclipse.
    #[must_use]
    pub fn detect(&self, kind: EclipseKind, sun: Vec3, planet: Vec3, moon: Vec3) -> bool {
        match kind {
            EclipseKind::Solar => {
                let to_sun = sun - planet;
                let to_moon = moon - planet;
                to_moon.length() < to_sun.length() && self.aligned(to_sun, to_moon)
            }
            EclipseKind::Lunar => {
                let to_planet = planet - sun;
                let to_moon = moon - sun;
                to_planet.length() < to_moon.length() && self.aligned(to_planet, to_moon)
            }
        }
    }

    /// Classifies the configuration. Solar wins when degenerate geometry
    /// satisfies both tests.
    #[must_use]
    pub fn classify(&self, sun: Vec3, planet: Vec3, moon: Vec3) -> Option<EclipseKind> {
        [EclipseKind::Solar, EclipseKind::Lunar]
            .into_iter()
            .find(|&kind| self.detect(kind, sun, planet, moon))
    }

    fn aligned(&self, a: Vec3, b: Vec3) -> bool {
        a.dot(b) > 0.0 && perpendicular_distance(a, b).is_some_and(|d| d < self.threshold)
    }
}
