//! Planar circular orbits and self-rotation.
//!
//! Orbits lie in the XZ plane of the parent's orbit frame, which is the
//! parent's world transform without its spin. Children therefore do not use
//! the parent's full world transform: a moon circles its planet's center and
//! is not swept around by the planet's rotation.
//!
//! Spin advances with the simulated clock's per-tick delta, so a frozen clock
//! freezes both orbit and spin.

use std::f64::consts::TAU;

use glam::{Mat4, Vec3};

use crate::body::OrbitParams;

/// Position in the parent's frame at `simulated_time`:
/// `(r·cos(t·ω), 0, r·sin(t·ω))`.
#[must_use]
pub fn orbit_position(orbit: &OrbitParams, simulated_time: f64) -> Vec3 {
    let phase = simulated_time * f64::from(orbit.orbit_speed);
    let r = f64::from(orbit.orbit_radius);
    Vec3::new((r * phase.cos()) as f32, 0.0, (r * phase.sin()) as f32)
}

/// Advance a spin angle by `sim_dt · rotation_speed`, wrapped to `[0, 2π)`.
#[must_use]
pub fn advance_spin(spin_angle: f32, rotation_speed: f32, sim_dt: f64) -> f32 {
    let next = f64::from(spin_angle) + sim_dt * f64::from(rotation_speed);
    next.rem_euclid(TAU) as f32
}

/// `parent_frame · translate(orbit_position)`: where a body sits before its
/// own spin is applied.
#[must_use]
pub fn orbit_frame(orbit: &OrbitParams, parent_frame: Mat4, simulated_time: f64) -> Mat4 {
    parent_frame * Mat4::from_translation(orbit_position(orbit, simulated_time))
}

/// World transform of a body:
/// `parent_frame · translate(orbit_position) · rotate(spin_angle, axis)`.
///
/// `parent_frame` must already be resolved for this frame.
#[must_use]
pub fn resolve_transform(
    orbit: &OrbitParams,
    parent_frame: Mat4,
    simulated_time: f64,
    spin_angle: f32,
) -> Mat4 {
    orbit_frame(orbit, parent_frame, simulated_time)
        * Mat4::from_axis_angle(orbit.rotation_axis, spin_angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn orbit(radius: f32, speed: f32) -> OrbitParams {
        OrbitParams {
            orbit_radius: radius,
            orbit_speed: speed,
            ..OrbitParams::default()
        }
    }

    #[test]
    fn test_root_orbit_stays_on_circle() {
        let o = orbit(10.0, 0.7);
        for i in 0..200 {
            let t = f64::from(i) * 0.37;
            let world = resolve_transform(&o, Mat4::IDENTITY, t, 0.0);
            let p = world.w_axis.truncate();
            assert!((p.length() - 10.0).abs() < 1e-4, "t={t}, |p|={}", p.length());
            assert!(p.y.abs() < 1e-6);
        }
    }

    #[test]
    fn test_orbit_starts_on_positive_x() {
        let p = orbit_position(&orbit(10.0, 1.0), 0.0);
        assert!((p - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_half_period_is_opposite_side() {
        let p = orbit_position(&orbit(10.0, 1.0), PI);
        assert!((p - Vec3::new(-10.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_zero_orbit_radius_sits_on_parent() {
        let parent = Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0));
        let world = resolve_transform(&orbit(0.0, 3.0), parent, 12.5, 1.0);
        assert!((world.w_axis.truncate() - Vec3::new(4.0, 5.0, 6.0)).length() < 1e-5);
    }

    #[test]
    fn test_child_composes_onto_parent_translation() {
        let parent = resolve_transform(&orbit(10.0, 1.0), Mat4::IDENTITY, 0.0, 0.0);
        let child = resolve_transform(&orbit(2.0, 3.0), parent, 0.0, 0.0);
        assert!((child.w_axis.truncate() - Vec3::new(12.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_orbit_frame_has_no_spin() {
        let o = OrbitParams {
            orbit_radius: 3.0,
            orbit_speed: 1.0,
            rotation_speed: 2.0,
            rotation_axis: Vec3::Y,
        };
        let frame = orbit_frame(&o, Mat4::IDENTITY, 0.0);
        let world = resolve_transform(&o, Mat4::IDENTITY, 0.0, 1.0);
        assert_eq!(frame.w_axis, world.w_axis);
        assert!((frame.x_axis.truncate() - Vec3::X).length() < 1e-6);
        assert!((world.x_axis.truncate() - Vec3::X).length() > 0.1);
    }

    #[test]
    fn test_spin_does_not_move_body() {
        let o = orbit(5.0, 1.0);
        let a = resolve_transform(&o, Mat4::IDENTITY, 2.0, 0.0);
        let b = resolve_transform(&o, Mat4::IDENTITY, 2.0, 2.5);
        assert!((a.w_axis - b.w_axis).length() < 1e-6);
    }

    #[test]
    fn test_spin_wraps_into_range() {
        let angle = advance_spin(6.0, 1.0, 1.0);
        assert!((0.0..std::f32::consts::TAU).contains(&angle));
        assert!((angle - (7.0 - std::f32::consts::TAU)).abs() < 1e-5);

        let negative = advance_spin(0.5, -1.0, 1.0);
        assert!((negative - (std::f32::consts::TAU - 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_spin_holds_when_clock_is_frozen() {
        assert_eq!(advance_spin(1.25, 4.0, 0.0), 1.25);
    }
}
