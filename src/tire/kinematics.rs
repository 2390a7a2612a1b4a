// ==============================================================================
// kinematics.rs — WHEEL BASIS + SLIP DECOMPOSITION (WORLD SPACE)
// ------------------------------------------------------------------------------
// Converts chassis orientation + per-corner steer angle into a wheel basis:
// - forward: wheel rolling direction (world)
// - left:    lateral direction (world), forward rotated +90° about body up
//
// Steering rotates about body up; positive steer turns the wheel left.
//
// slip_components(point_vel, forward, left):
//     v_long = dot(v, forward)
//     v_lat  = dot(v, left)
//
// slip_angle(v_long, v_lat, deadband):
//     α = atan2(v_lat, |v_long|) outside the deadband, 0 inside it
// ==============================================================================

use nalgebra::{UnitQuaternion, Vector3};

use crate::math::{Quat, Real, Vec3, rotate};

/// World-space velocity of a point rigidly attached to the body:
/// v(p) = v_com + ω × r, with r already in world space.
#[inline]
pub fn point_velocity(linvel: Vec3, angvel: Vec3, r_world: Vec3) -> Vec3 {
    linvel + angvel.cross(&r_world)
}

/// Returns (wheel_forward, wheel_left) in world space.
#[inline]
pub fn wheel_basis_world(rot: &Quat, steer: Real) -> (Vec3, Vec3) {
    if steer == 0.0 {
        return (rotate(rot, Vec3::x()), rotate(rot, Vec3::y()));
    }
    let steered = rot * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), steer);
    (rotate(&steered, Vec3::x()), rotate(&steered, Vec3::y()))
}

/// Compute (v_long, v_lat) given point velocity and wheel basis.
#[inline]
pub fn slip_components(point_vel: Vec3, wheel_forward: Vec3, wheel_left: Vec3) -> (Real, Real) {
    (point_vel.dot(&wheel_forward), point_vel.dot(&wheel_left))
}

#[inline]
pub fn slip_angle(v_long: Real, v_lat: Real, deadband: Real) -> Real {
    if v_long.abs() > deadband {
        v_lat.atan2(v_long.abs())
    } else {
        0.0
    }
}
