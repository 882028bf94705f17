//! Ground-plane helpers on top of `glam`.
//!
//! The world is Y-up. Entities move on the XZ plane and their orientation is a
//! single yaw angle in radians, where yaw 0 faces +Z and positive yaw turns
//! toward +X.

use std::f32::consts::{PI, TAU};

pub use glam::Vec3;

/// Distances below this are treated as "already there".
pub const NEAR_ZERO: f32 = 1.0e-4;

/// Drops the vertical component of a vector.
#[must_use]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Distance between two points measured on the ground plane.
#[must_use]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    flatten(b - a).length()
}

/// Unit vector on the ground plane for a yaw angle.
#[must_use]
pub fn forward(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Yaw that faces from `from` toward `to`, or `None` when the points coincide
/// on the ground plane.
#[must_use]
pub fn yaw_toward(from: Vec3, to: Vec3) -> Option<f32> {
    let delta = flatten(to - from);
    if delta.length_squared() < NEAR_ZERO * NEAR_ZERO {
        None
    } else {
        Some(delta.x.atan2(delta.z))
    }
}

/// Wraps an angle into `(-PI, PI]`.
#[must_use]
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle.rem_euclid(TAU);
    if a > PI {
        a -= TAU;
    }
    a
}

/// Turns `current` toward `target` by at most `max_step` radians, taking the
/// short way around.
#[must_use]
pub fn rotate_toward(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = wrap_angle(target - current);
    let step = max_step.max(0.0);
    if delta.abs() <= step {
        wrap_angle(target)
    } else {
        wrap_angle(current + delta.signum() * step)
    }
}
