//! Spherical play area that keeps entities inside the world.

use menagerie_common::{Vec3, NEAR_ZERO};
use serde::{Deserialize, Serialize};

/// Fraction of the radius an entity is pulled inside the surface after a
/// correction, so the next tick does not trigger again on rounding.
pub const CONTAINMENT_SKIN: f32 = 1.0e-3;

/// Sphere wrapping the playable area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryRegion {
    /// Center of the region
    pub anchor: Vec3,
    /// Radius of the region
    pub radius: f32,
}

impl Default for BoundaryRegion {
    fn default() -> Self {
        Self {
            anchor: Vec3::ZERO,
            radius: 40.0,
        }
    }
}

impl BoundaryRegion {
    /// Creates a region. Negative radii are treated as zero.
    #[must_use]
    pub fn new(anchor: Vec3, radius: f32) -> Self {
        Self {
            anchor,
            radius: radius.max(0.0),
        }
    }

    /// Whether a point lies strictly inside the region.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.distance(self.anchor) < self.radius
    }

    fn outward_normal(&self, point: Vec3) -> Vec3 {
        let offset = point - self.anchor;
        let len = offset.length();
        if len > NEAR_ZERO {
            offset / len
        } else {
            Vec3::Z
        }
    }

    fn surface_point(&self, normal: Vec3) -> Vec3 {
        self.anchor + normal * self.radius * (1.0 - CONTAINMENT_SKIN)
    }

    /// Returns `point` if it is inside, otherwise the nearest point just
    /// inside the surface.
    #[must_use]
    pub fn clamp_point(&self, point: Vec3) -> Vec3 {
        if self.contains(point) {
            point
        } else {
            self.surface_point(self.outward_normal(point))
        }
    }

    /// Corrects an entity at or beyond the surface.
    ///
    /// Cancels the outward component of `velocity` and moves `position` back
    /// just inside the surface. Returns whether a correction happened, which is
    /// the caller's cue to have the entity replan its wander.
    pub fn contain(&self, position: &mut Vec3, velocity: &mut Vec3) -> bool {
        if self.contains(*position) {
            return false;
        }

        let normal = self.outward_normal(*position);
        let outward = velocity.dot(normal);
        if outward > 0.0 {
            *velocity -= normal * outward;
        }
        *position = self.surface_point(normal);
        true
    }
}
