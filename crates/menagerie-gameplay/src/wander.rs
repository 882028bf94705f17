//! Random idle destinations.

use std::f32::consts::TAU;

use menagerie_common::{flatten, planar_distance, Vec3, NEAR_ZERO};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::boundary::{BoundaryRegion, CONTAINMENT_SKIN};

/// Random picks tried before falling back to sampling the in-bounds arc.
pub const MAX_WAYPOINT_ATTEMPTS: usize = 8;

/// Wander tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderSettings {
    /// Minimum waypoint distance from the anchor
    pub min_radius: f32,
    /// Maximum waypoint distance from the anchor
    pub max_radius: f32,
    /// Distance at which a waypoint counts as reached
    pub arrival_tolerance: f32,
    /// Seconds before an unreached waypoint is re-rolled
    pub replan_timeout: f32,
}

impl Default for WanderSettings {
    fn default() -> Self {
        Self {
            min_radius: 3.0,
            max_radius: 8.0,
            arrival_tolerance: 0.5,
            replan_timeout: 6.0,
        }
    }
}

impl WanderSettings {
    /// Sets the radius bounds.
    #[must_use]
    pub fn with_radii(mut self, min_radius: f32, max_radius: f32) -> Self {
        self.min_radius = min_radius;
        self.max_radius = max_radius;
        self
    }

    /// Sets the re-roll timeout.
    #[must_use]
    pub fn with_replan_timeout(mut self, timeout: f32) -> Self {
        self.replan_timeout = timeout;
        self
    }

    /// Radius bounds ordered and made non-negative.
    #[must_use]
    pub fn radii(&self) -> (f32, f32) {
        let a = self.min_radius.max(0.0);
        let b = self.max_radius.max(0.0);
        (a.min(b), a.max(b))
    }
}

/// Returns a point at a random angle and a random distance in
/// `[min_radius, max_radius]` from `anchor` on the anchor's ground plane.
pub fn pick_waypoint(
    rng: &mut fastrand::Rng,
    anchor: Vec3,
    min_radius: f32,
    max_radius: f32,
) -> Vec3 {
    let angle = rng.f32() * TAU;
    let distance = min_radius + rng.f32() * (max_radius - min_radius);
    anchor + Vec3::new(angle.sin(), 0.0, angle.cos()) * distance
}

/// Samples the part of the `[min_radius, max_radius]` ring around `anchor`
/// that lies inside `region`, on the anchor's ground plane.
///
/// Returns `None` when the ring and the region do not meet.
pub fn pick_waypoint_within(
    rng: &mut fastrand::Rng,
    anchor: Vec3,
    min_radius: f32,
    max_radius: f32,
    region: &BoundaryRegion,
) -> Option<Vec3> {
    // The region's slice through the ground plane is a disk around `center`.
    let reach = region.radius * (1.0 - CONTAINMENT_SKIN);
    let height = anchor.y - region.anchor.y;
    let disk_sq = reach * reach - height * height;
    if disk_sq <= 0.0 {
        return None;
    }
    let disk = disk_sq.sqrt();
    let center = Vec3::new(region.anchor.x, anchor.y, region.anchor.z);

    let offset = flatten(center - anchor);
    let gap = offset.length();
    let near = min_radius.max(gap - disk);
    let far = max_radius.min(gap + disk);
    if near > far {
        return None;
    }
    let distance = near + rng.f32() * (far - near);

    if gap <= NEAR_ZERO {
        let angle = rng.f32() * TAU;
        return Some(anchor + Vec3::new(angle.sin(), 0.0, angle.cos()) * distance);
    }

    // Law of cosines: the waypoint stays inside the disk while its bearing is
    // within `spread` of the bearing toward the center.
    let toward = offset.x.atan2(offset.z);
    let cos_spread = if distance <= NEAR_ZERO {
        -1.0
    } else {
        (gap * gap + distance * distance - disk_sq) / (2.0 * gap * distance)
    };
    let spread = cos_spread.clamp(-1.0, 1.0).acos();
    let angle = toward + (rng.f32() * 2.0 - 1.0) * spread;
    let pick = anchor + Vec3::new(angle.sin(), 0.0, angle.cos()) * distance;

    if region.contains(pick) {
        Some(pick)
    } else {
        // Rounding at the arc's edge; the bearing toward the center is always
        // inside for this distance.
        Some(anchor + Vec3::new(toward.sin(), 0.0, toward.cos()) * distance)
    }
}

/// Holds one entity's current wander destination.
#[derive(Debug)]
pub struct WanderPlanner {
    settings: WanderSettings,
    rng: fastrand::Rng,
    waypoint: Option<Vec3>,
    elapsed: f32,
    forced: bool,
}

impl WanderPlanner {
    /// Creates a planner with its own seeded RNG.
    #[must_use]
    pub fn new(settings: WanderSettings, seed: u64) -> Self {
        Self {
            settings,
            rng: fastrand::Rng::with_seed(seed),
            waypoint: None,
            elapsed: 0.0,
            forced: false,
        }
    }

    /// Tuning in use.
    #[must_use]
    pub const fn settings(&self) -> &WanderSettings {
        &self.settings
    }

    /// Current waypoint, if one has been picked.
    #[must_use]
    pub const fn waypoint(&self) -> Option<Vec3> {
        self.waypoint
    }

    /// Makes the next update pick a fresh waypoint regardless of progress.
    pub fn force_new_waypoint(&mut self) {
        self.forced = true;
    }

    /// Picks a waypoint around `anchor` that `bounds` accepts.
    ///
    /// Retries up to [`MAX_WAYPOINT_ATTEMPTS`] times, then samples only the
    /// in-bounds arc of the ring. The waypoint leaves the ring only when the
    /// ring lies entirely outside the region; it is clamped to the surface
    /// then.
    pub fn replan(&mut self, anchor: Vec3, bounds: Option<&BoundaryRegion>) -> Vec3 {
        let (min, max) = self.settings.radii();
        let mut pick = pick_waypoint(&mut self.rng, anchor, min, max);
        if let Some(region) = bounds {
            let mut attempts = 1;
            while !region.contains(pick) && attempts < MAX_WAYPOINT_ATTEMPTS {
                pick = pick_waypoint(&mut self.rng, anchor, min, max);
                attempts += 1;
            }
            if !region.contains(pick) {
                pick = pick_waypoint_within(&mut self.rng, anchor, min, max, region)
                    .unwrap_or_else(|| region.clamp_point(pick));
            }
        }

        trace!(?pick, "new wander waypoint");
        self.waypoint = Some(pick);
        self.elapsed = 0.0;
        self.forced = false;
        pick
    }

    /// Advances the planner and returns the waypoint to steer toward.
    ///
    /// Replans when there is no waypoint yet, when it was reached, when the
    /// timeout elapsed, or when a replan was forced.
    pub fn update(
        &mut self,
        position: Vec3,
        anchor: Vec3,
        dt: f32,
        bounds: Option<&BoundaryRegion>,
    ) -> Vec3 {
        self.elapsed += dt.max(0.0);

        match self.waypoint {
            Some(waypoint)
                if !self.forced
                    && self.elapsed < self.settings.replan_timeout
                    && planar_distance(position, waypoint) > self.settings.arrival_tolerance =>
            {
                waypoint
            },
            _ => self.replan(anchor, bounds),
        }
    }
}
