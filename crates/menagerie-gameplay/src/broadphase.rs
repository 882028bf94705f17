//! Broad-phase proximity detection.
//!
//! Bodies are bucketed into a uniform grid on the XZ plane. Each update the
//! tracker computes which sensor volumes overlap which bodies and diffs that
//! against the previous update to produce enter/exit events, the same shape of
//! notification a physics engine's trigger volumes would deliver.
//!
//! A body or sensor that disappears between updates is forgotten without an
//! exit event. Consumers have to tolerate that and liveness-check what they
//! hold.

use ahash::{AHashMap, AHashSet};
use menagerie_common::{EntityId, LootId, Vec3};
use serde::{Deserialize, Serialize};

/// Something a sensor can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Body {
    /// An entity's collider
    Entity(EntityId),
    /// A lootable on the ground
    Loot(LootId),
}

/// Which of an entity's sensors an event is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SensorKind {
    /// Opponent detection, reacts to entity bodies
    Target,
    /// Loot detection, reacts to loot bodies
    Loot,
}

impl SensorKind {
    fn detects(self, body: Body) -> bool {
        matches!(
            (self, body),
            (Self::Target, Body::Entity(_)) | (Self::Loot, Body::Loot(_))
        )
    }
}

/// Whether an overlap began or ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlapPhase {
    /// Body entered the sensor
    Enter,
    /// Body left the sensor
    Exit,
}

/// One enter or exit notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapEvent {
    /// Enter or exit
    pub phase: OverlapPhase,
    /// Sensor that fired
    pub sensor: SensorKind,
    /// Entity owning the sensor
    pub owner: EntityId,
    /// Body that entered or left
    pub other: Body,
}

/// A sensor volume for one update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorVolume {
    /// Owning entity
    pub owner: EntityId,
    /// Sensor kind
    pub kind: SensorKind,
    /// Center of the volume
    pub center: Vec3,
    /// Radius of the volume
    pub radius: f32,
}

/// A detectable body for one update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    /// Body identity
    pub body: Body,
    /// Center of the body
    pub center: Vec3,
    /// Radius of the body
    pub radius: f32,
}

/// Uniform grid over the XZ plane holding collider indices.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<usize>>,
    max_radius: f32,
}

impl SpatialGrid {
    /// Creates a grid. Cell sizes below 0.5 are raised to 0.5.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(0.5),
            cells: AHashMap::new(),
            max_radius: 0.0,
        }
    }

    fn cell_of(&self, x: f32, z: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (z / self.cell_size).floor() as i32,
        )
    }

    /// Removes every entry, keeping allocations.
    pub fn clear(&mut self) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        self.max_radius = 0.0;
    }

    /// Inserts a collider index at a position.
    pub fn insert(&mut self, index: usize, center: Vec3, radius: f32) {
        let cell = self.cell_of(center.x, center.z);
        self.cells.entry(cell).or_default().push(index);
        self.max_radius = self.max_radius.max(radius);
    }

    /// Collects every index whose cell could overlap a sphere, in ascending
    /// order.
    pub fn query(&self, center: Vec3, radius: f32, out: &mut Vec<usize>) {
        out.clear();
        let reach = radius + self.max_radius;
        let (min_x, min_z) = self.cell_of(center.x - reach, center.z - reach);
        let (max_x, max_z) = self.cell_of(center.x + reach, center.z + reach);
        for cx in min_x..=max_x {
            for cz in min_z..=max_z {
                if let Some(bucket) = self.cells.get(&(cx, cz)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
        out.sort_unstable();
    }
}

type Overlap = (EntityId, SensorKind, Body);

/// Turns per-update geometry into enter/exit events.
#[derive(Debug, Clone)]
pub struct OverlapTracker {
    grid: SpatialGrid,
    previous: Vec<Overlap>,
    previous_set: AHashSet<Overlap>,
    scratch: Vec<usize>,
}

impl OverlapTracker {
    /// Creates a tracker with the given grid cell size.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            grid: SpatialGrid::new(cell_size),
            previous: Vec::new(),
            previous_set: AHashSet::new(),
            scratch: Vec::new(),
        }
    }

    /// Number of overlaps recorded by the last update.
    #[must_use]
    pub fn overlap_count(&self) -> usize {
        self.previous.len()
    }

    /// Whether the last update saw `other` inside `owner`'s sensor.
    #[must_use]
    pub fn is_overlapping(&self, owner: EntityId, kind: SensorKind, other: Body) -> bool {
        self.previous_set.contains(&(owner, kind, other))
    }

    /// Computes this update's overlaps and returns the events since the last
    /// update.
    ///
    /// Exits are listed before enters. Within each group events follow sensor
    /// order, then collider order.
    pub fn update(
        &mut self,
        sensors: &[SensorVolume],
        colliders: &[Collider],
    ) -> Vec<OverlapEvent> {
        self.grid.clear();
        for (index, collider) in colliders.iter().enumerate() {
            self.grid.insert(index, collider.center, collider.radius);
        }

        let mut current = Vec::new();
        for sensor in sensors {
            self.grid.query(sensor.center, sensor.radius, &mut self.scratch);
            for &index in &self.scratch {
                let collider = &colliders[index];
                if collider.body == Body::Entity(sensor.owner)
                    || !sensor.kind.detects(collider.body)
                {
                    continue;
                }
                let reach = sensor.radius + collider.radius;
                if sensor.center.distance_squared(collider.center) <= reach * reach {
                    current.push((sensor.owner, sensor.kind, collider.body));
                }
            }
        }
        let current_set: AHashSet<Overlap> = current.iter().copied().collect();

        let live_sensors: AHashSet<(EntityId, SensorKind)> =
            sensors.iter().map(|s| (s.owner, s.kind)).collect();
        let live_bodies: AHashSet<Body> = colliders.iter().map(|c| c.body).collect();

        let exits = self
            .previous
            .iter()
            .filter(|overlap| !current_set.contains(*overlap))
            .filter(|(owner, kind, other)| {
                live_sensors.contains(&(*owner, *kind)) && live_bodies.contains(other)
            })
            .map(|&(owner, sensor, other)| OverlapEvent {
                phase: OverlapPhase::Exit,
                sensor,
                owner,
                other,
            });
        let enters = current
            .iter()
            .filter(|overlap| !self.previous_set.contains(*overlap))
            .map(|&(owner, sensor, other)| OverlapEvent {
                phase: OverlapPhase::Enter,
                sensor,
                owner,
                other,
            });
        let events = exits.chain(enters).collect();

        self.previous = current;
        self.previous_set = current_set;
        events
    }

    /// Drops every recorded overlap involving `body`, so the next update
    /// reports each sensor it is still inside as a fresh enter.
    pub fn forget_body(&mut self, body: Body) {
        self.forget(|&(_, _, other)| other == body);
    }

    /// Drops every recorded overlap of `owner`'s sensors, so the next update
    /// reports everything still in range as a fresh enter.
    pub fn forget_sensor(&mut self, owner: EntityId) {
        self.forget(|&(sensor, _, _)| sensor == owner);
    }

    fn forget(&mut self, matches: impl Fn(&Overlap) -> bool) {
        let before = self.previous.len();
        self.previous.retain(|overlap| !matches(overlap));
        if self.previous.len() != before {
            self.previous_set.retain(|overlap| !matches(overlap));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> EntityId {
        EntityId::from_raw(raw)
    }

    fn sensor(owner: u64, center: Vec3, radius: f32) -> SensorVolume {
        SensorVolume {
            owner: id(owner),
            kind: SensorKind::Target,
            center,
            radius,
        }
    }

    fn entity(raw: u64, center: Vec3) -> Collider {
        Collider {
            body: Body::Entity(id(raw)),
            center,
            radius: 0.5,
        }
    }

    #[test]
    fn test_enter_then_exit() {
        let mut tracker = OverlapTracker::new(4.0);
        let sensors = [sensor(1, Vec3::ZERO, 5.0)];

        let near = [entity(1, Vec3::ZERO), entity(2, Vec3::new(3.0, 0.0, 0.0))];
        let events = tracker.update(&sensors, &near);
        assert_eq!(
            events,
            vec![OverlapEvent {
                phase: OverlapPhase::Enter,
                sensor: SensorKind::Target,
                owner: id(1),
                other: Body::Entity(id(2)),
            }]
        );

        let still_near = [entity(1, Vec3::ZERO), entity(2, Vec3::new(3.5, 0.0, 0.0))];
        let events = tracker.update(&sensors, &still_near);
        assert!(events.is_empty());

        let gone = [entity(1, Vec3::ZERO), entity(2, Vec3::new(20.0, 0.0, 0.0))];
        let events = tracker.update(&sensors, &gone);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].phase, OverlapPhase::Exit);
    }

    #[test]
    fn test_vanished_body_has_no_exit() {
        let mut tracker = OverlapTracker::new(4.0);
        let sensors = [sensor(1, Vec3::ZERO, 5.0)];

        tracker.update(&sensors, &[entity(2, Vec3::X)]);
        assert!(tracker.is_overlapping(id(1), SensorKind::Target, Body::Entity(id(2))));

        let events = tracker.update(&sensors, &[]);
        assert!(events.is_empty());
        assert_eq!(tracker.overlap_count(), 0);
    }

    #[test]
    fn test_sensor_kinds_filter_bodies() {
        let mut tracker = OverlapTracker::new(4.0);
        let sensors = [SensorVolume {
            owner: id(1),
            kind: SensorKind::Loot,
            center: Vec3::ZERO,
            radius: 3.0,
        }];
        let colliders = [
            entity(2, Vec3::X),
            Collider {
                body: Body::Loot(LootId::new(7)),
                center: Vec3::Z,
                radius: 0.0,
            },
        ];

        let events = tracker.update(&sensors, &colliders);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].other, Body::Loot(LootId::new(7)));
    }

    #[test]
    fn test_matches_brute_force_across_cells() {
        let mut tracker = OverlapTracker::new(2.0);
        let mut rng = fastrand::Rng::with_seed(11);
        let colliders: Vec<Collider> = (1..=40)
            .map(|raw| {
                let position = Vec3::new(rng.f32() * 40.0 - 20.0, 0.0, rng.f32() * 40.0 - 20.0);
                entity(raw, position)
            })
            .collect();
        let sensors: Vec<SensorVolume> = colliders
            .iter()
            .take(10)
            .enumerate()
            .map(|(i, c)| sensor(i as u64 + 1, c.center, 6.0))
            .collect();

        let events = tracker.update(&sensors, &colliders);

        let mut expected = 0;
        for s in &sensors {
            for c in &colliders {
                if c.body != Body::Entity(s.owner)
                    && s.center.distance(c.center) <= s.radius + c.radius
                {
                    expected += 1;
                }
            }
        }
        assert_eq!(events.len(), expected);
    }

    #[test]
    fn test_forgotten_body_enters_again() {
        let mut tracker = OverlapTracker::new(4.0);
        let sensors = [sensor(1, Vec3::ZERO, 5.0), sensor(3, Vec3::Z, 5.0)];
        let colliders = [entity(2, Vec3::X), entity(4, Vec3::NEG_X)];

        assert_eq!(tracker.update(&sensors, &colliders).len(), 4);
        assert!(tracker.update(&sensors, &colliders).is_empty());

        tracker.forget_body(Body::Entity(id(2)));
        assert!(!tracker.is_overlapping(id(1), SensorKind::Target, Body::Entity(id(2))));
        assert!(tracker.is_overlapping(id(1), SensorKind::Target, Body::Entity(id(4))));

        let events = tracker.update(&sensors, &colliders);
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|e| e.phase == OverlapPhase::Enter && e.other == Body::Entity(id(2))));
    }

    #[test]
    fn test_forgotten_sensor_enters_again() {
        let mut tracker = OverlapTracker::new(4.0);
        let sensors = [sensor(1, Vec3::ZERO, 5.0), sensor(3, Vec3::Z, 5.0)];
        let colliders = [entity(2, Vec3::X)];

        assert_eq!(tracker.update(&sensors, &colliders).len(), 2);
        tracker.forget_sensor(id(1));
        assert_eq!(tracker.overlap_count(), 1);

        let events = tracker.update(&sensors, &colliders);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].owner, id(1));
        assert_eq!(events[0].phase, OverlapPhase::Enter);
    }
}
