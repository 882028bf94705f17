//! The simulation driver.
//!
//! A [`World`] owns every entity and runs the per-frame pipeline:
//!
//! 1. advance the game clock
//! 2. broad phase: compute overlaps and dispatch enter/exit to sensors
//! 3. boundary containment (forces a wander replan on correction)
//! 4. per entity: prune stale targets, think, steer, attack, handle loot
//! 5. settle: drop dead or missing entries from every target set
//! 6. remove corpses whose despawn delay has elapsed
//!
//! Everything is single-threaded and synchronous. A failure on one entity
//! (missing companion, vanished target, full event queue) is absorbed and the
//! remaining entities still run.

use ahash::AHashSet;
use menagerie_common::{EntityId, IdAllocator, LootId, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::attack;
use crate::behavior::{steer, BehaviorState, Brain, Perception};
use crate::boundary::BoundaryRegion;
use crate::broadphase::{
    Body, Collider, OverlapEvent, OverlapPhase, OverlapTracker, SensorKind, SensorVolume,
};
use crate::entity::{Entity, EntityArena, EntityResult, SpawnParams};
use crate::events::{GameEvent, Subscription};
use crate::loot::LootField;
use crate::presentation::Services;
use crate::sensor::{LootNotice, SensorCandidate};

/// World construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Broad-phase grid cell size
    pub cell_size: f32,
    /// Play area, `None` for an unbounded world
    pub boundary: Option<BoundaryRegion>,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            cell_size: 8.0,
            boundary: Some(BoundaryRegion::default()),
        }
    }
}

impl WorldSettings {
    /// Sets the play area.
    #[must_use]
    pub fn with_boundary(mut self, boundary: Option<BoundaryRegion>) -> Self {
        self.boundary = boundary;
        self
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Enter/exit events dispatched
    pub overlap_events: usize,
    /// Entities pushed back inside the boundary
    pub contained: usize,
    /// Attacks that passed the cooldown gate
    pub attacks: usize,
    /// Deaths caused during the tick
    pub deaths: usize,
    /// Stale target-set entries removed
    pub pruned: usize,
    /// Corpses removed
    pub despawned: usize,
}

/// Owns all simulation state for one play session.
#[derive(Debug)]
pub struct World {
    services: Services,
    arena: EntityArena,
    ids: IdAllocator,
    boundary: Option<BoundaryRegion>,
    tracker: OverlapTracker,
    loot: LootField,
    seeds: fastrand::Rng,
    clock: f64,
    tick_count: u64,
}

impl World {
    /// Creates an empty world. `seed` drives every entity's wander RNG.
    #[must_use]
    pub fn new(services: Services, settings: WorldSettings, seed: u64) -> Self {
        Self {
            services,
            arena: EntityArena::new(),
            ids: IdAllocator::new(),
            boundary: settings.boundary,
            tracker: OverlapTracker::new(settings.cell_size),
            loot: LootField::new(),
            seeds: fastrand::Rng::with_seed(seed),
            clock: 0.0,
            tick_count: 0,
        }
    }

    /// Shared services.
    #[must_use]
    pub const fn services(&self) -> &Services {
        &self.services
    }

    /// Mutable shared services.
    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    /// Subscribes to world events.
    pub fn subscribe(&mut self, capacity: usize) -> Subscription {
        self.services.events.subscribe(capacity)
    }

    /// Game time in seconds.
    #[must_use]
    pub const fn now(&self) -> f64 {
        self.clock
    }

    /// Number of ticks run.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Play area.
    #[must_use]
    pub const fn boundary(&self) -> Option<&BoundaryRegion> {
        self.boundary.as_ref()
    }

    /// Entity storage.
    #[must_use]
    pub const fn entities(&self) -> &EntityArena {
        &self.arena
    }

    /// Raw mutable entity storage.
    ///
    /// Changes made here bypass the world's bookkeeping: an entity removed
    /// through it stays in other target sets until they are pruned.
    pub fn entities_mut(&mut self) -> &mut EntityArena {
        &mut self.arena
    }

    /// Looks up an entity.
    pub fn entity(&self, id: EntityId) -> EntityResult<&Entity> {
        self.arena.get(id)
    }

    /// Lootables in the world.
    #[must_use]
    pub const fn loot(&self) -> &LootField {
        &self.loot
    }

    /// Spawns an entity.
    pub fn spawn(&mut self, params: &SpawnParams) -> EntityResult<EntityId> {
        let id = self.ids.next_entity();
        let entity = Entity::new(id, params, self.seeds.u64(..));
        self.arena.insert(entity)?;
        debug!(entity = %id, faction = ?params.faction, "spawned");
        Ok(id)
    }

    /// Removes an entity, drops what it carried and purges it from every
    /// target set.
    pub fn despawn(&mut self, id: EntityId) -> EntityResult<Entity> {
        let entity = self.arena.remove(id)?;
        if let Some(loot) = entity.brain().and_then(Brain::carrying) {
            self.loot.release(loot, entity.position());
        }
        self.purge_from_targets(id);
        self.services.events.publish(GameEvent::Despawned { entity: id });
        debug!(entity = %id, "despawned");
        Ok(entity)
    }

    /// Enables or disables an entity. A disabled entity stops thinking at
    /// once and disappears from every target set.
    pub fn set_active(&mut self, id: EntityId, active: bool) -> EntityResult<()> {
        let entity = self.arena.get_mut(id)?;
        if entity.is_active() == active {
            return Ok(());
        }
        entity.set_active(active);
        if !active {
            entity.kinematics_mut().velocity = Vec3::ZERO;
            if entity.set_walking(false) {
                self.services.set_walking(id, false);
            }
            self.purge_from_targets(id);
        }
        debug!(entity = %id, active, "activity changed");
        Ok(())
    }

    /// Damages an entity. Returns whether its health changed.
    pub fn apply_damage(
        &mut self,
        id: EntityId,
        amount: f32,
        source: Option<EntityId>,
    ) -> EntityResult<bool> {
        let entity = self.arena.get_mut(id)?;
        let was_alive = entity.is_alive();
        let changed = entity.vitals_mut().take_damage(amount, source, &mut self.services);
        if was_alive && !entity.is_alive() {
            self.handle_death(id);
        }
        Ok(changed)
    }

    /// Heals an entity. Returns whether its health increased.
    pub fn heal(&mut self, id: EntityId, amount: f32) -> EntityResult<bool> {
        let entity = self.arena.get_mut(id)?;
        Ok(entity.vitals_mut().heal(amount, &mut self.services))
    }

    /// Kills an entity outright. Returns whether this call killed it.
    pub fn kill(&mut self, id: EntityId) -> EntityResult<bool> {
        let entity = self.arena.get_mut(id)?;
        let killed = entity.vitals_mut().die(&mut self.services);
        if killed {
            self.handle_death(id);
        }
        Ok(killed)
    }

    /// Revives a dead entity at `fraction` of its max health and restarts its
    /// state machine. Returns whether it was revived.
    pub fn revive(&mut self, id: EntityId, fraction: f32) -> EntityResult<bool> {
        let entity = self.arena.get_mut(id)?;
        if !entity.vitals_mut().revive(fraction, &mut self.services) {
            return Ok(false);
        }
        entity.attack_mut().reset();
        entity.sensor_mut().targets_mut().clear();
        if let Some(brain) = entity.brain_mut() {
            let from = brain.state();
            brain.reset();
            let to = brain.state();
            self.services
                .events
                .publish(GameEvent::BehaviorChanged { entity: id, from, to });
        }
        self.tracker.forget_sensor(id);
        Ok(true)
    }

    /// Changes an entity's max health.
    pub fn set_max_health(
        &mut self,
        id: EntityId,
        max_health: f32,
        rescale_current: bool,
    ) -> EntityResult<()> {
        self.arena
            .get_mut(id)?
            .vitals_mut()
            .set_max_health(max_health, rescale_current);
        Ok(())
    }

    /// Requests one attack outside the state machines. Returns whether it
    /// landed.
    pub fn try_attack(&mut self, attacker: EntityId, target: EntityId) -> EntityResult<bool> {
        let (a, t) = self.arena.get_pair_mut(attacker, target)?;
        if !a.is_active() || !t.is_active() {
            return Ok(false);
        }
        let was_alive = t.is_alive();
        let landed = attack::try_attack(a, t, self.clock, &mut self.services);
        if was_alive && !t.is_alive() {
            self.handle_death(target);
        }
        Ok(landed)
    }

    /// Drops a lootable on the ground.
    pub fn add_loot(&mut self, position: Vec3) -> LootId {
        let id = self.ids.next_loot();
        self.loot.add(id, position);
        id
    }

    /// Takes a lootable out of the world (collected by the player, expired).
    pub fn remove_loot(&mut self, id: LootId) -> bool {
        self.loot.remove(id).is_some()
    }

    /// Runs one frame.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += f64::from(dt);
        self.tick_count += 1;

        let mut report = TickReport {
            overlap_events: self.run_broadphase(),
            contained: self.contain(),
            ..TickReport::default()
        };

        for id in self.arena.ids() {
            self.update_entity(id, dt, &mut report);
        }

        report.pruned += self.settle();
        report.despawned = self.sweep_corpses(dt);
        trace!(tick = self.tick_count, ?report, "tick");
        report
    }

    fn run_broadphase(&mut self) -> usize {
        let mut sensors = Vec::new();
        let mut colliders = Vec::new();
        for entity in self.arena.iter().filter(|e| e.is_participating()) {
            colliders.push(Collider {
                body: Body::Entity(entity.id()),
                center: entity.position(),
                radius: entity.body_radius(),
            });
            if !entity.sensor().mask().is_empty() {
                sensors.push(SensorVolume {
                    owner: entity.id(),
                    kind: SensorKind::Target,
                    center: entity.position(),
                    radius: entity.sensor().radius(),
                });
            }
            if let Some(loot_sensor) = entity.loot_sensor() {
                sensors.push(SensorVolume {
                    owner: entity.id(),
                    kind: SensorKind::Loot,
                    center: entity.position(),
                    radius: loot_sensor.radius(),
                });
            }
        }
        colliders.extend(self.loot.available().map(|loot| Collider {
            body: Body::Loot(loot.id),
            center: loot.position,
            radius: 0.0,
        }));

        let events = self.tracker.update(&sensors, &colliders);
        for event in &events {
            self.dispatch_overlap(event);
        }
        events.len()
    }

    fn dispatch_overlap(&mut self, event: &OverlapEvent) {
        match (event.sensor, event.other) {
            (SensorKind::Target, Body::Entity(other)) => {
                let candidate = self.arena.get(other).ok().map(|e| SensorCandidate {
                    id: e.id(),
                    faction: e.faction(),
                    alive: e.is_participating(),
                });
                let Ok(owner) = self.arena.get_mut(event.owner) else {
                    return;
                };
                match event.phase {
                    OverlapPhase::Enter => owner.sensor_mut().on_enter(candidate),
                    OverlapPhase::Exit => owner.sensor_mut().on_exit(other),
                };
            },
            (SensorKind::Loot, Body::Loot(loot)) => {
                let notice = match event.phase {
                    OverlapPhase::Enter => LootNotice::Sighted(loot),
                    OverlapPhase::Exit => LootNotice::Lost(loot),
                };
                if let Some(brain) = self
                    .arena
                    .get_mut(event.owner)
                    .ok()
                    .and_then(Entity::brain_mut)
                {
                    brain.notify_loot(notice);
                }
            },
            _ => {},
        }
    }

    fn contain(&mut self) -> usize {
        let Some(region) = self.boundary else {
            return 0;
        };
        let mut corrected = 0;
        for entity in self.arena.iter_mut().filter(|e| e.is_participating()) {
            let kinematics = entity.kinematics_mut();
            if !region.contain(&mut kinematics.position, &mut kinematics.velocity) {
                continue;
            }
            corrected += 1;
            debug!(entity = %entity.id(), "contained at boundary");
            if let Some(brain) = entity.brain_mut() {
                brain.force_new_waypoint();
            }
        }
        corrected
    }

    fn update_entity(&mut self, id: EntityId, dt: f32, report: &mut TickReport) {
        let Ok(entity) = self.arena.get(id) else {
            return;
        };
        let Some(brain) = entity.brain() else {
            return;
        };
        if !entity.is_participating() {
            return;
        }

        let mut targets = Vec::new();
        let mut stale = Vec::new();
        for target in entity.sensor().targets().iter() {
            match self.arena.get(target) {
                Ok(other) if other.is_participating() => targets.push((target, other.position())),
                _ => stale.push(target),
            }
        }
        let companion = brain
            .kind()
            .companion()
            .and_then(|c| self.arena.get(c).ok())
            .filter(|c| c.is_participating())
            .map(Entity::position);
        let position = entity.position();
        let home = entity.home();

        let Ok(entity) = self.arena.get_mut(id) else {
            return;
        };
        if !stale.is_empty() {
            report.pruned += entity.sensor_mut().prune(|t| !stale.contains(&t));
        }

        let Some(brain) = entity.brain_mut() else {
            return;
        };
        let before = brain.state();
        let turn_rate = brain.tuning().turn_rate;
        let directive = brain.think(&Perception {
            position,
            home,
            alive: true,
            dt,
            targets: &targets,
            companion,
            loot: &self.loot,
            bounds: self.boundary.as_ref(),
        });

        let walking = steer(entity.kinematics_mut(), &directive, turn_rate, dt);
        if entity.set_walking(walking) {
            self.services.set_walking(id, walking);
        }

        if let Some(loot) = directive.pickup {
            self.pick_up(id, loot);
        }
        if let Some(loot) = directive.deliver {
            self.deliver(id, loot);
        }
        if let Some(target) = directive.attack {
            if let Ok(true) = self.try_attack(id, target) {
                report.attacks += 1;
                if self.arena.get(target).is_ok_and(|t| !t.is_alive()) {
                    report.deaths += 1;
                }
            }
        }

        let after = self
            .arena
            .get(id)
            .ok()
            .and_then(Entity::brain)
            .map(Brain::state);
        if let Some(after) = after.filter(|after| *after != before) {
            self.services.events.publish(GameEvent::BehaviorChanged {
                entity: id,
                from: before,
                to: after,
            });
        }
    }

    fn pick_up(&mut self, id: EntityId, loot: LootId) {
        let claimed = self.loot.claim(loot, id);
        let Some(brain) = self.arena.get_mut(id).ok().and_then(Entity::brain_mut) else {
            return;
        };
        if claimed {
            brain.confirm_pickup(loot);
            self.services
                .events
                .publish(GameEvent::LootPickedUp { entity: id, loot });
        } else {
            brain.abandon_loot(loot);
        }
    }

    fn deliver(&mut self, id: EntityId, loot: LootId) {
        let Some(brain) = self.arena.get_mut(id).ok().and_then(Entity::brain_mut) else {
            return;
        };
        if brain.confirm_delivery() == Some(loot) {
            self.loot.remove(loot);
            self.services
                .events
                .publish(GameEvent::LootDelivered { entity: id, loot });
        }
    }

    /// Bookkeeping after an entity's vitals went from alive to dead.
    fn handle_death(&mut self, id: EntityId) {
        if let Ok(entity) = self.arena.get_mut(id) {
            let position = entity.position();
            entity.kinematics_mut().velocity = Vec3::ZERO;
            if entity.set_walking(false) {
                self.services.set_walking(id, false);
            }
            entity.sensor_mut().targets_mut().clear();
            if let Some(brain) = entity.brain_mut() {
                let from = brain.state();
                if let Some(loot) = brain.mark_dead() {
                    self.loot.release(loot, position);
                }
                if from != BehaviorState::Dead {
                    self.services.events.publish(GameEvent::BehaviorChanged {
                        entity: id,
                        from,
                        to: BehaviorState::Dead,
                    });
                }
            }
        }
        self.tracker.forget_sensor(id);
        self.purge_from_targets(id);
    }

    /// Removes `id` from every target set. The tracker forgets its overlaps
    /// too, so sensors it is still inside see it enter again once it is back.
    fn purge_from_targets(&mut self, id: EntityId) {
        for entity in self.arena.iter_mut() {
            entity.sensor_mut().targets_mut().remove(id);
        }
        self.tracker.forget_body(Body::Entity(id));
    }

    fn settle(&mut self) -> usize {
        let live: AHashSet<EntityId> = self
            .arena
            .iter()
            .filter(|e| e.is_participating())
            .map(Entity::id)
            .collect();
        self.arena
            .iter_mut()
            .map(|e| e.sensor_mut().prune(|t| live.contains(&t)))
            .sum()
    }

    fn sweep_corpses(&mut self, dt: f32) -> usize {
        let expired: Vec<EntityId> = self
            .arena
            .iter_mut()
            .filter_map(|e| e.vitals_mut().tick_corpse(dt).then(|| e.id()))
            .collect();
        expired
            .into_iter()
            .filter(|id| self.despawn(*id).is_ok())
            .count()
    }
}
