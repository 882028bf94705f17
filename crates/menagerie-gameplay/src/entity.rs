//! Entities and arena-based storage.

use menagerie_common::{EntityId, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attack::{AttackCooldown, AttackProfile};
use crate::behavior::{BehaviorTuning, Brain, BrainKind};
use crate::faction::Faction;
use crate::lifecycle::{LifecycleSettings, Vitals};
use crate::sensor::{LootSensor, ProximitySensor};
use crate::wander::WanderSettings;

/// Error types for entity operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntityError {
    /// Entity not found
    #[error("Entity not found: {0}")]
    NotFound(EntityId),
    /// Entity ID already in use
    #[error("Entity already exists: {0}")]
    AlreadyExists(EntityId),
    /// Same entity requested twice where two distinct ones are needed
    #[error("Entity aliased with itself: {0}")]
    Aliased(EntityId),
}

/// Result type for entity operations.
pub type EntityResult<T> = Result<T, EntityError>;

/// Position, facing and velocity on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    /// World position
    pub position: Vec3,
    /// Facing in radians, 0 = +Z
    pub yaw: f32,
    /// Velocity from the last movement step
    pub velocity: Vec3,
}

impl Kinematics {
    /// Creates kinematics at rest.
    #[must_use]
    pub const fn new(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            yaw,
            velocity: Vec3::ZERO,
        }
    }
}

/// Everything needed to spawn an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnParams {
    /// Side the entity fights for
    pub faction: Faction,
    /// Spawn position, also the wander anchor
    pub position: Vec3,
    /// Initial facing
    pub yaw: f32,
    /// Collider radius
    pub body_radius: f32,
    /// Target sensor radius
    pub sensor_radius: f32,
    /// Loot sensor radius, if the entity looks for loot
    pub loot_sensor_radius: Option<f32>,
    /// Health settings
    pub lifecycle: LifecycleSettings,
    /// Attack settings
    pub attack: AttackProfile,
    /// State machine variant, `None` for externally driven entities
    pub brain: Option<BrainKind>,
    /// State machine tuning
    pub tuning: BehaviorTuning,
    /// Wander tuning
    pub wander: WanderSettings,
}

impl SpawnParams {
    /// Defaults for a faction at a position, with no state machine.
    #[must_use]
    pub fn new(faction: Faction, position: Vec3) -> Self {
        Self {
            faction,
            position,
            yaw: 0.0,
            body_radius: 0.5,
            sensor_radius: 8.0,
            loot_sensor_radius: None,
            lifecycle: LifecycleSettings::default(),
            attack: AttackProfile::default(),
            brain: None,
            tuning: BehaviorTuning::default(),
            wander: WanderSettings::default(),
        }
    }

    /// A hostile creature.
    #[must_use]
    pub fn hostile(position: Vec3) -> Self {
        Self::new(Faction::Hostile, position).with_brain(BrainKind::Hostile)
    }

    /// An ally following `companion` and fetching loot.
    #[must_use]
    pub fn ally(position: Vec3, companion: EntityId) -> Self {
        Self::new(Faction::Ally, position)
            .with_brain(BrainKind::Ally { companion })
            .with_loot_sensor(6.0)
    }

    /// Sets the state machine.
    #[must_use]
    pub fn with_brain(mut self, brain: BrainKind) -> Self {
        self.brain = Some(brain);
        self
    }

    /// Sets the target sensor radius.
    #[must_use]
    pub fn with_sensor_radius(mut self, radius: f32) -> Self {
        self.sensor_radius = radius;
        self
    }

    /// Adds a loot sensor.
    #[must_use]
    pub fn with_loot_sensor(mut self, radius: f32) -> Self {
        self.loot_sensor_radius = Some(radius);
        self
    }

    /// Sets health settings.
    #[must_use]
    pub fn with_lifecycle(mut self, lifecycle: LifecycleSettings) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Sets the attack profile.
    #[must_use]
    pub fn with_attack(mut self, attack: AttackProfile) -> Self {
        self.attack = attack;
        self
    }

    /// Sets state machine tuning.
    #[must_use]
    pub fn with_tuning(mut self, tuning: BehaviorTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Sets wander tuning.
    #[must_use]
    pub fn with_wander(mut self, wander: WanderSettings) -> Self {
        self.wander = wander;
        self
    }
}

/// An entity in the simulation.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    faction: Faction,
    kinematics: Kinematics,
    home: Vec3,
    body_radius: f32,
    vitals: Vitals,
    attack: AttackCooldown,
    sensor: ProximitySensor,
    loot_sensor: Option<LootSensor>,
    brain: Option<Brain>,
    active: bool,
    walking: bool,
}

impl Entity {
    /// Builds an entity. `seed` feeds its wander RNG.
    #[must_use]
    pub fn new(id: EntityId, params: &SpawnParams, seed: u64) -> Self {
        let mask = params.faction.default_opponents();
        Self {
            id,
            faction: params.faction,
            kinematics: Kinematics::new(params.position, params.yaw),
            home: params.position,
            body_radius: params.body_radius.max(0.0),
            vitals: Vitals::new(id, &params.lifecycle),
            attack: AttackCooldown::new(params.attack.clone()),
            sensor: ProximitySensor::new(id, params.sensor_radius, mask),
            loot_sensor: params.loot_sensor_radius.map(LootSensor::new),
            brain: params
                .brain
                .map(|kind| Brain::new(kind, params.tuning, params.wander, seed)),
            active: true,
            walking: false,
        }
    }

    /// Returns the entity's unique ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's faction.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Returns the entity's world position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.kinematics.position
    }

    /// Position, facing and velocity.
    #[must_use]
    pub const fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    /// Mutable kinematics.
    pub fn kinematics_mut(&mut self) -> &mut Kinematics {
        &mut self.kinematics
    }

    /// Wander anchor.
    #[must_use]
    pub const fn home(&self) -> Vec3 {
        self.home
    }

    /// Collider radius.
    #[must_use]
    pub const fn body_radius(&self) -> f32 {
        self.body_radius
    }

    /// Health state.
    #[must_use]
    pub const fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    /// Mutable health state.
    pub fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    /// Whether the entity is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.vitals.is_alive()
    }

    /// Attack cooldown state.
    #[must_use]
    pub const fn attack(&self) -> &AttackCooldown {
        &self.attack
    }

    /// Mutable attack cooldown state.
    pub fn attack_mut(&mut self) -> &mut AttackCooldown {
        &mut self.attack
    }

    /// Target sensor.
    #[must_use]
    pub const fn sensor(&self) -> &ProximitySensor {
        &self.sensor
    }

    /// Mutable target sensor.
    pub fn sensor_mut(&mut self) -> &mut ProximitySensor {
        &mut self.sensor
    }

    /// Loot sensor, if any.
    #[must_use]
    pub const fn loot_sensor(&self) -> Option<&LootSensor> {
        self.loot_sensor.as_ref()
    }

    /// State machine, if any.
    #[must_use]
    pub const fn brain(&self) -> Option<&Brain> {
        self.brain.as_ref()
    }

    /// Mutable state machine.
    pub fn brain_mut(&mut self) -> Option<&mut Brain> {
        self.brain.as_mut()
    }

    /// Returns whether the entity is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enables or disables the entity.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether the entity takes part in this tick: active and alive.
    #[must_use]
    pub const fn is_participating(&self) -> bool {
        self.active && self.vitals.is_alive()
    }

    pub(crate) fn set_walking(&mut self, walking: bool) -> bool {
        let changed = self.walking != walking;
        self.walking = walking;
        changed
    }
}

/// Arena-based entity storage for efficient allocation and lookup.
///
/// Uses a free list for O(1) allocation and deallocation.
/// Entity lookup by ID uses a HashMap for O(1) access.
#[derive(Debug, Default)]
pub struct EntityArena {
    /// Storage slots for entities
    entities: Vec<Option<Entity>>,
    /// Free slot indices for reuse
    free_list: Vec<usize>,
    /// Map from EntityId to slot index for fast lookup
    id_to_index: std::collections::HashMap<EntityId, usize>,
}

impl EntityArena {
    /// Creates a new empty entity arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.id_to_index.len()
    }

    /// Returns true if the arena holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id_to_index.is_empty()
    }

    /// Returns the total capacity (including free slots).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entities.len()
    }

    /// Inserts an entity under its own ID.
    pub fn insert(&mut self, entity: Entity) -> EntityResult<EntityId> {
        let id = entity.id();
        if self.id_to_index.contains_key(&id) {
            return Err(EntityError::AlreadyExists(id));
        }

        let index = if let Some(free_index) = self.free_list.pop() {
            // Reuse a free slot
            self.entities[free_index] = Some(entity);
            free_index
        } else {
            // Allocate a new slot
            let index = self.entities.len();
            self.entities.push(Some(entity));
            index
        };

        self.id_to_index.insert(id, index);
        Ok(id)
    }

    /// Removes an entity by ID and returns it.
    pub fn remove(&mut self, id: EntityId) -> EntityResult<Entity> {
        let index = self
            .id_to_index
            .remove(&id)
            .ok_or(EntityError::NotFound(id))?;

        let entity = self.entities[index].take().ok_or(EntityError::NotFound(id))?;
        self.free_list.push(index);
        Ok(entity)
    }

    /// Gets a reference to an entity by ID.
    pub fn get(&self, id: EntityId) -> EntityResult<&Entity> {
        let index = self.id_to_index.get(&id).ok_or(EntityError::NotFound(id))?;

        self.entities[*index]
            .as_ref()
            .ok_or(EntityError::NotFound(id))
    }

    /// Gets a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> EntityResult<&mut Entity> {
        let index = self.id_to_index.get(&id).ok_or(EntityError::NotFound(id))?;

        self.entities[*index]
            .as_mut()
            .ok_or(EntityError::NotFound(id))
    }

    /// Gets mutable references to two distinct entities at once.
    pub fn get_pair_mut(
        &mut self,
        a: EntityId,
        b: EntityId,
    ) -> EntityResult<(&mut Entity, &mut Entity)> {
        if a == b {
            return Err(EntityError::Aliased(a));
        }
        let ia = *self.id_to_index.get(&a).ok_or(EntityError::NotFound(a))?;
        let ib = *self.id_to_index.get(&b).ok_or(EntityError::NotFound(b))?;

        let (first, second) = if ia < ib {
            let (left, right) = self.entities.split_at_mut(ib);
            (&mut left[ia], &mut right[0])
        } else {
            let (left, right) = self.entities.split_at_mut(ia);
            (&mut right[0], &mut left[ib])
        };

        match (first.as_mut(), second.as_mut()) {
            (Some(ea), Some(eb)) => Ok((ea, eb)),
            (None, _) => Err(EntityError::NotFound(a)),
            (_, None) => Err(EntityError::NotFound(b)),
        }
    }

    /// Checks if an entity with the given ID exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.id_to_index.contains_key(&id)
    }

    /// Returns an iterator over all entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter_map(|opt| opt.as_ref())
    }

    /// Returns a mutable iterator over all entities in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut().filter_map(|opt| opt.as_mut())
    }

    /// Returns an iterator over entities of one faction.
    pub fn iter_by_faction(&self, faction: Faction) -> impl Iterator<Item = &Entity> {
        self.iter().filter(move |e| e.faction() == faction)
    }

    /// Returns all entity IDs in slot order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(Entity::id).collect()
    }
}
