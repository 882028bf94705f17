//! Proximity sensors: the per-entity target set and the loot sensor.
//!
//! A sensor only reacts to enter/exit notifications. Where those come from
//! (the broad phase in [`crate::broadphase`], or a physics engine) is not its
//! concern.

use menagerie_common::{EntityId, LootId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::faction::{DetectionMask, Faction};

/// Opposing entities currently in range of one sensor.
///
/// Set semantics with stable insertion order, so iteration (and therefore
/// tie-breaking between equally near targets) does not change frame to frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSet {
    members: Vec<EntityId>,
}

impl TargetSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity. Returns false if it was already present.
    pub fn insert(&mut self, id: EntityId) -> bool {
        if self.members.contains(&id) {
            false
        } else {
            self.members.push(id);
            true
        }
    }

    /// Removes an entity. Returns whether it was present.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != id);
        self.members.len() != before
    }

    /// Whether the entity is tracked.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    /// Number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Tracked entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.iter().copied()
    }

    /// Keeps only the entities the predicate accepts. Returns how many were
    /// removed.
    pub fn retain(&mut self, mut keep: impl FnMut(EntityId) -> bool) -> usize {
        let before = self.members.len();
        self.members.retain(|m| keep(*m));
        before - self.members.len()
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.members.clear();
    }
}

/// What a sensor knows about a body that just entered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorCandidate {
    /// Owning entity of the body
    pub id: EntityId,
    /// Faction of that entity
    pub faction: Faction,
    /// Whether that entity is alive
    pub alive: bool,
}

/// Per-entity trigger volume that maintains a [`TargetSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximitySensor {
    owner: EntityId,
    radius: f32,
    mask: DetectionMask,
    targets: TargetSet,
}

impl ProximitySensor {
    /// Creates a sensor for `owner` detecting the layers in `mask`.
    #[must_use]
    pub fn new(owner: EntityId, radius: f32, mask: DetectionMask) -> Self {
        Self {
            owner,
            radius: radius.max(0.0),
            mask,
            targets: TargetSet::new(),
        }
    }

    /// Sensor radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Layers this sensor detects.
    #[must_use]
    pub const fn mask(&self) -> DetectionMask {
        self.mask
    }

    /// Current target set.
    #[must_use]
    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    /// Mutable access to the target set.
    pub fn targets_mut(&mut self) -> &mut TargetSet {
        &mut self.targets
    }

    /// A body entered the volume.
    ///
    /// `None` means the body resolved to no entity. The candidate is added
    /// only if it is alive, is not the owner and its faction is in the mask.
    pub fn on_enter(&mut self, candidate: Option<SensorCandidate>) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };
        if candidate.id == self.owner
            || !candidate.alive
            || !self.mask.contains(candidate.faction)
        {
            return false;
        }
        self.targets.insert(candidate.id)
    }

    /// A body left the volume. Removal does not depend on liveness.
    pub fn on_exit(&mut self, id: EntityId) -> bool {
        self.targets.remove(id)
    }

    /// Drops every target the liveness check rejects.
    pub fn prune(&mut self, mut is_valid: impl FnMut(EntityId) -> bool) -> usize {
        let owner = self.owner;
        self.targets.retain(|id| {
            let keep = is_valid(id);
            if !keep {
                debug!(owner = %owner, target = %id, "pruned stale target");
            }
            keep
        })
    }
}

/// Trigger volume that spots lootables for an ally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LootSensor {
    radius: f32,
}

impl LootSensor {
    /// Creates a loot sensor.
    #[must_use]
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.max(0.0),
        }
    }

    /// Sensor radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }
}

/// Notification a loot sensor hands to its owner's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LootNotice {
    /// Lootable came into view
    Sighted(LootId),
    /// Lootable left view
    Lost(LootId),
}
