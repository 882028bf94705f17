//! Lootables lying in the world and who is carrying them.

use menagerie_common::{EntityId, LootId, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One lootable object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lootable {
    /// Loot ID
    pub id: LootId,
    /// Where it lies (or was last dropped)
    pub position: Vec3,
    /// Entity currently carrying it
    pub carrier: Option<EntityId>,
}

impl Lootable {
    /// Whether it lies on the ground waiting to be picked up.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.carrier.is_none()
    }
}

/// Registry of every lootable in a world.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LootField {
    items: Vec<Lootable>,
}

impl LootField {
    /// Creates an empty field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a lootable on the ground.
    pub fn add(&mut self, id: LootId, position: Vec3) {
        self.remove(id);
        self.items.push(Lootable {
            id,
            position,
            carrier: None,
        });
    }

    /// Removes a lootable entirely.
    pub fn remove(&mut self, id: LootId) -> Option<Lootable> {
        let index = self.items.iter().position(|l| l.id == id)?;
        Some(self.items.remove(index))
    }

    /// Looks up a lootable.
    #[must_use]
    pub fn get(&self, id: LootId) -> Option<&Lootable> {
        self.items.iter().find(|l| l.id == id)
    }

    /// Whether a lootable exists and nobody carries it.
    #[must_use]
    pub fn is_available(&self, id: LootId) -> bool {
        self.get(id).is_some_and(Lootable::is_available)
    }

    /// Hands an available lootable to `carrier`. Returns false if it is gone
    /// or already carried.
    pub fn claim(&mut self, id: LootId, carrier: EntityId) -> bool {
        match self.items.iter_mut().find(|l| l.id == id) {
            Some(item) if item.is_available() => {
                item.carrier = Some(carrier);
                debug!(loot = id.raw(), carrier = %carrier, "loot claimed");
                true
            },
            _ => false,
        }
    }

    /// Drops a carried lootable back on the ground at `position`.
    pub fn release(&mut self, id: LootId, position: Vec3) -> bool {
        match self.items.iter_mut().find(|l| l.id == id) {
            Some(item) if item.carrier.is_some() => {
                item.carrier = None;
                item.position = position;
                true
            },
            _ => false,
        }
    }

    /// Lootables lying on the ground.
    pub fn available(&self) -> impl Iterator<Item = &Lootable> {
        self.items.iter().filter(|l| l.is_available())
    }

    /// Every lootable.
    pub fn iter(&self) -> impl Iterator<Item = &Lootable> {
        self.items.iter()
    }

    /// Number of lootables, carried or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
