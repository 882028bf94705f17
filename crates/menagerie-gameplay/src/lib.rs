//! # Menagerie Gameplay
//!
//! Entity behavior and combat core for Menagerie.
//!
//! This crate simulates creatures that fight, fetch and follow:
//! - Health, death and revival with exactly-once lifecycle events
//! - Proximity sensors fed by a broad-phase overlap tracker
//! - Hostile and ally behavior state machines
//! - Cooldown-gated attacks scaled by attributes
//! - Boundary containment and random wander
//! - Loot pickup and delivery for allies
//! - Event bus and presentation hooks for animation, audio and attributes

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod attack;
pub mod behavior;
pub mod boundary;
pub mod broadphase;
pub mod entity;
pub mod events;
pub mod faction;
pub mod lifecycle;
pub mod loot;
pub mod presentation;
pub mod sensor;
pub mod wander;
pub mod world;

mod e2e_tests;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::attack::*;
    pub use crate::behavior::*;
    pub use crate::boundary::*;
    pub use crate::broadphase::*;
    pub use crate::entity::*;
    pub use crate::events::*;
    pub use crate::faction::*;
    pub use crate::lifecycle::*;
    pub use crate::loot::*;
    pub use crate::presentation::*;
    pub use crate::sensor::*;
    pub use crate::wander::*;
    pub use crate::world::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use menagerie_common::{EntityId, Vec3};

    #[test]
    fn test_entity_creation() {
        let entity = Entity::new(
            EntityId::from_raw(1),
            &SpawnParams::hostile(Vec3::ZERO),
            0,
        );
        assert!(entity.id().is_valid());
        assert_eq!(entity.faction(), Faction::Hostile);
        assert_eq!(entity.brain().map(Brain::state), Some(BehaviorState::Wander));
    }

    #[test]
    fn test_world_tick_advances_clock() {
        let mut world = World::new(Services::new(), WorldSettings::default(), 0);
        world.tick(0.25);
        world.tick(0.25);
        assert!((world.now() - 0.5).abs() < 1e-9);
        assert_eq!(world.tick_count(), 2);
    }
}
