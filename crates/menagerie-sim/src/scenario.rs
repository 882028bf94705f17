//! Scenario setup: one player, its allies, a pack of hostiles and some loot,
//! all placed inside the arena from the configured seed.

use menagerie_common::{EntityId, Vec3};
use menagerie_gameplay::{
    pick_waypoint, Entity, EntityResult, Faction, Services, SpawnParams, World, WorldSettings,
};
use tracing::info;

use crate::config::{ArchetypeConfig, SimConfig};

/// A populated world plus the handles the runner reports on.
#[derive(Debug)]
pub struct Scenario {
    /// The simulation
    pub world: World,
    /// Player entity
    pub player: EntityId,
    /// Ally entities
    pub allies: Vec<EntityId>,
    /// Hostile entities
    pub hostiles: Vec<EntityId>,
}

fn archetype(params: SpawnParams, archetype: &ArchetypeConfig) -> SpawnParams {
    params
        .with_lifecycle(archetype.lifecycle())
        .with_attack(archetype.attack.clone())
        .with_tuning(archetype.tuning)
        .with_wander(archetype.wander)
        .with_sensor_radius(archetype.sensor_radius)
}

/// Builds a world from `config`.
///
/// The same config always yields the same placements and the same wander
/// seeds.
pub fn build(config: &SimConfig, services: Services) -> EntityResult<Scenario> {
    let settings = WorldSettings {
        cell_size: config.cell_size,
        boundary: config.boundary(),
    };
    let mut world = World::new(services, settings, config.seed);
    let mut rng = fastrand::Rng::with_seed(config.seed.rotate_left(32));

    let center = config.arena_center;
    let radius = config.arena_radius;

    let player = world.spawn(&archetype(
        SpawnParams::new(Faction::Player, center),
        &config.player,
    ))?;

    let allies = (0..config.allies)
        .map(|_| {
            let position = pick_waypoint(&mut rng, center, 1.0, (radius * 0.1).max(1.0));
            world.spawn(&archetype(SpawnParams::ally(position, player), &config.ally))
        })
        .collect::<EntityResult<Vec<_>>>()?;

    let hostiles = (0..config.hostiles)
        .map(|_| {
            let position = pick_waypoint(&mut rng, center, radius * 0.3, radius * 0.9);
            world.spawn(&archetype(SpawnParams::hostile(position), &config.hostile))
        })
        .collect::<EntityResult<Vec<_>>>()?;

    for _ in 0..config.loot {
        world.add_loot(pick_waypoint(&mut rng, center, radius * 0.1, radius * 0.8));
    }

    info!(
        allies = allies.len(),
        hostiles = hostiles.len(),
        loot = config.loot,
        seed = config.seed,
        "scenario ready"
    );

    Ok(Scenario {
        world,
        player,
        allies,
        hostiles,
    })
}

impl Scenario {
    /// Ids that are still in the world and alive.
    #[must_use]
    pub fn survivors(&self, ids: &[EntityId]) -> usize {
        ids.iter()
            .filter(|id| self.world.entity(**id).is_ok_and(Entity::is_alive))
            .count()
    }

    /// Where the player currently stands, if it still exists.
    #[must_use]
    pub fn player_position(&self) -> Option<Vec3> {
        self.world.entity(self.player).ok().map(Entity::position)
    }
}
