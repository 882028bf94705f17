//! Health, death, and revival for one entity.
//!
//! Every operation is a soft no-op on invalid state (dead, invulnerable,
//! nonsensical amounts) so that one bad frame never stalls the simulation.
//!
//! Invariants held at all times:
//! - `0 <= current_health <= max_health`
//! - `is_dead() == (current_health == 0)`
//! - a `Death` event is published exactly once per death

use menagerie_common::EntityId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::GameEvent;
use crate::presentation::Services;

/// Smallest fraction of max health a revive restores.
pub const MIN_REVIVE_FRACTION: f32 = 0.01;

/// Spawn-time lifecycle settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleSettings {
    /// Maximum (and starting) health
    pub max_health: f32,
    /// Seconds a corpse stays in the world before removal (None = never)
    pub despawn_delay: Option<f32>,
    /// Whether the entity ignores damage
    pub invulnerable: bool,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            despawn_delay: Some(2.0),
            invulnerable: false,
        }
    }
}

impl LifecycleSettings {
    /// Sets max health.
    #[must_use]
    pub fn with_max_health(mut self, max_health: f32) -> Self {
        self.max_health = max_health;
        self
    }

    /// Sets the corpse removal delay.
    #[must_use]
    pub fn with_despawn_delay(mut self, delay: Option<f32>) -> Self {
        self.despawn_delay = delay;
        self
    }
}

/// Health and death state of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    owner: EntityId,
    max_health: f32,
    current_health: f32,
    dead: bool,
    invulnerable: bool,
    despawn_delay: Option<f32>,
    /// Time since death, counting toward `despawn_delay`
    corpse_time: Option<f32>,
}

impl Vitals {
    /// Creates vitals at full health.
    #[must_use]
    pub fn new(owner: EntityId, settings: &LifecycleSettings) -> Self {
        let max_health = sanitize_max(settings.max_health).unwrap_or(1.0);
        Self {
            owner,
            max_health,
            current_health: max_health,
            dead: false,
            invulnerable: settings.invulnerable,
            despawn_delay: settings.despawn_delay.map(|d| d.max(0.0)),
            corpse_time: None,
        }
    }

    /// Entity these vitals belong to.
    #[must_use]
    pub const fn owner(&self) -> EntityId {
        self.owner
    }

    /// Current health.
    #[must_use]
    pub const fn current_health(&self) -> f32 {
        self.current_health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Current health as a fraction of max.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        (self.current_health / self.max_health).clamp(0.0, 1.0)
    }

    /// Whether the entity is dead.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Whether the entity is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Whether damage is currently ignored.
    #[must_use]
    pub const fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    /// Toggles invulnerability.
    pub fn set_invulnerable(&mut self, invulnerable: bool) {
        self.invulnerable = invulnerable;
    }

    /// Applies damage. Returns whether health changed.
    ///
    /// Ignored while dead, while invulnerable, and for non-positive amounts.
    /// Reaching zero health kills the entity.
    pub fn take_damage(
        &mut self,
        amount: f32,
        source: Option<EntityId>,
        services: &mut Services,
    ) -> bool {
        if self.dead || self.invulnerable || amount.is_nan() || amount <= 0.0 {
            return false;
        }

        self.current_health = (self.current_health - amount).max(0.0);
        debug!(
            entity = %self.owner,
            source = ?source,
            amount,
            remaining = self.current_health,
            "damaged"
        );
        services
            .events
            .publish(GameEvent::Damaged { entity: self.owner });

        if self.current_health <= 0.0 {
            self.die(services);
        }
        true
    }

    /// Kills the entity. Returns whether this call caused the death.
    ///
    /// Idempotent: a second call publishes nothing.
    pub fn die(&mut self, services: &mut Services) -> bool {
        if self.dead {
            return false;
        }

        self.dead = true;
        self.current_health = 0.0;
        self.corpse_time = self.despawn_delay.map(|_| 0.0);
        debug!(entity = %self.owner, "died");
        services
            .events
            .publish(GameEvent::Death { entity: self.owner });
        services.set_dead(self.owner);
        true
    }

    /// Restores health up to max. Returns whether health increased.
    pub fn heal(&mut self, amount: f32, services: &mut Services) -> bool {
        if self.dead || amount.is_nan() || amount <= 0.0 {
            return false;
        }

        let before = self.current_health;
        self.current_health = (self.current_health + amount).min(self.max_health);
        if self.current_health > before {
            services
                .events
                .publish(GameEvent::Healed { entity: self.owner });
            true
        } else {
            false
        }
    }

    /// Brings a dead entity back at `fraction` of max health.
    ///
    /// The fraction is clamped to `[MIN_REVIVE_FRACTION, 1]`. Returns whether
    /// the entity was revived.
    pub fn revive(&mut self, fraction: f32, services: &mut Services) -> bool {
        if !self.dead {
            return false;
        }

        let fraction = if fraction.is_nan() {
            MIN_REVIVE_FRACTION
        } else {
            fraction.clamp(MIN_REVIVE_FRACTION, 1.0)
        };
        self.dead = false;
        self.current_health =
            (fraction * self.max_health).clamp(f32::MIN_POSITIVE, self.max_health);
        self.corpse_time = None;
        debug!(entity = %self.owner, health = self.current_health, "revived");
        services
            .events
            .publish(GameEvent::Revived { entity: self.owner });
        true
    }

    /// Changes max health (clamped to at least 1).
    ///
    /// With `rescale_current` the current health keeps its proportion of max,
    /// otherwise it is clamped to the new max. Dead entities stay at zero.
    pub fn set_max_health(&mut self, new_max: f32, rescale_current: bool) {
        let Some(new_max) = sanitize_max(new_max) else {
            return;
        };
        let old_max = self.max_health;
        self.max_health = new_max;

        if self.dead {
            return;
        }
        self.current_health = if rescale_current {
            (self.current_health / old_max * new_max).clamp(f32::MIN_POSITIVE, new_max)
        } else {
            self.current_health.min(new_max)
        };
    }

    /// Advances the corpse timer. Returns true once the grace delay is over
    /// and the entity should be removed from the world.
    pub fn tick_corpse(&mut self, dt: f32) -> bool {
        match (self.corpse_time.as_mut(), self.despawn_delay) {
            (Some(elapsed), Some(delay)) => {
                *elapsed += dt.max(0.0);
                *elapsed >= delay
            },
            _ => false,
        }
    }
}

fn sanitize_max(max: f32) -> Option<f32> {
    max.is_finite().then(|| max.max(1.0))
}
