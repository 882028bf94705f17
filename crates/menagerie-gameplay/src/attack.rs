//! Cooldown-gated melee attacks.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::entity::Entity;
use crate::events::GameEvent;
use crate::presentation::Services;

/// Attack parameters for one kind of creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackProfile {
    /// Damage before attribute scaling
    pub base_damage: f32,
    /// Minimum seconds between two attacks
    pub cooldown: f32,
    /// Sound requested when an attack lands
    pub sound: Option<String>,
}

impl Default for AttackProfile {
    fn default() -> Self {
        Self {
            base_damage: 10.0,
            cooldown: 1.5,
            sound: None,
        }
    }
}

impl AttackProfile {
    /// Sets base damage.
    #[must_use]
    pub fn with_base_damage(mut self, damage: f32) -> Self {
        self.base_damage = damage;
        self
    }

    /// Sets the cooldown in seconds.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: f32) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Sets the sound played on each landed attack.
    #[must_use]
    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }
}

/// Per-entity attack state: the profile plus the time of the last swing.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackCooldown {
    profile: AttackProfile,
    last_attack_time: Option<f64>,
}

impl AttackCooldown {
    /// Creates a cooldown that is ready immediately.
    #[must_use]
    pub fn new(profile: AttackProfile) -> Self {
        Self {
            profile,
            last_attack_time: None,
        }
    }

    /// Attack parameters.
    #[must_use]
    pub fn profile(&self) -> &AttackProfile {
        &self.profile
    }

    /// Game time of the last successful attack.
    #[must_use]
    pub const fn last_attack_time(&self) -> Option<f64> {
        self.last_attack_time
    }

    fn cooldown(&self) -> f64 {
        f64::from(self.profile.cooldown.max(0.0))
    }

    /// Whether an attack at `now` passes the cooldown gate.
    #[must_use]
    pub fn ready(&self, now: f64) -> bool {
        self.last_attack_time
            .map_or(true, |last| now - last >= self.cooldown())
    }

    /// Seconds until the next attack is allowed.
    #[must_use]
    pub fn remaining(&self, now: f64) -> f64 {
        self.last_attack_time
            .map_or(0.0, |last| (self.cooldown() - (now - last)).max(0.0))
    }

    fn record(&mut self, now: f64) {
        self.last_attack_time = Some(now);
    }

    /// Forgets the last attack (used on revive).
    pub fn reset(&mut self) {
        self.last_attack_time = None;
    }
}

/// Attempts one attack from `attacker` on `target` at game time `now`.
///
/// Returns false without side effects when the cooldown has not elapsed, either
/// side is dead, or the attacker targets itself. Otherwise scales base damage
/// by the attacker's attribute multiplier, applies it to the target, records
/// the attack time and requests the swing animation and sound.
pub fn try_attack(
    attacker: &mut Entity,
    target: &mut Entity,
    now: f64,
    services: &mut Services,
) -> bool {
    if attacker.id() == target.id() || !attacker.is_alive() || !target.is_alive() {
        return false;
    }
    if !attacker.attack().ready(now) {
        trace!(
            attacker = %attacker.id(),
            remaining = attacker.attack().remaining(now),
            "attack on cooldown"
        );
        return false;
    }

    let damage = attacker.attack().profile().base_damage.max(0.0)
        * services.attribute_multiplier(attacker.id());
    attacker.attack_mut().record(now);

    target
        .vitals_mut()
        .take_damage(damage, Some(attacker.id()), services);
    services.events.publish(GameEvent::AttackLanded {
        attacker: attacker.id(),
        target: target.id(),
        damage,
    });
    services.trigger_attack(attacker.id());
    if let Some(sound) = attacker.attack().profile().sound.clone() {
        services.play_sound(&sound, attacker.position());
    }
    true
}
