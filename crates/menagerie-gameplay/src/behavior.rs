//! Finite-state behavior for hostile creatures and player allies.
//!
//! A [`Brain`] reads a [`Perception`] snapshot once per tick and answers with a
//! [`Directive`]: where to go, what to face, whom to attack, what loot to pick
//! up or hand over. It never touches other entities itself; the world applies
//! the directive.
//!
//! Hostiles cycle Wander, Chase and Attack. Allies add Follow (staying within
//! a distance band of their companion) and a loot cycle of GoingToLoot and
//! Carrying. Combat always takes priority. Dead is terminal until the world
//! explicitly resets the brain on revive.

use menagerie_common::{
    flatten, planar_distance, rotate_toward, yaw_toward, EntityId, LootId, Vec3, NEAR_ZERO,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::boundary::BoundaryRegion;
use crate::entity::Kinematics;
use crate::loot::LootField;
use crate::sensor::LootNotice;
use crate::wander::{WanderPlanner, WanderSettings};

/// Behavior states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorState {
    /// Idle roaming between random waypoints
    Wander,
    /// Staying near the companion (allies only)
    Follow,
    /// Closing in on a target
    Chase,
    /// In range and swinging at a target
    Attack,
    /// Heading for a sighted lootable (allies only)
    GoingToLoot,
    /// Bringing a lootable back to the companion (allies only)
    Carrying,
    /// Dead; issues nothing
    Dead,
}

impl BehaviorState {
    /// Whether the state is driven by a combat target.
    #[must_use]
    pub const fn is_combat(self) -> bool {
        matches!(self, Self::Chase | Self::Attack)
    }
}

/// Distances, speeds and turn rate for a state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorTuning {
    /// Distance at which Chase becomes Attack
    pub attack_range: f32,
    /// Movement speed while chasing
    pub chase_speed: f32,
    /// Movement speed while wandering
    pub wander_speed: f32,
    /// Movement speed while following, fetching or carrying
    pub follow_speed: f32,
    /// Maximum turn rate in radians per second
    pub turn_rate: f32,
    /// Follow stops once the companion is this close
    pub follow_min_distance: f32,
    /// Follow resumes once the companion is farther than this
    pub follow_max_distance: f32,
    /// Distance at which a lootable can be picked up
    pub pickup_range: f32,
    /// Distance to the companion at which carried loot is handed over
    pub deliver_range: f32,
}

impl Default for BehaviorTuning {
    fn default() -> Self {
        Self {
            attack_range: 1.8,
            chase_speed: 4.0,
            wander_speed: 1.5,
            follow_speed: 3.5,
            turn_rate: 6.0,
            follow_min_distance: 2.0,
            follow_max_distance: 5.0,
            pickup_range: 1.0,
            deliver_range: 2.0,
        }
    }
}

impl BehaviorTuning {
    /// Sets attack range.
    #[must_use]
    pub fn with_attack_range(mut self, range: f32) -> Self {
        self.attack_range = range;
        self
    }

    /// Sets the follow band.
    #[must_use]
    pub fn with_follow_band(mut self, min: f32, max: f32) -> Self {
        self.follow_min_distance = min;
        self.follow_max_distance = max;
        self
    }
}

/// Which state machine variant an entity runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrainKind {
    /// Wild creature: Wander, Chase, Attack
    Hostile,
    /// Tamed creature: adds Follow and the loot cycle
    Ally {
        /// Entity the ally follows and delivers loot to
        companion: EntityId,
    },
}

impl BrainKind {
    /// State a fresh (or revived) brain starts in.
    #[must_use]
    pub const fn initial_state(self) -> BehaviorState {
        match self {
            Self::Hostile => BehaviorState::Wander,
            Self::Ally { .. } => BehaviorState::Follow,
        }
    }

    /// Companion of an ally.
    #[must_use]
    pub const fn companion(self) -> Option<EntityId> {
        match self {
            Self::Hostile => None,
            Self::Ally { companion } => Some(companion),
        }
    }
}

/// What a brain sees this tick.
#[derive(Debug, Clone, Copy)]
pub struct Perception<'a> {
    /// Own position
    pub position: Vec3,
    /// Wander anchor
    pub home: Vec3,
    /// Whether the owner is alive
    pub alive: bool,
    /// Seconds since the last tick
    pub dt: f32,
    /// Live targets with positions, in target-set order
    pub targets: &'a [(EntityId, Vec3)],
    /// Companion position, if the companion exists and is alive
    pub companion: Option<Vec3>,
    /// Lootables in the world
    pub loot: &'a LootField,
    /// Play area, if any
    pub bounds: Option<&'a BoundaryRegion>,
}

/// What a brain wants done this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Directive {
    /// Point to move toward
    pub destination: Option<Vec3>,
    /// Movement speed toward the destination
    pub speed: f32,
    /// Point to turn toward instead of the destination
    pub face: Option<Vec3>,
    /// Target to attack
    pub attack: Option<EntityId>,
    /// Lootable to pick up
    pub pickup: Option<LootId>,
    /// Carried lootable to hand over
    pub deliver: Option<LootId>,
}

impl Directive {
    /// Stand still and do nothing.
    #[must_use]
    pub fn halt() -> Self {
        Self::default()
    }

    fn move_to(destination: Vec3, speed: f32) -> Self {
        Self {
            destination: Some(destination),
            speed,
            ..Self::default()
        }
    }

    fn face(point: Vec3) -> Self {
        Self {
            face: Some(point),
            ..Self::default()
        }
    }

    /// Whether the directive asks for any action at all.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        *self == Self::halt()
    }
}

/// Turns toward the directive's focus at a bounded rate and advances toward its
/// destination by `speed * dt` on the ground plane, without overshooting.
///
/// Returns whether the entity is walking.
pub fn steer(kinematics: &mut Kinematics, directive: &Directive, turn_rate: f32, dt: f32) -> bool {
    let dt = dt.max(0.0);
    if let Some(look_at) = directive.face.or(directive.destination) {
        if let Some(yaw) = yaw_toward(kinematics.position, look_at) {
            kinematics.yaw = rotate_toward(kinematics.yaw, yaw, turn_rate * dt);
        }
    }

    let Some(destination) = directive.destination else {
        kinematics.velocity = Vec3::ZERO;
        return false;
    };
    let delta = flatten(destination - kinematics.position);
    let distance = delta.length();
    if distance <= NEAR_ZERO || directive.speed <= 0.0 {
        kinematics.velocity = Vec3::ZERO;
        return false;
    }

    let direction = delta / distance;
    let step = (directive.speed * dt).min(distance);
    kinematics.position += direction * step;
    kinematics.velocity = direction * directive.speed;
    true
}

/// Per-entity behavior state machine.
#[derive(Debug)]
pub struct Brain {
    kind: BrainKind,
    tuning: BehaviorTuning,
    state: BehaviorState,
    focus: Option<EntityId>,
    wander: WanderPlanner,
    sighted: Vec<LootId>,
    loot_task: Option<LootId>,
    carrying: Option<LootId>,
    following: bool,
}

impl Brain {
    /// Creates a brain in its kind's initial state.
    #[must_use]
    pub fn new(kind: BrainKind, tuning: BehaviorTuning, wander: WanderSettings, seed: u64) -> Self {
        Self {
            kind,
            tuning,
            state: kind.initial_state(),
            focus: None,
            wander: WanderPlanner::new(wander, seed),
            sighted: Vec::new(),
            loot_task: None,
            carrying: None,
            following: false,
        }
    }

    /// Variant this brain runs.
    #[must_use]
    pub const fn kind(&self) -> BrainKind {
        self.kind
    }

    /// Tuning in use.
    #[must_use]
    pub const fn tuning(&self) -> &BehaviorTuning {
        &self.tuning
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> BehaviorState {
        self.state
    }

    /// Target chosen on the last tick.
    #[must_use]
    pub const fn focus(&self) -> Option<EntityId> {
        self.focus
    }

    /// Lootable currently carried.
    #[must_use]
    pub const fn carrying(&self) -> Option<LootId> {
        self.carrying
    }

    /// Lootable currently headed for.
    #[must_use]
    pub const fn loot_task(&self) -> Option<LootId> {
        self.loot_task
    }

    /// Wander planner.
    #[must_use]
    pub const fn wander(&self) -> &WanderPlanner {
        &self.wander
    }

    /// Makes the wander planner pick a new waypoint on the next tick.
    pub fn force_new_waypoint(&mut self) {
        self.wander.force_new_waypoint();
    }

    fn transition(&mut self, to: BehaviorState) {
        if self.state == to {
            return;
        }
        debug!(from = ?self.state, to = ?to, "behavior transition");
        if to == BehaviorState::Wander {
            self.wander.force_new_waypoint();
        }
        self.state = to;
    }

    /// Switches to Dead. Returns the lootable that was being carried, which
    /// the caller should drop back into the world.
    pub fn mark_dead(&mut self) -> Option<LootId> {
        self.transition(BehaviorState::Dead);
        self.focus = None;
        self.loot_task = None;
        self.sighted.clear();
        self.carrying.take()
    }

    /// Clears all state and returns to the initial state (revive path).
    pub fn reset(&mut self) {
        self.state = self.kind.initial_state();
        self.focus = None;
        self.sighted.clear();
        self.loot_task = None;
        self.carrying = None;
        self.following = false;
        self.wander.force_new_waypoint();
    }

    /// Feeds a loot sensor notification. Hostiles ignore loot.
    pub fn notify_loot(&mut self, notice: LootNotice) {
        if matches!(self.kind, BrainKind::Hostile) || self.state == BehaviorState::Dead {
            return;
        }
        match notice {
            LootNotice::Sighted(id) => {
                if !self.sighted.contains(&id) {
                    self.sighted.push(id);
                }
            },
            LootNotice::Lost(id) => self.forget_loot(id),
        }
    }

    fn forget_loot(&mut self, id: LootId) {
        self.sighted.retain(|l| *l != id);
        if self.loot_task == Some(id) {
            self.loot_task = None;
        }
    }

    /// The world handed over the lootable requested by `Directive::pickup`.
    pub fn confirm_pickup(&mut self, id: LootId) {
        self.forget_loot(id);
        self.carrying = Some(id);
        self.transition(BehaviorState::Carrying);
    }

    /// The requested lootable was gone or taken by someone else.
    pub fn abandon_loot(&mut self, id: LootId) {
        self.forget_loot(id);
    }

    /// The carried lootable reached the companion.
    pub fn confirm_delivery(&mut self) -> Option<LootId> {
        let delivered = self.carrying.take();
        if delivered.is_some() {
            self.transition(self.kind.initial_state());
        }
        delivered
    }

    /// Nearest target with stickiness: the cached focus is kept while it is
    /// still in the list unless another target is strictly closer. Equal
    /// distances resolve to the earliest entry.
    pub fn select_target(
        &mut self,
        position: Vec3,
        targets: &[(EntityId, Vec3)],
    ) -> Option<(EntityId, Vec3)> {
        let mut nearest: Option<(EntityId, Vec3, f32)> = None;
        for &(id, target) in targets {
            let distance = position.distance(target);
            if nearest.map_or(true, |(_, _, best)| distance < best) {
                nearest = Some((id, target, distance));
            }
        }
        let Some((nearest_id, nearest_pos, nearest_distance)) = nearest else {
            self.focus = None;
            return None;
        };

        if let Some(focus) = self.focus {
            if let Some(&(id, target)) = targets.iter().find(|(id, _)| *id == focus) {
                if nearest_distance >= position.distance(target) {
                    return Some((id, target));
                }
            }
        }
        self.focus = Some(nearest_id);
        Some((nearest_id, nearest_pos))
    }

    fn next_loot(&mut self, position: Vec3, field: &LootField) -> Option<(LootId, Vec3)> {
        self.sighted.retain(|id| field.is_available(*id));
        if self.loot_task.is_some_and(|id| !field.is_available(id)) {
            self.loot_task = None;
        }

        if self.loot_task.is_none() {
            self.loot_task = self
                .sighted
                .iter()
                .filter_map(|id| field.get(*id))
                .map(|l| (l.id, planar_distance(position, l.position)))
                .fold(None, |best: Option<(LootId, f32)>, (id, d)| match best {
                    Some((_, best_d)) if best_d <= d => best,
                    _ => Some((id, d)),
                })
                .map(|(id, _)| id);
        }

        let id = self.loot_task?;
        field.get(id).map(|l| (id, l.position))
    }

    fn wander_directive(&mut self, p: &Perception<'_>) -> Directive {
        let waypoint = self.wander.update(p.position, p.home, p.dt, p.bounds);
        Directive::move_to(waypoint, self.tuning.wander_speed)
    }

    /// Runs one tick of the state machine.
    pub fn think(&mut self, p: &Perception<'_>) -> Directive {
        if !p.alive {
            if self.state != BehaviorState::Dead {
                self.mark_dead();
            }
            return Directive::halt();
        }
        if self.state == BehaviorState::Dead {
            return Directive::halt();
        }

        if let Some((target, target_pos)) = self.select_target(p.position, p.targets) {
            return if p.position.distance(target_pos) <= self.tuning.attack_range {
                self.transition(BehaviorState::Attack);
                Directive {
                    attack: Some(target),
                    ..Directive::face(target_pos)
                }
            } else {
                self.transition(BehaviorState::Chase);
                Directive::move_to(target_pos, self.tuning.chase_speed)
            };
        }

        match self.kind {
            BrainKind::Hostile => {
                self.transition(BehaviorState::Wander);
                self.wander_directive(p)
            },
            BrainKind::Ally { .. } => self.think_ally(p),
        }
    }

    fn think_ally(&mut self, p: &Perception<'_>) -> Directive {
        if let Some(carried) = self.carrying {
            self.transition(BehaviorState::Carrying);
            return match p.companion {
                Some(companion)
                    if planar_distance(p.position, companion) <= self.tuning.deliver_range =>
                {
                    Directive {
                        deliver: Some(carried),
                        ..Directive::face(companion)
                    }
                },
                Some(companion) => Directive::move_to(companion, self.tuning.follow_speed),
                None => self.wander_directive(p),
            };
        }

        if let Some((loot, loot_pos)) = self.next_loot(p.position, p.loot) {
            self.transition(BehaviorState::GoingToLoot);
            return if planar_distance(p.position, loot_pos) <= self.tuning.pickup_range {
                Directive {
                    pickup: Some(loot),
                    ..Directive::face(loot_pos)
                }
            } else {
                Directive::move_to(loot_pos, self.tuning.follow_speed)
            };
        }

        let Some(companion) = p.companion else {
            self.transition(BehaviorState::Wander);
            return self.wander_directive(p);
        };

        self.transition(BehaviorState::Follow);
        let distance = planar_distance(p.position, companion);
        if self.following {
            if distance <= self.tuning.follow_min_distance {
                self.following = false;
            }
        } else if distance > self.tuning.follow_max_distance {
            self.following = true;
        }

        if self.following {
            Directive::move_to(companion, self.tuning.follow_speed)
        } else {
            Directive::face(companion)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> EntityId {
        EntityId::from_raw(raw)
    }

    fn hostile() -> Brain {
        Brain::new(BrainKind::Hostile, BehaviorTuning::default(), WanderSettings::default(), 1)
    }

    fn ally() -> Brain {
        Brain::new(
            BrainKind::Ally { companion: id(100) },
            BehaviorTuning::default(),
            WanderSettings::default(),
            2,
        )
    }

    fn perceive<'a>(targets: &'a [(EntityId, Vec3)], loot: &'a LootField) -> Perception<'a> {
        Perception {
            position: Vec3::ZERO,
            home: Vec3::ZERO,
            alive: true,
            dt: 0.1,
            targets,
            companion: None,
            loot,
            bounds: None,
        }
    }

    #[test]
    fn test_nearest_target_chosen() {
        let mut brain = hostile();
        let targets = [(id(2), Vec3::new(5.0, 0.0, 0.0)), (id(3), Vec3::new(0.0, 0.0, 3.0))];
        let chosen = brain.select_target(Vec3::ZERO, &targets);
        assert_eq!(chosen.map(|(t, _)| t), Some(id(3)));
    }

    #[test]
    fn test_focus_sticky_on_tie() {
        let mut brain = hostile();
        let first = [(id(2), Vec3::new(3.0, 0.0, 0.0))];
        brain.select_target(Vec3::ZERO, &first);

        let tied = [(id(3), Vec3::new(-3.0, 0.0, 0.0)), (id(2), Vec3::new(3.0, 0.0, 0.0))];
        for _ in 0..5 {
            let chosen = brain.select_target(Vec3::ZERO, &tied);
            assert_eq!(chosen.map(|(t, _)| t), Some(id(2)));
        }
    }

    #[test]
    fn test_focus_displaced_by_strictly_closer() {
        let mut brain = hostile();
        brain.select_target(Vec3::ZERO, &[(id(2), Vec3::new(3.0, 0.0, 0.0))]);

        let closer = [(id(2), Vec3::new(3.0, 0.0, 0.0)), (id(3), Vec3::new(0.0, 0.0, 2.0))];
        let chosen = brain.select_target(Vec3::ZERO, &closer);
        assert_eq!(chosen.map(|(t, _)| t), Some(id(3)));
        assert_eq!(brain.focus(), Some(id(3)));
    }

    #[test]
    fn test_ties_without_focus_pick_first() {
        let mut brain = hostile();
        let tied = [(id(7), Vec3::new(0.0, 0.0, 4.0)), (id(5), Vec3::new(4.0, 0.0, 0.0))];
        let chosen = brain.select_target(Vec3::ZERO, &tied);
        assert_eq!(chosen.map(|(t, _)| t), Some(id(7)));
    }

    #[test]
    fn test_hostile_transitions() {
        let loot = LootField::new();
        let mut brain = hostile();
        assert_eq!(brain.state(), BehaviorState::Wander);

        let far = [(id(2), Vec3::new(6.0, 0.0, 0.0))];
        let d = brain.think(&perceive(&far, &loot));
        assert_eq!(brain.state(), BehaviorState::Chase);
        assert_eq!(d.destination, Some(Vec3::new(6.0, 0.0, 0.0)));
        assert!(d.attack.is_none());

        let near = [(id(2), Vec3::new(1.0, 0.0, 0.0))];
        let d = brain.think(&perceive(&near, &loot));
        assert_eq!(brain.state(), BehaviorState::Attack);
        assert_eq!(d.attack, Some(id(2)));
        assert!(d.destination.is_none());

        let d = brain.think(&perceive(&far, &loot));
        assert_eq!(brain.state(), BehaviorState::Chase);
        assert!(d.attack.is_none());

        let d = brain.think(&perceive(&[], &loot));
        assert_eq!(brain.state(), BehaviorState::Wander);
        assert!(d.destination.is_some());
        assert!(brain.focus().is_none());
    }

    #[test]
    fn test_dead_is_terminal() {
        let loot = LootField::new();
        let mut brain = hostile();
        let near = [(id(2), Vec3::new(1.0, 0.0, 0.0))];

        let mut p = perceive(&near, &loot);
        p.alive = false;
        assert!(brain.think(&p).is_idle());
        assert_eq!(brain.state(), BehaviorState::Dead);

        // Even a live perception does not leave Dead without a reset.
        assert!(brain.think(&perceive(&near, &loot)).is_idle());
        assert_eq!(brain.state(), BehaviorState::Dead);

        brain.reset();
        assert_eq!(brain.state(), BehaviorState::Wander);
    }

    #[test]
    fn test_ally_follow_band() {
        let loot = LootField::new();
        let mut brain = ally();
        assert_eq!(brain.state(), BehaviorState::Follow);

        let mut p = perceive(&[], &loot);
        p.companion = Some(Vec3::new(4.0, 0.0, 0.0));
        assert!(brain.think(&p).destination.is_none());

        p.companion = Some(Vec3::new(6.0, 0.0, 0.0));
        assert!(brain.think(&p).destination.is_some());

        // Inside the band but still closing in.
        p.companion = Some(Vec3::new(3.0, 0.0, 0.0));
        assert!(brain.think(&p).destination.is_some());

        p.companion = Some(Vec3::new(1.5, 0.0, 0.0));
        assert!(brain.think(&p).destination.is_none());
        assert_eq!(brain.state(), BehaviorState::Follow);
    }

    #[test]
    fn test_ally_without_companion_wanders() {
        let loot = LootField::new();
        let mut brain = ally();
        brain.think(&perceive(&[], &loot));
        assert_eq!(brain.state(), BehaviorState::Wander);
    }

    #[test]
    fn test_ally_combat_first() {
        let loot = LootField::new();
        let mut brain = ally();
        let targets = [(id(9), Vec3::new(1.0, 0.0, 0.0))];
        let mut p = perceive(&targets, &loot);
        p.companion = Some(Vec3::new(10.0, 0.0, 0.0));

        let d = brain.think(&p);
        assert_eq!(brain.state(), BehaviorState::Attack);
        assert_eq!(d.attack, Some(id(9)));
    }

    #[test]
    fn test_ally_loot_cycle() {
        let mut field = LootField::new();
        let coin = LootId::new(1);
        field.add(coin, Vec3::new(0.5, 0.0, 0.0));
        let mut brain = ally();
        brain.notify_loot(LootNotice::Sighted(coin));

        let mut p = perceive(&[], &field);
        p.companion = Some(Vec3::new(1.0, 0.0, 0.0));
        let d = brain.think(&p);
        assert_eq!(brain.state(), BehaviorState::GoingToLoot);
        assert_eq!(d.pickup, Some(coin));

        field.claim(coin, id(1));
        brain.confirm_pickup(coin);
        assert_eq!(brain.state(), BehaviorState::Carrying);
        assert_eq!(brain.carrying(), Some(coin));

        let mut p = perceive(&[], &field);
        p.companion = Some(Vec3::new(1.0, 0.0, 0.0));
        let d = brain.think(&p);
        assert_eq!(d.deliver, Some(coin));

        assert_eq!(brain.confirm_delivery(), Some(coin));
        assert_eq!(brain.state(), BehaviorState::Follow);
        assert!(brain.carrying().is_none());
    }

    #[test]
    fn test_ally_drops_loot_taken_by_others() {
        let mut field = LootField::new();
        let coin = LootId::new(1);
        field.add(coin, Vec3::new(6.0, 0.0, 0.0));
        let mut brain = ally();
        brain.notify_loot(LootNotice::Sighted(coin));

        let d = brain.think(&perceive(&[], &field));
        assert_eq!(brain.state(), BehaviorState::GoingToLoot);
        assert!(d.destination.is_some());

        field.claim(coin, id(55));
        brain.think(&perceive(&[], &field));
        assert!(brain.loot_task().is_none());
        assert_ne!(brain.state(), BehaviorState::GoingToLoot);
    }

    #[test]
    fn test_hostile_ignores_loot() {
        let mut field = LootField::new();
        let coin = LootId::new(1);
        field.add(coin, Vec3::X);
        let mut brain = hostile();
        brain.notify_loot(LootNotice::Sighted(coin));

        brain.think(&perceive(&[], &field));
        assert_eq!(brain.state(), BehaviorState::Wander);
    }

    #[test]
    fn test_mark_dead_returns_carried_loot() {
        let mut brain = ally();
        brain.confirm_pickup(LootId::new(4));
        assert_eq!(brain.mark_dead(), Some(LootId::new(4)));
        assert_eq!(brain.state(), BehaviorState::Dead);
    }

    #[test]
    fn test_steer_moves_without_overshoot() {
        let mut k = Kinematics::new(Vec3::ZERO, 0.0);
        let directive = Directive::move_to(Vec3::new(0.0, 0.0, 1.0), 4.0);

        assert!(steer(&mut k, &directive, 6.0, 1.0));
        assert!((k.position - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
        assert!(!steer(&mut k, &directive, 6.0, 1.0));
        assert_eq!(k.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_steer_turn_rate_bounded() {
        let mut k = Kinematics::new(Vec3::ZERO, 0.0);
        let directive = Directive::face(Vec3::new(5.0, 0.0, 0.0));

        assert!(!steer(&mut k, &directive, 1.0, 0.1));
        assert!((k.yaw - 0.1).abs() < 1e-5);
        assert_eq!(k.position, Vec3::ZERO);
    }
}
