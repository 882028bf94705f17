//! Run report: event tallies, per-tick totals and who is still standing.

use menagerie_common::{MenagerieError, MenagerieResult};
use menagerie_gameplay::{BehaviorState, GameEvent, TickReport};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Counts of every event seen on the bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EventTally {
    /// `Damaged` events
    pub damaged: u64,
    /// `Healed` events
    pub healed: u64,
    /// `Death` events
    pub deaths: u64,
    /// `Revived` events
    pub revived: u64,
    /// `Despawned` events
    pub despawned: u64,
    /// `AttackLanded` events
    pub attacks: u64,
    /// Total damage requested by landed attacks
    pub damage_dealt: f64,
    /// `BehaviorChanged` events
    pub state_changes: u64,
    /// Transitions into Attack
    pub engagements: u64,
    /// `LootPickedUp` events
    pub loot_picked_up: u64,
    /// `LootDelivered` events
    pub loot_delivered: u64,
}

impl EventTally {
    /// Counts one event.
    pub fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Damaged { .. } => self.damaged += 1,
            GameEvent::Healed { .. } => self.healed += 1,
            GameEvent::Death { .. } => self.deaths += 1,
            GameEvent::Revived { .. } => self.revived += 1,
            GameEvent::Despawned { .. } => self.despawned += 1,
            GameEvent::AttackLanded { damage, .. } => {
                self.attacks += 1;
                self.damage_dealt += f64::from(*damage);
            },
            GameEvent::BehaviorChanged { to, .. } => {
                self.state_changes += 1;
                if *to == BehaviorState::Attack {
                    self.engagements += 1;
                }
            },
            GameEvent::LootPickedUp { .. } => self.loot_picked_up += 1,
            GameEvent::LootDelivered { .. } => self.loot_delivered += 1,
        }
    }

    /// Counts a batch of events.
    pub fn extend<'a>(&mut self, events: impl IntoIterator<Item = &'a GameEvent>) {
        for event in events {
            self.record(event);
        }
    }
}

/// Sum of every [`TickReport`] in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickTotals {
    /// Enter/exit events dispatched
    pub overlap_events: u64,
    /// Containment corrections
    pub contained: u64,
    /// Attacks that passed the cooldown gate
    pub attacks: u64,
    /// Deaths caused during ticks
    pub deaths: u64,
    /// Stale target-set entries removed
    pub pruned: u64,
    /// Corpses removed
    pub despawned: u64,
}

impl TickTotals {
    /// Adds one tick's report.
    pub fn add(&mut self, report: &TickReport) {
        self.overlap_events += report.overlap_events as u64;
        self.contained += report.contained as u64;
        self.attacks += report.attacks as u64;
        self.deaths += report.deaths as u64;
        self.pruned += report.pruned as u64;
        self.despawned += report.despawned as u64;
    }
}

/// Who is left at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Survivors {
    /// Player still alive
    pub player: bool,
    /// Allies still alive
    pub allies: usize,
    /// Hostiles still alive
    pub hostiles: usize,
    /// Lootables still in the world
    pub loot: usize,
}

/// Everything written at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Crate version
    pub app_version: String,
    /// Seed used
    pub seed: u64,
    /// Ticks simulated
    pub ticks: u64,
    /// Game seconds simulated
    pub sim_seconds: f64,
    /// Average wall-clock cost per tick in milliseconds
    pub average_tick_ms: f32,
    /// Bus event counts
    pub events: EventTally,
    /// Per-tick totals
    pub totals: TickTotals,
    /// End-of-run population
    pub survivors: Survivors,
    /// Player health as a fraction of max, 0 once gone
    pub player_health: f32,
    /// Sounds requested
    pub sounds_played: usize,
    /// Attack animations requested
    pub attack_animations: usize,
}

impl RunReport {
    /// Writes the report as pretty JSON, creating parent directories.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> MenagerieResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| MenagerieError::Serialization(e.to_string()))?;
        fs::write(path, json)?;

        info!("Run report written to {}", path.display());
        Ok(())
    }
}
