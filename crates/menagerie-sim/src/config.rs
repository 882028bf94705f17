//! Runner configuration.
//!
//! Scenario sizing, pacing and every gameplay tunable in one TOML file.
//! Missing keys fall back to their defaults.

use menagerie_common::{ConfigError, MenagerieError, MenagerieResult, Vec3};
use menagerie_gameplay::{
    AttackProfile, BehaviorTuning, BoundaryRegion, LifecycleSettings, WanderSettings,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file looked up when no path is given.
pub const CONFIG_FILE: &str = "menagerie.toml";

/// Tunables for one creature archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeConfig {
    /// Health and corpse settings
    pub lifecycle: LifecycleSettings,
    /// Damage and cooldown
    pub attack: AttackProfile,
    /// Ranges and speeds
    pub tuning: BehaviorTuning,
    /// Wander radii and timeout
    pub wander: WanderSettings,
    /// Opponent sensor radius
    pub sensor_radius: f32,
    /// Never remove the corpse, overriding `lifecycle.despawn_delay`
    pub keep_corpse: bool,
}

impl Default for ArchetypeConfig {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleSettings::default(),
            attack: AttackProfile::default(),
            tuning: BehaviorTuning::default(),
            wander: WanderSettings::default(),
            sensor_radius: 8.0,
            keep_corpse: false,
        }
    }
}

impl ArchetypeConfig {
    fn validate(&mut self) {
        self.lifecycle.max_health = self.lifecycle.max_health.clamp(1.0, 100_000.0);
        if let Some(delay) = self.lifecycle.despawn_delay.as_mut() {
            *delay = delay.clamp(0.0, 600.0);
        }
        self.attack.base_damage = self.attack.base_damage.clamp(0.0, 100_000.0);
        self.attack.cooldown = self.attack.cooldown.clamp(0.0, 60.0);

        let t = &mut self.tuning;
        t.attack_range = t.attack_range.clamp(0.1, 50.0);
        t.chase_speed = t.chase_speed.clamp(0.0, 100.0);
        t.wander_speed = t.wander_speed.clamp(0.0, 100.0);
        t.follow_speed = t.follow_speed.clamp(0.0, 100.0);
        t.turn_rate = t.turn_rate.clamp(0.1, 100.0);
        t.follow_min_distance = t.follow_min_distance.clamp(0.0, 100.0);
        t.follow_max_distance = t.follow_max_distance.clamp(0.0, 100.0);
        t.pickup_range = t.pickup_range.clamp(0.1, 50.0);
        t.deliver_range = t.deliver_range.clamp(0.1, 50.0);

        let w = &mut self.wander;
        w.min_radius = w.min_radius.clamp(0.0, 500.0);
        w.max_radius = w.max_radius.clamp(0.0, 500.0);
        w.arrival_tolerance = w.arrival_tolerance.clamp(0.01, 10.0);
        w.replan_timeout = w.replan_timeout.clamp(0.1, 600.0);

        self.sensor_radius = self.sensor_radius.clamp(0.5, 200.0);
    }

    /// Lifecycle settings with the corpse override applied.
    #[must_use]
    pub fn lifecycle(&self) -> LifecycleSettings {
        if self.keep_corpse {
            self.lifecycle.with_despawn_delay(None)
        } else {
            self.lifecycle
        }
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.tuning.follow_min_distance > self.tuning.follow_max_distance {
            return Err(ConfigError::Invalid {
                field,
                reason: format!(
                    "follow band is inverted ({} > {})",
                    self.tuning.follow_min_distance, self.tuning.follow_max_distance
                ),
            });
        }
        if self.wander.min_radius > self.wander.max_radius {
            return Err(ConfigError::Invalid {
                field,
                reason: format!(
                    "wander radii are inverted ({} > {})",
                    self.wander.min_radius, self.wander.max_radius
                ),
            });
        }
        Ok(())
    }
}

/// Runner configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Run Settings ===
    /// Seed for spawning and every wander RNG
    pub seed: u64,
    /// Number of ticks to simulate
    pub ticks: u32,
    /// Simulation rate in ticks per second
    pub tick_rate: u32,
    /// Pace ticks against the wall clock instead of running flat out
    pub realtime: bool,
    /// Where to write the JSON run report (None = no report)
    pub report_path: Option<PathBuf>,

    // === Arena Settings ===
    /// Center of the play area
    pub arena_center: Vec3,
    /// Radius of the play area
    pub arena_radius: f32,
    /// Keep entities inside the play area
    pub contain: bool,
    /// Broad-phase grid cell size
    pub cell_size: f32,

    // === Population ===
    /// Tamed creatures following the player
    pub allies: u32,
    /// Wild creatures
    pub hostiles: u32,
    /// Lootables scattered at start
    pub loot: u32,

    // === Archetypes ===
    /// Player tunables
    pub player: ArchetypeConfig,
    /// Ally tunables
    pub ally: ArchetypeConfig,
    /// Hostile tunables
    pub hostile: ArchetypeConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            // Run
            seed: 0x5EED,
            ticks: 1800,
            tick_rate: 30,
            realtime: false,
            report_path: None,

            // Arena
            arena_center: Vec3::ZERO,
            arena_radius: 40.0,
            contain: true,
            cell_size: 8.0,

            // Population
            allies: 2,
            hostiles: 6,
            loot: 4,

            // Archetypes
            player: ArchetypeConfig {
                lifecycle: LifecycleSettings::default().with_max_health(250.0),
                keep_corpse: true,
                ..ArchetypeConfig::default()
            },
            ally: ArchetypeConfig {
                sensor_radius: 10.0,
                ..ArchetypeConfig::default()
            },
            hostile: ArchetypeConfig {
                attack: AttackProfile::default().with_sound("bite"),
                ..ArchetypeConfig::default()
            },
        }
    }
}

impl SimConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match Self::from_toml_str(&contents) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("{e}, using defaults");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> MenagerieResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| MenagerieError::Serialization(e.to_string()))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.ticks = self.ticks.clamp(1, 10_000_000);
        self.tick_rate = self.tick_rate.clamp(1, 1000);

        self.arena_radius = self.arena_radius.clamp(1.0, 10_000.0);
        self.cell_size = self.cell_size.clamp(0.5, 1000.0);

        self.allies = self.allies.min(256);
        self.hostiles = self.hostiles.min(4096);
        self.loot = self.loot.min(4096);

        self.player.validate();
        self.ally.validate();
        self.hostile.validate();
    }

    /// Rejects combinations clamping cannot repair.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.player.check("player")?;
        self.ally.check("ally")?;
        self.hostile.check("hostile")
    }

    /// The play area, if containment is on.
    #[must_use]
    pub fn boundary(&self) -> Option<BoundaryRegion> {
        self.contain
            .then(|| BoundaryRegion::new(self.arena_center, self.arena_radius))
    }
}
