//! Factions and the detection layers sensors filter on.

use serde::{Deserialize, Serialize};

/// Side an entity fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Player-controlled character
    Player,
    /// Tamed creature fighting for the player
    Ally,
    /// Wild creature that attacks the player and allies
    Hostile,
    /// Harmless wildlife, never a target
    Wildlife,
}

impl Faction {
    /// Bit this faction occupies in a [`DetectionMask`].
    #[must_use]
    pub const fn layer_bit(self) -> u8 {
        match self {
            Self::Player => 1 << 0,
            Self::Ally => 1 << 1,
            Self::Hostile => 1 << 2,
            Self::Wildlife => 1 << 3,
        }
    }

    /// Layers this faction's target sensor detects by default.
    #[must_use]
    pub const fn default_opponents(self) -> DetectionMask {
        match self {
            Self::Player | Self::Ally => DetectionMask::HOSTILE,
            Self::Hostile => DetectionMask::PLAYER.union(DetectionMask::ALLY),
            Self::Wildlife => DetectionMask::NONE,
        }
    }

    /// Whether `other` is on an opposing side.
    #[must_use]
    pub const fn is_hostile_to(self, other: Faction) -> bool {
        self.default_opponents().contains(other)
    }
}

/// Set of faction layers a sensor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DetectionMask(u8);

impl DetectionMask {
    /// Detects nothing.
    pub const NONE: Self = Self(0);
    /// Player layer.
    pub const PLAYER: Self = Self(Faction::Player.layer_bit());
    /// Ally layer.
    pub const ALLY: Self = Self(Faction::Ally.layer_bit());
    /// Hostile layer.
    pub const HOSTILE: Self = Self(Faction::Hostile.layer_bit());
    /// Wildlife layer.
    pub const WILDLIFE: Self = Self(Faction::Wildlife.layer_bit());

    /// Combines two masks.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether this mask detects the given faction.
    #[must_use]
    pub const fn contains(self, faction: Faction) -> bool {
        self.0 & faction.layer_bit() != 0
    }

    /// Whether the mask detects nothing.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}
