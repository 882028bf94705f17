//! Event bus for lifecycle and combat notifications.
//!
//! Loot spawners, health bars and score systems subscribe here instead of
//! holding callbacks on the entities themselves. Every logical occurrence is
//! published once; each live subscriber receives its own copy.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::trace;

use menagerie_common::{EntityId, LootId};

use crate::behavior::BehaviorState;

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Entity lost health
    Damaged {
        /// Entity ID
        entity: EntityId,
    },
    /// Entity regained health
    Healed {
        /// Entity ID
        entity: EntityId,
    },
    /// Entity died. Published exactly once per death.
    Death {
        /// Entity ID
        entity: EntityId,
    },
    /// Dead entity was brought back
    Revived {
        /// Entity ID
        entity: EntityId,
    },
    /// Entity was removed from the world
    Despawned {
        /// Entity ID
        entity: EntityId,
    },
    /// An attack passed its cooldown gate and was applied
    AttackLanded {
        /// Attacking entity
        attacker: EntityId,
        /// Attacked entity
        target: EntityId,
        /// Damage requested after attribute scaling
        damage: f32,
    },
    /// Behavior state machine switched state
    BehaviorChanged {
        /// Entity ID
        entity: EntityId,
        /// Previous state
        from: BehaviorState,
        /// New state
        to: BehaviorState,
    },
    /// Ally picked up a lootable
    LootPickedUp {
        /// Carrying entity
        entity: EntityId,
        /// Loot picked up
        loot: LootId,
    },
    /// Ally handed a lootable to its companion
    LootDelivered {
        /// Delivering entity
        entity: EntityId,
        /// Loot delivered
        loot: LootId,
    },
}

impl GameEvent {
    /// The entity this event is primarily about.
    #[must_use]
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Damaged { entity }
            | Self::Healed { entity }
            | Self::Death { entity }
            | Self::Revived { entity }
            | Self::Despawned { entity }
            | Self::BehaviorChanged { entity, .. }
            | Self::LootPickedUp { entity, .. }
            | Self::LootDelivered { entity, .. } => *entity,
            Self::AttackLanded { attacker, .. } => *attacker,
        }
    }
}

/// Identifies one subscription on an [`EventBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u32);

/// Receiving end handed out by [`EventBus::subscribe`].
///
/// Dropping it is enough to unsubscribe; the bus forgets disconnected
/// subscribers on the next publish.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: Receiver<GameEvent>,
}

impl Subscription {
    /// Returns the subscription's ID.
    #[must_use]
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the underlying receiver.
    #[must_use]
    pub fn receiver(&self) -> &Receiver<GameEvent> {
        &self.receiver
    }
}

/// Fan-out event bus for broadcasting events to subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    /// Live subscribers
    subscribers: Vec<(SubscriberId, Sender<GameEvent>)>,
    /// Next subscriber ID
    next_id: u32,
    /// Events dropped because a subscriber's queue was full
    dropped: u64,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber with a bounded queue of `capacity` events.
    pub fn subscribe(&mut self, capacity: usize) -> Subscription {
        let (sender, receiver) = bounded(capacity.max(1));
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, sender));
        Subscription { id, receiver }
    }

    /// Removes a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Publishes an event to every subscriber.
    ///
    /// Non-blocking: a full subscriber misses the event, a disconnected one is
    /// removed.
    pub fn publish(&mut self, event: GameEvent) {
        trace!(?event, "publish");
        let mut dropped = 0;
        self.subscribers
            .retain(|(_, sender)| match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    dropped += 1;
                    true
                },
                Err(TrySendError::Disconnected(_)) => false,
            });
        self.dropped += dropped;
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns how many deliveries were lost to full queues.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }
}
