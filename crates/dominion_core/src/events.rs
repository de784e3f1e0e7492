//! Domain events and the publish/subscribe surface.
//!
//! Core components never call subscribers directly. Each one buffers the
//! events it raises; the [`Game`](crate::game::Game) facade drains those
//! buffers after every operation and publishes them here, in order.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::effects::Effect;
use crate::ledger::LedgerAction;
use crate::players::PlayerId;
use crate::resources::Resources;
use crate::territory::{TerritoryId, TerritoryPatch};
use crate::turn::Phase;
use crate::victory::{GameStatus, VictoryCondition};

/// Default number of events kept in [`EventBus::history`].
pub const DEFAULT_HISTORY_CAPACITY: usize = 1024;

/// Changes to the territory map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerritoryEvent {
    /// A territory was created.
    Created {
        /// New territory.
        id: TerritoryId,
        /// Its owner at creation.
        owner: PlayerId,
    },
    /// Non-ownership fields changed.
    Updated {
        /// Territory.
        id: TerritoryId,
        /// Fields that actually changed.
        changes: TerritoryPatch,
    },
    /// A territory changed hands.
    OwnershipChanged {
        /// Territory.
        id: TerritoryId,
        /// Owner before.
        old_owner: PlayerId,
        /// Owner after.
        new_owner: PlayerId,
    },
}

/// Changes to resource pools and effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceEvent {
    /// A pool changed for any reason.
    Changed {
        /// Pool owner.
        player: PlayerId,
        /// Signed change per resource type.
        delta: Resources,
        /// What caused the change.
        reason: LedgerAction,
    },
    /// Production was collected.
    Collected {
        /// Collecting player.
        player: PlayerId,
        /// Full production report, zero entries included.
        production: Resources,
    },
    /// Resources were spent.
    Spent {
        /// Spending player.
        player: PlayerId,
        /// Amount paid.
        cost: Resources,
    },
    /// A temporary or permanent effect started.
    EffectApplied {
        /// The effect.
        effect: Effect,
        /// Tick at which it expires, if temporary.
        expires_at: Option<u64>,
    },
    /// A temporary effect ran out.
    EffectExpired {
        /// The effect.
        effect: Effect,
    },
}

/// Turn and phase progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    /// A party's turn began.
    TurnStarted {
        /// Turn number.
        turn: u32,
        /// Active party.
        player: PlayerId,
    },
    /// A party's turn finished.
    TurnEnded {
        /// Turn number.
        turn: u32,
        /// Party that just moved.
        player: PlayerId,
    },
    /// The phase changed within a turn.
    PhaseChanged {
        /// Phase before.
        old_phase: Phase,
        /// Phase after.
        new_phase: Phase,
        /// Active party.
        player: PlayerId,
    },
}

/// Game-level outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Game status changed.
    StatusChanged {
        /// Status before.
        old: GameStatus,
        /// Status after.
        new: GameStatus,
    },
    /// A party met a victory condition.
    VictoryConditionMet {
        /// Winning party.
        winner: PlayerId,
        /// Condition that was met.
        condition: VictoryCondition,
        /// Human-readable summary.
        details: String,
    },
}

/// Any event raised by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEvent {
    /// Territory map event.
    Territory(TerritoryEvent),
    /// Resource event.
    Resource(ResourceEvent),
    /// Turn event.
    Turn(TurnEvent),
    /// Game event.
    Game(GameEvent),
}

impl From<TerritoryEvent> for DomainEvent {
    fn from(event: TerritoryEvent) -> Self {
        Self::Territory(event)
    }
}

impl From<ResourceEvent> for DomainEvent {
    fn from(event: ResourceEvent) -> Self {
        Self::Resource(event)
    }
}

impl From<TurnEvent> for DomainEvent {
    fn from(event: TurnEvent) -> Self {
        Self::Turn(event)
    }
}

impl From<GameEvent> for DomainEvent {
    fn from(event: GameEvent) -> Self {
        Self::Game(event)
    }
}

/// Receiver of domain events.
///
/// Implement only the categories you care about; the rest default to no-ops.
pub trait EventSubscriber {
    /// Territory map event.
    fn on_territory(&mut self, _event: &TerritoryEvent) {}

    /// Resource event.
    fn on_resource(&mut self, _event: &ResourceEvent) {}

    /// Turn event.
    fn on_turn(&mut self, _event: &TurnEvent) {}

    /// Game event.
    fn on_game(&mut self, _event: &GameEvent) {}

    /// Dispatch to the category method. Override to see every event.
    fn on_event(&mut self, event: &DomainEvent) {
        match event {
            DomainEvent::Territory(e) => self.on_territory(e),
            DomainEvent::Resource(e) => self.on_resource(e),
            DomainEvent::Turn(e) => self.on_turn(e),
            DomainEvent::Game(e) => self.on_game(e),
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u32);

/// Delivers events to subscribers in registration order and keeps a bounded history.
pub struct EventBus {
    subscribers: Vec<(SubscriberId, Box<dyn EventSubscriber>)>,
    next_id: u32,
    history: VecDeque<DomainEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus with the default history capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a bus keeping at most `capacity` past events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
            history: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
        }
    }

    /// Register a subscriber.
    pub fn subscribe(&mut self, subscriber: Box<dyn EventSubscriber>) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, subscriber));
        id
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver one event to every subscriber.
    pub fn publish(&mut self, event: impl Into<DomainEvent>) {
        let event = event.into();
        for (_, subscriber) in &mut self.subscribers {
            subscriber.on_event(&event);
        }
        if self.capacity > 0 {
            if self.history.len() == self.capacity {
                self.history.pop_front();
            }
            self.history.push_back(event);
        }
    }

    /// Deliver a batch of events in order.
    pub fn publish_all<I, E>(&mut self, events: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<DomainEvent>,
    {
        for event in events {
            self.publish(event);
        }
    }

    /// Recent events, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &DomainEvent> + '_ {
        self.history.iter()
    }

    /// Forget past events.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("history", &self.history.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
