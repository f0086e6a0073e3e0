//! Combat event bus for observers outside the per-frame pass.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::agent::AgentState;
use crate::collaborators::WaveTracker;
use crate::profile::ReactionKind;
use skirmish_common::AgentId;

/// Events emitted by combat agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// Agent was (re)spawned and reset to its patrol baseline
    AgentSpawned {
        /// Agent ID
        agent: AgentId,
    },
    /// Agent switched behavioral state
    StateChanged {
        /// Agent ID
        agent: AgentId,
        /// Previous state
        from: AgentState,
        /// New state
        to: AgentState,
    },
    /// Coordinator granted an attack token
    TokenGranted {
        /// Agent ID
        agent: AgentId,
    },
    /// Coordinator was at capacity and the agent started circling
    TokenDenied {
        /// Agent ID
        agent: AgentId,
    },
    /// A melee swing connected with the target
    AttackLanded {
        /// Attacking agent
        agent: AgentId,
        /// Damage dealt
        damage: f32,
    },
    /// Agent started reacting to a hit
    ReactionStarted {
        /// Agent ID
        agent: AgentId,
        /// Chosen reaction
        kind: ReactionKind,
    },
    /// Agent finished reacting and regained control
    ReactionFinished {
        /// Agent ID
        agent: AgentId,
        /// Reaction that finished
        kind: ReactionKind,
    },
    /// Agent was stunned
    AgentStunned {
        /// Agent ID
        agent: AgentId,
        /// Stun time remaining after the call
        remaining: f32,
    },
    /// Agent was defeated
    AgentDefeated {
        /// Agent ID
        agent: AgentId,
    },
    /// Agent's owning object was disabled or destroyed
    AgentDestroyed {
        /// Wave that spawned the agent
        wave_index: u32,
        /// Whether the agent was an elite
        is_elite: bool,
    },
}

/// Event bus for broadcasting combat events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<CombatEvent>,
    /// Receiver for collecting events
    receiver: Receiver<CombatEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: CombatEvent) {
        publish(&self.sender, event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<CombatEvent> {
        self.sender.clone()
    }
}

impl WaveTracker for EventBus {
    fn notify_destroyed(&self, wave_index: u32, is_elite: bool) {
        self.publish(CombatEvent::AgentDestroyed {
            wave_index,
            is_elite,
        });
    }
}

impl WaveTracker for Sender<CombatEvent> {
    fn notify_destroyed(&self, wave_index: u32, is_elite: bool) {
        publish(
            self,
            CombatEvent::AgentDestroyed {
                wave_index,
                is_elite,
            },
        );
    }
}

/// Non-blocking send; if the channel is full the event is dropped.
pub(crate) fn publish(sender: &Sender<CombatEvent>, event: CombatEvent) {
    let _ = sender.try_send(event);
}
