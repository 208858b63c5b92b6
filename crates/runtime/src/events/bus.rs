//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::{CastEvent, EffectEvent, RegistryEvent, SessionEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Cast successes and failures
    Cast,
    /// Effect start / end
    Effect,
    /// Ability registration changes
    Registry,
    /// Actor join / leave
    Session,
}

impl Topic {
    pub const ALL: [Topic; 4] = [Topic::Cast, Topic::Effect, Topic::Registry, Topic::Session];

    const fn index(self) -> usize {
        match self {
            Topic::Cast => 0,
            Topic::Effect => 1,
            Topic::Registry => 2,
            Topic::Session => 3,
        }
    }
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Cast(CastEvent),
    Effect(EffectEvent),
    Registry(RegistryEvent),
    Session(SessionEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Cast(_) => Topic::Cast,
            Event::Effect(_) => Topic::Effect,
            Event::Registry(_) => Topic::Registry,
            Event::Session(_) => Topic::Session,
        }
    }
}

/// Topic-based event bus
///
/// Channels are created up front for every topic and never change, so
/// publishing and subscribing never lock.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<[broadcast::Sender<Event>; 4]>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(std::array::from_fn(|_| broadcast::channel(capacity).0)),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();

        if self.channels[topic.index()].send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::events", ?topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels[topic.index()].subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl From<CastEvent> for Event {
    fn from(event: CastEvent) -> Self {
        Event::Cast(event)
    }
}

impl From<EffectEvent> for Event {
    fn from(event: EffectEvent) -> Self {
        Event::Effect(event)
    }
}

impl From<RegistryEvent> for Event {
    fn from(event: RegistryEvent) -> Self {
        Event::Registry(event)
    }
}

impl From<SessionEvent> for Event {
    fn from(event: SessionEvent) -> Self {
        Event::Session(event)
    }
}
