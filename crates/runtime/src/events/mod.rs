//! Topic-based event bus for engine notifications.
//!
//! Events are published to a topic and consumers subscribe only to the topics
//! they need. Delivery is best-effort: a topic without subscribers drops its
//! events, and slow subscribers observe `RecvError::Lagged`.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{CastEvent, EffectEndReason, EffectEvent, RegistryEvent, SessionEvent};
