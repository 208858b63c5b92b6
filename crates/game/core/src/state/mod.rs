//! Per-actor casting state.
//!
//! [`CasterState`] is the resource & cooldown ledger owned by one connected
//! actor's session. [`CasterSnapshot`] is its persisted form.

mod caster;
mod snapshot;

pub use caster::CasterState;
pub use snapshot::CasterSnapshot;

use std::fmt;

/// Absolute timestamps and durations, in milliseconds.
pub type Millis = u64;

/// Identity of a connected actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}
