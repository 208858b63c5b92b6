//! Persisted form of a caster ledger.
//!
//! Abilities are stored by name so that a snapshot survives registry
//! changes between sessions. Cooldowns are never persisted.

use std::collections::HashSet;

use crate::ability::AbilityTag;
use crate::config::CastConfig;
use crate::house::House;

use super::{ActorId, CasterState};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CasterSnapshot {
    pub magic: u32,
    pub max_magic: u32,
    /// Learned ability ids, sorted.
    pub learned: Vec<String>,
    /// One entry per slot; `None` for empty slots.
    pub binds: Vec<Option<String>>,
    /// House name, if any.
    pub house: Option<String>,
}

impl CasterState {
    /// Captures the persistent part of the ledger.
    pub fn snapshot(&self) -> CasterSnapshot {
        let mut learned: Vec<String> = self.learned().map(|id| id.to_string()).collect();
        learned.sort();

        CasterSnapshot {
            magic: self.magic(),
            max_magic: self.max_magic(),
            learned,
            binds: self
                .bound_slots()
                .iter()
                .map(|slot| slot.as_ref().map(|tag| tag.id.to_string()))
                .collect(),
            house: self.house().map(|house| house.name.clone()),
        }
    }

    /// Rebuilds a ledger from a snapshot.
    ///
    /// `resolve` maps a stored ability name to the currently registered
    /// ability. Names it cannot resolve are dropped, binds that do not refer
    /// to a resolved learned ability are dropped, and binds forbidden by the
    /// restored house are dropped. Cooldowns always start empty.
    pub fn restore<F>(actor: ActorId, snapshot: &CasterSnapshot, mut resolve: F) -> Self
    where
        F: FnMut(&str) -> Option<AbilityTag>,
    {
        let learned: HashSet<_> = snapshot
            .learned
            .iter()
            .filter_map(|name| resolve(name))
            .map(|tag| tag.id)
            .collect();
        let house = snapshot.house.as_deref().and_then(House::by_name);

        let mut state = Self::restore_parts(
            actor,
            snapshot.magic,
            snapshot.max_magic,
            learned,
            house,
        );

        for (slot, name) in snapshot
            .binds
            .iter()
            .enumerate()
            .take(CastConfig::SLOT_COUNT)
        {
            if let Some(tag) = name.as_deref().and_then(&mut resolve) {
                state.restore_bind(slot, tag);
            }
        }

        state
    }
}
