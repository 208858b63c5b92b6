//! Periodic magic regeneration.

use std::sync::{Arc, PoisonError};

use spell_core::Location;
use tracing::trace;

use crate::scheduler::{RepeatingTask, TickControl};

use super::CasterManager;

/// Restores `amount` magic to every open session once per period.
///
/// Runs on the global loop.
pub struct MagicRegen {
    sessions: Arc<CasterManager>,
    amount: u32,
}

impl MagicRegen {
    pub fn new(sessions: Arc<CasterManager>, amount: u32) -> Self {
        Self { sessions, amount }
    }
}

impl RepeatingTask for MagicRegen {
    fn anchor(&self) -> Option<Location> {
        None
    }

    fn tick(&mut self) -> TickControl {
        let sessions = self.sessions.sessions();
        for (_, caster) in &sessions {
            caster
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .regenerate_magic(self.amount);
        }
        trace!(target: "runtime::session", casters = sessions.len(), amount = self.amount, "magic regenerated");
        TickControl::Continue
    }
}
