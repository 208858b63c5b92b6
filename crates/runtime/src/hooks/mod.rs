//! Cast hook system.
//!
//! Hooks observe every pass through the cast pipeline. Before validation
//! continues past the learned check, each hook may inspect and adjust the
//! [`PreCastEvent`]: veto the cast or change the magic it will cost. After
//! the outcome is known, hooks are told about the success or the failure.
//!
//! # Execution Order
//!
//! Hooks are sorted by priority (lower values run first). The first hook to
//! cancel stops the pre-cast chain.

mod discount;
mod registry;

pub use discount::PerkDiscountHook;
pub use registry::CastHooks;

use spell_core::{AbilityId, ActorId, CastFailReason};

/// Mutable pre-cast notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreCastEvent {
    pub actor: ActorId,
    pub ability: AbilityId,
    /// Magic the cast will cost. Starts at the ability's configured cost.
    pub cost: u32,
    cancelled: bool,
}

impl PreCastEvent {
    pub fn new(actor: ActorId, ability: AbilityId, cost: u32) -> Self {
        Self {
            actor,
            ability,
            cost,
            cancelled: false,
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Observer of the cast pipeline.
pub trait CastHook: Send + Sync {
    /// Returns a human-readable name for this hook (used in logging and debugging).
    fn name(&self) -> &'static str;

    /// Lower values run first.
    fn priority(&self) -> i32 {
        0
    }

    /// Called after the learned check. May cancel or change the cost.
    fn pre_cast(&self, _event: &mut PreCastEvent) {}

    /// Called after a successful cast has been committed.
    fn on_cast(&self, _actor: ActorId, _ability: &AbilityId, _cost: u32) {}

    /// Called once per failed cast.
    fn on_fail(&self, _actor: ActorId, _ability: &AbilityId, _reason: CastFailReason) {}
}
