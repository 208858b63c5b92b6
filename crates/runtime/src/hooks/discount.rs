//! Per-actor percentage discount on magic cost.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use spell_core::ActorId;

use super::{CastHook, PreCastEvent};

/// Reduces the cost of every cast by an actor-specific percentage.
///
/// Cooldowns are unaffected.
#[derive(Default)]
pub struct PerkDiscountHook {
    discounts: RwLock<HashMap<ActorId, u8>>,
}

impl PerkDiscountHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a discount in percent, capped at 100.
    pub fn set_discount(&self, actor: ActorId, percent: u8) {
        let mut discounts = self.discounts.write().unwrap_or_else(PoisonError::into_inner);
        discounts.insert(actor, percent.min(100));
    }

    pub fn clear_discount(&self, actor: ActorId) {
        let mut discounts = self.discounts.write().unwrap_or_else(PoisonError::into_inner);
        discounts.remove(&actor);
    }

    pub fn discount(&self, actor: ActorId) -> u8 {
        let discounts = self.discounts.read().unwrap_or_else(PoisonError::into_inner);
        discounts.get(&actor).copied().unwrap_or(0)
    }
}

impl CastHook for PerkDiscountHook {
    fn name(&self) -> &'static str {
        "PerkDiscount"
    }

    fn priority(&self) -> i32 {
        -50
    }

    fn pre_cast(&self, event: &mut PreCastEvent) {
        let percent = u32::from(self.discount(event.actor));
        if percent > 0 {
            event.cost = event.cost * (100 - percent) / 100;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spell_core::AbilityId;

    #[test]
    fn discount_applies_per_actor() {
        let hook = PerkDiscountHook::new();
        hook.set_discount(ActorId(1), 40);

        let mut discounted = PreCastEvent::new(ActorId(1), AbilityId::new("Blink"), 35);
        hook.pre_cast(&mut discounted);
        assert_eq!(discounted.cost, 21);

        let mut full = PreCastEvent::new(ActorId(2), AbilityId::new("Blink"), 35);
        hook.pre_cast(&mut full);
        assert_eq!(full.cost, 35);
    }

    #[test]
    fn discount_is_capped() {
        let hook = PerkDiscountHook::new();
        hook.set_discount(ActorId(1), 250);
        assert_eq!(hook.discount(ActorId(1)), 100);

        let mut event = PreCastEvent::new(ActorId(1), AbilityId::new("Blink"), 35);
        hook.pre_cast(&mut event);
        assert_eq!(event.cost, 0);

        hook.clear_discount(ActorId(1));
        assert_eq!(hook.discount(ActorId(1)), 0);
    }
}
