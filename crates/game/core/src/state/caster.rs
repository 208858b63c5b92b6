//! Resource & cooldown ledger.
//!
//! Holds everything the cast pipeline needs to know about one actor:
//! - Magic: current value is always within `0..=max_magic`
//! - Learned abilities: unordered, unique
//! - Slot bindings: fixed array of [`CastConfig::SLOT_COUNT`] entries, each
//!   referring to a learned ability
//! - Cooldowns: absolute expiry per ability, evicted lazily when read
//! - House: optional elemental restriction on bound slots
//!
//! The ledger is plain data. Callers pass the current time in, so expiry is
//! deterministic and testable without a clock.

use std::collections::{HashMap, HashSet};

use crate::ability::{AbilityId, AbilitySpec, AbilityTag};
use crate::config::CastConfig;
use crate::error::BindError;
use crate::house::{House, is_element_allowed};

use super::{ActorId, Millis};

type Slots = [Option<AbilityTag>; CastConfig::SLOT_COUNT];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CasterState {
    actor: ActorId,
    magic: u32,
    max_magic: u32,
    learned: HashSet<AbilityId>,
    slots: Slots,
    cooldowns: HashMap<AbilityId, Millis>,
    house: Option<House>,
}

impl CasterState {
    /// Creates a ledger with full magic and nothing learned.
    pub fn new(actor: ActorId, max_magic: u32) -> Self {
        Self {
            actor,
            magic: max_magic,
            max_magic,
            learned: HashSet::new(),
            slots: Slots::default(),
            cooldowns: HashMap::new(),
            house: None,
        }
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    // ========================================================================
    // Magic
    // ========================================================================

    pub fn magic(&self) -> u32 {
        self.magic
    }

    pub fn max_magic(&self) -> u32 {
        self.max_magic
    }

    /// Power used to scale ability effects. Equals max magic.
    pub fn magic_power(&self) -> u32 {
        self.max_magic
    }

    /// Sets current magic, clamped to `[0, max_magic]`.
    pub fn set_magic(&mut self, magic: u32) {
        self.magic = magic.min(self.max_magic);
    }

    /// Sets max magic and pulls current magic down if it now exceeds it.
    pub fn set_max_magic(&mut self, max_magic: u32) {
        self.max_magic = max_magic;
        self.magic = self.magic.min(max_magic);
    }

    pub fn has_magic(&self, amount: u32) -> bool {
        self.magic >= amount
    }

    /// Spends `amount`, flooring at zero. Over-consumption is not an error.
    pub fn consume_magic(&mut self, amount: u32) {
        self.magic = self.magic.saturating_sub(amount);
    }

    /// Restores `amount`, ceiling at max magic.
    pub fn regenerate_magic(&mut self, amount: u32) {
        self.magic = self.magic.saturating_add(amount).min(self.max_magic);
    }

    // ========================================================================
    // Learned abilities
    // ========================================================================

    pub fn has_learned(&self, ability: &AbilityId) -> bool {
        self.learned.contains(ability)
    }

    pub fn learned(&self) -> impl Iterator<Item = &AbilityId> {
        self.learned.iter()
    }

    /// Marks an ability as learned. Returns false if it already was.
    pub fn learn(&mut self, ability: AbilityId) -> bool {
        self.learned.insert(ability)
    }

    /// Forgets an ability, clearing every slot bound to it and its pending
    /// cooldown. Returns false if it was not learned.
    pub fn unlearn(&mut self, ability: &AbilityId) -> bool {
        let removed = self.learned.remove(ability);

        for slot in self.slots.iter_mut() {
            if slot.as_ref().is_some_and(|bound| &bound.id == ability) {
                *slot = None;
            }
        }
        self.cooldowns.remove(ability);

        removed
    }

    // ========================================================================
    // Slot bindings
    // ========================================================================

    /// Binds a learned ability to `slot`, replacing whatever was there.
    pub fn bind_slot(&mut self, slot: usize, ability: &AbilitySpec) -> Result<(), BindError> {
        self.bind_tag(slot, ability.tag())
    }

    fn bind_tag(&mut self, slot: usize, tag: AbilityTag) -> Result<(), BindError> {
        if slot >= CastConfig::SLOT_COUNT {
            return Err(BindError::InvalidSlot { slot });
        }
        if !self.has_learned(&tag.id) {
            return Err(BindError::AbilityNotLearned { ability: tag.id });
        }
        if let Some(house) = &self.house
            && let Some(element) = tag.element
            && !house.allows(element)
        {
            return Err(BindError::ElementRestricted {
                house: house.name.clone(),
                element,
            });
        }

        self.slots[slot] = Some(tag);
        Ok(())
    }

    /// Clears `slot`. Empty or out-of-range slots are ignored.
    pub fn unbind_slot(&mut self, slot: usize) -> Option<AbilityTag> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    /// Ability bound at `slot`, if any. Out-of-range slots are empty.
    pub fn spell_at_slot(&self, slot: usize) -> Option<&AbilityId> {
        self.slots.get(slot)?.as_ref().map(|tag| &tag.id)
    }

    pub fn bound_slots(&self) -> &[Option<AbilityTag>] {
        &self.slots
    }

    // ========================================================================
    // Cooldowns
    // ========================================================================

    /// Returns true while the cooldown for `ability` has not expired.
    ///
    /// A missing or expired entry means "ready"; an expired entry is evicted
    /// as a side effect of the read.
    pub fn is_on_cooldown(&mut self, ability: &AbilityId, now: Millis) -> bool {
        match self.cooldowns.get(ability) {
            Some(&expiry) if now < expiry => true,
            Some(_) => {
                self.cooldowns.remove(ability);
                false
            }
            None => false,
        }
    }

    /// Milliseconds until `ability` is ready again, zero if it already is.
    pub fn remaining_cooldown(&self, ability: &AbilityId, now: Millis) -> Millis {
        self.cooldowns
            .get(ability)
            .map_or(0, |expiry| expiry.saturating_sub(now))
    }

    /// Arms a cooldown expiring at `now + duration`, overwriting any entry.
    pub fn set_cooldown(&mut self, ability: AbilityId, duration: Millis, now: Millis) {
        self.cooldowns.insert(ability, now.saturating_add(duration));
    }

    /// Number of cooldown entries currently stored (expired ones included
    /// until they are read).
    pub fn cooldown_entries(&self) -> usize {
        self.cooldowns.len()
    }

    // ========================================================================
    // House
    // ========================================================================

    pub fn house(&self) -> Option<&House> {
        self.house.as_ref()
    }

    /// Assigns a house and clears bound slots whose element it forbids.
    ///
    /// Returns the cleared slot indices.
    pub fn set_house(&mut self, house: Option<House>) -> Vec<usize> {
        self.house = house;

        let Some(house) = &self.house else {
            return Vec::new();
        };

        let mut cleared = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot
                .as_ref()
                .is_some_and(|tag| !is_element_allowed(house, tag.element))
            {
                *slot = None;
                cleared.push(index);
            }
        }
        cleared
    }

    pub(super) fn restore_parts(
        actor: ActorId,
        magic: u32,
        max_magic: u32,
        learned: HashSet<AbilityId>,
        house: Option<House>,
    ) -> Self {
        Self {
            actor,
            magic: magic.min(max_magic),
            max_magic,
            learned,
            slots: Slots::default(),
            cooldowns: HashMap::new(),
            house,
        }
    }

    pub(super) fn restore_bind(&mut self, slot: usize, tag: AbilityTag) -> bool {
        self.bind_tag(slot, tag).is_ok()
    }
}
