//! Validation errors raised synchronously by ledger operations.
//!
//! Cast outcomes are *not* errors: they are returned as
//! [`crate::cast::CastOutcome`] values. Only binding operations, which are
//! driven by explicit player input, fail with a [`BindError`].

use thiserror::Error;

use crate::ability::{AbilityId, Element};
use crate::config::CastConfig;

/// Errors returned by [`crate::state::CasterState::bind_slot`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("slot {slot} is outside 0..{}", CastConfig::SLOT_COUNT)]
    InvalidSlot { slot: usize },

    #[error("ability {ability} has not been learned")]
    AbilityNotLearned { ability: AbilityId },

    #[error("house {house} does not allow {element} abilities")]
    ElementRestricted { house: String, element: Element },
}
