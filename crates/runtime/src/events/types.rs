//! Event payloads per topic.

use serde::{Deserialize, Serialize};
use spell_core::{AbilityId, ActorId, CastFailReason};

use crate::effects::EffectId;

/// Cast pipeline outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastEvent {
    /// The behavior succeeded and `cost` magic was consumed.
    Cast {
        actor: ActorId,
        ability: AbilityId,
        cost: u32,
    },
    /// The cast stopped at `reason`. Emitted exactly once per failed attempt.
    CastFail {
        actor: ActorId,
        ability: AbilityId,
        reason: CastFailReason,
    },
}

impl CastEvent {
    pub fn actor(&self) -> ActorId {
        match self {
            Self::Cast { actor, .. } | Self::CastFail { actor, .. } => *actor,
        }
    }
}

/// Why an effect stopped ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectEndReason {
    /// The effect hit a target or an obstacle.
    Completed,
    /// Lifetime or range bound exceeded.
    Expired,
    /// Owner went offline or died.
    OwnerGone,
    /// The ability was unregistered while the effect was live.
    AbilityRemoved,
    /// Removed explicitly (owner left, engine shutdown).
    Removed,
}

/// Effect lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectEvent {
    Started {
        effect: EffectId,
        owner: ActorId,
        ability: AbilityId,
    },
    Ended {
        effect: EffectId,
        owner: ActorId,
        ability: AbilityId,
        reason: EffectEndReason,
    },
}

/// Ability catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    Registered { ability: AbilityId },
    Unregistered { ability: AbilityId },
}

/// Session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    Joined { actor: ActorId, restored: bool },
    Left { actor: ActorId },
}
