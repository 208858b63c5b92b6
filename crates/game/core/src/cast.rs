//! Cast outcome types.
//!
//! Casting happens on the hot path, so every outcome is a plain value. A
//! failed cast carries exactly one [`CastFailReason`] that observers can react
//! to without re-deriving the cause.

use std::fmt;

/// Result reported by an ability behavior when invoked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastResult {
    Success,
    /// The behavior could not execute (no target, no source block, ...).
    Failure,
}

impl CastResult {
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Why a cast attempt failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastFailReason {
    /// The caster has not learned the ability.
    NotLearned,
    /// A pre-cast hook vetoed the cast.
    Cancelled,
    /// The ability's cooldown has not expired.
    OnCooldown,
    /// Current magic is below the effective cost.
    InsufficientMagic,
    /// The behavior ran and reported failure.
    CastFailed,
}

impl CastFailReason {
    /// Stable reason code for analytics and UI.
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotLearned => "NOT_LEARNED",
            Self::Cancelled => "CANCELLED",
            Self::OnCooldown => "COOLDOWN",
            Self::InsufficientMagic => "INSUFFICIENT_MAGIC",
            Self::CastFailed => "CAST_FAILED",
        }
    }
}

impl fmt::Display for CastFailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Final outcome of one pass through the cast pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastOutcome {
    /// The behavior succeeded; `cost` magic was consumed.
    Success { cost: u32 },
    Failed(CastFailReason),
}

impl CastOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub const fn fail_reason(&self) -> Option<CastFailReason> {
        match self {
            Self::Success { .. } => None,
            Self::Failed(reason) => Some(*reason),
        }
    }
}
