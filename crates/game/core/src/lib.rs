//! Deterministic casting rules and data types shared across the engine.
//!
//! `spell-core` defines the canonical per-actor ledger (magic, learned
//! abilities, slot bindings, cooldowns), ability metadata, houses and their
//! elemental restrictions, and the world coordinates effects are anchored to.
//! Everything here is pure data and arithmetic: time is always passed in
//! explicitly, so the same inputs always produce the same outputs.
pub mod ability;
pub mod cast;
pub mod config;
pub mod error;
pub mod house;
pub mod state;
pub mod world;

pub use ability::{
    AbilityCategory, AbilityId, AbilitySpec, AbilityTag, ActivationGesture, ClickAction, Element,
    ElementSet,
};
pub use cast::{CastFailReason, CastOutcome, CastResult};
pub use config::CastConfig;
pub use error::BindError;
pub use house::{House, is_element_allowed};
pub use state::{ActorId, CasterSnapshot, CasterState, Millis};
pub use world::{BlockKind, BlockPos, Location, RegionId, Vec3, WorldId};
