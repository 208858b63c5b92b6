//! Unified error types surfaced by the engine API.
//!
//! Cast outcomes are not errors; these cover addressing mistakes (unknown
//! actor, ability, or house), rejected binds, and persistence failures.

use spell_core::{ActorId, BindError};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{actor} has no active session")]
    UnknownActor { actor: ActorId },

    #[error("no ability named {name:?} is registered")]
    UnknownAbility { name: String },

    #[error("no house named {name:?}")]
    UnknownHouse { name: String },

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("persistence task failed")]
    TaskJoin(#[source] tokio::task::JoinError),

    #[error("engine requires a world to be configured before building")]
    MissingWorld,
}
