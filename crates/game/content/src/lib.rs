//! Data-driven content definitions and loaders.
//!
//! This crate houses the static data the engine is configured with:
//! - Engine settings (data-driven via TOML)
//! - Ability catalog: metadata and tunables per built-in ability (RON)
//!
//! Content is consumed by the runtime at startup and never appears in a
//! caster's ledger.

pub mod settings;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use settings::{
    EngineSettings, EventSettings, MagicSettings, PersistenceSettings, RegistrySettings,
    SchedulerMode, SchedulerSettings,
};

#[cfg(feature = "loaders")]
pub use loaders::{AbilityCatalog, CatalogEntry, ConfigLoader, LoadResult};
