//! Runtime orchestration for the spellcasting engine.
//!
//! This crate wires the pure casting rules from `spell-core` to a host world:
//! an ability registry, a tick scheduler with optional region affinity,
//! location-anchored effects, per-actor sessions with persistence, and a
//! topic-based event bus. Hosts embed [`Engine`] and implement [`World`].
//!
//! Modules are organized by responsibility:
//! - [`engine`] hosts the orchestrator and builder
//! - [`cast`] runs the ordered cast pipeline
//! - [`registry`] and [`abilities`] hold ability definitions and built-ins
//! - [`effects`] and [`scheduler`] drive everything that outlives a cast
//! - [`session`] and [`repository`] own caster ledgers and their storage
//! - [`events`] and [`hooks`] let observers watch and shape casts
//! - [`world`] is the port to the host world
pub mod abilities;
pub mod api;
pub mod cast;
pub mod clock;
pub mod effects;
pub mod engine;
pub mod events;
pub mod hooks;
pub mod registry;
pub mod repository;
pub mod scheduler;
pub mod session;
pub mod world;

pub use abilities::{builtin_abilities, register_builtins};
pub use api::{EngineError, Result};
pub use cast::CastPipeline;
pub use clock::Clock;
pub use effects::{
    EffectBehavior, EffectContext, EffectId, EffectManager, EffectSpawn, EffectStep,
};
pub use engine::{Engine, EngineBuilder, EngineConfig};
pub use events::{
    CastEvent, EffectEndReason, EffectEvent, Event, EventBus, RegistryEvent, SessionEvent, Topic,
};
pub use hooks::{CastHook, CastHooks, PerkDiscountHook, PreCastEvent};
pub use registry::{Ability, AbilityBehavior, AbilityRegistry, CastContext};
pub use repository::{
    CasterRepository, FileCasterRepository, InMemoryCasterRepo, RepositoryError,
};
pub use scheduler::{RepeatingTask, Scheduler, TaskHandle, TickControl};
pub use session::{CasterManager, MagicRegen};
pub use world::{ActorView, DamageRecord, InMemoryWorld, TempBlock, World};
