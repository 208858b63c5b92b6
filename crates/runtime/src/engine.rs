//! High-level engine orchestrator.
//!
//! The engine owns the scheduler, registry, effect manager and caster
//! sessions, wires them to one event bus, and exposes a builder-based API for
//! hosts to drive casting.

use std::sync::{Arc, PoisonError};
use std::time::Duration;

use spell_content::{EngineSettings, SchedulerMode};
use spell_core::{AbilityId, ActorId, CastConfig, CastOutcome, CasterState, House, Millis};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::api::{EngineError, Result};
use crate::cast::CastPipeline;
use crate::clock::Clock;
use crate::effects::EffectManager;
use crate::events::{Event, EventBus, Topic};
use crate::hooks::{CastHook, CastHooks};
use crate::registry::{Ability, AbilityRegistry};
use crate::repository::{CasterRepository, InMemoryCasterRepo};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::session::{CasterManager, MagicRegen};
use crate::world::World;

/// Engine configuration shared across subsystems.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub cast: CastConfig,
    pub scheduler_mode: SchedulerMode,
    /// Region width in blocks (regional mode only).
    pub region_size: u32,
    pub tick: Duration,
    /// Magic restored per regeneration period. Zero disables regeneration.
    pub regen_amount: u32,
    pub regen_interval: Duration,
    pub event_buffer_size: usize,
    /// Upper bound on draining async registrations at shutdown.
    pub shutdown_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&EngineSettings::default())
    }
}

impl From<&EngineSettings> for EngineConfig {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            cast: settings.cast_config(),
            scheduler_mode: settings.scheduler.mode,
            region_size: settings.scheduler.region_size,
            tick: Duration::from_millis(settings.scheduler.tick_interval_ms),
            regen_amount: settings.magic.regen_amount,
            regen_interval: Duration::from_millis(settings.magic.regen_interval_ms),
            event_buffer_size: settings.events.buffer_size,
            shutdown_timeout: Duration::from_millis(settings.registry.shutdown_timeout_ms),
        }
    }
}

/// Main engine.
///
/// Every caster operation addresses an actor with an open session; calls for
/// other actors fail with [`EngineError::UnknownActor`].
pub struct Engine {
    config: EngineConfig,
    events: EventBus,
    world: Arc<dyn World>,
    scheduler: Arc<Scheduler>,
    registry: Arc<AbilityRegistry>,
    effects: EffectManager,
    sessions: Arc<CasterManager>,
    pipeline: CastPipeline,
    regen: Option<TaskHandle>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Opens a session, restoring the stored ledger if there is one.
    pub async fn join(&self, actor: ActorId) -> Result<bool> {
        self.sessions.join(actor).await
    }

    /// Ends the actor's effects, saves the ledger, and closes the session.
    pub async fn leave(&self, actor: ActorId) -> Result<()> {
        self.sessions.leave(actor).await
    }

    pub fn is_joined(&self, actor: ActorId) -> bool {
        self.sessions.is_joined(actor)
    }

    /// Runs `f` with the actor's ledger locked.
    pub fn with_caster<R>(&self, actor: ActorId, f: impl FnOnce(&mut CasterState) -> R) -> Result<R> {
        let caster = self
            .sessions
            .get(actor)
            .ok_or(EngineError::UnknownActor { actor })?;
        let mut state = caster.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&mut state))
    }

    // ========================================================================
    // Ledger
    // ========================================================================

    /// Teaches a registered ability. Returns false if already learned.
    pub fn learn(&self, actor: ActorId, name: &str) -> Result<bool> {
        let ability = self.ability(name)?;
        self.with_caster(actor, |state| state.learn(ability.id().clone()))
    }

    /// Forgets an ability, clearing its slots and cooldown. The ability need
    /// not be registered anymore.
    pub fn unlearn(&self, actor: ActorId, name: &str) -> Result<bool> {
        let id = AbilityId::new(name);
        self.with_caster(actor, |state| state.unlearn(&id))
    }

    pub fn bind_slot(&self, actor: ActorId, slot: usize, name: &str) -> Result<()> {
        let ability = self.ability(name)?;
        self.with_caster(actor, |state| state.bind_slot(slot, ability.spec()))??;
        Ok(())
    }

    pub fn unbind_slot(&self, actor: ActorId, slot: usize) -> Result<Option<AbilityId>> {
        self.with_caster(actor, |state| state.unbind_slot(slot).map(|tag| tag.id))
    }

    /// Joins or leaves a house. Returns the slots cleared because the new
    /// house forbids their element.
    pub fn set_house(&self, actor: ActorId, name: Option<&str>) -> Result<Vec<usize>> {
        let house = match name {
            Some(name) => Some(House::by_name(name).ok_or_else(|| EngineError::UnknownHouse {
                name: name.to_string(),
            })?),
            None => None,
        };
        self.with_caster(actor, |state| state.set_house(house))
    }

    // ========================================================================
    // Casting
    // ========================================================================

    pub fn cast(&self, actor: ActorId, name: &str) -> Result<CastOutcome> {
        let ability = self.ability(name)?;
        self.with_caster(actor, |state| self.pipeline.cast(state, &ability))
    }

    /// Casts the ability bound at `slot`. `None` if nothing castable is bound.
    pub fn cast_slot(&self, actor: ActorId, slot: usize) -> Result<Option<CastOutcome>> {
        self.with_caster(actor, |state| {
            self.pipeline.cast_slot(state, &self.registry, slot)
        })
    }

    /// Milliseconds until the actor can cast `name` again, zero if ready.
    pub fn remaining_cooldown(&self, actor: ActorId, name: &str) -> Result<Millis> {
        let id = AbilityId::new(name);
        let now = self.pipeline.clock().now();
        self.with_caster(actor, |state| state.remaining_cooldown(&id, now))
    }

    // ========================================================================
    // Registry
    // ========================================================================

    pub fn register(&self, ability: Ability) -> Option<Arc<Ability>> {
        self.registry.register(ability)
    }

    /// Unregisters an ability and tears down its live effects.
    pub fn unregister(&self, name: &str) -> Option<Arc<Ability>> {
        let removed = self.registry.unregister(name)?;
        self.effects.remove_for_ability(removed.id());
        Some(removed)
    }

    pub fn register_async(&self, ability: Ability) {
        self.registry.register_async(ability);
    }

    /// Effects of the ability end on their next tick once removal lands.
    pub fn unregister_async(&self, name: &str) {
        self.registry.unregister_async(name);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.events.subscribe(topic)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn world(&self) -> &Arc<dyn World> {
        &self.world
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    pub fn registry(&self) -> &Arc<AbilityRegistry> {
        &self.registry
    }

    pub fn effects(&self) -> &EffectManager {
        &self.effects
    }

    pub fn sessions(&self) -> &Arc<CasterManager> {
        &self.sessions
    }

    pub fn hooks(&self) -> &CastHooks {
        self.pipeline.hooks()
    }

    /// Orderly shutdown: stop regeneration, revert every effect, save every
    /// session, stop the tick loops, then drain the registry.
    pub async fn shutdown(self) -> Result<()> {
        if let Some(regen) = &self.regen {
            regen.cancel();
        }
        self.effects.shutdown();

        let saved = self.sessions.save_all().await;
        self.scheduler.shutdown();
        let drained = self.registry.shutdown(self.config.shutdown_timeout).await;
        if !drained {
            warn!(target: "runtime::registry", "registry shut down with pending registrations");
        }

        let saved = saved?;
        info!(target: "runtime", saved, "engine stopped");
        Ok(())
    }

    fn ability(&self, name: &str) -> Result<Arc<Ability>> {
        self.registry
            .lookup(name)
            .ok_or_else(|| EngineError::UnknownAbility {
                name: name.to_string(),
            })
    }
}

/// Builder for [`Engine`].
pub struct EngineBuilder {
    config: EngineConfig,
    world: Option<Arc<dyn World>>,
    repository: Option<Arc<dyn CasterRepository>>,
    hooks: Vec<Arc<dyn CastHook>>,
}

impl EngineBuilder {
    fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            world: None,
            repository: None,
            hooks: Vec::new(),
        }
    }

    /// Override engine configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the host world (required)
    pub fn world(mut self, world: Arc<dyn World>) -> Self {
        self.world = Some(world);
        self
    }

    /// Set caster persistence. Defaults to in-memory.
    pub fn repository(mut self, repository: Arc<dyn CasterRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Adds a cast hook. Hooks run in priority order.
    pub fn hook(mut self, hook: Arc<dyn CastHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Build the engine. Must be called inside a tokio runtime.
    pub async fn build(self) -> Result<Engine> {
        let world = self.world.ok_or(EngineError::MissingWorld)?;
        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(InMemoryCasterRepo::new()));
        let config = self.config;

        let events = EventBus::with_capacity(config.event_buffer_size);
        let scheduler = Arc::new(match config.scheduler_mode {
            SchedulerMode::Single => Scheduler::single(config.tick),
            SchedulerMode::Regional => Scheduler::regional(config.region_size, config.tick),
        });
        let registry = Arc::new(AbilityRegistry::new(events.clone()));
        let effects = EffectManager::new(
            Arc::clone(&world),
            Arc::clone(&registry),
            Arc::clone(&scheduler),
            events.clone(),
        );
        let sessions = Arc::new(CasterManager::new(
            repository,
            Arc::clone(&registry),
            effects.clone(),
            events.clone(),
            config.cast.clone(),
        ));
        let pipeline = CastPipeline::new(
            CastHooks::new(self.hooks),
            events.clone(),
            Clock::new(),
            Arc::clone(&world),
            Arc::clone(&scheduler),
            effects.clone(),
        );

        let regen = (config.regen_amount > 0).then(|| {
            let period = scheduler.ticks_from_millis(config.regen_interval.as_millis() as u64);
            scheduler.run_repeating(
                MagicRegen::new(Arc::clone(&sessions), config.regen_amount),
                period,
                period,
            )
        });

        info!(
            target: "runtime",
            mode = ?config.scheduler_mode,
            tick_ms = config.tick.as_millis() as u64,
            hooks = pipeline.hooks().len(),
            "engine started"
        );

        Ok(Engine {
            config,
            events,
            world,
            scheduler,
            registry,
            effects,
            sessions,
            pipeline,
            regen,
        })
    }
}
