//! Caster sessions.
//!
//! A session exists from `join` to `leave`. While it exists the actor's
//! ledger lives here behind its own lock, which serializes that actor's
//! casts. Loading and saving run on the blocking pool.
//!
//! `join` and `leave` for one actor are serialized through a per-actor gate,
//! so a rejoin waits for the previous save to land before loading.

mod regen;

pub use regen::MagicRegen;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use spell_core::{ActorId, CastConfig, CasterState};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{error, info, warn};

use crate::api::{EngineError, Result};
use crate::effects::EffectManager;
use crate::events::{EventBus, SessionEvent};
use crate::registry::AbilityRegistry;
use crate::repository::CasterRepository;

/// Shared handle to one actor's ledger.
pub type CasterHandle = Arc<Mutex<CasterState>>;

pub struct CasterManager {
    casters: RwLock<HashMap<ActorId, CasterHandle>>,
    /// One entry per actor that ever joined.
    gates: Mutex<HashMap<ActorId, Arc<AsyncMutex<()>>>>,
    repository: Arc<dyn CasterRepository>,
    registry: Arc<AbilityRegistry>,
    effects: EffectManager,
    events: EventBus,
    config: CastConfig,
}

impl CasterManager {
    pub fn new(
        repository: Arc<dyn CasterRepository>,
        registry: Arc<AbilityRegistry>,
        effects: EffectManager,
        events: EventBus,
        config: CastConfig,
    ) -> Self {
        Self {
            casters: RwLock::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            repository,
            registry,
            effects,
            events,
            config,
        }
    }

    /// Loads (or creates) the actor's ledger and opens a session.
    ///
    /// Returns true if a stored snapshot was restored. Joining twice keeps
    /// the existing session. A join racing a `leave` for the same actor
    /// waits until that leave has saved.
    pub async fn join(&self, actor: ActorId) -> Result<bool> {
        let gate = self.gate(actor);
        let _serial = gate.lock().await;

        if self.is_joined(actor) {
            warn!(target: "runtime::session", actor = %actor, "actor already joined");
            return Ok(false);
        }

        let repository = Arc::clone(&self.repository);
        let snapshot = tokio::task::spawn_blocking(move || repository.load(actor))
            .await
            .map_err(EngineError::TaskJoin)??;

        let restored = snapshot.is_some();
        let state = match snapshot {
            Some(snapshot) => {
                CasterState::restore(actor, &snapshot, |name| self.registry.resolve_tag(name))
            }
            None => {
                info!(
                    target: "runtime::session",
                    actor = %actor,
                    max_magic = self.config.max_magic,
                    "no stored caster, starting fresh"
                );
                CasterState::new(actor, self.config.max_magic)
            }
        };

        self.write_casters()
            .entry(actor)
            .or_insert_with(|| Arc::new(Mutex::new(state)));

        info!(target: "runtime::session", actor = %actor, restored, "actor joined");
        self.events.publish(SessionEvent::Joined { actor, restored });
        Ok(restored)
    }

    /// Tears down the actor's effects, saves the ledger, and closes the
    /// session. Leaving without a session is a warning, not an error.
    pub async fn leave(&self, actor: ActorId) -> Result<()> {
        let gate = self.gate(actor);
        let _serial = gate.lock().await;

        let Some(caster) = self.write_casters().remove(&actor) else {
            warn!(target: "runtime::session", actor = %actor, "leave without active session");
            return Ok(());
        };

        let effects = self.effects.remove_for_actor(actor);
        let snapshot = caster
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot();

        let repository = Arc::clone(&self.repository);
        let saved = tokio::task::spawn_blocking(move || repository.save(actor, &snapshot))
            .await
            .map_err(EngineError::TaskJoin)?;

        self.events.publish(SessionEvent::Left { actor });

        if let Err(e) = saved {
            error!(target: "runtime::session", actor = %actor, error = %e, "failed to save caster");
            return Err(e.into());
        }

        info!(target: "runtime::session", actor = %actor, effects, "actor left");
        Ok(())
    }

    /// Saves every open session. Returns how many were saved; individual
    /// failures are logged.
    pub async fn save_all(&self) -> Result<usize> {
        let snapshots: Vec<_> = self
            .sessions()
            .into_iter()
            .map(|(actor, caster)| {
                let snapshot = caster
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .snapshot();
                (actor, snapshot)
            })
            .collect();

        let repository = Arc::clone(&self.repository);
        let saved = tokio::task::spawn_blocking(move || {
            let mut saved = 0;
            for (actor, snapshot) in snapshots {
                match repository.save(actor, &snapshot) {
                    Ok(()) => saved += 1,
                    Err(e) => error!(
                        target: "runtime::session",
                        actor = %actor,
                        error = %e,
                        "failed to save caster"
                    ),
                }
            }
            saved
        })
        .await
        .map_err(EngineError::TaskJoin)?;

        info!(target: "runtime::session", saved, "saved all casters");
        Ok(saved)
    }

    pub fn get(&self, actor: ActorId) -> Option<CasterHandle> {
        self.read_casters().get(&actor).cloned()
    }

    pub fn is_joined(&self, actor: ActorId) -> bool {
        self.read_casters().contains_key(&actor)
    }

    /// Every open session.
    pub fn sessions(&self) -> Vec<(ActorId, CasterHandle)> {
        self.read_casters()
            .iter()
            .map(|(actor, caster)| (*actor, Arc::clone(caster)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read_casters().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_casters().is_empty()
    }

    fn gate(&self, actor: ActorId) -> Arc<AsyncMutex<()>> {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(gates.entry(actor).or_default())
    }

    fn read_casters(&self) -> std::sync::RwLockReadGuard<'_, HashMap<ActorId, CasterHandle>> {
        self.casters.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_casters(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<ActorId, CasterHandle>> {
        self.casters.write().unwrap_or_else(PoisonError::into_inner)
    }
}
