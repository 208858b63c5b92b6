//! Effect lifecycle manager.
//!
//! An effect is a repeating, location-anchored task spawned by an ability
//! (a projectile, a moving water stream). Each tick, in order:
//! 1. the owner must still be online and alive,
//! 2. the ability must still be registered,
//! 3. lifetime and range bounds must hold,
//! 4. the behavior advances and performs one collision/target test.
//!
//! Any failed check tears the effect down: its owned world mutation is
//! reverted first, then its task handle is cancelled. Teardown is idempotent
//! and may race freely with explicit removal.

mod instance;

pub use instance::{EffectBehavior, EffectContext, EffectSpawn, EffectStep};

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use spell_core::{AbilityId, ActorId, Location};
use tracing::{debug, info};

use crate::events::{EffectEndReason, EffectEvent, EventBus};
use crate::registry::AbilityRegistry;
use crate::scheduler::{RepeatingTask, Scheduler, TaskHandle, TickControl};
use crate::world::World;

use instance::EffectInstance;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectId(pub u64);

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect#{}", self.0)
    }
}

struct ActiveEffect {
    owner: ActorId,
    ability: AbilityId,
    handle: TaskHandle,
    instance: Arc<Mutex<EffectInstance>>,
}

struct Inner {
    active: Mutex<HashMap<EffectId, ActiveEffect>>,
    next_id: AtomicU64,
    world: Arc<dyn World>,
    registry: Arc<AbilityRegistry>,
    scheduler: Arc<Scheduler>,
    events: EventBus,
}

/// Tracks every live effect. Cheap to clone.
#[derive(Clone)]
pub struct EffectManager {
    inner: Arc<Inner>,
}

impl EffectManager {
    pub fn new(
        world: Arc<dyn World>,
        registry: Arc<AbilityRegistry>,
        scheduler: Arc<Scheduler>,
        events: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                active: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                world,
                registry,
                scheduler,
                events,
            }),
        }
    }

    /// Starts ticking a new effect every game tick, beginning immediately.
    pub fn spawn(&self, spawn: EffectSpawn) -> EffectId {
        let id = EffectId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let owner = spawn.owner;
        let ability = spawn.ability.id().clone();
        let instance = Arc::new(Mutex::new(EffectInstance::new(id, spawn)));

        let task = EffectTask {
            id,
            instance: Arc::clone(&instance),
            inner: Arc::clone(&self.inner),
        };

        // Held across scheduling so a first tick that finishes immediately
        // still finds the entry.
        let mut active = self.inner.lock_active();
        let handle = self.inner.scheduler.run_repeating(task, 0, 1);
        active.insert(
            id,
            ActiveEffect {
                owner,
                ability: ability.clone(),
                handle,
                instance,
            },
        );
        self.inner.events.publish(EffectEvent::Started {
            effect: id,
            owner,
            ability: ability.clone(),
        });
        drop(active);

        debug!(target: "runtime::effects", effect = %id, actor = %owner, ability = %ability, "effect spawned");
        id
    }

    /// Tears down one effect. Returns false if it was not active.
    pub fn remove(&self, id: EffectId) -> bool {
        let entry = self.inner.lock_active().remove(&id);
        match entry {
            Some(entry) => {
                self.inner.teardown(id, entry, EffectEndReason::Removed);
                true
            }
            None => false,
        }
    }

    /// Tears down every effect owned by `actor`.
    pub fn remove_for_actor(&self, actor: ActorId) -> usize {
        self.remove_where(|entry| entry.owner == actor)
    }

    /// Tears down every effect spawned by `ability`.
    pub fn remove_for_ability(&self, ability: &AbilityId) -> usize {
        self.remove_where(|entry| &entry.ability == ability)
    }

    /// Tears down everything. Every owned mutation is reverted before this
    /// returns.
    pub fn shutdown(&self) -> usize {
        let removed = self.remove_where(|_| true);
        info!(target: "runtime::effects", removed, "effects shut down");
        removed
    }

    pub fn is_active(&self, id: EffectId) -> bool {
        self.inner.lock_active().contains_key(&id)
    }

    pub fn active_count(&self) -> usize {
        self.inner.lock_active().len()
    }

    pub fn active_for(&self, actor: ActorId) -> usize {
        self.inner
            .lock_active()
            .values()
            .filter(|entry| entry.owner == actor)
            .count()
    }

    /// Task handle of a live effect.
    pub fn handle(&self, id: EffectId) -> Option<TaskHandle> {
        self.inner
            .lock_active()
            .get(&id)
            .map(|entry| entry.handle.clone())
    }

    fn remove_where(&self, predicate: impl Fn(&ActiveEffect) -> bool) -> usize {
        let removed: Vec<_> = {
            let mut active = self.inner.lock_active();
            let ids: Vec<_> = active
                .iter()
                .filter(|(_, entry)| predicate(entry))
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| active.remove(&id).map(|entry| (id, entry)))
                .collect()
        };

        let count = removed.len();
        for (id, entry) in removed {
            self.inner.teardown(id, entry, EffectEndReason::Removed);
        }
        count
    }
}

impl Inner {
    fn lock_active(&self) -> std::sync::MutexGuard<'_, HashMap<EffectId, ActiveEffect>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reverts, cancels, and reports an effect already taken out of `active`.
    fn teardown(&self, id: EffectId, entry: ActiveEffect, reason: EffectEndReason) {
        entry
            .instance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .end(self.world.as_ref());
        entry.handle.cancel();
        self.report_end(id, entry.owner, entry.ability, reason);
    }

    /// Called from a tick that ended its own effect (already reverted).
    fn finish_from_tick(&self, id: EffectId, reason: EffectEndReason) {
        let entry = self.lock_active().remove(&id);
        if let Some(entry) = entry {
            entry.handle.cancel();
            self.report_end(id, entry.owner, entry.ability, reason);
        }
    }

    fn report_end(&self, id: EffectId, owner: ActorId, ability: AbilityId, reason: EffectEndReason) {
        debug!(
            target: "runtime::effects",
            effect = %id,
            actor = %owner,
            ability = %ability,
            reason = ?reason,
            "effect ended"
        );
        self.events.publish(EffectEvent::Ended {
            effect: id,
            owner,
            ability,
            reason,
        });
    }
}

/// Repeating task driving one effect.
struct EffectTask {
    id: EffectId,
    instance: Arc<Mutex<EffectInstance>>,
    inner: Arc<Inner>,
}

impl RepeatingTask for EffectTask {
    fn anchor(&self) -> Option<Location> {
        let instance = self.instance.lock().unwrap_or_else(PoisonError::into_inner);
        Some(instance.location())
    }

    fn tick(&mut self) -> TickControl {
        let reason = {
            let mut instance = self.instance.lock().unwrap_or_else(PoisonError::into_inner);
            if instance.is_ended() {
                return TickControl::Stop;
            }
            match instance.tick(self.inner.world.as_ref(), &self.inner.registry) {
                None => return TickControl::Continue,
                Some(reason) => {
                    instance.end(self.inner.world.as_ref());
                    reason
                }
            }
        };

        self.inner.finish_from_tick(self.id, reason);
        TickControl::Stop
    }
}
