//! Ability registry.
//!
//! The catalog is an immutable map behind an `Arc`, swapped wholesale on
//! every change (copy-on-write). Lookups clone the current `Arc` and never
//! observe a partially applied registration, while writers serialize on the
//! swap. Async registration runs on the tokio pool and is tracked so that
//! [`AbilityRegistry::shutdown`] can drain it.

mod ability;

pub use ability::{Ability, AbilityBehavior, CastContext};

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use spell_core::{AbilityId, AbilityTag};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::events::{EventBus, RegistryEvent};

type Catalog = HashMap<AbilityId, Arc<Ability>>;

pub struct AbilityRegistry {
    catalog: RwLock<Arc<Catalog>>,
    pending: Mutex<Vec<JoinHandle<()>>>,
    /// Cleared when shutdown starts; new submissions are rejected.
    accepting: AtomicBool,
    /// Set once pending work is drained; late writes are dropped.
    closed: AtomicBool,
    events: EventBus,
}

impl AbilityRegistry {
    pub fn new(events: EventBus) -> Self {
        Self {
            catalog: RwLock::new(Arc::new(Catalog::new())),
            pending: Mutex::new(Vec::new()),
            accepting: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            events,
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Current catalog. Later changes do not affect the returned map.
    pub fn snapshot(&self) -> Arc<HashMap<AbilityId, Arc<Ability>>> {
        Arc::clone(&self.catalog.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Looks up an ability by name, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<Arc<Ability>> {
        self.get(&AbilityId::new(name))
    }

    pub fn get(&self, id: &AbilityId) -> Option<Arc<Ability>> {
        self.snapshot().get(id).cloned()
    }

    /// Returns true if this exact instance is the one currently registered.
    pub fn is_current(&self, ability: &Arc<Ability>) -> bool {
        self.get(ability.id())
            .is_some_and(|current| Arc::ptr_eq(&current, ability))
    }

    /// Identity and element of a registered ability, for ledger restores.
    pub fn resolve_tag(&self, name: &str) -> Option<AbilityTag> {
        self.lookup(name).map(|ability| ability.tag())
    }

    /// Every registered ability, ordered by id.
    pub fn all(&self) -> Vec<Arc<Ability>> {
        let mut abilities: Vec<_> = self.snapshot().values().cloned().collect();
        abilities.sort_by(|a, b| a.id().cmp(b.id()));
        abilities
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Registers an ability, replacing any ability with the same id.
    pub fn register(&self, ability: Ability) -> Option<Arc<Ability>> {
        if !self.accepting.load(Ordering::SeqCst) {
            warn!(
                target: "runtime::registry",
                ability = %ability.id(),
                "registry is shutting down, registration ignored"
            );
            return None;
        }
        self.apply_register(Arc::new(ability))
    }

    /// Removes an ability. Unknown names are a warning, not an error.
    pub fn unregister(&self, name: &str) -> Option<Arc<Ability>> {
        self.apply_unregister(&AbilityId::new(name))
    }

    /// Registers on the async pool. Returns immediately.
    pub fn register_async(self: &Arc<Self>, ability: Ability) {
        if !self.accepting.load(Ordering::SeqCst) {
            warn!(
                target: "runtime::registry",
                ability = %ability.id(),
                "registry is shutting down, async registration ignored"
            );
            return;
        }
        let registry = Arc::clone(self);
        let ability = Arc::new(ability);
        self.track(tokio::spawn(async move {
            registry.apply_register(ability);
        }));
    }

    /// Unregisters on the async pool. Returns immediately.
    pub fn unregister_async(self: &Arc<Self>, name: &str) {
        if !self.accepting.load(Ordering::SeqCst) {
            warn!(
                target: "runtime::registry",
                ability = %AbilityId::new(name),
                "registry is shutting down, async unregistration ignored"
            );
            return;
        }
        let registry = Arc::clone(self);
        let id = AbilityId::new(name);
        self.track(tokio::spawn(async move {
            registry.apply_unregister(&id);
        }));
    }

    /// Waits for every async registration submitted so far.
    pub async fn settle(&self) {
        for handle in self.take_pending() {
            report_join(handle.await);
        }
    }

    /// Stops accepting work, waits up to `timeout` for pending async
    /// registrations, then clears the catalog.
    ///
    /// Returns false if the wait timed out.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.accepting.store(false, Ordering::SeqCst);

        let pending = self.take_pending();
        let count = pending.len();
        let drained = tokio::time::timeout(timeout, async move {
            for handle in pending {
                report_join(handle.await);
            }
        })
        .await
        .is_ok();

        if !drained {
            warn!(
                target: "runtime::registry",
                pending = count,
                timeout_ms = timeout.as_millis() as u64,
                "timed out waiting for pending registrations"
            );
        }

        self.closed.store(true, Ordering::SeqCst);
        let removed = {
            let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *catalog, Arc::new(Catalog::new())).len()
        };

        info!(target: "runtime::registry", removed, "ability registry shut down");
        drained
    }

    fn apply_register(&self, ability: Arc<Ability>) -> Option<Arc<Ability>> {
        let id = ability.id().clone();
        {
            let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
            if self.closed.load(Ordering::SeqCst) {
                warn!(target: "runtime::registry", ability = %id, "registry closed, registration dropped");
                return None;
            }
            let mut next = Catalog::clone(&catalog);
            if next.insert(id.clone(), Arc::clone(&ability)).is_some() {
                warn!(target: "runtime::registry", ability = %id, "ability replaced by newer registration");
            }
            *catalog = Arc::new(next);
        }

        debug!(target: "runtime::registry", ability = %id, "ability registered");
        self.events
            .publish(RegistryEvent::Registered { ability: id });
        Some(ability)
    }

    fn apply_unregister(&self, id: &AbilityId) -> Option<Arc<Ability>> {
        let removed = {
            let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
            if !catalog.contains_key(id) {
                None
            } else {
                let mut next = Catalog::clone(&catalog);
                let removed = next.remove(id);
                *catalog = Arc::new(next);
                removed
            }
        };

        match &removed {
            Some(_) => {
                debug!(target: "runtime::registry", ability = %id, "ability unregistered");
                self.events.publish(RegistryEvent::Unregistered {
                    ability: id.clone(),
                });
            }
            None => {
                warn!(target: "runtime::registry", ability = %id, "unregister of unknown ability ignored");
            }
        }
        removed
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|task| !task.is_finished());
        pending.push(handle);
    }

    fn take_pending(&self) -> Vec<JoinHandle<()>> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

fn report_join(result: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        warn!(target: "runtime::registry", error = %e, "registration task failed");
    }
}
