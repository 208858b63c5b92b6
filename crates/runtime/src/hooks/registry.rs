//! Ordered hook list.

use std::sync::Arc;

use spell_core::{AbilityId, ActorId, CastFailReason};
use tracing::debug;

use super::{CastHook, PreCastEvent};

/// Hooks sorted by priority, shared by every cast.
#[derive(Clone)]
pub struct CastHooks {
    hooks: Arc<[Arc<dyn CastHook>]>,
}

impl CastHooks {
    /// Creates a hook list sorted by priority (stable for equal priorities).
    pub fn new(mut hooks: Vec<Arc<dyn CastHook>>) -> Self {
        hooks.sort_by_key(|h| h.priority());
        Self {
            hooks: hooks.into(),
        }
    }

    /// Runs `pre_cast` in order until a hook cancels.
    pub fn pre_cast(&self, event: &mut PreCastEvent) {
        for hook in self.hooks.iter() {
            hook.pre_cast(event);
            if event.is_cancelled() {
                debug!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    actor = %event.actor,
                    ability = %event.ability,
                    "cast cancelled by hook"
                );
                return;
            }
        }
    }

    pub fn on_cast(&self, actor: ActorId, ability: &AbilityId, cost: u32) {
        for hook in self.hooks.iter() {
            hook.on_cast(actor, ability, cost);
        }
    }

    pub fn on_fail(&self, actor: ActorId, ability: &AbilityId, reason: CastFailReason) {
        for hook in self.hooks.iter() {
            hook.on_fail(actor, ability, reason);
        }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Returns an iterator over hook names and priorities (for debugging).
    pub fn hooks(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        self.hooks.iter().map(|h| (h.name(), h.priority()))
    }
}

impl Default for CastHooks {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        priority: i32,
        cancel: bool,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    impl CastHook for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn pre_cast(&self, event: &mut PreCastEvent) {
            self.seen.lock().unwrap().push(self.name);
            event.cost += 1;
            if self.cancel {
                event.cancel();
            }
        }
    }

    fn recorder(
        name: &'static str,
        priority: i32,
        cancel: bool,
        seen: &Arc<Mutex<Vec<&'static str>>>,
    ) -> Arc<dyn CastHook> {
        Arc::new(Recorder {
            name,
            priority,
            cancel,
            seen: Arc::clone(seen),
        })
    }

    #[test]
    fn hooks_run_by_priority_and_stop_on_cancel() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let hooks = CastHooks::new(vec![
            recorder("late", 10, false, &seen),
            recorder("veto", 0, true, &seen),
            recorder("early", -10, false, &seen),
        ]);

        let mut event = PreCastEvent::new(ActorId(1), AbilityId::new("Heal"), 10);
        hooks.pre_cast(&mut event);

        assert!(event.is_cancelled());
        assert_eq!(event.cost, 12);
        assert_eq!(*seen.lock().unwrap(), vec!["early", "veto"]);
        assert_eq!(
            hooks.hooks().map(|(name, _)| name).collect::<Vec<_>>(),
            vec!["early", "veto", "late"]
        );
    }
}
