//! Cast pipeline.
//!
//! ```text
//! LearnedCheck → PreCast hooks → CooldownCheck → ResourceCheck → Invoke
//!                                                          ├─ Success → commit
//!                                                          └─ Failure → report
//! ```
//!
//! Steps run strictly in order on the caller's thread with the caster's
//! ledger locked. Every attempt ends with exactly one notification: a `Cast`
//! event on success or a `CastFail` event carrying the first failing step.
//! Magic and cooldown change only after the behavior reports success.

use std::sync::Arc;

use spell_core::{AbilityId, CastFailReason, CastOutcome, CastResult, CasterState};
use tracing::debug;

use crate::clock::Clock;
use crate::effects::EffectManager;
use crate::events::{CastEvent, EventBus};
use crate::hooks::{CastHooks, PreCastEvent};
use crate::registry::{Ability, AbilityRegistry, CastContext};
use crate::scheduler::Scheduler;
use crate::world::World;

pub struct CastPipeline {
    hooks: CastHooks,
    events: EventBus,
    clock: Clock,
    world: Arc<dyn World>,
    scheduler: Arc<Scheduler>,
    effects: EffectManager,
}

impl CastPipeline {
    pub fn new(
        hooks: CastHooks,
        events: EventBus,
        clock: Clock,
        world: Arc<dyn World>,
        scheduler: Arc<Scheduler>,
        effects: EffectManager,
    ) -> Self {
        Self {
            hooks,
            events,
            clock,
            world,
            scheduler,
            effects,
        }
    }

    pub fn hooks(&self) -> &CastHooks {
        &self.hooks
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Runs one cast attempt for the ledger's actor.
    pub fn cast(&self, state: &mut CasterState, ability: &Arc<Ability>) -> CastOutcome {
        let id = ability.id();

        if !state.has_learned(id) {
            return self.fail(state, id, CastFailReason::NotLearned);
        }

        let mut pre_cast = PreCastEvent::new(state.actor(), id.clone(), ability.spec().magic_cost);
        self.hooks.pre_cast(&mut pre_cast);
        if pre_cast.is_cancelled() {
            return self.fail(state, id, CastFailReason::Cancelled);
        }
        let cost = pre_cast.cost;

        let now = self.clock.now();
        if state.is_on_cooldown(id, now) {
            return self.fail(state, id, CastFailReason::OnCooldown);
        }

        if !state.has_magic(cost) {
            return self.fail(state, id, CastFailReason::InsufficientMagic);
        }

        if !ability.is_enabled() {
            return self.fail(state, id, CastFailReason::CastFailed);
        }

        let ctx = CastContext {
            actor: state.actor(),
            magic_power: state.magic_power(),
            ability,
            world: &self.world,
            scheduler: &self.scheduler,
            effects: &self.effects,
        };
        if ability.invoke(&ctx) == CastResult::Failure {
            return self.fail(state, id, CastFailReason::CastFailed);
        }

        state.consume_magic(cost);
        state.set_cooldown(id.clone(), ability.spec().cooldown_ms, now);

        debug!(
            target: "runtime::cast",
            actor = %state.actor(),
            ability = %id,
            cost,
            magic = state.magic(),
            "cast succeeded"
        );
        self.hooks.on_cast(state.actor(), id, cost);
        self.events.publish(CastEvent::Cast {
            actor: state.actor(),
            ability: id.clone(),
            cost,
        });

        CastOutcome::Success { cost }
    }

    /// Casts whatever is bound at `slot`. Empty, out-of-range, or stale
    /// slots do nothing.
    pub fn cast_slot(
        &self,
        state: &mut CasterState,
        registry: &AbilityRegistry,
        slot: usize,
    ) -> Option<CastOutcome> {
        let id = state.spell_at_slot(slot)?.clone();
        let Some(ability) = registry.get(&id) else {
            debug!(
                target: "runtime::cast",
                actor = %state.actor(),
                slot,
                ability = %id,
                "slot bound to an unregistered ability"
            );
            return None;
        };
        Some(self.cast(state, &ability))
    }

    fn fail(&self, state: &CasterState, ability: &AbilityId, reason: CastFailReason) -> CastOutcome {
        debug!(
            target: "runtime::cast",
            actor = %state.actor(),
            ability = %ability,
            reason = %reason,
            "cast failed"
        );
        self.hooks.on_fail(state.actor(), ability, reason);
        self.events.publish(CastEvent::CastFail {
            actor: state.actor(),
            ability: ability.clone(),
            reason,
        });
        CastOutcome::Failed(reason)
    }
}
