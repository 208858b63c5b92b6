//! Registered ability: static spec plus pluggable behavior.

use std::fmt;
use std::sync::Arc;

use spell_core::{AbilityId, AbilitySpec, AbilityTag, ActorId, CastResult};

use crate::effects::EffectManager;
use crate::scheduler::Scheduler;
use crate::world::World;

/// Everything a behavior may use while being invoked.
///
/// The caster's ledger is locked for the duration of the cast, so behaviors
/// only see a read-only view of it (`magic_power`).
pub struct CastContext<'a> {
    pub actor: ActorId,
    pub magic_power: u32,
    pub ability: &'a Arc<Ability>,
    pub world: &'a Arc<dyn World>,
    pub scheduler: &'a Arc<Scheduler>,
    pub effects: &'a EffectManager,
}

/// The executable part of an ability.
///
/// `invoke` runs on the caster's thread and must not block. Long-running
/// work is handed to the scheduler or spawned as an effect.
pub trait AbilityBehavior: Send + Sync {
    fn invoke(&self, ctx: &CastContext<'_>) -> CastResult;
}

impl<F> AbilityBehavior for F
where
    F: Fn(&CastContext<'_>) -> CastResult + Send + Sync,
{
    fn invoke(&self, ctx: &CastContext<'_>) -> CastResult {
        self(ctx)
    }
}

pub struct Ability {
    id: AbilityId,
    spec: AbilitySpec,
    behavior: Box<dyn AbilityBehavior>,
}

impl Ability {
    pub fn new(spec: AbilitySpec, behavior: impl AbilityBehavior + 'static) -> Self {
        Self {
            id: spec.id(),
            spec,
            behavior: Box::new(behavior),
        }
    }

    pub fn id(&self) -> &AbilityId {
        &self.id
    }

    pub fn spec(&self) -> &AbilitySpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn tag(&self) -> AbilityTag {
        self.spec.tag()
    }

    pub fn is_enabled(&self) -> bool {
        self.spec.enabled
    }

    pub fn invoke(&self, ctx: &CastContext<'_>) -> CastResult {
        self.behavior.invoke(ctx)
    }
}

impl fmt::Debug for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ability")
            .field("id", &self.id)
            .field("magic_cost", &self.spec.magic_cost)
            .field("cooldown_ms", &self.spec.cooldown_ms)
            .field("enabled", &self.spec.enabled)
            .finish_non_exhaustive()
    }
}
