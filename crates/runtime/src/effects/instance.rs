//! One live effect and its per-tick bookkeeping.

use std::sync::Arc;

use spell_core::{AbilityId, ActorId, BlockKind, BlockPos, Location};

use crate::events::EffectEndReason;
use crate::registry::{Ability, AbilityRegistry};
use crate::world::{ActorView, TempBlock, World};

use super::EffectId;

/// Result of advancing an effect by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectStep {
    Continue,
    /// Hit something or otherwise done; the effect is torn down.
    Finish,
}

/// What an effect's behavior may touch during one tick.
pub struct EffectContext<'a> {
    pub world: &'a dyn World,
    pub owner: &'a ActorView,
    pub ability: &'a AbilityId,
    /// Ticks lived before this one.
    pub tick: u32,
    block: &'a mut Option<TempBlock>,
}

impl EffectContext<'_> {
    /// Moves the effect's single owned block: reverts the current one, if
    /// any, then places `kind` at `pos`.
    pub fn replace_block(&mut self, pos: BlockPos, kind: BlockKind) {
        if let Some(mut previous) = self.block.take() {
            previous.revert(self.world);
        }
        *self.block = Some(TempBlock::place(self.world, pos, kind));
    }

    pub fn block(&self) -> Option<&TempBlock> {
        self.block.as_ref()
    }
}

/// Per-effect movement and collision logic.
pub trait EffectBehavior: Send + 'static {
    /// Current position; drives region affinity and range bounds.
    fn location(&self) -> Location;

    /// Moves the effect and performs exactly one collision/target test.
    fn advance(&mut self, ctx: &mut EffectContext<'_>) -> EffectStep;
}

/// Parameters for a new effect.
pub struct EffectSpawn {
    pub owner: ActorId,
    pub ability: Arc<Ability>,
    pub origin: Location,
    /// Ticks after which the effect expires.
    pub max_ticks: u32,
    /// Max distance from `origin`; unbounded when `None`.
    pub max_range: Option<f64>,
    /// Block the effect already owns at spawn.
    pub block: Option<TempBlock>,
    pub behavior: Box<dyn EffectBehavior>,
}

impl EffectSpawn {
    pub fn new(
        owner: ActorId,
        ability: Arc<Ability>,
        origin: Location,
        behavior: impl EffectBehavior,
    ) -> Self {
        Self {
            owner,
            ability,
            origin,
            max_ticks: u32::MAX,
            max_range: None,
            block: None,
            behavior: Box::new(behavior),
        }
    }

    pub fn max_ticks(mut self, ticks: u32) -> Self {
        self.max_ticks = ticks;
        self
    }

    pub fn max_range(mut self, range: f64) -> Self {
        self.max_range = Some(range);
        self
    }

    pub fn with_block(mut self, block: TempBlock) -> Self {
        self.block = Some(block);
        self
    }
}

pub(crate) struct EffectInstance {
    id: EffectId,
    owner: ActorId,
    ability: Arc<Ability>,
    origin: Location,
    max_ticks: u32,
    max_range: Option<f64>,
    lived: u32,
    block: Option<TempBlock>,
    behavior: Box<dyn EffectBehavior>,
    ended: bool,
}

impl EffectInstance {
    pub(crate) fn new(id: EffectId, spawn: EffectSpawn) -> Self {
        Self {
            id,
            owner: spawn.owner,
            ability: spawn.ability,
            origin: spawn.origin,
            max_ticks: spawn.max_ticks,
            max_range: spawn.max_range,
            lived: 0,
            block: spawn.block,
            behavior: spawn.behavior,
            ended: false,
        }
    }

    pub(crate) fn location(&self) -> Location {
        self.behavior.location()
    }

    pub(crate) fn is_ended(&self) -> bool {
        self.ended
    }

    /// Runs one tick. Returns the reason if the effect must be torn down.
    pub(crate) fn tick(
        &mut self,
        world: &dyn World,
        registry: &AbilityRegistry,
    ) -> Option<EffectEndReason> {
        let Some(owner) = world.actor(self.owner).filter(ActorView::is_present) else {
            return Some(EffectEndReason::OwnerGone);
        };

        if !registry.is_current(&self.ability) {
            return Some(EffectEndReason::AbilityRemoved);
        }

        if self.lived > self.max_ticks {
            return Some(EffectEndReason::Expired);
        }
        let tick = self.lived;
        self.lived += 1;

        if let Some(range) = self.max_range
            && self.location().distance_squared(&self.origin) > range * range
        {
            return Some(EffectEndReason::Expired);
        }

        let mut ctx = EffectContext {
            world,
            owner: &owner,
            ability: self.ability.id(),
            tick,
            block: &mut self.block,
        };
        match self.behavior.advance(&mut ctx) {
            EffectStep::Continue => None,
            EffectStep::Finish => Some(EffectEndReason::Completed),
        }
    }

    /// Reverts the owned block and marks the effect ended.
    ///
    /// Returns false if it had already ended; the block is reverted at most
    /// once no matter how many paths race to end the effect.
    pub(crate) fn end(&mut self, world: &dyn World) -> bool {
        if self.ended {
            return false;
        }
        self.ended = true;
        if let Some(mut block) = self.block.take() {
            block.revert(world);
        }
        tracing::trace!(target: "runtime::effects", effect = %self.id, lived = self.lived, "effect ended");
        true
    }
}
