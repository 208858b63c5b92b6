//! Steerable water stream.

use spell_content::CatalogEntry;
use spell_core::{BlockKind, CastResult, Location, Vec3};

use crate::effects::{EffectBehavior, EffectContext, EffectSpawn, EffectStep};
use crate::registry::{Ability, AbilityBehavior, CastContext};
use crate::world::TempBlock;

/// Sends a temporary water block forward from the caster's eyes. The
/// caster steers it by sneaking. Each move reverts the previous block.
#[derive(Clone, Debug)]
pub struct WaterManipulation {
    range: f64,
    speed: f64,
    hit_radius: f64,
    damage: f64,
    max_ticks: u32,
}

impl WaterManipulation {
    pub fn from_entry(entry: &CatalogEntry) -> Self {
        Self {
            range: entry.spec.range.unwrap_or(25.0),
            speed: entry.param("speed", 1.0),
            hit_radius: entry.param("hit_radius", 1.2),
            damage: entry.param("damage", 4.0),
            max_ticks: entry.param("max_ticks", 60.0) as u32,
        }
    }

    pub fn ability(entry: &CatalogEntry) -> Ability {
        Ability::new(entry.spec.clone(), Self::from_entry(entry))
    }
}

impl AbilityBehavior for WaterManipulation {
    fn invoke(&self, ctx: &CastContext<'_>) -> CastResult {
        let Some(caster) = ctx.world.actor(ctx.actor) else {
            return CastResult::Failure;
        };

        let origin = caster.eye_location;
        let water = TempBlock::place(ctx.world.as_ref(), origin.block(), BlockKind::Water);
        let stream = WaterStream {
            location: origin,
            direction: caster.direction,
            speed: self.speed,
            hit_radius: self.hit_radius,
            damage: self.damage,
        };

        ctx.effects.spawn(
            EffectSpawn::new(ctx.actor, ctx.ability.clone(), origin, stream)
                .max_ticks(self.max_ticks)
                .max_range(self.range)
                .with_block(water),
        );
        CastResult::Success
    }
}

struct WaterStream {
    location: Location,
    direction: Vec3,
    speed: f64,
    hit_radius: f64,
    damage: f64,
}

impl EffectBehavior for WaterStream {
    fn location(&self) -> Location {
        self.location
    }

    fn advance(&mut self, ctx: &mut EffectContext<'_>) -> EffectStep {
        let owner = ctx.owner;
        if owner.sneaking {
            self.direction = owner.direction;
        }

        self.location = self.location.offset(self.direction * self.speed);
        let pos = self.location.block();

        if ctx.world.block_at(pos).is_solid() {
            return EffectStep::Finish;
        }
        if ctx.block().is_none_or(|water| water.pos() != pos) {
            ctx.replace_block(pos, BlockKind::Water);
        }

        match ctx
            .world
            .targets_near(owner.id, &self.location, self.hit_radius)
            .first()
        {
            Some(target) => {
                ctx.world.damage(owner.id, target.id, self.damage, ctx.ability);
                EffectStep::Finish
            }
            None => EffectStep::Continue,
        }
    }
}
