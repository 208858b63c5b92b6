//! Homing water projectile.

use spell_content::CatalogEntry;
use spell_core::{BlockKind, CastResult, Location};
use tracing::debug;

use crate::effects::{EffectBehavior, EffectContext, EffectSpawn, EffectStep};
use crate::registry::{Ability, AbilityBehavior, CastContext};

/// Launches a water orb that homes on the nearest target around the caster.
///
/// The orb is drawn from a water block within `source_range`, which is
/// consumed. Without a source it starts at the caster's eyes, unless
/// `require_source` is set, in which case the cast fails.
#[derive(Clone, Debug)]
pub struct AquaMissile {
    range: f64,
    source_range: i32,
    speed: f64,
    hit_radius: f64,
    damage: f64,
    max_ticks: u32,
    require_source: bool,
}

impl AquaMissile {
    pub fn from_entry(entry: &CatalogEntry) -> Self {
        Self {
            range: entry.spec.range.unwrap_or(40.0),
            source_range: entry.param("source_range", 10.0) as i32,
            speed: entry.param("speed", 0.6),
            hit_radius: entry.param("hit_radius", 1.5),
            damage: entry.param("damage", 6.0),
            max_ticks: entry.param("max_ticks", 100.0) as u32,
            require_source: entry.flag("require_source", true),
        }
    }

    pub fn ability(entry: &CatalogEntry) -> Ability {
        Ability::new(entry.spec.clone(), Self::from_entry(entry))
    }
}

impl AbilityBehavior for AquaMissile {
    fn invoke(&self, ctx: &CastContext<'_>) -> CastResult {
        let Some(caster) = ctx.world.actor(ctx.actor) else {
            return CastResult::Failure;
        };

        let source = ctx.world.find_block(
            caster.eye_location.block(),
            self.source_range,
            &|kind| kind == BlockKind::Water,
        );

        let start = match source {
            Some(pos) => {
                ctx.world.set_block(pos, BlockKind::Air);
                pos.center()
            }
            None if self.require_source => {
                debug!(target: "runtime::cast", actor = %ctx.actor, "no water source in range");
                return CastResult::Failure;
            }
            None => caster.eye_location,
        };

        let flight = MissileFlight {
            location: start,
            range: self.range,
            speed: self.speed,
            hit_radius: self.hit_radius,
            damage: self.damage,
        };
        ctx.effects.spawn(
            EffectSpawn::new(ctx.actor, ctx.ability.clone(), start, flight).max_ticks(self.max_ticks),
        );
        CastResult::Success
    }
}

struct MissileFlight {
    location: Location,
    range: f64,
    speed: f64,
    hit_radius: f64,
    damage: f64,
}

impl EffectBehavior for MissileFlight {
    fn location(&self) -> Location {
        self.location
    }

    fn advance(&mut self, ctx: &mut EffectContext<'_>) -> EffectStep {
        let owner = ctx.owner;
        let direction = ctx
            .world
            .targets_near(owner.id, &owner.location, self.range)
            .first()
            .map(|target| (target.eye_location.position - self.location.position).normalize())
            .unwrap_or(owner.direction);

        self.location = self.location.offset(direction * self.speed);

        if ctx.world.block_at(self.location.block()).is_solid() {
            return EffectStep::Finish;
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
