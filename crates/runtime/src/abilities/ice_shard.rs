//! Ice shard burst.

use std::sync::Arc;

use spell_content::CatalogEntry;
use spell_core::{BlockKind, CastResult};
use tracing::debug;

use crate::registry::{Ability, AbilityBehavior, CastContext};

/// Draws on nearby ice or water to fire a burst of shards at the nearest
/// targets a short delay after casting.
#[derive(Clone, Debug)]
pub struct IceShard {
    range: f64,
    source_radius: i32,
    shards: usize,
    damage: f64,
    delay_ticks: u64,
}

impl IceShard {
    pub fn from_entry(entry: &CatalogEntry) -> Self {
        Self {
            range: entry.spec.range.unwrap_or(10.0),
            source_radius: entry.param("source_radius", 16.0) as i32,
            shards: entry.param("shards", 5.0) as usize,
            damage: entry.param("damage", 6.0),
            delay_ticks: entry.param("delay_ticks", 1.0) as u64,
        }
    }

    pub fn ability(entry: &CatalogEntry) -> Ability {
        Ability::new(entry.spec.clone(), Self::from_entry(entry))
    }
}

impl AbilityBehavior for IceShard {
    fn invoke(&self, ctx: &CastContext<'_>) -> CastResult {
        let Some(caster) = ctx.world.actor(ctx.actor) else {
            return CastResult::Failure;
        };

        let source = ctx.world.find_block(caster.location.block(), self.source_radius, &|kind| {
            matches!(kind, BlockKind::Ice | BlockKind::Water)
        });
        if source.is_none() {
            debug!(target: "runtime::cast", actor = %ctx.actor, "no ice or water nearby");
            return CastResult::Failure;
        }

        let world = Arc::clone(ctx.world);
        let ability = ctx.ability.id().clone();
        let actor = ctx.actor;
        let origin = caster.eye_location;
        let (range, shards, damage) = (self.range, self.shards, self.damage);

        ctx.scheduler.run_later(Some(origin), self.delay_ticks, move || {
            for target in world.targets_near(actor, &origin, range).into_iter().take(shards) {
                world.damage(actor, target.id, damage, &ability);
            }
        });
        CastResult::Success
    }
}
