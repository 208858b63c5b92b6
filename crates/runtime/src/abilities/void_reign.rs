//! Void area ultimate.

use std::sync::Arc;

use spell_content::CatalogEntry;
use spell_core::CastResult;

use crate::registry::{Ability, AbilityBehavior, CastContext};

/// Damages everyone within `radius` of the caster once, off the tick loops.
/// Damage is `base_damage + magic_power * power_scale`.
#[derive(Clone, Debug)]
pub struct VoidReign {
    radius: f64,
    base_damage: f64,
    power_scale: f64,
}

impl VoidReign {
    pub fn from_entry(entry: &CatalogEntry) -> Self {
        Self {
            radius: entry.param("radius", 8.0),
            base_damage: entry.param("base_damage", 8.0),
            power_scale: entry.param("power_scale", 0.3),
        }
    }

    pub fn ability(entry: &CatalogEntry) -> Ability {
        Ability::new(entry.spec.clone(), Self::from_entry(entry))
    }

    pub fn damage_for(&self, magic_power: u32) -> f64 {
        self.base_damage + f64::from(magic_power) * self.power_scale
    }
}

impl AbilityBehavior for VoidReign {
    fn invoke(&self, ctx: &CastContext<'_>) -> CastResult {
        let Some(caster) = ctx.world.actor(ctx.actor) else {
            return CastResult::Failure;
        };

        let world = Arc::clone(ctx.world);
        let ability = ctx.ability.id().clone();
        let actor = ctx.actor;
        let center = caster.location;
        let radius = self.radius;
        let damage = self.damage_for(ctx.magic_power);

        ctx.scheduler.run_async(move || {
            for target in world.targets_near(actor, &center, radius) {
                world.damage(actor, target.id, damage, &ability);
            }
        });
        CastResult::Success
    }
}
