//! Built-in abilities.
//!
//! Each ability reads its metadata and tunables from an [`AbilityCatalog`]
//! entry, so costs, cooldowns and damage are data-driven.

mod aqua_missile;
mod ice_shard;
mod void_reign;
mod water_manipulation;

pub use aqua_missile::AquaMissile;
pub use ice_shard::IceShard;
pub use void_reign::VoidReign;
pub use water_manipulation::WaterManipulation;

use spell_content::{AbilityCatalog, CatalogEntry};
use tracing::warn;

use crate::registry::{Ability, AbilityRegistry};

type Builder = fn(&CatalogEntry) -> Ability;

const BUILTINS: [(&str, Builder); 4] = [
    ("AquaMissile", AquaMissile::ability),
    ("WaterManipulation", WaterManipulation::ability),
    ("IceShard", IceShard::ability),
    ("VoidReign", VoidReign::ability),
];

/// Builds every built-in ability the catalog has an entry for.
pub fn builtin_abilities(catalog: &AbilityCatalog) -> Vec<Ability> {
    BUILTINS
        .iter()
        .filter_map(|(name, build)| match catalog.get(name) {
            Some(entry) => Some(build(entry)),
            None => {
                warn!(target: "runtime::registry", ability = name, "no catalog entry, skipping");
                None
            }
        })
        .collect()
}

/// Registers the built-ins synchronously. Returns how many were registered.
pub fn register_builtins(registry: &AbilityRegistry, catalog: &AbilityCatalog) -> usize {
    let abilities = builtin_abilities(catalog);
    let count = abilities.len();
    for ability in abilities {
        registry.register(ability);
    }
    count
}
