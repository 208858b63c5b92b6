//! Ability catalog loader.
//!
//! Each catalog entry pairs an [`AbilitySpec`] with named numeric tunables
//! (`params`) that the ability's behavior reads at registration time.

use std::collections::BTreeMap;
use std::path::Path;

use spell_core::{AbilityId, AbilitySpec};

use crate::loaders::{LoadResult, read_file};

const DEFAULT_CATALOG: &str = include_str!("../../data/abilities.ron");

/// One ability definition from the catalog.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CatalogEntry {
    pub spec: AbilitySpec,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

impl CatalogEntry {
    /// Reads a tunable, falling back to `default` when absent.
    pub fn param(&self, name: &str, default: f64) -> f64 {
        self.params.get(name).copied().unwrap_or(default)
    }

    /// Reads a tunable as a flag (non-zero is true).
    pub fn flag(&self, name: &str, default: bool) -> bool {
        self.params.get(name).map_or(default, |value| *value != 0.0)
    }
}

/// Ability definitions keyed by case-insensitive id.
#[derive(Clone, Debug, Default)]
pub struct AbilityCatalog {
    entries: BTreeMap<AbilityId, CatalogEntry>,
}

impl AbilityCatalog {
    /// Loads the catalog shipped with the crate.
    pub fn embedded() -> LoadResult<Self> {
        Self::parse(DEFAULT_CATALOG)
    }

    /// Loads a catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<Self> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    /// Parses a RON list of entries. Later duplicates replace earlier ones.
    pub fn parse(content: &str) -> LoadResult<Self> {
        let entries: Vec<CatalogEntry> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse ability catalog RON: {}", e))?;

        Ok(entries.into_iter().collect())
    }

    /// Looks up an entry by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(&AbilityId::new(name))
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<CatalogEntry> for AbilityCatalog {
    fn from_iter<I: IntoIterator<Item = CatalogEntry>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|entry| (entry.spec.id(), entry))
            .collect();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spell_core::{AbilityCategory, Element};

    #[test]
    fn embedded_catalog_has_builtin_abilities() {
        let catalog = AbilityCatalog::embedded().expect("embedded catalog");

        let aqua = catalog.get("aquamissile").expect("AquaMissile");
        assert_eq!(aqua.spec.name, "AquaMissile");
        assert_eq!(aqua.spec.element, Some(Element::Water));
        assert_eq!(aqua.spec.magic_cost, 35);
        assert_eq!(aqua.spec.cooldown_ms, 6_000);
        assert_eq!(aqua.spec.range, Some(40.0));
        assert_eq!(aqua.param("hit_radius", 0.0), 1.5);
        assert!(aqua.flag("require_source", false));

        let void = catalog.get("VoidReign").expect("VoidReign");
        assert_eq!(void.spec.category, AbilityCategory::Ultimate);
        assert_eq!(void.spec.magic_cost, 100);

        assert!(catalog.get("IceShard").is_some());
        assert!(catalog.get("WaterManipulation").is_some());
    }

    #[test]
    fn missing_params_fall_back() {
        let catalog = AbilityCatalog::parse(
            r#"[
                (spec: (name: "Blink", category: Transportation, magic_cost: 5, cooldown_ms: 500)),
            ]"#,
        )
        .expect("minimal entry");

        let blink = catalog.get("blink").expect("Blink");
        assert!(blink.spec.enabled);
        assert_eq!(blink.spec.element, None);
        assert_eq!(blink.param("speed", 2.5), 2.5);
    }

    #[test]
    fn later_duplicates_win() {
        let catalog = AbilityCatalog::parse(
            r#"[
                (spec: (name: "Blink", category: Utility, magic_cost: 5, cooldown_ms: 500)),
                (spec: (name: "BLINK", category: Utility, magic_cost: 9, cooldown_ms: 500)),
            ]"#,
        )
        .expect("duplicate entries");

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("blink").map(|e| e.spec.magic_cost), Some(9));
    }

    #[test]
    fn malformed_catalog_is_an_error() {
        assert!(AbilityCatalog::parse("[(spec: (name: 3))]").is_err());
    }
}
