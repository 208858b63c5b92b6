//! Ability identity and static metadata.
//!
//! An ability is identified by its display name. Lookups are
//! case-insensitive: [`AbilityId`] stores the trimmed, lower-cased name so
//! `"AquaMissile"`, `"aquamissile"` and `"AQUAMISSILE"` all refer to the same
//! entry. The original spelling is kept on [`AbilitySpec::name`] for display.
//!
//! # Design
//!
//! - **AbilitySpec**: immutable metadata (cost, cooldown, element, ...)
//! - **AbilityTag**: the identity + element pair the ledger stores per slot
//! - Behaviors live in the runtime; this crate only knows the data

mod element;

pub use element::{Element, ElementSet};

use std::fmt;
use std::sync::Arc;

use crate::state::Millis;

// ============================================================================
// Identity
// ============================================================================

/// Case-insensitive ability identity.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub struct AbilityId(Arc<str>);

impl AbilityId {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name.trim().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AbilityId({})", self.0)
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AbilityId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for AbilityId {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<AbilityId> for String {
    fn from(id: AbilityId) -> Self {
        id.0.to_string()
    }
}

/// Identity plus elemental tag, the part of an ability the ledger needs to
/// enforce house restrictions on bound slots.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AbilityTag {
    pub id: AbilityId,
    pub element: Option<Element>,
}

impl AbilityTag {
    pub fn new(id: AbilityId, element: Option<Element>) -> Self {
        Self { id, element }
    }
}

// ============================================================================
// Category
// ============================================================================

/// Category an ability belongs to, used for organization and filtering.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityCategory {
    Elemental,
    Combat,
    Utility,
    Healing,
    Protection,
    Transportation,
    Offensive,
    Summoning,
    /// Powerful abilities with long cooldowns and high magic cost.
    Ultimate,
}

impl AbilityCategory {
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Elemental => "Elemental",
            Self::Combat => "Combat",
            Self::Utility => "Utility",
            Self::Healing => "Healing",
            Self::Protection => "Protection",
            Self::Transportation => "Transportation",
            Self::Offensive => "Offensive",
            Self::Summoning => "Summoning",
            Self::Ultimate => "Ultimate",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Elemental => "Spells that harness the power of elements",
            Self::Combat => "Offensive spells for battle",
            Self::Utility => "Helpful spells for various purposes",
            Self::Healing => "Spells that restore health and cure ailments",
            Self::Protection => "Defensive spells and shields",
            Self::Transportation => "Spells for movement and travel",
            Self::Offensive => "Spells used for wide range attacks",
            Self::Summoning => "Spells that summon pets or creatures",
            Self::Ultimate => "Powerful spells with long cooldowns and high magic cost",
        }
    }
}

// ============================================================================
// Activation gesture
// ============================================================================

/// Mouse action that triggers an ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClickAction {
    LeftClick,
    RightClick,
}

/// Input gesture descriptor. Opaque to the engine; carried for input
/// front-ends that map gestures to casts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActivationGesture {
    pub sneaking: bool,
    pub click: Option<ClickAction>,
    /// Player-facing usage hint, e.g. "Sneak to launch a homing water orb!".
    pub hint: String,
}

// ============================================================================
// Spec
// ============================================================================

/// Static ability metadata.
///
/// Effectively immutable once registered; replacing an ability means
/// unregistering the old definition and registering a new one.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySpec {
    /// Display name. The lookup key is derived from it via [`AbilityId::new`].
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    pub category: AbilityCategory,
    #[cfg_attr(feature = "serde", serde(default))]
    pub element: Option<Element>,
    pub magic_cost: u32,
    pub cooldown_ms: Millis,
    #[cfg_attr(feature = "serde", serde(default))]
    pub range: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default = "enabled_by_default"))]
    pub enabled: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub gesture: ActivationGesture,
}

#[cfg(feature = "serde")]
fn enabled_by_default() -> bool {
    true
}

impl AbilitySpec {
    pub fn new(name: impl Into<String>, category: AbilityCategory) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category,
            element: None,
            magic_cost: 0,
            cooldown_ms: 0,
            range: None,
            enabled: true,
            gesture: ActivationGesture::default(),
        }
    }

    pub fn id(&self) -> AbilityId {
        AbilityId::new(&self.name)
    }

    pub fn tag(&self) -> AbilityTag {
        AbilityTag::new(self.id(), self.element)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    pub fn with_cost(mut self, magic_cost: u32) -> Self {
        self.magic_cost = magic_cost;
        self
    }

    pub fn with_cooldown(mut self, cooldown_ms: Millis) -> Self {
        self.cooldown_ms = cooldown_ms;
        self
    }

    pub fn with_range(mut self, range: f64) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_gesture(mut self, gesture: ActivationGesture) -> Self {
        self.gesture = gesture;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_ignore_case_and_whitespace() {
        assert_eq!(AbilityId::new("AquaMissile"), AbilityId::new("aquamissile"));
        assert_eq!(AbilityId::new("  IceShard "), AbilityId::new("ICESHARD"));
        assert_eq!(AbilityId::new("VoidReign").as_str(), "voidreign");
    }

    #[test]
    fn spec_id_derives_from_name() {
        let spec = AbilitySpec::new("WaterManipulation", AbilityCategory::Combat)
            .with_element(Element::Water)
            .with_cost(20);

        assert_eq!(spec.id(), AbilityId::new("watermanipulation"));
        assert_eq!(spec.tag().element, Some(Element::Water));
        assert!(spec.enabled);
    }

    #[test]
    fn categories_parse_case_insensitively() {
        assert_eq!(
            "ultimate".parse::<AbilityCategory>().ok(),
            Some(AbilityCategory::Ultimate)
        );
        assert_eq!(AbilityCategory::Healing.display_name(), "Healing");
    }
}
