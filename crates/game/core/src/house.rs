//! Houses and their elemental restrictions.
//!
//! A caster may belong to one house. The house decides which elements its
//! members may keep bound to slots; abilities without an element are
//! usable by every house.

use crate::ability::{Element, ElementSet};

/// A magical house a caster may belong to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct House {
    /// Unique upper-case name, used as the lookup and persistence key.
    pub name: String,
    pub display_name: String,
    pub motto: String,
    pub symbol: String,
    pub elements: ElementSet,
}

impl House {
    pub fn new(
        name: &str,
        display_name: impl Into<String>,
        motto: impl Into<String>,
        symbol: impl Into<String>,
        elements: ElementSet,
    ) -> Self {
        Self {
            name: name.trim().to_uppercase(),
            display_name: display_name.into(),
            motto: motto.into(),
            symbol: symbol.into(),
            elements,
        }
    }

    /// Cunning and destructive magic.
    pub fn vulmeron() -> Self {
        Self::new(
            "VULMERON",
            "Vulmeron",
            "Cunning above all",
            "Silver Fox & Quill",
            ElementSet::FIRE | ElementSet::HEAT | ElementSet::LIGHTNING | ElementSet::LAVA,
        )
    }

    /// Strength and resilience.
    pub fn drakmor() -> Self {
        Self::new(
            "DRAKMOR",
            "Drakmor",
            "Bravery through strength",
            "Dragon & Sword",
            ElementSet::EARTH | ElementSet::AIR,
        )
    }

    /// Wisdom and balance.
    pub fn aurevale() -> Self {
        Self::new(
            "AUREVALE",
            "Aurevale",
            "Knowledge lights the way",
            "Owl & Lantern",
            ElementSet::NATURE | ElementSet::WATER | ElementSet::ICE,
        )
    }

    /// Shadow and forbidden magic.
    pub fn noctyra() -> Self {
        Self::new(
            "NOCTYRA",
            "Noctyra",
            "Power lies in shadows",
            "Serpent & Moon",
            ElementSet::DARK | ElementSet::SHADOW | ElementSet::VOID | ElementSet::LIGHT,
        )
    }

    /// All built-in houses.
    pub fn builtin() -> [House; 4] {
        [
            Self::vulmeron(),
            Self::drakmor(),
            Self::aurevale(),
            Self::noctyra(),
        ]
    }

    /// Looks up a built-in house by name, ignoring case.
    pub fn by_name(name: &str) -> Option<House> {
        let key = name.trim().to_uppercase();
        Self::builtin().into_iter().find(|house| house.name == key)
    }

    /// Returns true if members may use abilities of `element`.
    pub fn allows(&self, element: Element) -> bool {
        self.elements.allows(element)
    }
}

/// House restriction contract consumed by slot binding and house assignment.
///
/// An ability without an elemental tag is always allowed.
pub fn is_element_allowed(house: &House, element: Option<Element>) -> bool {
    element.is_none_or(|element| house.allows(element))
}
