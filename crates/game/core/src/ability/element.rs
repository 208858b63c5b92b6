//! Magic elements and element sets.
//!
//! Elements are the thematic tag of an ability. Houses restrict which
//! elements their members may keep bound, which is expressed with
//! [`ElementSet`] bit sets.

use strum::IntoEnumIterator;

/// Elemental tag carried by an ability.
///
/// Names parse case-insensitively (`"fire"`, `"FIRE"` and `"Fire"` are the
/// same element) and display in upper case.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(ascii_case_insensitive, serialize_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    Fire,
    Lightning,
    Earth,
    Air,
    Water,
    Ice,
    Nature,
    Light,
    Dark,
    Shadow,
    Void,
    Lava,
    Heat,
}

impl Element {
    /// Parses an element name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        name.trim().parse().ok()
    }

    /// Returns the canonical upper-case name.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Returns the single-bit set for this element.
    pub const fn bit(self) -> ElementSet {
        match self {
            Self::Fire => ElementSet::FIRE,
            Self::Lightning => ElementSet::LIGHTNING,
            Self::Earth => ElementSet::EARTH,
            Self::Air => ElementSet::AIR,
            Self::Water => ElementSet::WATER,
            Self::Ice => ElementSet::ICE,
            Self::Nature => ElementSet::NATURE,
            Self::Light => ElementSet::LIGHT,
            Self::Dark => ElementSet::DARK,
            Self::Shadow => ElementSet::SHADOW,
            Self::Void => ElementSet::VOID,
            Self::Lava => ElementSet::LAVA,
            Self::Heat => ElementSet::HEAT,
        }
    }
}

bitflags::bitflags! {
    /// Set of elements, used for house restrictions.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ElementSet: u16 {
        const FIRE = 1 << 0;
        const LIGHTNING = 1 << 1;
        const EARTH = 1 << 2;
        const AIR = 1 << 3;
        const WATER = 1 << 4;
        const ICE = 1 << 5;
        const NATURE = 1 << 6;
        const LIGHT = 1 << 7;
        const DARK = 1 << 8;
        const SHADOW = 1 << 9;
        const VOID = 1 << 10;
        const LAVA = 1 << 11;
        const HEAT = 1 << 12;
    }
}

impl ElementSet {
    /// Returns true if `element` is a member of this set.
    pub fn allows(self, element: Element) -> bool {
        self.contains(element.bit())
    }

    /// Iterates the elements in this set in declaration order.
    pub fn elements(self) -> impl Iterator<Item = Element> {
        Element::iter().filter(move |element| self.allows(*element))
    }
}

impl From<Element> for ElementSet {
    fn from(element: Element) -> Self {
        element.bit()
    }
}

impl FromIterator<Element> for ElementSet {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ElementSet::empty(), |set, element| set | element.bit())
    }
}
