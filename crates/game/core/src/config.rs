/// Casting configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastConfig {
    /// Maximum magic a freshly created caster starts with.
    pub max_magic: u32,
}

impl CastConfig {
    // ===== compile-time constants used as type parameters =====
    /// Number of hotbar slots an actor can bind abilities to.
    pub const SLOT_COUNT: usize = 9;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_MAGIC: u32 = 100;

    pub fn new() -> Self {
        Self {
            max_magic: Self::DEFAULT_MAX_MAGIC,
        }
    }

    pub fn with_max_magic(max_magic: u32) -> Self {
        Self { max_magic }
    }
}

impl Default for CastConfig {
    fn default() -> Self {
        Self::new()
    }
}
