//! Engine settings.
//!
//! Every section and field has a default, so a partial (or empty) TOML file
//! is always valid.

use spell_core::CastConfig;

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineSettings {
    pub magic: MagicSettings,
    pub scheduler: SchedulerSettings,
    pub registry: RegistrySettings,
    pub events: EventSettings,
    pub persistence: PersistenceSettings,
}

impl EngineSettings {
    pub fn cast_config(&self) -> CastConfig {
        CastConfig::with_max_magic(self.magic.max)
    }
}

/// `[magic]`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MagicSettings {
    /// Max magic for casters without a stored snapshot.
    pub max: u32,
    /// Magic restored per regeneration tick. Zero disables regeneration.
    pub regen_amount: u32,
    pub regen_interval_ms: u64,
}

impl Default for MagicSettings {
    fn default() -> Self {
        Self {
            max: CastConfig::DEFAULT_MAX_MAGIC,
            regen_amount: 1,
            regen_interval_ms: 1_000,
        }
    }
}

/// How tick loops are laid out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SchedulerMode {
    /// One global loop runs every task.
    #[default]
    Single,
    /// One loop per world region plus a global loop for unanchored tasks.
    Regional,
}

/// `[scheduler]`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerSettings {
    pub mode: SchedulerMode,
    /// Region width in blocks (regional mode only).
    pub region_size: u32,
    /// Duration of one game tick.
    pub tick_interval_ms: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            mode: SchedulerMode::Single,
            region_size: 512,
            tick_interval_ms: 50,
        }
    }
}

/// `[registry]`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegistrySettings {
    /// Upper bound on waiting for pending registrations at shutdown.
    pub shutdown_timeout_ms: u64,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            shutdown_timeout_ms: 5_000,
        }
    }
}

/// `[events]`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EventSettings {
    pub buffer_size: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self { buffer_size: 256 }
    }
}

/// `[persistence]`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PersistenceSettings {
    /// Directory for caster snapshots. In-memory persistence when unset.
    pub data_dir: Option<String>,
}
