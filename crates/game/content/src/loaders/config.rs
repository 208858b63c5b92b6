//! Engine settings loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::settings::EngineSettings;

const DEFAULT_CONFIG: &str = include_str!("../../data/config.toml");

/// Loader for engine settings from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> LoadResult<EngineSettings> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    /// Parse settings from TOML text.
    pub fn parse(content: &str) -> LoadResult<EngineSettings> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))
    }

    /// Settings shipped with the crate.
    pub fn embedded() -> LoadResult<EngineSettings> {
        Self::parse(DEFAULT_CONFIG)
    }
}
