//! Content loaders for reading engine data from files.
//!
//! Settings come from TOML, the ability catalog from RON. Both have an
//! embedded default so the engine boots without any files on disk.

pub mod abilities;
pub mod config;

pub use abilities::{AbilityCatalog, CatalogEntry};
pub use config::ConfigLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
