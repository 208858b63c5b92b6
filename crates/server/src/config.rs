//! Server configuration read from the environment.

use std::env;
use std::path::PathBuf;

/// Paths the server reads and writes.
///
/// Every value can be overridden through the environment (or a `.env` file):
/// - `SPELLCRAFT_CONFIG`: engine settings TOML (embedded defaults if unset)
/// - `SPELLCRAFT_ABILITIES`: ability catalog RON (embedded catalog if unset)
/// - `SPELLCRAFT_DATA_DIR`: caster snapshots; overrides `[persistence]`
/// - `SPELLCRAFT_LOG_DIR`: log files
/// - `SPELLCRAFT_LOG_STDERR`: also log to stderr (default: true)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub settings_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub log_dir: PathBuf,
    pub log_to_stderr: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            settings_path: read_path("SPELLCRAFT_CONFIG"),
            catalog_path: read_path("SPELLCRAFT_ABILITIES"),
            data_dir: read_path("SPELLCRAFT_DATA_DIR"),
            log_dir: read_path("SPELLCRAFT_LOG_DIR").unwrap_or_else(default_log_dir),
            log_to_stderr: read_env::<bool>("SPELLCRAFT_LOG_STDERR").unwrap_or(true),
        }
    }
}

/// Platform cache directory, e.g. `~/.cache/spellcraft/logs` on Linux.
fn default_log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "spellcraft")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/spellcraft"))
        .join("logs")
}

fn read_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
