//! Standalone spellcasting server.
//!
//! Composition root: loads settings and the ability catalog, picks a
//! persistence backend, builds the engine over an in-memory world, and runs
//! until interrupted. Hosts embedding the engine in a real game world use
//! `spell-runtime` directly and implement its `World` port.

mod config;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use spell_content::{AbilityCatalog, ConfigLoader, EngineSettings};
use spell_runtime::{
    CasterRepository, Engine, EngineConfig, EventBus, FileCasterRepository, InMemoryCasterRepo,
    InMemoryWorld, PerkDiscountHook, Topic, register_builtins,
};
use tokio::sync::broadcast::error::RecvError;

use config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env();
    let _guard = logging::setup_logging(&config.log_dir, config.log_to_stderr)?;

    let settings = load_settings(&config)?;
    let catalog = load_catalog(&config)?;
    let repository = open_repository(&config, &settings)?;

    let engine = Engine::builder()
        .config(EngineConfig::from(&settings))
        .world(Arc::new(InMemoryWorld::new()))
        .repository(repository)
        .hook(Arc::new(PerkDiscountHook::new()))
        .build()
        .await?;

    let registered = register_builtins(engine.registry(), &catalog);
    tracing::info!(registered, catalog = catalog.len(), "abilities registered");

    spawn_event_log(engine.events());

    tracing::info!("Spellcraft server running, press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    tracing::info!("Shutting down");
    engine.shutdown().await?;
    Ok(())
}

fn load_settings(config: &ServerConfig) -> Result<EngineSettings> {
    match &config.settings_path {
        Some(path) => {
            tracing::info!("Loading settings from {}", path.display());
            ConfigLoader::load(path)
        }
        None => ConfigLoader::embedded(),
    }
}

fn load_catalog(config: &ServerConfig) -> Result<AbilityCatalog> {
    match &config.catalog_path {
        Some(path) => {
            tracing::info!("Loading ability catalog from {}", path.display());
            AbilityCatalog::load(path)
        }
        None => AbilityCatalog::embedded(),
    }
}

fn open_repository(
    config: &ServerConfig,
    settings: &EngineSettings,
) -> Result<Arc<dyn CasterRepository>> {
    let data_dir = config
        .data_dir
        .clone()
        .or_else(|| settings.persistence.data_dir.as_ref().map(PathBuf::from));

    Ok(match data_dir {
        Some(dir) => {
            tracing::info!("Persisting casters to {}", dir.display());
            let repository = FileCasterRepository::new(&dir)
                .with_context(|| format!("Failed to open data directory {}", dir.display()))?;
            Arc::new(repository)
        }
        None => {
            tracing::warn!("No data directory configured, casters are kept in memory only");
            Arc::new(InMemoryCasterRepo::new())
        }
    })
}

/// Mirrors every engine event into the log at debug level.
fn spawn_event_log(events: &EventBus) {
    for (topic, mut rx) in events.subscribe_multiple(&Topic::ALL) {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => tracing::debug!(target: "spellcraft::events", ?topic, ?event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(target: "spellcraft::events", ?topic, skipped, "event log lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}
