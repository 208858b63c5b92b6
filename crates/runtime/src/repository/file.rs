//! File-based CasterRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use spell_core::{ActorId, CasterSnapshot};

use super::{CasterRepository, RepositoryError, Result};

/// Stores each actor's snapshot as `caster_{id}.json` under a base directory.
///
/// Writes go to a temp file first and are renamed into place, so a crash
/// never leaves a half-written snapshot behind.
pub struct FileCasterRepository {
    base_dir: PathBuf,
}

impl FileCasterRepository {
    /// Create a repository rooted at `base_dir`, creating it if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn snapshot_path(&self, actor: ActorId) -> PathBuf {
        self.base_dir.join(format!("caster_{}.json", actor.0))
    }
}

impl CasterRepository for FileCasterRepository {
    fn save(&self, actor: ActorId, snapshot: &CasterSnapshot) -> Result<()> {
        let path = self.snapshot_path(actor);
        let temp_path = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(target: "runtime::repository", actor = %actor, path = %path.display(), "saved caster");
        Ok(())
    }

    fn load(&self, actor: ActorId) -> Result<Option<CasterSnapshot>> {
        let path = self.snapshot_path(actor);

        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let snapshot = serde_json::from_slice(&bytes).map_err(|e| {
            RepositoryError::CorruptedData(format!("{}: {}", path.display(), e))
        })?;

        tracing::debug!(target: "runtime::repository", actor = %actor, path = %path.display(), "loaded caster");
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> CasterSnapshot {
        CasterSnapshot {
            magic: 40,
            max_magic: 120,
            learned: vec!["aquamissile".into()],
            binds: vec![Some("aquamissile".into()), None],
            house: Some("AUREVALE".into()),
        }
    }

    #[test]
    fn snapshots_survive_a_new_repository() {
        let dir = tempfile::tempdir().unwrap();

        let repo = FileCasterRepository::new(dir.path()).unwrap();
        repo.save(ActorId(7), &snapshot()).unwrap();
        drop(repo);

        let repo = FileCasterRepository::new(dir.path()).unwrap();
        assert_eq!(repo.load(ActorId(7)).unwrap(), Some(snapshot()));
        assert!(!dir.path().join("caster_7.json.tmp").exists());
    }

    #[test]
    fn missing_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileCasterRepository::new(dir.path()).unwrap();

        assert!(repo.load(ActorId(1)).unwrap().is_none());
    }

    #[test]
    fn corrupted_snapshot_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileCasterRepository::new(dir.path()).unwrap();
        std::fs::write(dir.path().join("caster_3.json"), b"{ not json").unwrap();

        assert!(matches!(
            repo.load(ActorId(3)),
            Err(RepositoryError::CorruptedData(_))
        ));
    }
}
