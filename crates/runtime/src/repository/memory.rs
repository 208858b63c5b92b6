//! In-memory CasterRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use spell_core::{ActorId, CasterSnapshot};

use super::{CasterRepository, RepositoryError, Result};

#[derive(Default)]
pub struct InMemoryCasterRepo {
    snapshots: RwLock<HashMap<ActorId, CasterSnapshot>>,
}

impl InMemoryCasterRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CasterRepository for InMemoryCasterRepo {
    fn save(&self, actor: ActorId, snapshot: &CasterSnapshot) -> Result<()> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        snapshots.insert(actor, snapshot.clone());
        Ok(())
    }

    fn load(&self, actor: ActorId) -> Result<Option<CasterSnapshot>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(snapshots.get(&actor).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_returns_latest() {
        let repo = InMemoryCasterRepo::new();
        let snapshot = CasterSnapshot {
            magic: 12,
            max_magic: 100,
            ..CasterSnapshot::default()
        };

        assert!(repo.load(ActorId(1)).unwrap().is_none());
        repo.save(ActorId(1), &snapshot).unwrap();
        assert_eq!(repo.load(ActorId(1)).unwrap(), Some(snapshot.clone()));

        let drained = CasterSnapshot { magic: 0, ..snapshot };
        repo.save(ActorId(1), &drained).unwrap();
        assert_eq!(repo.load(ActorId(1)).unwrap(), Some(drained));
        assert!(repo.load(ActorId(2)).unwrap().is_none());
    }
}
