//! Persistence for caster snapshots.
//!
//! Repositories are synchronous; the session layer calls them from the
//! blocking pool so tick loops never wait on storage.

mod error;
mod file;
mod memory;

pub use error::{RepositoryError, Result};
pub use file::FileCasterRepository;
pub use memory::InMemoryCasterRepo;

use spell_core::{ActorId, CasterSnapshot};

/// Repository for per-actor caster snapshots.
pub trait CasterRepository: Send + Sync {
    /// Save (or overwrite) an actor's snapshot.
    fn save(&self, actor: ActorId, snapshot: &CasterSnapshot) -> Result<()>;

    /// Load an actor's snapshot, `None` if never saved.
    fn load(&self, actor: ActorId) -> Result<Option<CasterSnapshot>>;
}
