//! Reversible block mutation.

use spell_core::{BlockKind, BlockPos};

use super::World;

/// A block placed by an effect, remembering what it replaced.
///
/// [`TempBlock::revert`] restores the original material exactly once.
#[derive(Debug)]
pub struct TempBlock {
    pos: BlockPos,
    original: BlockKind,
    placed: BlockKind,
    reverted: bool,
}

impl TempBlock {
    pub fn place(world: &dyn World, pos: BlockPos, kind: BlockKind) -> Self {
        let original = world.set_block(pos, kind);
        Self {
            pos,
            original,
            placed: kind,
            reverted: false,
        }
    }

    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    pub fn placed(&self) -> BlockKind {
        self.placed
    }

    pub fn is_reverted(&self) -> bool {
        self.reverted
    }

    /// Restores the original block. Returns false if already reverted.
    pub fn revert(&mut self, world: &dyn World) -> bool {
        if self.reverted {
            return false;
        }
        world.set_block(self.pos, self.original);
        self.reverted = true;
        true
    }
}
