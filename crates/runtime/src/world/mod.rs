//! Port to the host world the engine runs inside.
//!
//! Abilities and effects never touch world storage directly; they go through
//! [`World`], which a host implements over its own entity and block model.
//! [`InMemoryWorld`] backs tests and the standalone server.

mod memory;
mod temp_block;

pub use memory::{DamageRecord, InMemoryWorld};
pub use temp_block::TempBlock;

use spell_core::{AbilityId, ActorId, BlockKind, BlockPos, Location, Vec3};

/// Pose and presence of an actor, as seen by abilities.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorView {
    pub id: ActorId,
    /// Feet position.
    pub location: Location,
    pub eye_location: Location,
    /// Unit look direction.
    pub direction: Vec3,
    pub online: bool,
    pub dead: bool,
    pub sneaking: bool,
}

impl ActorView {
    pub fn new(id: ActorId, location: Location) -> Self {
        Self {
            id,
            location,
            eye_location: location.offset(Vec3::new(0.0, 1.62, 0.0)),
            direction: Vec3::new(0.0, 0.0, 1.0),
            online: true,
            dead: false,
            sneaking: false,
        }
    }

    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = direction.normalize();
        self
    }

    /// Online and alive.
    pub fn is_present(&self) -> bool {
        self.online && !self.dead
    }
}

/// World access used by abilities and effects.
///
/// Implementations must be safe to call from any tick loop and from the
/// async pool concurrently.
pub trait World: Send + Sync {
    fn block_at(&self, pos: BlockPos) -> BlockKind;

    /// Sets a block and returns the previous material.
    fn set_block(&self, pos: BlockPos, kind: BlockKind) -> BlockKind;

    fn actor(&self, actor: ActorId) -> Option<ActorView>;

    /// Present actors within `radius` of `center`.
    fn nearby_actors(&self, center: &Location, radius: f64) -> Vec<ActorView>;

    /// Applies ability damage from `source` to `target`.
    fn damage(&self, source: ActorId, target: ActorId, amount: f64, ability: &AbilityId);

    /// Present actors within `radius` of `center` that `source` may harm,
    /// nearest first.
    fn targets_near(&self, source: ActorId, center: &Location, radius: f64) -> Vec<ActorView> {
        let mut targets: Vec<_> = self
            .nearby_actors(center, radius)
            .into_iter()
            .filter(|view| view.id != source && view.is_present())
            .collect();
        targets.sort_by(|a, b| {
            a.location
                .distance_squared(center)
                .total_cmp(&b.location.distance_squared(center))
        });
        targets
    }

    /// Nearest block within a cube of half-width `radius` around `center`
    /// matching `predicate`.
    fn find_block(
        &self,
        center: BlockPos,
        radius: i32,
        predicate: &dyn Fn(BlockKind) -> bool,
    ) -> Option<BlockPos> {
        let mut best: Option<(i64, BlockPos)> = None;
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                for dz in -radius..=radius {
                    let pos = BlockPos::new(center.world, center.x + dx, center.y + dy, center.z + dz);
                    if !predicate(self.block_at(pos)) {
                        continue;
                    }
                    let dist = i64::from(dx * dx + dy * dy + dz * dz);
                    if best.is_none_or(|(d, _)| dist < d) {
                        best = Some((dist, pos));
                    }
                }
            }
        }
        best.map(|(_, pos)| pos)
    }
}
