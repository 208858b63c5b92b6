//! In-memory world for tests and standalone runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use spell_core::{AbilityId, ActorId, BlockKind, BlockPos, Location, Vec3};

use super::{ActorView, World};

/// One applied hit.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageRecord {
    pub source: ActorId,
    pub target: ActorId,
    pub amount: f64,
    pub ability: AbilityId,
}

struct ActorEntry {
    view: ActorView,
    health: f64,
}

/// Sparse block map (unset blocks are air) plus a set of actors with health.
#[derive(Default)]
pub struct InMemoryWorld {
    blocks: RwLock<HashMap<BlockPos, BlockKind>>,
    actors: RwLock<HashMap<ActorId, ActorEntry>>,
    damage_log: Mutex<Vec<DamageRecord>>,
    block_writes: AtomicUsize,
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a block without counting it as an engine write.
    pub fn put_block(&self, pos: BlockPos, kind: BlockKind) {
        let mut blocks = self.blocks.write().unwrap_or_else(PoisonError::into_inner);
        if kind == BlockKind::Air {
            blocks.remove(&pos);
        } else {
            blocks.insert(pos, kind);
        }
    }

    /// Number of [`World::set_block`] calls so far.
    pub fn block_writes(&self) -> usize {
        self.block_writes.load(Ordering::SeqCst)
    }

    pub fn spawn_actor(&self, view: ActorView, health: f64) {
        let mut actors = self.actors.write().unwrap_or_else(PoisonError::into_inner);
        actors.insert(view.id, ActorEntry { view, health });
    }

    pub fn remove_actor(&self, actor: ActorId) {
        let mut actors = self.actors.write().unwrap_or_else(PoisonError::into_inner);
        actors.remove(&actor);
    }

    pub fn set_online(&self, actor: ActorId, online: bool) {
        self.update(actor, |view| view.online = online);
    }

    pub fn set_sneaking(&self, actor: ActorId, sneaking: bool) {
        self.update(actor, |view| view.sneaking = sneaking);
    }

    pub fn set_direction(&self, actor: ActorId, direction: Vec3) {
        self.update(actor, |view| view.direction = direction.normalize());
    }

    pub fn move_actor(&self, actor: ActorId, location: Location) {
        self.update(actor, |view| {
            let eye = view.eye_location.position - view.location.position;
            view.location = location;
            view.eye_location = location.offset(eye);
        });
    }

    pub fn health(&self, actor: ActorId) -> Option<f64> {
        let actors = self.actors.read().unwrap_or_else(PoisonError::into_inner);
        actors.get(&actor).map(|entry| entry.health)
    }

    pub fn damage_log(&self) -> Vec<DamageRecord> {
        self.damage_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, actor: ActorId, f: impl FnOnce(&mut ActorView)) {
        let mut actors = self.actors.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = actors.get_mut(&actor) {
            f(&mut entry.view);
        }
    }
}

impl World for InMemoryWorld {
    fn block_at(&self, pos: BlockPos) -> BlockKind {
        let blocks = self.blocks.read().unwrap_or_else(PoisonError::into_inner);
        blocks.get(&pos).copied().unwrap_or_default()
    }

    fn set_block(&self, pos: BlockPos, kind: BlockKind) -> BlockKind {
        self.block_writes.fetch_add(1, Ordering::SeqCst);
        let mut blocks = self.blocks.write().unwrap_or_else(PoisonError::into_inner);
        let previous = if kind == BlockKind::Air {
            blocks.remove(&pos)
        } else {
            blocks.insert(pos, kind)
        };
        previous.unwrap_or_default()
    }

    fn actor(&self, actor: ActorId) -> Option<ActorView> {
        let actors = self.actors.read().unwrap_or_else(PoisonError::into_inner);
        actors.get(&actor).map(|entry| entry.view.clone())
    }

    /// Matches on either feet or eyes, so hits near the head count.
    fn nearby_actors(&self, center: &Location, radius: f64) -> Vec<ActorView> {
        let radius_sq = radius * radius;
        let actors = self.actors.read().unwrap_or_else(PoisonError::into_inner);
        actors
            .values()
            .filter(|entry| entry.view.is_present())
            .filter(|entry| {
                entry.view.location.distance_squared(center) <= radius_sq
                    || entry.view.eye_location.distance_squared(center) <= radius_sq
            })
            .map(|entry| entry.view.clone())
            .collect()
    }

    fn damage(&self, source: ActorId, target: ActorId, amount: f64, ability: &AbilityId) {
        {
            let mut actors = self.actors.write().unwrap_or_else(PoisonError::into_inner);
            let Some(entry) = actors.get_mut(&target) else {
                return;
            };
            entry.health = (entry.health - amount).max(0.0);
            if entry.health == 0.0 {
                entry.view.dead = true;
            }
        }

        self.damage_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(DamageRecord {
                source,
                target,
                amount,
                ability: ability.clone(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spell_core::WorldId;

    #[test]
    fn unset_blocks_are_air() {
        let world = InMemoryWorld::new();
        let pos = BlockPos::new(WorldId(0), 0, 0, 0);
        assert_eq!(world.block_at(pos), BlockKind::Air);
        assert_eq!(world.set_block(pos, BlockKind::Water), BlockKind::Air);
        assert_eq!(world.set_block(pos, BlockKind::Air), BlockKind::Water);
        assert_eq!(world.block_writes(), 2);
    }

    #[test]
    fn targets_are_sorted_and_exclude_source() {
        let world = InMemoryWorld::new();
        world.spawn_actor(ActorView::new(ActorId(1), Location::at(0.0, 0.0, 0.0)), 20.0);
        world.spawn_actor(ActorView::new(ActorId(2), Location::at(5.0, 0.0, 0.0)), 20.0);
        world.spawn_actor(ActorView::new(ActorId(3), Location::at(2.0, 0.0, 0.0)), 20.0);
        world.spawn_actor(ActorView::new(ActorId(4), Location::at(50.0, 0.0, 0.0)), 20.0);

        let ids: Vec<_> = world
            .targets_near(ActorId(1), &Location::at(0.0, 0.0, 0.0), 10.0)
            .into_iter()
            .map(|view| view.id)
            .collect();

        assert_eq!(ids, vec![ActorId(3), ActorId(2)]);
    }

    #[test]
    fn lethal_damage_marks_dead() {
        let world = InMemoryWorld::new();
        world.spawn_actor(ActorView::new(ActorId(9), Location::at(0.0, 0.0, 0.0)), 5.0);

        world.damage(ActorId(1), ActorId(9), 6.0, &AbilityId::new("AquaMissile"));

        assert_eq!(world.health(ActorId(9)), Some(0.0));
        assert!(world.actor(ActorId(9)).is_some_and(|view| view.dead));
        assert_eq!(world.damage_log().len(), 1);
    }

    #[test]
    fn find_block_prefers_nearest() {
        let world = InMemoryWorld::new();
        let origin = BlockPos::new(WorldId(0), 0, 64, 0);
        world.put_block(BlockPos::new(WorldId(0), 4, 64, 0), BlockKind::Water);
        world.put_block(BlockPos::new(WorldId(0), 1, 63, 1), BlockKind::Water);

        let found = world.find_block(origin, 5, &|kind| kind == BlockKind::Water);
        assert_eq!(found, Some(BlockPos::new(WorldId(0), 1, 63, 1)));
        assert_eq!(world.find_block(origin, 0, &|kind| kind == BlockKind::Ice), None);
    }
}
