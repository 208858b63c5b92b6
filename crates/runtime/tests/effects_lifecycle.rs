use std::sync::Arc;
use std::time::Duration;

use spell_content::AbilityCatalog;
use spell_core::{
    AbilityId, ActorId, BlockKind, BlockPos, CastFailReason, CastOutcome, Location, WorldId,
};
use spell_runtime::{
    ActorView, EffectEndReason, EffectEvent, Engine, EngineConfig, Event, InMemoryWorld, Topic,
    World, register_builtins,
};
use tokio::sync::broadcast;

const CASTER: ActorId = ActorId(1);

async fn setup() -> (Engine, Arc<InMemoryWorld>) {
    let world = Arc::new(InMemoryWorld::new());
    world.spawn_actor(ActorView::new(CASTER, Location::at(0.5, 64.0, 0.5)), 20.0);

    let config = EngineConfig {
        regen_amount: 0,
        ..EngineConfig::default()
    };
    let engine = Engine::builder()
        .config(config)
        .world(world.clone())
        .build()
        .await
        .expect("engine should build");

    let catalog = AbilityCatalog::embedded().expect("embedded catalog");
    assert_eq!(register_builtins(engine.registry(), &catalog), 4);

    engine.join(CASTER).await.unwrap();
    for name in ["AquaMissile", "WaterManipulation", "IceShard", "VoidReign"] {
        engine.learn(CASTER, name).unwrap();
    }
    (engine, world)
}

fn water_blocks(world: &InMemoryWorld) -> usize {
    let mut count = 0;
    for x in -3..=4 {
        for y in 62..=68 {
            for z in -3..=40 {
                if world.block_at(BlockPos::new(WorldId(0), x, y, z)) == BlockKind::Water {
                    count += 1;
                }
            }
        }
    }
    count
}

fn ended(events: &mut broadcast::Receiver<Event>) -> Vec<EffectEndReason> {
    let mut reasons = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let Event::Effect(EffectEvent::Ended { reason, .. }) = event {
            reasons.push(reason);
        }
    }
    reasons
}

async fn ticks(n: u64) {
    tokio::time::sleep(Duration::from_millis(50 * n)).await;
}

#[tokio::test(start_paused = true)]
async fn water_stream_expires_and_reverts_every_block() {
    let (engine, world) = setup().await;
    let mut events = engine.subscribe(Topic::Effect);

    let outcome = engine.cast(CASTER, "WaterManipulation").unwrap();
    assert_eq!(outcome, CastOutcome::Success { cost: 20 });
    assert_eq!(water_blocks(&world), 1);
    assert_eq!(engine.effects().active_count(), 1);

    ticks(5).await;
    assert_eq!(water_blocks(&world), 1);

    ticks(60).await;
    assert_eq!(engine.effects().active_count(), 0);
    assert_eq!(water_blocks(&world), 0);
    assert_eq!(ended(&mut events), vec![EffectEndReason::Expired]);
}

#[tokio::test(start_paused = true)]
async fn effect_ends_when_owner_goes_offline() {
    let (engine, world) = setup().await;
    let mut events = engine.subscribe(Topic::Effect);

    engine.cast(CASTER, "WaterManipulation").unwrap();
    ticks(3).await;
    assert_eq!(water_blocks(&world), 1);

    world.set_online(CASTER, false);
    ticks(2).await;

    assert_eq!(engine.effects().active_count(), 0);
    assert_eq!(water_blocks(&world), 0);
    assert_eq!(ended(&mut events), vec![EffectEndReason::OwnerGone]);
}

#[tokio::test(start_paused = true)]
async fn unregistering_ability_removes_its_effects_once() {
    let (engine, world) = setup().await;
    let mut events = engine.subscribe(Topic::Effect);

    engine.cast(CASTER, "WaterManipulation").unwrap();
    ticks(3).await;

    assert!(engine.unregister("watermanipulation").is_some());
    assert_eq!(engine.effects().active_count(), 0);
    assert_eq!(water_blocks(&world), 0);

    let writes = world.block_writes();
    ticks(10).await;
    assert_eq!(world.block_writes(), writes);
    assert_eq!(ended(&mut events), vec![EffectEndReason::Removed]);

    assert!(engine.cast(CASTER, "WaterManipulation").is_err());
}

#[tokio::test(start_paused = true)]
async fn replaced_ability_ends_effects_of_old_definition() {
    let (engine, world) = setup().await;
    let mut events = engine.subscribe(Topic::Effect);

    engine.cast(CASTER, "WaterManipulation").unwrap();
    ticks(2).await;

    let catalog = AbilityCatalog::embedded().unwrap();
    register_builtins(engine.registry(), &catalog);
    ticks(2).await;

    assert_eq!(engine.effects().active_count(), 0);
    assert_eq!(water_blocks(&world), 0);
    assert_eq!(ended(&mut events), vec![EffectEndReason::AbilityRemoved]);
}

#[tokio::test(start_paused = true)]
async fn shutdown_reverts_live_effects() {
    let (engine, world) = setup().await;

    engine.cast(CASTER, "WaterManipulation").unwrap();
    ticks(4).await;
    assert_eq!(water_blocks(&world), 1);

    engine.shutdown().await.unwrap();

    assert_eq!(water_blocks(&world), 0);
}

#[tokio::test(start_paused = true)]
async fn aqua_missile_consumes_source_and_hits_target() {
    let (engine, world) = setup().await;
    let target = ActorId(2);
    world.spawn_actor(ActorView::new(target, Location::at(0.5, 64.0, 6.5)), 20.0);
    let source = BlockPos::new(WorldId(0), 1, 65, 1);
    world.put_block(source, BlockKind::Water);
    let mut events = engine.subscribe(Topic::Effect);

    let outcome = engine.cast(CASTER, "AquaMissile").unwrap();
    assert_eq!(outcome, CastOutcome::Success { cost: 35 });
    assert_eq!(world.block_at(source), BlockKind::Air);

    ticks(30).await;

    assert_eq!(world.health(target), Some(14.0));
    let hits = world.damage_log();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source, CASTER);
    assert_eq!(hits[0].ability, AbilityId::new("AquaMissile"));
    assert_eq!(ended(&mut events), vec![EffectEndReason::Completed]);
    // The source stays consumed.
    assert_eq!(world.block_at(source), BlockKind::Air);
}

#[tokio::test(start_paused = true)]
async fn aqua_missile_without_source_fails() {
    let (engine, _world) = setup().await;

    let outcome = engine.cast(CASTER, "AquaMissile").unwrap();

    assert_eq!(outcome.fail_reason(), Some(CastFailReason::CastFailed));
    assert_eq!(engine.with_caster(CASTER, |state| state.magic()).unwrap(), 100);
    assert_eq!(engine.effects().active_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn ice_shard_bursts_nearest_targets_after_delay() {
    let (engine, world) = setup().await;
    world.put_block(BlockPos::new(WorldId(0), 3, 64, 3), BlockKind::Ice);
    world.spawn_actor(ActorView::new(ActorId(2), Location::at(0.5, 64.0, 4.5)), 20.0);
    world.spawn_actor(ActorView::new(ActorId(3), Location::at(4.5, 64.0, 0.5)), 20.0);
    world.spawn_actor(ActorView::new(ActorId(4), Location::at(0.5, 64.0, 30.5)), 20.0);

    let outcome = engine.cast(CASTER, "IceShard").unwrap();
    assert!(outcome.is_success());
    assert!(world.damage_log().is_empty());

    ticks(4).await;

    let mut hit: Vec<_> = world.damage_log().iter().map(|hit| hit.target).collect();
    hit.sort();
    assert_eq!(hit, vec![ActorId(2), ActorId(3)]);
    assert_eq!(world.health(ActorId(4)), Some(20.0));
}

#[tokio::test(start_paused = true)]
async fn ice_shard_needs_ice_or_water() {
    let (engine, _world) = setup().await;

    let outcome = engine.cast(CASTER, "IceShard").unwrap();

    assert_eq!(outcome.fail_reason(), Some(CastFailReason::CastFailed));
}

#[tokio::test(start_paused = true)]
async fn void_reign_scales_with_magic_power() {
    let (engine, world) = setup().await;
    world.spawn_actor(ActorView::new(ActorId(2), Location::at(3.5, 64.0, 0.5)), 50.0);
    world.spawn_actor(ActorView::new(ActorId(3), Location::at(20.5, 64.0, 0.5)), 50.0);

    let outcome = engine.cast(CASTER, "VoidReign").unwrap();
    assert_eq!(outcome, CastOutcome::Success { cost: 100 });
    assert_eq!(engine.with_caster(CASTER, |state| state.magic()).unwrap(), 0);

    ticks(1).await;

    let health = world.health(ActorId(2)).unwrap();
    assert!((health - 12.0).abs() < 1e-9);
    assert_eq!(world.health(ActorId(3)), Some(50.0));
    assert_eq!(world.health(CASTER), Some(20.0));
}
