use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use spell_core::{
    AbilityCategory, AbilityId, AbilitySpec, ActorId, CastFailReason, CastOutcome, CastResult,
    Element,
};
use spell_runtime::{
    Ability, AbilityBehavior, CastContext, CastEvent, CastHook, Engine, EngineConfig,
    EngineError, Event, InMemoryWorld, PerkDiscountHook, PreCastEvent, Topic,
};

const ACTOR: ActorId = ActorId(1);

/// Returns a fixed result and counts invocations.
struct Scripted {
    result: CastResult,
    calls: Arc<AtomicUsize>,
}

impl AbilityBehavior for Scripted {
    fn invoke(&self, _ctx: &CastContext<'_>) -> CastResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
    }
}

fn scripted(spec: AbilitySpec, result: CastResult) -> (Ability, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let behavior = Scripted {
        result,
        calls: Arc::clone(&calls),
    };
    (Ability::new(spec, behavior), calls)
}

fn missile_spec() -> AbilitySpec {
    AbilitySpec::new("AquaMissile", AbilityCategory::Combat)
        .with_element(Element::Water)
        .with_cost(35)
        .with_cooldown(6_000)
}

async fn engine(hooks: Vec<Arc<dyn CastHook>>) -> Engine {
    let config = EngineConfig {
        regen_amount: 0,
        ..EngineConfig::default()
    };
    let mut builder = Engine::builder()
        .config(config)
        .world(Arc::new(InMemoryWorld::new()));
    for hook in hooks {
        builder = builder.hook(hook);
    }
    let engine = builder.build().await.expect("engine should build");
    engine.join(ACTOR).await.expect("join should succeed");
    engine
}

fn magic(engine: &Engine) -> u32 {
    engine.with_caster(ACTOR, |state| state.magic()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn successful_cast_consumes_magic_and_arms_cooldown() {
    let engine = engine(vec![]).await;
    let (ability, calls) = scripted(missile_spec(), CastResult::Success);
    engine.register(ability);
    engine.learn(ACTOR, "AquaMissile").unwrap();

    let outcome = engine.cast(ACTOR, "aquamissile").unwrap();
    assert_eq!(outcome, CastOutcome::Success { cost: 35 });
    assert_eq!(magic(&engine), 65);
    let remaining = engine.remaining_cooldown(ACTOR, "AquaMissile").unwrap();
    assert!(remaining > 0 && remaining <= 6_000, "remaining = {remaining}");

    let again = engine.cast(ACTOR, "AquaMissile").unwrap();
    assert_eq!(again, CastOutcome::Failed(CastFailReason::OnCooldown));
    assert_eq!(magic(&engine), 65);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_millis(6_001)).await;

    assert_eq!(engine.remaining_cooldown(ACTOR, "AquaMissile").unwrap(), 0);
    let after = engine.cast(ACTOR, "AquaMissile").unwrap();
    assert!(after.is_success());
    assert_eq!(magic(&engine), 30);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn insufficient_magic_leaves_ledger_untouched() {
    let engine = engine(vec![]).await;
    let spec = AbilitySpec::new("VoidReign", AbilityCategory::Ultimate)
        .with_element(Element::Void)
        .with_cost(150)
        .with_cooldown(30_000);
    let (ability, calls) = scripted(spec, CastResult::Success);
    engine.register(ability);
    engine.learn(ACTOR, "VoidReign").unwrap();

    let outcome = engine.cast(ACTOR, "VoidReign").unwrap();

    assert_eq!(outcome, CastOutcome::Failed(CastFailReason::InsufficientMagic));
    assert_eq!(magic(&engine), 100);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let cooling = engine
        .with_caster(ACTOR, |state| state.is_on_cooldown(&AbilityId::new("VoidReign"), 0))
        .unwrap();
    assert!(!cooling);
}

#[tokio::test(start_paused = true)]
async fn failed_behavior_commits_nothing_and_reports_once() {
    let engine = engine(vec![]).await;
    let (ability, calls) = scripted(missile_spec(), CastResult::Failure);
    engine.register(ability);
    engine.learn(ACTOR, "AquaMissile").unwrap();
    let mut events = engine.subscribe(Topic::Cast);

    let outcome = engine.cast(ACTOR, "AquaMissile").unwrap();
    assert_eq!(outcome, CastOutcome::Failed(CastFailReason::CastFailed));
    assert_eq!(magic(&engine), 100);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // No cooldown either: a retry reaches the behavior again.
    engine.cast(ACTOR, "AquaMissile").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let mut failures = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            Event::Cast(CastEvent::CastFail { actor, reason, .. }) => {
                assert_eq!(actor, ACTOR);
                assert_eq!(reason, CastFailReason::CastFailed);
                failures += 1;
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert_eq!(failures, 2);
}

#[tokio::test(start_paused = true)]
async fn unlearned_ability_fails_first() {
    let engine = engine(vec![]).await;
    let (ability, calls) = scripted(missile_spec(), CastResult::Success);
    engine.register(ability);

    let outcome = engine.cast(ACTOR, "AquaMissile").unwrap();

    assert_eq!(outcome.fail_reason(), Some(CastFailReason::NotLearned));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn disabled_ability_fails_without_invoking() {
    let engine = engine(vec![]).await;
    let (ability, calls) = scripted(missile_spec().with_enabled(false), CastResult::Success);
    engine.register(ability);
    engine.learn(ACTOR, "AquaMissile").unwrap();

    let outcome = engine.cast(ACTOR, "AquaMissile").unwrap();

    assert_eq!(outcome.fail_reason(), Some(CastFailReason::CastFailed));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(magic(&engine), 100);
}

#[tokio::test(start_paused = true)]
async fn discount_hook_lowers_cost_but_not_cooldown() {
    let discount = Arc::new(PerkDiscountHook::new());
    discount.set_discount(ACTOR, 50);
    let engine = engine(vec![discount.clone()]).await;
    let (ability, _) = scripted(missile_spec(), CastResult::Success);
    engine.register(ability);
    engine.learn(ACTOR, "AquaMissile").unwrap();

    let outcome = engine.cast(ACTOR, "AquaMissile").unwrap();
    assert_eq!(outcome, CastOutcome::Success { cost: 17 });
    assert_eq!(magic(&engine), 83);

    tokio::time::advance(Duration::from_millis(3_000)).await;
    let early = engine.cast(ACTOR, "AquaMissile").unwrap();
    assert_eq!(early.fail_reason(), Some(CastFailReason::OnCooldown));
}

struct Silence;

impl CastHook for Silence {
    fn name(&self) -> &'static str {
        "silence"
    }

    fn pre_cast(&self, event: &mut PreCastEvent) {
        event.cancel();
    }
}

#[tokio::test(start_paused = true)]
async fn cancelling_hook_vetoes_cast() {
    let engine = engine(vec![Arc::new(Silence)]).await;
    let (ability, calls) = scripted(missile_spec(), CastResult::Success);
    engine.register(ability);
    engine.learn(ACTOR, "AquaMissile").unwrap();

    let outcome = engine.cast(ACTOR, "AquaMissile").unwrap();

    assert_eq!(outcome.fail_reason(), Some(CastFailReason::Cancelled));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(magic(&engine), 100);
}

#[tokio::test(start_paused = true)]
async fn cast_slot_uses_bound_ability() {
    let engine = engine(vec![]).await;
    let (ability, calls) = scripted(missile_spec(), CastResult::Success);
    engine.register(ability);
    engine.learn(ACTOR, "AquaMissile").unwrap();
    engine.bind_slot(ACTOR, 0, "AquaMissile").unwrap();

    assert_eq!(
        engine.cast_slot(ACTOR, 0).unwrap(),
        Some(CastOutcome::Success { cost: 35 })
    );
    assert_eq!(engine.cast_slot(ACTOR, 4).unwrap(), None);
    assert_eq!(engine.cast_slot(ACTOR, 99).unwrap(), None);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn addressing_errors() {
    let engine = engine(vec![]).await;

    assert!(matches!(
        engine.cast(ACTOR, "Nope"),
        Err(EngineError::UnknownAbility { .. })
    ));

    let (ability, _) = scripted(missile_spec(), CastResult::Success);
    engine.register(ability);
    assert!(matches!(
        engine.cast(ActorId(42), "AquaMissile"),
        Err(EngineError::UnknownActor { actor: ActorId(42) })
    ));
    assert!(matches!(
        engine.set_house(ACTOR, Some("Nowhere")),
        Err(EngineError::UnknownHouse { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn house_restricts_binding() {
    let engine = engine(vec![]).await;
    let fire = AbilitySpec::new("Fireball", AbilityCategory::Combat)
        .with_element(Element::Fire)
        .with_cost(10);
    let (fireball, _) = scripted(fire, CastResult::Success);
    let (missile, _) = scripted(missile_spec(), CastResult::Success);
    engine.register(fireball);
    engine.register(missile);
    engine.learn(ACTOR, "Fireball").unwrap();
    engine.learn(ACTOR, "AquaMissile").unwrap();
    engine.bind_slot(ACTOR, 0, "Fireball").unwrap();
    engine.bind_slot(ACTOR, 1, "AquaMissile").unwrap();

    let cleared = engine.set_house(ACTOR, Some("aurevale")).unwrap();
    assert_eq!(cleared, vec![0]);

    assert!(matches!(
        engine.bind_slot(ACTOR, 2, "Fireball"),
        Err(EngineError::Bind(_))
    ));
    assert_eq!(
        engine.unbind_slot(ACTOR, 1).unwrap(),
        Some(AbilityId::new("AquaMissile"))
    );
}
