//! Combat integration test
//!
//! Полный headless encounter: игрок в центре, basic + elite враги.
//!
//! Проверяем:
//! - Не больше одного attack token, holder жив и зарегистрирован (каждый тик)
//! - Ждущие враги кружат, holder атакует, урон доходит до игрока
//! - Смерть всех врагов → EncounterCleared, arbiter пуст
//! - Нет паники/крашей

use bevy::prelude::*;
use gauntlet_simulation::encounter::spawn_player;
use gauntlet_simulation::*;

/// Собранные за прогон события
#[derive(Resource, Default)]
struct Journal {
    player_damage: Vec<PlayerDamaged>,
    enemy_deaths: Vec<Entity>,
    cleared: usize,
}

fn record_events(
    mut journal: ResMut<Journal>,
    mut damaged: EventReader<PlayerDamaged>,
    mut died: EventReader<EnemyDied>,
    mut cleared: EventReader<EncounterCleared>,
) {
    journal.player_damage.extend(damaged.read().cloned());
    journal.enemy_deaths.extend(died.read().map(|event| event.entity));
    journal.cleared += cleared.read().count();
}

fn layout() -> EncounterLayout {
    EncounterLayout {
        basic_spawns: vec![[12.0, 0.0, 0.0], [-12.0, 0.0, 0.0], [0.0, 0.0, -12.0]],
        elite_spawns: vec![[0.0, 0.0, 12.0]],
    }
}

/// Helper: encounter App с игроком и заспавненными врагами
fn create_combat_app(seed: u64) -> (App, Entity) {
    let mut app = create_encounter_app(seed, CombatConfig::default(), layout());
    app.init_resource::<Journal>()
        .add_systems(FixedUpdate, record_events.after(SimulationSet::Aftermath));

    let player = spawn_player(&mut app.world_mut().commands(), Vec3::ZERO, 10_000.0);
    app.world_mut().flush();
    app.world_mut().send_event(SpawnEncounter);

    (app, player)
}

fn combatants(app: &mut App) -> Vec<(Entity, Combatant)> {
    let mut query = app.world_mut().query::<(Entity, &Combatant)>();
    let mut all: Vec<_> = query
        .iter(app.world())
        .map(|(entity, combatant)| (entity, combatant.clone()))
        .collect();
    all.sort_by_key(|(entity, _)| entity.index());
    all
}

fn assert_token_invariant(app: &mut App, tick: usize) {
    let holder = app.world().resource::<CombatArbiter>().token_holder();
    let Some(holder) = holder else {
        return;
    };

    assert!(
        app.world().resource::<CombatArbiter>().is_registered(holder),
        "tick {}: token holder {:?} not registered",
        tick,
        holder
    );

    let combatant = app
        .world()
        .get::<Combatant>(holder)
        .unwrap_or_else(|| panic!("tick {}: token holder {:?} has no Combatant", tick, holder));
    assert!(!combatant.is_dead(), "tick {}: dead combatant holds the token", tick);
    assert_ne!(
        combatant.state(),
        EnemyState::Circling,
        "tick {}: token holder is circling",
        tick
    );
}

/// Test: encounter 20 секунд, token invariant на каждом тике
#[test]
fn test_encounter_single_token_every_tick() {
    let (mut app, _player) = create_combat_app(42);

    let mut saw_charge = false;
    let mut saw_circling = false;

    for tick in 0..1200 {
        app.update();
        assert_token_invariant(&mut app, tick);

        for (_, combatant) in combatants(&mut app) {
            saw_charge |= combatant.state() == EnemyState::Charging;
            saw_circling |= combatant.state() == EnemyState::Circling;
        }
    }

    assert!(saw_charge, "никто не открыл бой charge'ем");
    assert!(saw_circling, "ждущие враги не встали в круг");
}

/// Test: holder доходит до игрока и наносит урон
#[test]
fn test_enemies_damage_player() {
    let (mut app, player) = create_combat_app(42);

    for _ in 0..1200 {
        app.update();
    }

    let journal = app.world().resource::<Journal>();
    assert!(!journal.player_damage.is_empty(), "игрок не получил урона за 20 секунд");

    // Первым всегда бьёт opening charge
    assert_eq!(journal.player_damage[0].kind, AttackKind::Charge);
    assert!(journal.player_damage.iter().all(|event| event.player == player));
    assert!(journal.player_damage.iter().all(|event| event.amount > 0.0));

    let health = app.world().get::<PlayerHealth>(player).expect("player exists");
    let total: f32 = journal.player_damage.iter().map(|event| event.amount).sum();
    assert!((health.health.max - health.health.current - total).abs() < 1e-3);
}

/// Test: смерть всех врагов → EncounterCleared один раз
#[test]
fn test_killing_everyone_clears_encounter() {
    let (mut app, _player) = create_combat_app(7);

    for _ in 0..120 {
        app.update();
    }

    let enemies: Vec<Entity> = combatants(&mut app).into_iter().map(|(entity, _)| entity).collect();
    assert_eq!(enemies.len(), 4);

    for entity in &enemies {
        app.world_mut().send_event(PlayerStrike {
            target: *entity,
            damage: 10_000.0,
        });
    }

    for _ in 0..5 {
        app.update();
    }

    let journal = app.world().resource::<Journal>();
    assert_eq!(journal.cleared, 1);
    assert_eq!(journal.enemy_deaths.len(), 4);

    let arbiter = app.world().resource::<CombatArbiter>();
    assert!(arbiter.is_empty());
    assert_eq!(arbiter.token_holder(), None);

    for (entity, combatant) in combatants(&mut app) {
        assert_eq!(combatant.state(), EnemyState::Dead);
        assert!(app.world().get::<Dead>(entity).is_some());
    }
}

/// Test: PlayerDamaged несёт флаг unblockable из AttackSpec
#[test]
fn test_unblockable_swing_is_flagged_for_player_side() {
    use gauntlet_simulation::config::{ActionBand, BandAction};

    let mut config = CombatConfig::default();
    config.elite.decision.bands = vec![ActionBand {
        weight: 1.0,
        action: BandAction::Attack(AttackKind::Unblockable),
    }];
    let lone_elite = EncounterLayout {
        basic_spawns: Vec::new(),
        elite_spawns: vec![[0.0, 0.0, 6.0]],
    };

    let mut app = create_encounter_app(42, config, lone_elite);
    app.init_resource::<Journal>()
        .add_systems(FixedUpdate, record_events.after(SimulationSet::Aftermath));
    spawn_player(&mut app.world_mut().commands(), Vec3::ZERO, 10_000.0);
    app.world_mut().flush();
    app.world_mut().send_event(SpawnEncounter);

    for _ in 0..1200 {
        app.update();
    }

    let journal = app.world().resource::<Journal>();
    assert!(
        journal.player_damage.iter().any(|event| event.kind == AttackKind::Unblockable),
        "elite так и не провёл unblockable swing"
    );
    for event in &journal.player_damage {
        assert_eq!(
            event.unblockable,
            event.kind == AttackKind::Unblockable,
            "{:?}: неверный флаг unblockable",
            event.kind
        );
    }
}

/// Test: враги без игрока остаются Unaware
#[test]
fn test_no_player_no_aggression() {
    let mut app = create_encounter_app(42, CombatConfig::default(), layout());
    app.world_mut().send_event(SpawnEncounter);

    for _ in 0..300 {
        app.update();
    }

    let all = combatants(&mut app);
    assert_eq!(all.len(), 4);
    assert!(all.iter().all(|(_, c)| c.state() == EnemyState::Unaware));
    assert_eq!(app.world().resource::<CombatArbiter>().token_holder(), None);
}
