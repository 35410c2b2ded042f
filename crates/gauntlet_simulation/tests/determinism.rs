//! Тесты детерминизма
//!
//! Проверяем что encounter с одинаковым seed даёт идентичные результаты:
//! decision jitter, probability bands, engage chance и cue variants
//! берутся только из `DeterministicRng`.

use bevy::prelude::*;
use gauntlet_simulation::bridge::NavAgent;
use gauntlet_simulation::encounter::spawn_player;
use gauntlet_simulation::*;

const TICK_COUNT: usize = 900;

fn layout() -> EncounterLayout {
    EncounterLayout {
        basic_spawns: vec![[10.0, 0.0, 3.0], [-9.0, 0.0, -4.0], [2.0, 0.0, -11.0]],
        elite_spawns: vec![[1.0, 0.0, 12.0]],
    }
}

/// Запускает encounter и возвращает snapshot мира
fn run_simulation(seed: u64, tick_count: usize) -> Vec<u8> {
    let mut app = create_encounter_app(seed, CombatConfig::default(), layout());

    spawn_player(&mut app.world_mut().commands(), Vec3::ZERO, 10_000.0);
    app.world_mut().flush();
    app.world_mut().send_event(SpawnEncounter);

    // Прогоняем симуляцию
    for _ in 0..tick_count {
        app.update();
    }

    let mut snapshot = world_snapshot::<Combatant>(app.world_mut());
    snapshot.extend(world_snapshot::<NavAgent>(app.world_mut()));
    snapshot.extend(world_snapshot::<PlayerHealth>(app.world_mut()));
    snapshot
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;

    // Первый прогон
    let snapshot1 = run_simulation(SEED, TICK_COUNT);

    // Второй прогон с тем же seed
    let snapshot2 = run_simulation(SEED, TICK_COUNT);

    // Снепшоты должны быть идентичны
    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;

    // Запускаем 3 раза — все должны быть идентичны
    let snapshots: Vec<_> = (0..3).map(|_| run_simulation(SEED, TICK_COUNT)).collect();

    // Все снепшоты должны совпадать с первым
    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}
