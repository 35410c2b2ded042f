//! Encounter systems (spawn / clear / cleared detection).

use bevy::prelude::*;

use super::{despawn_all, spawn_combatant, ClearEncounter, Encounter, EncounterCleared, SpawnEncounter};
use crate::ai::Combatant;
use crate::arbiter::CombatArbiter;
use crate::config::EnemyRole;

/// Система: SpawnEncounter → combatant'ы на spawn points
///
/// Повторный спавн (respawn) сначала удаляет прошлый roster.
pub fn spawn_encounter(
    mut commands: Commands,
    mut requests: EventReader<SpawnEncounter>,
    mut encounter: ResMut<Encounter>,
    mut arbiter: ResMut<CombatArbiter>,
) {
    // Несколько запросов за тик = один спавн
    if requests.read().count() == 0 {
        return;
    }

    if !encounter.spawned.is_empty() {
        despawn_all(&mut commands, &mut encounter, &mut arbiter);
    }

    let groups = [
        (EnemyRole::Basic, encounter.layout.basic_spawns.clone()),
        (EnemyRole::Elite, encounter.layout.elite_spawns.clone()),
    ];
    for (role, points) in groups {
        let profile = encounter.profile(role);
        for point in points {
            let entity = spawn_combatant(&mut commands, profile.clone(), Vec3::from_array(point));
            encounter.spawned.push(entity);
        }
    }

    encounter.active = !encounter.spawned.is_empty();
    crate::log_info(&format!(
        "🗡️ Encounter spawned: {} basic + {} elite",
        encounter.layout.basic_spawns.len(),
        encounter.layout.elite_spawns.len()
    ));
}

/// Система: ClearEncounter → despawn + arbiter reset
pub fn clear_encounter(
    mut commands: Commands,
    mut requests: EventReader<ClearEncounter>,
    mut encounter: ResMut<Encounter>,
    mut arbiter: ResMut<CombatArbiter>,
) {
    if requests.read().count() == 0 {
        return;
    }

    let count = encounter.spawned.len();
    despawn_all(&mut commands, &mut encounter, &mut arbiter);
    crate::log_info(&format!("🧹 Encounter cleared by request ({} despawned)", count));
}

/// Система: все мертвы → EncounterCleared + arbiter reset
///
/// Трупы остаются в мире до ClearEncounter / следующего спавна.
pub fn detect_encounter_cleared(
    mut encounter: ResMut<Encounter>,
    combatants: Query<&Combatant>,
    mut arbiter: ResMut<CombatArbiter>,
    mut cleared_events: EventWriter<EncounterCleared>,
) {
    if !encounter.active {
        return;
    }

    // Спавн ещё не применён (commands) — рано судить
    if encounter.spawned.iter().any(|entity| combatants.get(*entity).is_err()) {
        return;
    }

    if super::count_alive(&encounter, &combatants) > 0 {
        return;
    }

    encounter.active = false;
    arbiter.reset();
    cleared_events.write(EncounterCleared {
        defeated: encounter.spawned.len(),
    });
    crate::log_info(&format!(
        "🏁 Encounter cleared: all {} combatants defeated",
        encounter.spawned.len()
    ));
}
