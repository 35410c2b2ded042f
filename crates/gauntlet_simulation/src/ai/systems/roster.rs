//! Arbiter roster maintenance and the arbiter tick.

use bevy::prelude::*;

use crate::ai::Combatant;
use crate::arbiter::CombatArbiter;
use crate::components::CombatTarget;
use crate::DeterministicRng;

/// Система: регистрация новых combatant'ов в arbiter (activation)
///
/// Мёртвые не регистрируются повторно.
pub fn register_new_combatants(
    new_combatants: Query<(Entity, &Combatant), Added<Combatant>>,
    mut arbiter: ResMut<CombatArbiter>,
) {
    for (entity, combatant) in new_combatants.iter() {
        if combatant.is_dead() {
            continue;
        }
        if arbiter.register(entity) {
            crate::log(&format!(
                "📋 Arbiter: registered {:?} ({:?}), roster = {}",
                entity,
                combatant.profile().role,
                arbiter.roster_len()
            ));
        }
    }
}

/// Система: unregister при despawn / удалении Combatant
pub fn unregister_removed_combatants(
    mut removed: RemovedComponents<Combatant>,
    mut arbiter: ResMut<CombatArbiter>,
) {
    for entity in removed.read() {
        if arbiter.unregister(entity) {
            crate::log(&format!("📋 Arbiter: unregistered {:?} (removed)", entity));
        }
    }
}

/// Система: arbiter tick (validation + fixed-interval opportunity check)
///
/// Target = первый `CombatTarget` в мире; нет цели → `None`.
pub fn tick_arbiter(
    targets: Query<&Transform, With<CombatTarget>>,
    mut arbiter: ResMut<CombatArbiter>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let target = targets.iter().next().map(|transform| transform.translation);
    arbiter.set_target(target);
    arbiter.tick(time.delta_secs(), &mut rng.rng);
}
