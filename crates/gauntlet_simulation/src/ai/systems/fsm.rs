//! Combatant FSM tick system.

use bevy::prelude::*;

use super::flush_cues;
use crate::ai::{CombatContext, Combatant};
use crate::arbiter::CombatArbiter;
use crate::bridge::{CueRecorder, NavAgent, PresentationCue};
use crate::combat::Dead;
use crate::DeterministicRng;

/// Система: tick всех живых combatant'ов
///
/// Порядок = registry order arbiter'а: first-come-first-served на токен
/// детерминирован и не зависит от порядка archetype'ов в Query.
pub fn tick_combatants(
    mut combatants: Query<(&mut Combatant, &mut NavAgent), Without<Dead>>,
    mut arbiter: ResMut<CombatArbiter>,
    mut rng: ResMut<DeterministicRng>,
    mut cue_events: EventWriter<PresentationCue>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    let target = arbiter.target();
    let handles: Vec<Entity> = arbiter.handles().collect();
    let mut recorder = CueRecorder::new();

    for handle in handles {
        let Ok((mut combatant, mut agent)) = combatants.get_mut(handle) else {
            continue;
        };

        let mut ctx = CombatContext {
            target,
            arbiter: &mut *arbiter,
            locomotion: &mut *agent,
            presentation: &mut recorder,
            rng: &mut rng.rng,
        };
        combatant.tick(delta, &mut ctx);

        flush_cues(handle, &mut recorder, &mut cue_events);
    }
}
