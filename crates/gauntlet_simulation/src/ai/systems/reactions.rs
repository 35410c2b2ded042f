//! AI reaction systems (animation callbacks).

use bevy::prelude::*;

use super::flush_cues;
use crate::ai::{AnimationEvent, AnimationSignal, CombatContext, Combatant, ImpactOutcome};
use crate::arbiter::CombatArbiter;
use crate::bridge::{CueRecorder, NavAgent, PresentationCue};
use crate::combat::PlayerDamaged;
use crate::components::{CombatTarget, PlayerHealth};
use crate::DeterministicRng;

/// System: animation callbacks → combatant
///
/// AttackEnd / DashBackEnd / Impact. Дубликаты и опоздавшие сигналы
/// (после смерти, после смены состояния) combatant игнорирует сам.
/// Impact без игрока в мире пропускается.
pub fn process_animation_events(
    mut events: EventReader<AnimationEvent>,
    mut combatants: Query<(&mut Combatant, &mut NavAgent)>,
    mut players: Query<(Entity, &mut PlayerHealth), With<CombatTarget>>,
    mut arbiter: ResMut<CombatArbiter>,
    mut rng: ResMut<DeterministicRng>,
    mut cue_events: EventWriter<PresentationCue>,
    mut damaged_events: EventWriter<PlayerDamaged>,
) {
    let target = arbiter.target();
    let mut recorder = CueRecorder::new();

    for event in events.read() {
        let Ok((mut combatant, mut agent)) = combatants.get_mut(event.entity) else {
            continue;
        };

        let mut ctx = CombatContext {
            target,
            arbiter: &mut *arbiter,
            locomotion: &mut *agent,
            presentation: &mut recorder,
            rng: &mut rng.rng,
        };

        match event.signal {
            AnimationSignal::AttackEnd { swing } => {
                combatant.on_attack_end(swing, &mut ctx);
            }
            AnimationSignal::DashBackEnd => {
                combatant.on_dash_back_end(&mut ctx);
            }
            AnimationSignal::Impact { kind, swing } => {
                let Ok((player, mut player_health)) = players.single_mut() else {
                    continue;
                };

                let outcome = combatant.on_impact(kind, swing, &mut ctx, &mut *player_health);
                if let ImpactOutcome::Landed(report) = outcome {
                    if report.applied > 0.0 {
                        let unblockable = combatant
                            .profile()
                            .attack(kind)
                            .is_some_and(|spec| spec.unblockable);
                        damaged_events.write(PlayerDamaged {
                            player,
                            attacker: event.entity,
                            kind,
                            unblockable,
                            amount: report.applied,
                            health_after: report.health_after,
                            is_dead: report.is_dead,
                        });
                    }
                }
            }
        }

        flush_cues(event.entity, &mut recorder, &mut cue_events);
    }
}
