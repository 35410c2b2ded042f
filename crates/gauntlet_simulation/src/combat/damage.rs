//! Damage flow between the player and combatants.
//!
//! - PlayerStrike (player-side combat, external) → `Combatant::take_damage`
//! - Impact landed → PlayerDamaged (UI, sounds, camera shake)
//! - Combatant dead → `Dead` marker, collider disabled, EnemyDied

use bevy::prelude::*;
use bevy_rapier3d::prelude::ColliderDisabled;

use crate::ai::systems::flush_cues;
use crate::ai::{CombatContext, Combatant, HitReaction};
use crate::arbiter::CombatArbiter;
use crate::bridge::{CueRecorder, NavAgent, PresentationCue};
use crate::combat::AttackKind;
use crate::components::PlayerHealth;
use crate::DeterministicRng;

/// Событие: игрок ударил врага (от player-side combat)
#[derive(Event, Debug, Clone)]
pub struct PlayerStrike {
    pub target: Entity,
    pub damage: f32,
}

/// Событие: атака врага дошла до игрока
#[derive(Event, Debug, Clone)]
pub struct PlayerDamaged {
    pub player: Entity,
    pub attacker: Entity,
    pub kind: AttackKind,
    /// Атаку нельзя блокировать (player-side combat: только уклонение)
    pub unblockable: bool,
    pub amount: f32,
    pub health_after: f32,
    pub is_dead: bool,
}

/// Событие: враг умер (отправляется ровно один раз)
#[derive(Event, Debug, Clone)]
pub struct EnemyDied {
    pub entity: Entity,
}

/// Событие: игрок умер (отправляется ровно один раз)
#[derive(Event, Debug, Clone)]
pub struct PlayerDied {
    pub entity: Entity,
}

/// Компонент-маркер: entity мертв
///
/// Трупы остаются на месте (деспавн решает encounter).
#[derive(Component, Debug)]
pub struct Dead;

/// Система: apply PlayerStrike → combatant damage reactions
pub fn apply_player_strikes(
    mut strikes: EventReader<PlayerStrike>,
    mut combatants: Query<(&mut Combatant, &mut NavAgent)>,
    mut arbiter: ResMut<CombatArbiter>,
    mut rng: ResMut<DeterministicRng>,
    mut cue_events: EventWriter<PresentationCue>,
) {
    let target = arbiter.target();
    let mut recorder = CueRecorder::new();

    for strike in strikes.read() {
        let Ok((mut combatant, mut agent)) = combatants.get_mut(strike.target) else {
            crate::log_warning(&format!("PlayerStrike: target {:?} is not a combatant", strike.target));
            continue;
        };

        let mut ctx = CombatContext {
            target,
            arbiter: &mut *arbiter,
            locomotion: &mut *agent,
            presentation: &mut recorder,
            rng: &mut rng.rng,
        };
        let reaction = combatant.take_damage(strike.damage, &mut ctx);

        if reaction != HitReaction::Ignored {
            crate::log(&format!(
                "🥊 {:?} struck for {:.1} → {:?} (hp {:.1})",
                strike.target,
                strike.damage,
                reaction,
                combatant.health().current
            ));
        }

        flush_cues(strike.target, &mut recorder, &mut cue_events);
    }
}

/// Система: dead combatant → `Dead` marker + collider off + EnemyDied
///
/// Combatant уже сам ушёл из roster'а arbiter'а в момент смерти.
pub fn mark_dead_combatants(
    mut commands: Commands,
    combatants: Query<(Entity, &Combatant), Without<Dead>>,
    mut died_events: EventWriter<EnemyDied>,
) {
    for (entity, combatant) in combatants.iter() {
        if !combatant.is_dead() {
            continue;
        }

        commands.entity(entity).insert((Dead, ColliderDisabled));
        died_events.write(EnemyDied { entity });
        crate::log_info(&format!("💀 Enemy {:?} died (collider disabled)", entity));
    }
}

/// Система: invincibility window игрока + однократный PlayerDied
pub fn tick_player_health(
    mut players: Query<(Entity, &mut PlayerHealth)>,
    mut died_events: EventWriter<PlayerDied>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut player) in players.iter_mut() {
        player.tick(delta);

        if player.is_dead() && !player.death_reported {
            player.death_reported = true;
            died_events.write(PlayerDied { entity });
            crate::log_info(&format!("☠️ Player {:?} died", entity));
        }
    }
}
