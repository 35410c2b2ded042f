//! Combat system module
//!
//! ECS ответственность:
//! - Attack tuning: AttackKind / AttackSpec (данные для core)
//! - Damage flow: PlayerStrike → combatant, impact → PlayerDamaged
//! - Death: Dead marker, collider disabled, EnemyDied / PlayerDied
//!
//! Tactical layer ответственность:
//! - AnimationTree: swing timing (impact / attack-end callbacks)
//! - Player-side combat: какие удары игрока попали (PlayerStrike)

use bevy::prelude::*;

pub mod attack;
pub mod damage;

pub use attack::{AttackKind, AttackSpec};
pub use damage::{Dead, EnemyDied, PlayerDamaged, PlayerDied, PlayerStrike};

use crate::SimulationSet;

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate.
///
/// Порядок выполнения:
/// 1. apply_player_strikes — удары игрока (до animation callbacks и FSM tick)
/// 2. mark_dead_combatants — Dead + ColliderDisabled + EnemyDied
/// 3. tick_player_health — invincibility window, PlayerDied
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<PlayerStrike>()
            .add_event::<PlayerDamaged>()
            .add_event::<EnemyDied>()
            .add_event::<PlayerDied>();

        app.add_systems(
            FixedUpdate,
            damage::apply_player_strikes.in_set(SimulationSet::Strikes),
        )
        .add_systems(
            FixedUpdate,
            (damage::mark_dead_combatants, damage::tick_player_health)
                .chain()
                .in_set(SimulationSet::Aftermath),
        );
    }
}
