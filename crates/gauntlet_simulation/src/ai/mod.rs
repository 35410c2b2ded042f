//! AI decision-making module
//!
//! Один автомат (`Combatant`) для всех ролей врагов + decision policy.
//! Роль (Basic / Elite) — это данные `RoleProfile`, не отдельный код.

use bevy::prelude::*;

pub mod combatant;
pub mod components;
pub mod events;
pub mod policy;
pub mod systems;

pub use combatant::{cue, CombatContext, Combatant, HitReaction, ImpactOutcome};
pub use components::EnemyState;
pub use events::{AnimationEvent, AnimationSignal};
pub use policy::Decision;

use crate::arbiter::CombatArbiter;
use crate::bridge::PresentationCue;
use crate::SimulationSet;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения (через `SimulationSet`):
/// 1. register/unregister + tick_arbiter — roster и opportunity check
/// 2. process_animation_events — attack-end / dash-back-end / impact
/// 3. tick_combatants — FSM в registry order
/// 4. integrate_nav_agents — headless locomotion
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CombatArbiter>()
            .add_event::<AnimationEvent>()
            .add_event::<PresentationCue>();

        app.add_systems(
            FixedUpdate,
            (
                systems::register_new_combatants,
                systems::unregister_removed_combatants,
                systems::tick_arbiter,
            )
                .chain()
                .in_set(SimulationSet::Arbiter),
        )
        .add_systems(
            FixedUpdate,
            systems::process_animation_events.in_set(SimulationSet::Callbacks),
        )
        .add_systems(FixedUpdate, systems::tick_combatants.in_set(SimulationSet::Decisions))
        .add_systems(
            FixedUpdate,
            systems::integrate_nav_agents.in_set(SimulationSet::Locomotion),
        );
    }
}
