//! Encounter domain — spawn / clear / "all dead" detection
//!
//! Один encounter = один roster arbiter'а. Спавн по `EncounterLayout`,
//! профили берутся из `CombatConfig` и масштабируются `RoleModifiers`
//! (единственная точка входа run-upgrade систем, до спавна).

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;

use crate::ai::Combatant;
use crate::arbiter::CombatArbiter;
use crate::bridge::NavAgent;
use crate::components::{CombatTarget, PlayerHealth};
use crate::config::{CombatConfig, EncounterLayout, EnemyRole, RoleModifiers, RoleProfile};
use crate::headless::ClipPlayer;

pub mod systems;

pub use systems::*;


/// Событие: заспавнить encounter (живой encounter сначала очищается)
#[derive(Event, Debug, Clone, Default)]
pub struct SpawnEncounter;

/// Событие: удалить всех combatant'ов encounter'а
#[derive(Event, Debug, Clone, Default)]
pub struct ClearEncounter;

/// Событие: все combatant'ы encounter'а мертвы (один раз на спавн)
#[derive(Event, Debug, Clone)]
pub struct EncounterCleared {
    pub defeated: usize,
}

/// Encounter state resource.
#[derive(Resource, Debug, Clone, Default)]
pub struct Encounter {
    pub config: CombatConfig,
    pub layout: EncounterLayout,
    pub modifiers: RoleModifiers,
    spawned: Vec<Entity>,
    active: bool,
}

impl Encounter {
    pub fn new(config: CombatConfig, layout: EncounterLayout) -> Self {
        Self {
            config,
            layout,
            modifiers: RoleModifiers::default(),
            spawned: Vec::new(),
            active: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: RoleModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Profile of a role with current modifiers applied.
    pub fn profile(&self, role: EnemyRole) -> RoleProfile {
        self.config.profile(role).with_modifiers(&self.modifiers)
    }

    pub fn spawned(&self) -> &[Entity] {
        &self.spawned
    }

    /// Spawned and not yet cleared.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Spawn helper: combatant с полным набором headless компонентов
///
/// - Combatant (FSM + профиль роли)
/// - NavAgent (headless Locomotion), Transform
/// - ClipPlayer (headless animation callbacks)
/// - Rapier Collider (capsule; ColliderDisabled при смерти)
pub fn spawn_combatant(commands: &mut Commands, profile: RoleProfile, position: Vec3) -> Entity {
    let chase_speed = profile.stats.chase_speed;
    let entity = commands
        .spawn((
            Transform::from_translation(position),
            NavAgent::new(position, chase_speed),
            ClipPlayer::default(),
            Collider::capsule_y(0.5, 0.4), // Высота 1.0m (0.5 + 0.5), радиус 0.4m
        ))
        .id();

    // Combatant знает свой handle (arbiter API работает по Entity)
    commands.entity(entity).insert(Combatant::new(entity, profile));
    entity
}

/// Spawn helper: игрок (цель arbiter'а + Damage Sink)
pub fn spawn_player(commands: &mut Commands, position: Vec3, max_health: f32) -> Entity {
    commands
        .spawn((
            Transform::from_translation(position),
            CombatTarget,
            PlayerHealth::new(max_health),
            Collider::capsule_y(0.5, 0.4),
        ))
        .id()
}

/// Encounter Plugin
pub struct EncounterPlugin;

impl Plugin for EncounterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Encounter>()
            .add_event::<SpawnEncounter>()
            .add_event::<ClearEncounter>()
            .add_event::<EncounterCleared>();

        app.add_systems(
            FixedUpdate,
            (systems::clear_encounter, systems::spawn_encounter)
                .chain()
                .in_set(crate::SimulationSet::Spawning),
        )
        .add_systems(
            FixedUpdate,
            systems::detect_encounter_cleared
                .after(crate::combat::damage::mark_dead_combatants)
                .in_set(crate::SimulationSet::Aftermath),
        );
    }
}

/// Число живых combatant'ов encounter'а.
pub fn count_alive(encounter: &Encounter, combatants: &Query<&Combatant>) -> usize {
    encounter
        .spawned
        .iter()
        .filter(|entity| combatants.get(**entity).is_ok_and(|combatant| !combatant.is_dead()))
        .count()
}

pub(crate) fn despawn_all(commands: &mut Commands, encounter: &mut Encounter, arbiter: &mut CombatArbiter) {
    for entity in encounter.spawned.drain(..) {
        if let Ok(mut entity_commands) = commands.get_entity(entity) {
            entity_commands.despawn();
        }
    }
    encounter.active = false;
    arbiter.reset();
}
