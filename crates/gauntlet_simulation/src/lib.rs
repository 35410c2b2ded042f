//! Gauntlet Simulation Core
//!
//! ECS-симуляция melee encounter'а на Bevy 0.16 (strategic layer):
//! враги-combatant'ы, arbiter с одним attack token'ом, decision policy.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (combat FSM, arbitration, damage rules)
//! - Engine = tactical layer (navmesh, AnimationTree, hitboxes, UI)
//! - Граница — trait'ы в `bridge`; headless реализации для тестов и demo

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod arbiter;
pub mod bridge;
pub mod combat;
pub mod components;
pub mod config;
pub mod encounter;
pub mod headless;
pub mod logger;

// Re-export для удобства
pub use ai::{AIPlugin, AnimationEvent, CombatContext, Combatant, EnemyState, HitReaction};
pub use arbiter::{CombatArbiter, CombatantStatus};
pub use combat::{AttackKind, CombatPlugin, Dead, EnemyDied, PlayerDamaged, PlayerDied, PlayerStrike};
pub use components::*;
pub use config::{CombatConfig, ConfigError, EncounterLayout, EnemyRole, RoleModifiers, RoleProfile};
pub use encounter::{ClearEncounter, Encounter, EncounterCleared, EncounterPlugin, SpawnEncounter};
pub use headless::HeadlessPlugin;
pub use logger::{log, log_error, log_info, log_warning};

/// Порядок фаз одного fixed тика.
///
/// Spawning → Arbiter → Strikes → Callbacks → Decisions → Locomotion → Aftermath
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Encounter spawn / clear
    Spawning,
    /// Roster sync + arbiter tick (validation, opportunity check)
    Arbiter,
    /// Удары игрока по combatant'ам
    Strikes,
    /// Animation callbacks (impact, attack end, dash-back end)
    Callbacks,
    /// Combatant FSM tick
    Decisions,
    /// Headless locomotion + clip playback
    Locomotion,
    /// Death side effects, encounter cleared
    Aftermath,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Детерминистичный RNG (seed по умолчанию, если хост не задал свой)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Spawning,
                    SimulationSet::Arbiter,
                    SimulationSet::Strikes,
                    SimulationSet::Callbacks,
                    SimulationSet::Decisions,
                    SimulationSet::Locomotion,
                    SimulationSet::Aftermath,
                )
                    .chain(),
            )
            // Подсистемы (ECS strategic layer)
            .add_plugins((EncounterPlugin, CombatPlugin, AIPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Каждый `app.update()` продвигает время ровно на один fixed тик (60Hz).
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)) // 60Hz FixedUpdate
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)));

    app
}

/// Headless App с полной симуляцией encounter'а (без движка)
///
/// SimulationPlugin + HeadlessPlugin, arbiter из `config.arbiter`.
/// Encounter спавнится событием `SpawnEncounter`.
pub fn create_encounter_app(seed: u64, config: CombatConfig, layout: EncounterLayout) -> App {
    let mut app = create_headless_app(seed);
    app.insert_resource(CombatArbiter::new(config.arbiter.clone()))
        .insert_resource(Encounter::new(config, layout))
        .add_plugins((SimulationPlugin, HeadlessPlugin));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
