//! Headless симуляция Gauntlet
//!
//! Запускает encounter без движка: игрок стоит в центре арены,
//! враги сходятся, arbiter раздаёт attack token.
//!
//! Usage: gauntlet_simulation [combat_config.ron] [encounter_layout.ron]

use bevy::prelude::*;

use gauntlet_simulation::encounter::spawn_player;
use gauntlet_simulation::{
    create_encounter_app, log_error, CombatArbiter, CombatConfig, Combatant, EncounterLayout, PlayerHealth,
    SpawnEncounter,
};

const SEED: u64 = 42;
const TICKS: usize = 3600; // 60 секунд при 60Hz

fn load_config(path: Option<&String>) -> CombatConfig {
    let Some(path) = path else {
        return CombatConfig::default();
    };
    match CombatConfig::load(path) {
        Ok(config) => config,
        Err(err) => {
            log_error(&format!("{} (falling back to built-in profiles)", err));
            CombatConfig::default()
        }
    }
}

fn load_layout(path: Option<&String>) -> EncounterLayout {
    let default_layout = EncounterLayout {
        basic_spawns: vec![[12.0, 0.0, 0.0], [-12.0, 0.0, 0.0], [0.0, 0.0, -12.0]],
        elite_spawns: vec![[0.0, 0.0, 14.0]],
    };
    let Some(path) = path else {
        return default_layout;
    };
    match EncounterLayout::load(path) {
        Ok(layout) => layout,
        Err(err) => {
            log_error(&format!("{} (falling back to default layout)", err));
            default_layout
        }
    }
}

fn spawn_arena_player(mut commands: Commands) {
    spawn_player(&mut commands, Vec3::ZERO, 500.0);
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let config = load_config(args.get(1));
    let layout = load_layout(args.get(2));

    println!("Starting Gauntlet headless simulation (seed: {})", SEED);

    let mut app = create_encounter_app(SEED, config, layout);
    app.add_systems(Startup, spawn_arena_player);
    app.world_mut().send_event(SpawnEncounter);

    for tick in 0..TICKS {
        app.update();

        if tick % 300 == 0 {
            let holder = app.world().resource::<CombatArbiter>().token_holder();
            let mut combatants = app.world_mut().query::<&Combatant>();
            let alive = combatants.iter(app.world()).filter(|c| !c.is_dead()).count();
            let mut players = app.world_mut().query::<&PlayerHealth>();
            let player_hp = players.iter(app.world()).next().map_or(0.0, |p| p.health.current);
            println!(
                "Tick {}: {} alive, token = {:?}, player hp = {:.1}",
                tick, alive, holder, player_hp
            );
        }
    }

    println!("Simulation complete!");
}
