//! Boundary to the tactical layer (navigation, animation, player health).
//!
//! HYBRID ARCHITECTURE:
//! - ECS / combat core = strategic layer (decisions, timers, arbitration)
//! - Engine = tactical layer (navmesh, AnimationTree, hitboxes, UI)
//!
//! Core знает о tactical layer только через эти три trait'а. В headless
//! режиме их реализуют `NavAgent`, `CueRecorder` и `PlayerHealth`.

use bevy::prelude::*;

mod cues;
mod nav_agent;

pub use cues::{Cue, CueRecorder, PresentationCue};
pub use nav_agent::NavAgent;

/// Navigation agent contract (navmesh agent in the engine).
pub trait Locomotion {
    /// Path toward `point` and resume movement.
    fn move_to(&mut self, point: Vec3);
    /// Halt immediately (velocity zeroed, path dropped).
    fn stop(&mut self);
    /// Re-enable movement without changing the destination.
    fn resume(&mut self);
    fn set_speed(&mut self, speed: f32);
    fn current_velocity(&self) -> Vec3;
    fn position(&self) -> Vec3;
    fn is_on_navigable_surface(&self) -> bool;
}

/// Fire-and-forget animation/audio cues.
pub trait PresentationSink {
    fn trigger(&mut self, cue: &str);
    fn set_continuous(&mut self, param: &str, value: f32);
}

/// Result of applying damage to the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageReport {
    /// Damage actually applied (0 while invincible or already dead)
    pub applied: f32,
    pub health_after: f32,
    pub is_dead: bool,
}

/// Player health pool contract.
pub trait DamageSink {
    fn apply_damage(&mut self, amount: f32) -> DamageReport;
}
