//! Kinematic navigation agent (headless stand-in for the engine navmesh agent).

use bevy::prelude::*;

use super::Locomotion;

/// Minimal distance at which the agent considers the destination reached.
const ARRIVE_EPSILON: f32 = 0.05;

/// Headless navmesh agent: straight-line movement toward the destination.
///
/// In the engine build the tactical layer mirrors `destination`/`speed`/`stopped`
/// into its own agent and writes back `position`/`velocity`.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    pub position: Vec3,
    pub velocity: Vec3,
    pub destination: Option<Vec3>,
    pub speed: f32,
    pub stopped: bool,
    pub on_navmesh: bool,
}

impl NavAgent {
    /// Spawned agents start stopped (enemy is Unaware).
    pub fn new(position: Vec3, speed: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            destination: None,
            speed,
            stopped: true,
            on_navmesh: true,
        }
    }

    /// Advance along the path by `delta` seconds.
    pub fn integrate(&mut self, delta: f32) {
        let Some(destination) = self.destination else {
            self.velocity = Vec3::ZERO;
            return;
        };

        if self.stopped || !self.on_navmesh {
            self.velocity = Vec3::ZERO;
            return;
        }

        let to_destination = destination - self.position;
        let distance = to_destination.length();
        if distance <= ARRIVE_EPSILON {
            self.velocity = Vec3::ZERO;
            return;
        }

        let step = (self.speed * delta).min(distance);
        let direction = to_destination / distance;
        self.position += direction * step;
        self.velocity = if delta > 0.0 { direction * (step / delta) } else { Vec3::ZERO };
    }
}

impl Locomotion for NavAgent {
    fn move_to(&mut self, point: Vec3) {
        self.destination = Some(point);
        self.stopped = false;
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.velocity = Vec3::ZERO;
        self.destination = None;
    }

    fn resume(&mut self) {
        self.stopped = false;
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn current_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn is_on_navigable_surface(&self) -> bool {
        self.on_navmesh
    }
}
