//! Headless locomotion: NavAgent integration + Transform sync.

use bevy::prelude::*;

use crate::bridge::NavAgent;

/// Система: продвигаем NavAgent'ов и пишем позицию в Transform
///
/// В engine build это делает navmesh агент tactical layer'а; здесь —
/// прямолинейная kinematic интеграция.
pub fn integrate_nav_agents(mut agents: Query<(&mut NavAgent, &mut Transform)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (mut agent, mut transform) in agents.iter_mut() {
        agent.integrate(delta);
        if transform.translation != agent.position {
            transform.translation = agent.position;
        }
    }
}
