//! AI Events — inbound animation callbacks from the tactical layer
//!
//! AnimationTree (или headless clip driver) → AnimationEvent → Combatant callbacks.
//! Доставка at-least-once: combatant игнорирует сигналы, не совпадающие с состоянием.
//! Attack-сигналы несут `swing` (номер swing'а на момент старта клипа), чтобы
//! опоздавший сигнал прошлой атаки не завершил следующую.

use bevy::prelude::*;

use crate::combat::AttackKind;

/// What the animation reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationSignal {
    /// Attack clip finished
    AttackEnd { swing: u32 },
    /// Dash-back clip finished
    DashBackEnd,
    /// Impact frame of an attack clip (range re-check + damage)
    Impact { kind: AttackKind, swing: u32 },
}

/// Animation callback for a combatant.
#[derive(Event, Debug, Clone)]
pub struct AnimationEvent {
    /// Entity combatant'а, чья анимация прислала сигнал
    pub entity: Entity,
    pub signal: AnimationSignal,
}

impl AnimationEvent {
    pub fn attack_end(entity: Entity, swing: u32) -> Self {
        Self {
            entity,
            signal: AnimationSignal::AttackEnd { swing },
        }
    }

    pub fn dash_back_end(entity: Entity) -> Self {
        Self {
            entity,
            signal: AnimationSignal::DashBackEnd,
        }
    }

    pub fn impact(entity: Entity, kind: AttackKind, swing: u32) -> Self {
        Self {
            entity,
            signal: AnimationSignal::Impact { kind, swing },
        }
    }
}
