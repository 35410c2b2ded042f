//! Enemy combat FSM states.

use bevy::prelude::*;

use crate::combat::AttackKind;

/// Состояние боевого автомата врага.
///
/// Initial = `Unaware`, terminal = `Dead` (достижим из любого состояния).
/// Таймеры состояний живут в `Combatant`, не в варианте.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum EnemyState {
    /// Спавн: стоит, ждёт пока цель войдёт в awareness range
    #[default]
    Unaware,

    /// Заметил цель, преследует до engagement range
    Aware,

    /// В бою, ждёт решения policy / токена
    EngagedIdle,

    /// Токен у другого — орбита вокруг цели
    Circling,

    /// Рывок к цели (opener или re-charge на средней дистанции)
    Charging,

    /// Swing в процессе; завершается attack-end callback'ом (или watchdog'ом)
    Attacking { kind: AttackKind },

    /// Добровольный блок на время из policy
    Blocking,

    /// Реакция на пропущенный удар (накапливается через серию ударов)
    HitStun,

    /// Guard break: жёстче чем HitStun, без cap логики
    Stunned,

    /// Принудительный отскок назад (escape valve из длинного hit-stun)
    DashingBack,

    /// Терминальное состояние
    Dead,
}

impl EnemyState {
    pub fn name(&self) -> &'static str {
        match self {
            EnemyState::Unaware => "Unaware",
            EnemyState::Aware => "Aware",
            EnemyState::EngagedIdle => "EngagedIdle",
            EnemyState::Circling => "Circling",
            EnemyState::Charging => "Charging",
            EnemyState::Attacking { .. } => "Attacking",
            EnemyState::Blocking => "Blocking",
            EnemyState::HitStun => "HitStun",
            EnemyState::Stunned => "Stunned",
            EnemyState::DashingBack => "DashingBack",
            EnemyState::Dead => "Dead",
        }
    }

    /// Blocking or guard-broken: the arbiter may hand the token to someone else.
    pub fn is_vulnerable(&self) -> bool {
        matches!(self, EnemyState::Blocking | EnemyState::Stunned)
    }

    /// Mid-action: swing, charge or block in progress.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            EnemyState::Attacking { .. } | EnemyState::Charging | EnemyState::Blocking
        )
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, EnemyState::Dead)
    }

    pub fn attack_kind(&self) -> Option<AttackKind> {
        match self {
            EnemyState::Attacking { kind } => Some(*kind),
            _ => None,
        }
    }
}
