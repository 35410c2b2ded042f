//! Базовые компоненты акторов: Health, GuardMeter, PlayerHealth

use bevy::prelude::*;

use crate::bridge::{DamageReport, DamageSink};

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max. Смерть (current == 0) терминальна.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn is_dead(&self) -> bool {
        !self.is_alive()
    }

    /// Returns damage actually removed (clamped at zero).
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current - amount.max(0.0)).max(0.0);
        before - self.current
    }

    pub fn heal(&mut self, amount: f32) {
        if self.is_dead() {
            return;
        }
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }

    pub fn percentage(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }
}

/// Guard meter: chip damage taken while blocking.
///
/// Инвариант: 0 ≤ current ≤ max. Saturation → guard break (meter cleared).
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct GuardMeter {
    pub current: f32,
    pub max: f32,
}

impl GuardMeter {
    pub fn new(max: f32) -> Self {
        Self { current: 0.0, max }
    }

    /// Adds chip damage; returns `true` on guard break (meter reset to 0).
    pub fn accumulate(&mut self, amount: f32) -> bool {
        self.current += amount.max(0.0);
        if self.current >= self.max {
            self.current = 0.0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.current = 0.0;
    }
}

/// Маркер: цель, которую преследуют враги (игрок)
#[derive(Component, Debug, Default, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct CombatTarget;

/// Player health pool (in-crate `DamageSink`).
///
/// Brief invincibility after every hit so a multi-impact clip does not
/// stack damage within one swing.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PlayerHealth {
    pub health: Health,
    pub invincibility_duration: f32,
    pub invincibility_timer: f32,
    /// Death already reported (PlayerDied sent once)
    pub death_reported: bool,
}

impl Default for PlayerHealth {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl PlayerHealth {
    pub fn new(max: f32) -> Self {
        Self {
            health: Health::new(max),
            invincibility_duration: 0.5,
            invincibility_timer: 0.0,
            death_reported: false,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health.is_dead()
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility_timer > 0.0
    }

    pub fn tick(&mut self, delta: f32) {
        if self.invincibility_timer > 0.0 {
            self.invincibility_timer = (self.invincibility_timer - delta).max(0.0);
        }
    }

    pub fn heal(&mut self, amount: f32) {
        self.health.heal(amount);
    }
}

impl DamageSink for PlayerHealth {
    fn apply_damage(&mut self, amount: f32) -> DamageReport {
        if self.is_dead() || self.is_invincible() {
            return DamageReport {
                applied: 0.0,
                health_after: self.health.current,
                is_dead: self.is_dead(),
            };
        }

        let applied = self.health.take_damage(amount);
        self.invincibility_timer = self.invincibility_duration;

        DamageReport {
            applied,
            health_after: self.health.current,
            is_dead: self.is_dead(),
        }
    }
}
