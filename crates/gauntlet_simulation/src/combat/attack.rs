//! Attack kinds and their per-kind tuning.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Melee attack kinds the combat core can execute.
///
/// Basic role uses Light/Heavy/Charge, elite adds Unblockable/LegSweep/SwordSlam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum AttackKind {
    /// Default punch string
    Light,
    /// Shove (slower, knocks the target back)
    Heavy,
    /// Charge finisher, performed when the charge reaches stop distance
    Charge,
    /// Elite sword swing, cannot be blocked (player must dodge)
    Unblockable,
    /// Elite leg sweep, combo opener into `SwordSlam` when it connects
    LegSweep,
    /// Elite slam: standalone or combo follow-up
    SwordSlam,
}

impl AttackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttackKind::Light => "light",
            AttackKind::Heavy => "heavy",
            AttackKind::Charge => "charge",
            AttackKind::Unblockable => "unblockable",
            AttackKind::LegSweep => "leg_sweep",
            AttackKind::SwordSlam => "sword_slam",
        }
    }
}

/// Tuning of one attack kind for a role.
///
/// Effective reach at impact = `RoleStats::attack_range × range_multiplier`.
/// Cooldown started on execution = `RoleStats::attack_cooldown × cooldown_multiplier`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackSpec {
    pub kind: AttackKind,
    pub damage: f32,
    #[serde(default = "default_multiplier")]
    pub range_multiplier: f32,
    #[serde(default = "default_multiplier")]
    pub cooldown_multiplier: f32,
    /// Presentation cue names; one is picked at random per execution.
    pub cues: Vec<String>,
    /// Damage ignores the player's guard.
    #[serde(default)]
    pub unblockable: bool,
}

fn default_multiplier() -> f32 {
    1.0
}

impl AttackSpec {
    pub fn new(kind: AttackKind, damage: f32, cue: &str) -> Self {
        Self {
            kind,
            damage,
            range_multiplier: 1.0,
            cooldown_multiplier: 1.0,
            cues: vec![cue.to_string()],
            unblockable: false,
        }
    }

    pub fn with_range(mut self, multiplier: f32) -> Self {
        self.range_multiplier = multiplier;
        self
    }

    pub fn with_cooldown(mut self, multiplier: f32) -> Self {
        self.cooldown_multiplier = multiplier;
        self
    }

    pub fn with_cue(mut self, cue: &str) -> Self {
        self.cues.push(cue.to_string());
        self
    }

    pub fn unblockable(mut self) -> Self {
        self.unblockable = true;
        self
    }
}
