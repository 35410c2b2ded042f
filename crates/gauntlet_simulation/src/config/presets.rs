//! Built-in role profiles (used when no RON override is supplied).

use super::{ActionBand, BandAction, DecisionProfile, EnemyRole, RoleProfile, RoleStats};
use crate::combat::{AttackKind, AttackSpec};

impl Default for RoleStats {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            chase_speed: 4.0,
            charge_speed: 2.5,
            attack_range: 2.0,
            charge_stop_distance: 2.0,
            awareness_range: 25.0,
            engagement_range: 15.0,
            stun_duration: 2.0,
            attack_cooldown: 1.5,
            max_stun_meter: 100.0,
            guard_chip_ratio: 0.5,
            max_hit_stun_duration: 5.0,
            hit_stun_reset_time: 1.0,
            dash_back_duration: 0.4,
            dash_back_speed: 8.0,
            turn_rate: 10.0,
            max_attack_duration: 4.0,
            max_charge_duration: 8.0,
        }
    }
}

impl RoleProfile {
    /// Basic grunt: punches, shoves, blocks a quarter of the time.
    pub fn basic() -> Self {
        Self {
            role: EnemyRole::Basic,
            stats: RoleStats::default(),
            decision: DecisionProfile {
                attack_distance: 2.5,
                charge_distance: 8.0,
                charge_gap: 1.5,
                charge_chance: 0.35,
                decision_interval: 0.4,
                decision_jitter: 0.1,
                block_min: 0.6,
                block_max: 1.8,
                bands: vec![
                    ActionBand { weight: 0.25, action: BandAction::Block },
                    ActionBand { weight: 0.30, action: BandAction::Attack(AttackKind::Light) },
                    ActionBand { weight: 0.45, action: BandAction::Attack(AttackKind::Heavy) },
                ],
            },
            attacks: vec![
                AttackSpec::new(AttackKind::Light, 10.0, "QuadPunch").with_cue("PunchCombo"),
                AttackSpec::new(AttackKind::Heavy, 5.0, "Shove"),
                AttackSpec::new(AttackKind::Charge, 25.0, "QuadPunch")
                    .with_range(1.5)
                    .with_cooldown(1.8),
            ],
        }
    }

    /// Elite swordsman: unblockable swing, sweep→slam combo, standalone slam.
    pub fn elite() -> Self {
        Self {
            role: EnemyRole::Elite,
            stats: RoleStats::default(),
            decision: DecisionProfile {
                attack_distance: 3.0,
                charge_distance: 10.0,
                charge_gap: 1.5,
                charge_chance: 0.4,
                decision_interval: 0.4,
                decision_jitter: 0.1,
                block_min: 0.3,
                block_max: 1.0,
                bands: vec![
                    ActionBand { weight: 0.30, action: BandAction::Block },
                    ActionBand { weight: 0.05, action: BandAction::Attack(AttackKind::Light) },
                    ActionBand { weight: 0.15, action: BandAction::Attack(AttackKind::Heavy) },
                    ActionBand { weight: 0.20, action: BandAction::Attack(AttackKind::Unblockable) },
                    ActionBand { weight: 0.15, action: BandAction::Attack(AttackKind::LegSweep) },
                    ActionBand { weight: 0.15, action: BandAction::Attack(AttackKind::SwordSlam) },
                ],
            },
            attacks: vec![
                AttackSpec::new(AttackKind::Light, 10.0, "QuadPunch").with_cue("PunchCombo"),
                AttackSpec::new(AttackKind::Heavy, 5.0, "Shove"),
                AttackSpec::new(AttackKind::Charge, 25.0, "QuadPunch")
                    .with_range(1.5)
                    .with_cooldown(1.8),
                AttackSpec::new(AttackKind::Unblockable, 35.0, "SwordSwing")
                    .with_range(1.5)
                    .with_cooldown(1.5)
                    .unblockable(),
                AttackSpec::new(AttackKind::LegSweep, 15.0, "LegSweep"),
                AttackSpec::new(AttackKind::SwordSlam, 50.0, "SwordSlam")
                    .with_range(1.2)
                    .with_cooldown(2.0),
            ],
        }
    }
}
