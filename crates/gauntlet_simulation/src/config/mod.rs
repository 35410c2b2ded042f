//! Data-driven tuning for combatants, the arbiter and encounters.
//!
//! Всё, что игровой дизайнер может крутить, живёт здесь и грузится из RON:
//! - `RoleProfile`: статы роли + таблица атак + полосы вероятностей решений
//! - `ArbiterConfig`: интервал opportunity check, engage chance, радиус круга
//! - `EncounterLayout`: spawn points для basic/elite
//!
//! Run-upgrade / meta системы влияют на роль только через `RoleModifiers`,
//! и только до спавна (профиль read-only после спавна).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::{AttackKind, AttackSpec};

mod presets;


/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found.
    #[error("Config file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Parsed, but values violate an invariant.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Enemy role (one state machine, two data profiles).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyRole {
    Basic,
    Elite,
}

/// Scalar stats of a role. Read-only after spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleStats {
    pub max_health: f32,
    pub chase_speed: f32,
    pub charge_speed: f32,
    /// Base melee reach (multiplied per attack at impact time)
    pub attack_range: f32,
    /// Charge converts into an attack at this distance
    pub charge_stop_distance: f32,
    pub awareness_range: f32,
    pub engagement_range: f32,
    /// Guard-break stun duration (seconds)
    pub stun_duration: f32,
    /// Base attack cooldown (seconds)
    pub attack_cooldown: f32,
    pub max_stun_meter: f32,
    /// Fraction of blocked damage added to the guard meter
    pub guard_chip_ratio: f32,
    /// Cap on accumulated hit-stun before a forced dash-back (seconds)
    pub max_hit_stun_duration: f32,
    /// Hit-free gap that clears hit-stun (seconds)
    pub hit_stun_reset_time: f32,
    pub dash_back_duration: f32,
    pub dash_back_speed: f32,
    /// Facing interpolation rate (1/s)
    pub turn_rate: f32,
    /// Attack ends on its own if the end callback never arrives
    pub max_attack_duration: f32,
    /// Charge that can't reach stop distance is abandoned
    pub max_charge_duration: f32,
}

/// What a probability band dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BandAction {
    Block,
    Attack(AttackKind),
}

/// One band of the close-range roll. Bands are evaluated in order by
/// cumulative weight; a roll past the last band selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionBand {
    pub weight: f32,
    pub action: BandAction,
}

/// Decision policy tuning of a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionProfile {
    /// Close range: roll against `bands`
    pub attack_distance: f32,
    /// Medium range upper bound for re-charge
    pub charge_distance: f32,
    /// Medium range starts at `attack_distance + charge_gap`
    pub charge_gap: f32,
    pub charge_chance: f32,
    pub decision_interval: f32,
    /// Interval is jittered by ±`decision_jitter` to desync agents
    pub decision_jitter: f32,
    pub block_min: f32,
    pub block_max: f32,
    pub bands: Vec<ActionBand>,
}

/// Complete profile of a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleProfile {
    pub role: EnemyRole,
    pub stats: RoleStats,
    pub decision: DecisionProfile,
    pub attacks: Vec<AttackSpec>,
}

impl RoleProfile {
    /// Load a role profile from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = read_config(path.as_ref())?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (validated).
    pub fn from_ron_str(ron: &str) -> Result<Self, ConfigError> {
        let profile: RoleProfile = ron::from_str(ron)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn attack(&self, kind: AttackKind) -> Option<&AttackSpec> {
        self.attacks.iter().find(|spec| spec.kind == kind)
    }

    /// Check invariants the state machine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let stats = &self.stats;
        let positive = [
            ("max_health", stats.max_health),
            ("max_stun_meter", stats.max_stun_meter),
            ("max_hit_stun_duration", stats.max_hit_stun_duration),
            ("hit_stun_reset_time", stats.hit_stun_reset_time),
            ("decision_interval", self.decision.decision_interval),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{} must be > 0 (got {})", name, value)));
            }
        }

        let non_negative = [
            ("attack_range", stats.attack_range),
            ("charge_stop_distance", stats.charge_stop_distance),
            ("awareness_range", stats.awareness_range),
            ("engagement_range", stats.engagement_range),
            ("attack_cooldown", stats.attack_cooldown),
            ("stun_duration", stats.stun_duration),
            ("guard_chip_ratio", stats.guard_chip_ratio),
            ("dash_back_duration", stats.dash_back_duration),
            ("decision_jitter", self.decision.decision_jitter),
        ];
        for (name, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::Invalid(format!("{} must be >= 0 (got {})", name, value)));
            }
        }

        if self.decision.decision_jitter >= self.decision.decision_interval {
            return Err(ConfigError::Invalid(
                "decision_jitter must be smaller than decision_interval".to_string(),
            ));
        }

        if self.decision.block_min > self.decision.block_max {
            return Err(ConfigError::Invalid(format!(
                "block_min ({}) > block_max ({})",
                self.decision.block_min, self.decision.block_max
            )));
        }

        if !(0.0..=1.0).contains(&self.decision.charge_chance) {
            return Err(ConfigError::Invalid("charge_chance must be in [0, 1]".to_string()));
        }

        let total: f32 = self.decision.bands.iter().map(|band| band.weight).sum();
        if self.decision.bands.iter().any(|band| band.weight < 0.0) || total > 1.0 + 1e-4 {
            return Err(ConfigError::Invalid(format!(
                "band weights must be >= 0 and sum to at most 1 (sum = {})",
                total
            )));
        }

        // Every attack the policy or the state machine can dispatch needs a spec
        let mut required = vec![AttackKind::Charge];
        for band in &self.decision.bands {
            if let BandAction::Attack(kind) = band.action {
                required.push(kind);
                if kind == AttackKind::LegSweep {
                    required.push(AttackKind::SwordSlam);
                }
            }
        }
        for kind in required {
            match self.attack(kind) {
                None => {
                    return Err(ConfigError::Invalid(format!(
                        "{:?} role has no spec for attack {:?}",
                        self.role, kind
                    )))
                }
                Some(spec) if spec.cues.is_empty() => {
                    return Err(ConfigError::Invalid(format!("attack {:?} has no cues", kind)))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Returns a copy scaled by run/meta upgrades. Applied before spawn only.
    pub fn with_modifiers(&self, modifiers: &RoleModifiers) -> RoleProfile {
        let mut profile = self.clone();
        profile.stats.max_health *= modifiers.health_multiplier;
        profile.stats.chase_speed *= modifiers.speed_multiplier;
        profile.stats.charge_speed *= modifiers.speed_multiplier;
        profile.stats.attack_cooldown *= modifiers.cooldown_multiplier;
        for spec in &mut profile.attacks {
            spec.damage *= modifiers.damage_multiplier;
        }
        profile
    }
}

/// Scalar hooks for progression systems.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleModifiers {
    pub damage_multiplier: f32,
    pub speed_multiplier: f32,
    pub cooldown_multiplier: f32,
    pub health_multiplier: f32,
}

impl Default for RoleModifiers {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            speed_multiplier: 1.0,
            cooldown_multiplier: 1.0,
            health_multiplier: 1.0,
        }
    }
}

/// Combat arbiter tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbiterConfig {
    /// Probability that a waiting combatant takes over from a vulnerable holder
    pub engage_chance: f32,
    /// Seconds between opportunity re-evaluations
    pub opportunity_check_interval: f32,
    /// Ring radius for waiting combatants
    pub circle_radius: f32,
    /// Ring rotation (degrees per second)
    pub circle_rotation_speed: f32,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            engage_chance: 0.5,
            opportunity_check_interval: 0.5,
            circle_radius: 4.0,
            circle_rotation_speed: 20.0,
        }
    }
}

/// Full combat tuning bundle (one RON file per game mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatConfig {
    pub arbiter: ArbiterConfig,
    pub basic: RoleProfile,
    pub elite: RoleProfile,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            arbiter: ArbiterConfig::default(),
            basic: RoleProfile::basic(),
            elite: RoleProfile::elite(),
        }
    }
}

impl CombatConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = read_config(path.as_ref())?;
        Self::from_ron_str(&contents)
    }

    pub fn from_ron_str(ron: &str) -> Result<Self, ConfigError> {
        let config: CombatConfig = ron::from_str(ron)?;
        config.basic.validate()?;
        config.elite.validate()?;
        if !(0.0..=1.0).contains(&config.arbiter.engage_chance) {
            return Err(ConfigError::Invalid("engage_chance must be in [0, 1]".to_string()));
        }
        if config.arbiter.opportunity_check_interval <= 0.0 {
            return Err(ConfigError::Invalid(
                "opportunity_check_interval must be > 0".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn profile(&self, role: EnemyRole) -> &RoleProfile {
        match role {
            EnemyRole::Basic => &self.basic,
            EnemyRole::Elite => &self.elite,
        }
    }
}

/// Spawn points of one encounter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncounterLayout {
    #[serde(default)]
    pub basic_spawns: Vec<[f32; 3]>,
    #[serde(default)]
    pub elite_spawns: Vec<[f32; 3]>,
}

impl EncounterLayout {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = read_config(path.as_ref())?;
        Self::from_ron_str(&contents)
    }

    pub fn from_ron_str(ron: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(ron)?)
    }

    pub fn total_spawns(&self) -> usize {
        self.basic_spawns.len() + self.elite_spawns.len()
    }
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}
