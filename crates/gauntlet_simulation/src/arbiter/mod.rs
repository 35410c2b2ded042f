//! Combat arbiter: one attack token per encounter.
//!
//! Serializes attack initiative across the roster so that only one combatant
//! presses the player at a time while the rest orbit on a ring.
//!
//! # Token rules
//!
//! - Token mutates only through `request_attack_permission`,
//!   `release_attack_permission`, `unregister` and the periodic opportunity check.
//! - A dead or unregistered handle never holds and is never granted the token.
//! - Grants are first-come-first-served within a tick (caller order).
//! - Only the opportunity check revokes a living holder, and only while the
//!   holder reports itself vulnerable (blocking / stunned).
//!
//! Arbiter никогда не лезет в combatant'ов напрямую: каждый тик они публикуют
//! `CombatantStatus` через `report_status`, arbiter работает по этому snapshot.

use bevy::prelude::*;
use rand::{Rng, RngCore};

use crate::ai::combatant::flat_distance;
use crate::config::ArbiterConfig;

#[cfg(test)]
mod arbiter_tests;

/// What the arbiter knows about a registered combatant (refreshed every tick).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CombatantStatus {
    pub position: Vec3,
    pub engaged: bool,
    pub dead: bool,
    /// Blocking or guard-broken: opportunity for another combatant
    pub vulnerable: bool,
}

#[derive(Debug, Clone)]
struct RosterEntry {
    handle: Entity,
    status: CombatantStatus,
}

/// Encounter-scoped attack token coordinator.
///
/// Injected explicitly: the combat core receives `&mut CombatArbiter`,
/// ECS systems receive `ResMut<CombatArbiter>`.
#[derive(Resource, Debug, Clone)]
pub struct CombatArbiter {
    config: ArbiterConfig,
    /// Registry order = slot order on the ring = tick order
    roster: Vec<RosterEntry>,
    attack_token: Option<Entity>,
    opportunity_timer: f32,
    elapsed: f32,
    target: Option<Vec3>,
}

impl Default for CombatArbiter {
    fn default() -> Self {
        Self::new(ArbiterConfig::default())
    }
}

impl CombatArbiter {
    pub fn new(config: ArbiterConfig) -> Self {
        Self {
            config,
            roster: Vec::new(),
            attack_token: None,
            // Первый check сразу на первом тике
            opportunity_timer: 0.0,
            elapsed: 0.0,
            target: None,
        }
    }

    pub fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    /// Discard encounter state (roster, token, timers). Config is kept.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    // ------------------------------------------------------------------
    // Registry
    // ------------------------------------------------------------------

    /// Idempotent. Returns `true` if the handle was newly added.
    pub fn register(&mut self, handle: Entity) -> bool {
        if self.is_registered(handle) {
            return false;
        }
        self.roster.push(RosterEntry {
            handle,
            status: CombatantStatus::default(),
        });
        true
    }

    /// Idempotent. Clears the token if the handle held it.
    pub fn unregister(&mut self, handle: Entity) -> bool {
        let before = self.roster.len();
        self.roster.retain(|entry| entry.handle != handle);

        if self.attack_token == Some(handle) {
            self.attack_token = None;
            crate::log(&format!("🎟️ Arbiter: token cleared (holder {:?} unregistered)", handle));
        }

        self.roster.len() != before
    }

    pub fn is_registered(&self, handle: Entity) -> bool {
        self.roster.iter().any(|entry| entry.handle == handle)
    }

    /// Publish the combatant's view of itself for this tick.
    ///
    /// A dead report clears the token synchronously if the reporter holds it.
    pub fn report_status(&mut self, handle: Entity, status: CombatantStatus) {
        if let Some(entry) = self.roster.iter_mut().find(|entry| entry.handle == handle) {
            entry.status = status;
        }
        if status.dead && self.attack_token == Some(handle) {
            self.attack_token = None;
        }
    }

    pub fn status(&self, handle: Entity) -> Option<CombatantStatus> {
        self.roster
            .iter()
            .find(|entry| entry.handle == handle)
            .map(|entry| entry.status)
    }

    /// Registered handles in registry order.
    pub fn handles(&self) -> impl Iterator<Item = Entity> + '_ {
        self.roster.iter().map(|entry| entry.handle)
    }

    pub fn roster_len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    // ------------------------------------------------------------------
    // Token
    // ------------------------------------------------------------------

    fn is_eligible(&self, handle: Entity) -> bool {
        self.status(handle).map(|status| !status.dead).unwrap_or(false)
    }

    /// Grants if the token is free or already ours. Sole gate for attacking / opener charge.
    pub fn request_attack_permission(&mut self, handle: Entity) -> bool {
        if !self.is_eligible(handle) {
            return false;
        }

        match self.attack_token {
            None => {
                self.attack_token = Some(handle);
                crate::log(&format!("🎟️ Arbiter: token granted to {:?}", handle));
                true
            }
            Some(holder) => holder == handle,
        }
    }

    /// Clears the token iff `handle` holds it (stale releases are no-ops).
    pub fn release_attack_permission(&mut self, handle: Entity) -> bool {
        if self.attack_token == Some(handle) {
            self.attack_token = None;
            crate::log(&format!("🎟️ Arbiter: token released by {:?}", handle));
            true
        } else {
            false
        }
    }

    pub fn is_attacker(&self, handle: Entity) -> bool {
        self.attack_token == Some(handle)
    }

    pub fn token_holder(&self) -> Option<Entity> {
        self.attack_token
    }

    /// Someone else holds the token → orbit instead of pressing.
    pub fn should_wait(&self, handle: Entity) -> bool {
        matches!(self.attack_token, Some(holder) if holder != handle)
    }

    // ------------------------------------------------------------------
    // Ring
    // ------------------------------------------------------------------

    pub fn set_target(&mut self, target: Option<Vec3>) {
        self.target = target;
    }

    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    fn is_waiting_entry(&self, entry: &RosterEntry) -> bool {
        !entry.status.dead && Some(entry.handle) != self.attack_token
    }

    pub fn waiting_count(&self) -> usize {
        self.roster.iter().filter(|entry| self.is_waiting_entry(entry)).count()
    }

    /// Slot on the ring around the target for a waiting combatant.
    ///
    /// `angle = index × 360° / total + elapsed × rotation_speed`. Returns `current`
    /// when there is no target, nobody is waiting, or `handle` is not waiting.
    pub fn circle_position(&self, handle: Entity, current: Vec3) -> Vec3 {
        let Some(target) = self.target else {
            return current;
        };

        // Snapshot slot index (dead/holder filtered before indexing)
        let mut waiting_index = None;
        let mut total_waiting = 0usize;
        for entry in &self.roster {
            if !self.is_waiting_entry(entry) {
                continue;
            }
            if entry.handle == handle {
                waiting_index = Some(total_waiting);
            }
            total_waiting += 1;
        }

        let Some(index) = waiting_index else {
            return current;
        };

        let angle_step = 360.0 / total_waiting as f32;
        let angle = angle_step * index as f32 + self.elapsed * self.config.circle_rotation_speed;
        let radians = angle.to_radians();

        target + Vec3::new(radians.cos(), 0.0, radians.sin()) * self.config.circle_radius
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Drop dead entries and a stale token. Runs at the top of every tick.
    pub fn validate(&mut self) {
        let before = self.roster.len();
        self.roster.retain(|entry| !entry.status.dead);
        let removed = before - self.roster.len();
        if removed > 0 {
            crate::log(&format!("Arbiter: swept {} dead combatants from roster", removed));
        }

        if let Some(holder) = self.attack_token {
            if !self.is_eligible(holder) {
                self.attack_token = None;
                crate::log(&format!("🎟️ Arbiter: stale token of {:?} cleared", holder));
            }
        }
    }

    /// Advance arbiter time; runs the opportunity check every
    /// `opportunity_check_interval` seconds.
    pub fn tick(&mut self, delta: f32, rng: &mut dyn RngCore) {
        self.validate();

        self.elapsed += delta;
        self.opportunity_timer -= delta;
        if self.opportunity_timer <= 0.0 {
            self.opportunity_timer = self.config.opportunity_check_interval;
            self.check_engagement_opportunities(rng);
        }
    }

    fn check_engagement_opportunities(&mut self, rng: &mut dyn RngCore) {
        if self.target.is_none() {
            return;
        }

        let Some(holder) = self.attack_token else {
            if let Some(closest) = self.closest_engaged(None) {
                self.attack_token = Some(closest);
                crate::log(&format!("🎟️ Arbiter: token assigned to closest engaged {:?}", closest));
            }
            return;
        };

        let holder_vulnerable = self.status(holder).map(|s| s.vulnerable).unwrap_or(false);
        if !holder_vulnerable {
            return;
        }

        if rng.gen::<f32>() <= self.config.engage_chance {
            if let Some(replacement) = self.closest_engaged(Some(holder)) {
                self.attack_token = Some(replacement);
                crate::log(&format!(
                    "🎟️ Arbiter: {:?} vulnerable, token handed to {:?}",
                    holder, replacement
                ));
            }
        }
    }

    fn closest_engaged(&self, exclude: Option<Entity>) -> Option<Entity> {
        let target = self.target?;

        let mut closest: Option<(Entity, f32)> = None;
        for entry in &self.roster {
            if entry.status.dead || !entry.status.engaged || Some(entry.handle) == exclude {
                continue;
            }

            // Та же метрика, что у combatant'а (ground plane)
            let distance = flat_distance(entry.status.position, target);
            match closest {
                Some((_, best)) if distance >= best => {}
                _ => closest = Some((entry.handle, distance)),
            }
        }

        closest.map(|(handle, _)| handle)
    }
}
