//! Enemy combat core: one state machine for every role.
//!
//! `Combatant` ведёт автомат (awareness → engagement → actions →
//! damage/stun/recovery → death). Роль = данные (`RoleProfile`), логика общая.
//!
//! Коллабораторы передаются явно через `CombatContext` на каждый вызов:
//! arbiter, locomotion, presentation, rng. Никакого глобального доступа.
//!
//! Callbacks от анимаций (`on_attack_end`, `on_dash_back_end`, `on_impact`)
//! идемпотентны: если состояние уже не совпадает, вызов ничего не делает.
//! Attack callbacks несут номер swing'а: сигнал от прошлого swing'а игнорируется.

use bevy::prelude::*;
use rand::RngCore;

use crate::ai::components::EnemyState;
use crate::ai::policy::{self, Decision};
use crate::arbiter::{CombatArbiter, CombatantStatus};
use crate::bridge::{DamageReport, Locomotion, PresentationSink};
use crate::components::{GuardMeter, Health};
use crate::config::RoleProfile;

mod actions;
mod reactions;


/// Float timers accumulate tick deltas; thresholds compare with this slack.
pub(crate) const TIMER_EPSILON: f32 = 1e-4;

/// Trigger cue names sent to the presentation layer.
pub mod cue {
    pub const HIT: &str = "Hit";
    pub const DIE: &str = "Die";
    pub const STUNNED: &str = "Stunned";
    pub const DASH_BACK: &str = "DashBack";
    pub const BLOCK_IMPACT: &str = "BlockImpact";

    /// Continuous parameters
    pub const BLOCK: &str = "Block";
    pub const SPEED: &str = "Speed";
    pub const VELOCITY_X: &str = "VelocityX";
    pub const VELOCITY_Z: &str = "VelocityZ";
}

/// Collaborators for one combatant call.
pub struct CombatContext<'a> {
    /// Target position (player); `None` = no target in the scene
    pub target: Option<Vec3>,
    pub arbiter: &'a mut CombatArbiter,
    pub locomotion: &'a mut dyn Locomotion,
    pub presentation: &'a mut dyn PresentationSink,
    pub rng: &'a mut dyn RngCore,
}

/// How a combatant reacted to incoming damage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitReaction {
    /// Dead already: nothing happened
    Ignored,
    /// Absorbed by the guard (meter grew)
    Blocked,
    /// Guard meter saturated → Stunned
    GuardBroken,
    /// Entered or extended hit-stun
    Staggered,
    /// Health reduced, state kept (Stunned / DashingBack)
    Absorbed,
    Killed,
}

/// Result of an impact callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImpactOutcome {
    /// Impact does not match the current attack (late / duplicate)
    Ignored,
    /// Target out of effective range at impact time
    Whiffed,
    Landed(DamageReport),
}

/// Per-enemy combat state machine.
#[derive(Component, Debug, Clone)]
pub struct Combatant {
    id: Entity,
    profile: RoleProfile,
    state: EnemyState,
    health: Health,
    guard: GuardMeter,

    // Timers (seconds)
    attack_cooldown: f32,
    stun_remaining: f32,
    hit_stun_elapsed: f32,
    time_since_last_hit: f32,
    recovery_remaining: f32,
    block_remaining: f32,
    decision_timer: f32,
    /// Time in the current charge/attack (watchdog)
    action_elapsed: f32,

    /// Sequence number of the current swing (bumped on every attack entry)
    swing: u32,
    /// Impact of the current swing already resolved
    impact_resolved: bool,

    has_opened_with_charge: bool,
    combo_connected: bool,
    engaged: bool,
    facing: Vec3,
    missing_target_logged: bool,
}

impl Combatant {
    pub fn new(id: Entity, profile: RoleProfile) -> Self {
        let health = Health::new(profile.stats.max_health);
        let guard = GuardMeter::new(profile.stats.max_stun_meter);
        let decision_timer = profile.decision.decision_interval;

        Self {
            id,
            profile,
            state: EnemyState::Unaware,
            health,
            guard,
            attack_cooldown: 0.0,
            stun_remaining: 0.0,
            hit_stun_elapsed: 0.0,
            time_since_last_hit: 0.0,
            recovery_remaining: 0.0,
            block_remaining: 0.0,
            decision_timer,
            action_elapsed: 0.0,
            swing: 0,
            impact_resolved: false,
            has_opened_with_charge: false,
            combo_connected: false,
            engaged: false,
            facing: Vec3::Z,
            missing_target_logged: false,
        }
    }

    pub fn id(&self) -> Entity {
        self.id
    }

    pub fn profile(&self) -> &RoleProfile {
        &self.profile
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn guard(&self) -> &GuardMeter {
        &self.guard
    }

    pub fn is_dead(&self) -> bool {
        self.state.is_dead()
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged && !self.is_dead()
    }

    pub fn is_vulnerable(&self) -> bool {
        self.state.is_vulnerable()
    }

    pub fn is_in_hit_stun(&self) -> bool {
        self.state == EnemyState::HitStun
    }

    pub fn is_dashing_back(&self) -> bool {
        self.state == EnemyState::DashingBack
    }

    pub fn has_opened_with_charge(&self) -> bool {
        self.has_opened_with_charge
    }

    /// Opener done and no charge/attack in progress.
    pub fn has_completed_opener(&self) -> bool {
        self.engaged
            && self.has_opened_with_charge
            && !matches!(self.state, EnemyState::Charging | EnemyState::Attacking { .. })
    }

    pub fn combo_connected(&self) -> bool {
        self.combo_connected
    }

    pub fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown
    }

    /// Seconds spent in the current charge/attack.
    pub fn action_elapsed(&self) -> f32 {
        self.action_elapsed
    }

    /// Current swing number; animation callbacks must echo it back.
    pub fn swing(&self) -> u32 {
        self.swing
    }

    pub fn hit_stun_elapsed(&self) -> f32 {
        self.hit_stun_elapsed
    }

    pub fn facing(&self) -> Vec3 {
        self.facing
    }

    /// Not mid-action and off cooldown.
    pub fn is_action_ready(&self) -> bool {
        !self.state.is_busy()
            && !matches!(
                self.state,
                EnemyState::HitStun | EnemyState::Stunned | EnemyState::DashingBack | EnemyState::Dead
            )
            && self.attack_cooldown <= 0.0
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the state machine by `delta` seconds.
    pub fn tick(&mut self, delta: f32, ctx: &mut CombatContext) {
        if self.is_dead() {
            return;
        }

        self.attack_cooldown = (self.attack_cooldown - delta).max(0.0);
        let position = ctx.locomotion.position();

        let Some(target) = ctx.target else {
            self.lose_target(ctx);
            self.publish_status(position, ctx);
            return;
        };
        self.missing_target_logged = false;

        let distance = flat_distance(position, target);

        match self.state {
            EnemyState::Unaware => self.tick_unaware(distance, position, target, delta, ctx),
            EnemyState::Aware => self.tick_aware(distance, position, target, delta, ctx),
            EnemyState::EngagedIdle | EnemyState::Circling => {
                self.tick_engaged(distance, position, target, delta, ctx)
            }
            EnemyState::Charging => self.tick_charging(distance, position, target, delta, ctx),
            EnemyState::Attacking { .. } => self.tick_attacking(delta, ctx),
            EnemyState::Blocking => self.tick_blocking(position, target, delta, ctx),
            EnemyState::HitStun => self.tick_hit_stun(position, target, delta, ctx),
            EnemyState::Stunned => self.tick_stunned(delta, ctx),
            EnemyState::DashingBack => self.tick_dash_back(delta, ctx),
            EnemyState::Dead => return,
        }

        self.update_locomotion_params(ctx);
        self.publish_status(ctx.locomotion.position(), ctx);
    }

    fn tick_unaware(
        &mut self,
        distance: f32,
        position: Vec3,
        target: Vec3,
        delta: f32,
        ctx: &mut CombatContext,
    ) {
        if distance > self.profile.stats.awareness_range {
            return;
        }

        self.become_aware(ctx);
        self.tick_aware(distance, position, target, delta, ctx);
    }

    pub(super) fn become_aware(&mut self, ctx: &mut CombatContext) {
        self.state = EnemyState::Aware;
        ctx.locomotion.resume();
        ctx.locomotion.set_speed(self.profile.stats.chase_speed);
        crate::log(&format!("👁️ {:?} Unaware → Aware", self.id));
    }

    fn tick_aware(
        &mut self,
        distance: f32,
        position: Vec3,
        target: Vec3,
        delta: f32,
        ctx: &mut CombatContext,
    ) {
        if distance <= self.profile.stats.engagement_range {
            self.enter_engagement(target, ctx);
            return;
        }

        // Chase
        ctx.locomotion.move_to(target);
        self.face_towards(position, target, delta);
    }

    fn enter_engagement(&mut self, target: Vec3, ctx: &mut CombatContext) {
        self.engaged = true;
        self.state = EnemyState::EngagedIdle;
        self.decision_timer = policy::next_decision_interval(&self.profile.decision, ctx.rng);
        crate::log(&format!("⚔️ {:?} Aware → EngagedIdle", self.id));

        self.try_opening_charge(target, ctx);
    }

    /// Opening charge: once per engagement, gated by the token.
    ///
    /// Denied openers stay pending and are retried on later ticks.
    fn try_opening_charge(&mut self, target: Vec3, ctx: &mut CombatContext) -> bool {
        if self.has_opened_with_charge || !self.is_action_ready() {
            return false;
        }
        if !ctx.arbiter.request_attack_permission(self.id) {
            return false;
        }

        self.has_opened_with_charge = true;
        crate::log(&format!("🐂 {:?} opening charge", self.id));
        self.start_charge(target, ctx);
        true
    }

    fn tick_engaged(
        &mut self,
        distance: f32,
        position: Vec3,
        target: Vec3,
        delta: f32,
        ctx: &mut CombatContext,
    ) {
        if ctx.arbiter.should_wait(self.id) {
            if self.state != EnemyState::Circling {
                self.state = EnemyState::Circling;
            }
            let slot = ctx.arbiter.circle_position(self.id, position);
            ctx.locomotion.set_speed(self.profile.stats.chase_speed);
            ctx.locomotion.move_to(slot);
            self.face_towards(position, target, delta);
            return;
        }

        self.state = EnemyState::EngagedIdle;

        if self.try_opening_charge(target, ctx) {
            return;
        }

        if !ctx.arbiter.is_attacker(self.id) {
            // Токен свободен, но на cooldown не претендуем: не монополизируем
            if self.attack_cooldown > 0.0 || !ctx.arbiter.request_attack_permission(self.id) {
                // Ждём cooldown, но дистанцию держим (после dash-back — сближение)
                self.close_distance(distance, target, ctx);
                self.face_towards(position, target, delta);
                return;
            }
        }

        // Token holder: close to attack range, then let the policy act
        self.close_distance(distance, target, ctx);
        self.face_towards(position, target, delta);

        self.decision_timer -= delta;
        if self.decision_timer > 0.0 || !self.has_completed_opener() || self.attack_cooldown > 0.0 {
            return;
        }

        self.decision_timer = policy::next_decision_interval(&self.profile.decision, ctx.rng);
        match policy::decide(&self.profile.decision, distance, ctx.rng) {
            Decision::Block { duration } => self.start_block(duration, ctx),
            Decision::Attack(kind) => self.start_attack(kind, ctx),
            Decision::Charge => self.start_charge(target, ctx),
            Decision::Hold => {}
        }
    }

    fn tick_charging(
        &mut self,
        distance: f32,
        position: Vec3,
        target: Vec3,
        delta: f32,
        ctx: &mut CombatContext,
    ) {
        self.action_elapsed += delta;

        if distance <= self.profile.stats.charge_stop_distance {
            ctx.locomotion.stop();
            ctx.locomotion.set_speed(self.profile.stats.chase_speed);
            self.snap_facing(position, target);
            self.enter_attack(crate::combat::AttackKind::Charge, ctx, false);
            return;
        }

        if self.action_elapsed >= self.profile.stats.max_charge_duration {
            crate::log_warning(&format!(
                "{:?} charge did not reach target in {:.1}s, aborting",
                self.id, self.action_elapsed
            ));
            ctx.locomotion.set_speed(self.profile.stats.chase_speed);
            ctx.arbiter.release_attack_permission(self.id);
            self.state = EnemyState::EngagedIdle;
            return;
        }

        // Цель двигается — обновляем destination каждый тик
        ctx.locomotion.move_to(target);
        self.face_towards(position, target, delta);
    }

    /// Chase to attack range, hold position inside it.
    fn close_distance(&self, distance: f32, target: Vec3, ctx: &mut CombatContext) {
        if distance > self.profile.stats.attack_range {
            ctx.locomotion.set_speed(self.profile.stats.chase_speed);
            ctx.locomotion.move_to(target);
        } else {
            ctx.locomotion.stop();
        }
    }

    fn lose_target(&mut self, ctx: &mut CombatContext) {
        if !self.missing_target_logged {
            crate::log_warning(&format!("{:?}: no combat target, staying Unaware", self.id));
            self.missing_target_logged = true;
        }

        if self.state != EnemyState::Unaware {
            ctx.arbiter.release_attack_permission(self.id);
            ctx.locomotion.stop();
            self.state = EnemyState::Unaware;
            self.engaged = false;
        }
    }

    // ------------------------------------------------------------------
    // Facing / presentation / arbiter status
    // ------------------------------------------------------------------

    fn face_towards(&mut self, position: Vec3, target: Vec3, delta: f32) {
        let desired = flat(target - position).normalize_or_zero();
        if desired == Vec3::ZERO {
            return;
        }

        let t = (self.profile.stats.turn_rate * delta).clamp(0.0, 1.0);
        let turned = self.facing.lerp(desired, t).normalize_or_zero();
        self.facing = if turned == Vec3::ZERO { desired } else { turned };
    }

    pub(super) fn snap_facing(&mut self, position: Vec3, target: Vec3) {
        let desired = flat(target - position).normalize_or_zero();
        if desired != Vec3::ZERO {
            self.facing = desired;
        }
    }

    /// Speed normalized by chase speed, velocity in local (facing) space.
    fn update_locomotion_params(&self, ctx: &mut CombatContext) {
        let chase_speed = self.profile.stats.chase_speed.max(f32::EPSILON);
        let velocity = ctx.locomotion.current_velocity();
        let forward = self.facing;
        let right = Vec3::Y.cross(forward);

        ctx.presentation.set_continuous(cue::SPEED, velocity.length() / chase_speed);
        ctx.presentation.set_continuous(cue::VELOCITY_X, velocity.dot(right) / chase_speed);
        ctx.presentation.set_continuous(cue::VELOCITY_Z, velocity.dot(forward) / chase_speed);
    }

    fn publish_status(&self, position: Vec3, ctx: &mut CombatContext) {
        ctx.arbiter.report_status(
            self.id,
            CombatantStatus {
                position,
                engaged: self.is_engaged(),
                dead: self.is_dead(),
                vulnerable: self.is_vulnerable(),
            },
        );
    }
}

/// Horizontal projection (y = 0).
pub(crate) fn flat(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Distance on the ground plane.
pub(crate) fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    flat(b - a).length()
}
