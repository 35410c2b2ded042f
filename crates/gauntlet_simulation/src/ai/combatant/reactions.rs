//! Damage reactions: guard, hit-stun chain, dash-back escape valve, death.

use bevy::prelude::*;

use super::{cue, flat, CombatContext, Combatant, HitReaction, TIMER_EPSILON};
use crate::ai::components::EnemyState;
use crate::ai::policy;

impl Combatant {
    /// Apply incoming damage (player strike).
    ///
    /// Blocking: no health loss, `damage × guard_chip_ratio` goes to the guard meter.
    /// Otherwise health drops and the combatant enters/extends hit-stun, except
    /// in Stunned/DashingBack where only health changes.
    pub fn take_damage(&mut self, amount: f32, ctx: &mut CombatContext) -> HitReaction {
        if self.is_dead() {
            return HitReaction::Ignored;
        }
        let amount = amount.max(0.0);

        if self.state == EnemyState::Blocking {
            ctx.presentation.trigger(cue::BLOCK_IMPACT);
            let chip = amount * self.profile.stats.guard_chip_ratio;
            if self.guard.accumulate(chip) {
                self.guard_break(ctx);
                return HitReaction::GuardBroken;
            }
            return HitReaction::Blocked;
        }

        self.health.take_damage(amount);
        if self.health.is_dead() {
            self.die(ctx);
            return HitReaction::Killed;
        }

        match self.state {
            EnemyState::Stunned | EnemyState::DashingBack => {
                ctx.presentation.trigger(cue::HIT);
                HitReaction::Absorbed
            }
            EnemyState::HitStun => {
                // Продлеваем: elapsed копится дальше, сбрасываем только gap
                self.time_since_last_hit = 0.0;
                ctx.presentation.trigger(cue::HIT);
                HitReaction::Staggered
            }
            EnemyState::Unaware | EnemyState::Aware => {
                // Ambushed: сразу в бой, opener сгорает
                if self.state == EnemyState::Unaware {
                    self.become_aware(ctx);
                }
                self.engaged = true;
                self.has_opened_with_charge = true;
                self.enter_hit_stun(ctx);
                HitReaction::Staggered
            }
            _ => {
                self.enter_hit_stun(ctx);
                HitReaction::Staggered
            }
        }
    }

    fn guard_break(&mut self, ctx: &mut CombatContext) {
        self.end_block(ctx);
        self.guard.reset();
        self.state = EnemyState::Stunned;
        self.stun_remaining = self.profile.stats.stun_duration;
        ctx.locomotion.stop();
        ctx.presentation.trigger(cue::STUNNED);
        crate::log(&format!(
            "💔 {:?} guard broken → Stunned ({:.1}s)",
            self.id, self.stun_remaining
        ));
    }

    /// Fresh hit-stun chain; cancels any charge/attack and drops the token.
    fn enter_hit_stun(&mut self, ctx: &mut CombatContext) {
        if matches!(self.state, EnemyState::Charging | EnemyState::Attacking { .. }) {
            crate::log(&format!("{:?} {} interrupted by hit", self.id, self.state.name()));
        }

        ctx.arbiter.release_attack_permission(self.id);
        ctx.locomotion.stop();
        ctx.locomotion.set_speed(self.profile.stats.chase_speed);

        self.combo_connected = false;
        self.action_elapsed = 0.0;
        self.state = EnemyState::HitStun;
        self.hit_stun_elapsed = 0.0;
        self.time_since_last_hit = 0.0;
        ctx.presentation.trigger(cue::HIT);
    }

    pub(super) fn tick_hit_stun(&mut self, position: Vec3, target: Vec3, delta: f32, ctx: &mut CombatContext) {
        self.hit_stun_elapsed += delta;
        self.time_since_last_hit += delta;

        // Cap проверяется первым: escape valve важнее обычного выхода
        if self.hit_stun_elapsed + TIMER_EPSILON >= self.profile.stats.max_hit_stun_duration {
            self.start_dash_back(position, target, ctx);
            return;
        }

        if self.time_since_last_hit + TIMER_EPSILON >= self.profile.stats.hit_stun_reset_time {
            self.clear_hit_stun();
            self.state = EnemyState::EngagedIdle;
            ctx.locomotion.resume();
            crate::log(&format!("{:?} HitStun → EngagedIdle", self.id));
        }
    }

    fn clear_hit_stun(&mut self) {
        self.hit_stun_elapsed = 0.0;
        self.time_since_last_hit = 0.0;
    }

    pub(super) fn tick_stunned(&mut self, delta: f32, ctx: &mut CombatContext) {
        self.stun_remaining -= delta;
        if self.stun_remaining <= TIMER_EPSILON {
            self.stun_remaining = 0.0;
            self.state = EnemyState::EngagedIdle;
            ctx.locomotion.resume();
            crate::log(&format!("{:?} Stunned → EngagedIdle", self.id));
        }
    }

    /// Forced backward displacement away from the target.
    fn start_dash_back(&mut self, position: Vec3, target: Vec3, ctx: &mut CombatContext) {
        let mut away = flat(position - target).normalize_or_zero();
        if away == Vec3::ZERO {
            away = -self.facing;
        }

        let stats = &self.profile.stats;
        let destination = position + away * stats.dash_back_speed * stats.dash_back_duration;
        let dash_speed = stats.dash_back_speed;
        self.recovery_remaining = stats.dash_back_duration;

        crate::log(&format!(
            "🏃 {:?} HitStun cap reached ({:.2}s) → DashingBack",
            self.id, self.hit_stun_elapsed
        ));
        self.clear_hit_stun();
        self.state = EnemyState::DashingBack;

        ctx.arbiter.release_attack_permission(self.id);
        ctx.locomotion.resume();
        ctx.locomotion.set_speed(dash_speed);
        ctx.locomotion.move_to(destination);
        ctx.presentation.trigger(cue::DASH_BACK);
    }

    pub(super) fn tick_dash_back(&mut self, delta: f32, ctx: &mut CombatContext) {
        self.recovery_remaining -= delta;
        if self.recovery_remaining <= TIMER_EPSILON {
            self.end_dash_back(ctx);
        }
    }

    /// Dash-back animation ended. Returns `false` if ignored (not dashing).
    pub fn on_dash_back_end(&mut self, ctx: &mut CombatContext) -> bool {
        if self.state != EnemyState::DashingBack {
            return false;
        }
        self.end_dash_back(ctx);
        true
    }

    fn end_dash_back(&mut self, ctx: &mut CombatContext) {
        self.recovery_remaining = 0.0;
        self.state = EnemyState::EngagedIdle;
        self.decision_timer = policy::next_decision_interval(&self.profile.decision, ctx.rng);
        ctx.locomotion.stop();
        ctx.locomotion.set_speed(self.profile.stats.chase_speed);
        crate::log(&format!("{:?} DashingBack → EngagedIdle", self.id));
    }

    /// Terminal: drop the token, leave the roster, halt.
    fn die(&mut self, ctx: &mut CombatContext) {
        let previous = self.state;
        self.state = EnemyState::Dead;
        self.engaged = false;
        self.combo_connected = false;
        self.block_remaining = 0.0;
        self.stun_remaining = 0.0;
        self.recovery_remaining = 0.0;
        self.clear_hit_stun();

        ctx.arbiter.release_attack_permission(self.id);
        ctx.arbiter.unregister(self.id);
        ctx.locomotion.stop();
        ctx.presentation.trigger(cue::DIE);

        crate::log_info(&format!("💀 {:?} {} → Dead", self.id, previous.name()));
    }
}
