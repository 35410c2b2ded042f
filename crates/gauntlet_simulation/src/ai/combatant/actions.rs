//! Offensive/defensive actions and their animation callbacks.

use bevy::prelude::*;
use rand::Rng;

use super::{cue, flat_distance, CombatContext, Combatant, ImpactOutcome};
use crate::ai::components::EnemyState;
use crate::ai::policy;
use crate::bridge::DamageSink;
use crate::combat::AttackKind;

impl Combatant {
    pub(super) fn start_charge(&mut self, target: Vec3, ctx: &mut CombatContext) {
        let multiplier = self
            .profile
            .attack(AttackKind::Charge)
            .map(|spec| spec.cooldown_multiplier)
            .unwrap_or(1.0);

        self.state = EnemyState::Charging;
        self.action_elapsed = 0.0;
        self.attack_cooldown = self.profile.stats.attack_cooldown * multiplier;

        ctx.locomotion.resume();
        ctx.locomotion.set_speed(self.profile.stats.charge_speed);
        ctx.locomotion.move_to(target);
        crate::log(&format!("🐂 {:?} → Charging", self.id));
    }

    pub(super) fn start_attack(&mut self, kind: AttackKind, ctx: &mut CombatContext) {
        self.enter_attack(kind, ctx, true);
    }

    /// Enter `Attacking { kind }`, fire one of the attack's cues.
    ///
    /// Charge finisher skips the cooldown (already started when the charge began).
    pub(super) fn enter_attack(&mut self, kind: AttackKind, ctx: &mut CombatContext, start_cooldown: bool) {
        let Some(spec) = self.profile.attack(kind) else {
            crate::log_warning(&format!("{:?}: no attack spec for {}", self.id, kind.as_str()));
            return;
        };

        let cooldown = self.profile.stats.attack_cooldown * spec.cooldown_multiplier;
        let cue_name = if spec.cues.is_empty() {
            None
        } else {
            let index = ctx.rng.gen_range(0..spec.cues.len());
            spec.cues.get(index).cloned()
        };

        self.state = EnemyState::Attacking { kind };
        self.action_elapsed = 0.0;
        self.swing = self.swing.wrapping_add(1);
        self.impact_resolved = false;
        self.combo_connected = false;
        if start_cooldown {
            self.attack_cooldown = cooldown;
        }

        ctx.locomotion.stop();
        if let Some(name) = cue_name {
            ctx.presentation.trigger(&name);
        }
        crate::log(&format!("🗡️ {:?} → Attacking ({})", self.id, kind.as_str()));
    }

    pub(super) fn start_block(&mut self, duration: f32, ctx: &mut CombatContext) {
        self.state = EnemyState::Blocking;
        self.block_remaining = duration;
        ctx.locomotion.stop();
        ctx.presentation.set_continuous(cue::BLOCK, 1.0);
        crate::log(&format!("🛡️ {:?} → Blocking ({:.2}s)", self.id, duration));
    }

    pub(super) fn end_block(&mut self, ctx: &mut CombatContext) {
        self.block_remaining = 0.0;
        ctx.presentation.set_continuous(cue::BLOCK, 0.0);
    }

    pub(super) fn tick_attacking(&mut self, delta: f32, ctx: &mut CombatContext) {
        self.action_elapsed += delta;

        // Watchdog: attack-end callback так и не пришёл
        if self.action_elapsed >= self.profile.stats.max_attack_duration {
            crate::log_warning(&format!(
                "{:?} attack exceeded {:.1}s without end callback, forcing end",
                self.id, self.profile.stats.max_attack_duration
            ));
            self.finish_attack(ctx);
        }
    }

    pub(super) fn tick_blocking(&mut self, position: Vec3, target: Vec3, delta: f32, ctx: &mut CombatContext) {
        self.block_remaining -= delta;
        self.face_towards(position, target, delta);

        if self.block_remaining <= 0.0 {
            self.end_block(ctx);
            self.state = EnemyState::EngagedIdle;
        }
    }

    /// Attack animation of `swing` ended. Returns `false` if ignored
    /// (not attacking, or the signal belongs to an earlier swing).
    ///
    /// A connected leg sweep chains straight into the sword slam (token kept).
    pub fn on_attack_end(&mut self, swing: u32, ctx: &mut CombatContext) -> bool {
        let Some(kind) = self.state.attack_kind() else {
            return false;
        };
        if swing != self.swing {
            crate::log(&format!(
                "{:?} stale attack-end (swing {} != {}) ignored",
                self.id, swing, self.swing
            ));
            return false;
        }

        if kind == AttackKind::LegSweep && self.combo_connected {
            crate::log(&format!("💥 {:?} leg sweep connected → SwordSlam", self.id));
            self.enter_attack(AttackKind::SwordSlam, ctx, true);
            return true;
        }

        self.finish_attack(ctx);
        true
    }

    pub(super) fn finish_attack(&mut self, ctx: &mut CombatContext) {
        self.combo_connected = false;
        self.action_elapsed = 0.0;
        ctx.arbiter.release_attack_permission(self.id);
        // Агент вне navmesh (сбит с края, в воздухе) — не двигаем
        if ctx.locomotion.is_on_navigable_surface() {
            ctx.locomotion.set_speed(self.profile.stats.chase_speed);
            ctx.locomotion.resume();
        }

        self.state = if ctx.arbiter.should_wait(self.id) {
            EnemyState::Circling
        } else {
            EnemyState::EngagedIdle
        };
        self.decision_timer = policy::next_decision_interval(&self.profile.decision, ctx.rng);
    }

    /// Impact frame of `kind` in `swing`: re-measure live distance, damage
    /// the target if in reach. Resolved at most once per swing.
    pub fn on_impact(
        &mut self,
        kind: AttackKind,
        swing: u32,
        ctx: &mut CombatContext,
        sink: &mut dyn DamageSink,
    ) -> ImpactOutcome {
        if self.state != (EnemyState::Attacking { kind }) || swing != self.swing || self.impact_resolved {
            return ImpactOutcome::Ignored;
        }

        let Some(spec) = self.profile.attack(kind) else {
            return ImpactOutcome::Ignored;
        };
        let reach = self.profile.stats.attack_range * spec.range_multiplier;
        let damage = spec.damage;

        self.impact_resolved = true;

        let Some(target) = ctx.target else {
            return ImpactOutcome::Whiffed;
        };

        let position = ctx.locomotion.position();
        if kind == AttackKind::Charge {
            self.snap_facing(position, target);
        }

        let distance = flat_distance(position, target);
        if distance > reach {
            crate::log(&format!(
                "{:?} {} whiffed ({:.2} > {:.2})",
                self.id,
                kind.as_str(),
                distance,
                reach
            ));
            return ImpactOutcome::Whiffed;
        }

        if kind == AttackKind::LegSweep {
            self.combo_connected = true;
        }

        let report = sink.apply_damage(damage);
        crate::log(&format!(
            "💥 {:?} {} hit for {:.1} (target hp {:.1})",
            self.id,
            kind.as_str(),
            report.applied,
            report.health_after
        ));
        ImpactOutcome::Landed(report)
    }
}
