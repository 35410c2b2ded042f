//! Headless presentation driver
//!
//! В engine build AnimationTree сам присылает impact / attack-end /
//! dash-back-end. Без движка эти сигналы генерирует `drive_clips`:
//! проигрывает "клип" по таймлайну из `ClipLibrary` и пишет `AnimationEvent`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::{AnimationEvent, Combatant, EnemyState};
use crate::combat::{AttackKind, Dead};


/// Timeline of one attack clip (seconds from clip start).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipTiming {
    /// Impact frame (range re-check + damage)
    pub impact_at: f32,
    /// Clip length (attack-end callback)
    pub length: f32,
}

impl ClipTiming {
    pub const fn new(impact_at: f32, length: f32) -> Self {
        Self { impact_at, length }
    }
}

/// Clip timings per attack kind + dash-back clip length.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipLibrary {
    pub light: ClipTiming,
    pub heavy: ClipTiming,
    pub charge: ClipTiming,
    pub unblockable: ClipTiming,
    pub leg_sweep: ClipTiming,
    pub sword_slam: ClipTiming,
    pub dash_back_length: f32,
}

impl Default for ClipLibrary {
    fn default() -> Self {
        Self {
            light: ClipTiming::new(0.35, 0.9),
            heavy: ClipTiming::new(0.4, 1.0),
            charge: ClipTiming::new(0.35, 0.9),
            unblockable: ClipTiming::new(0.6, 1.3),
            leg_sweep: ClipTiming::new(0.3, 0.8),
            sword_slam: ClipTiming::new(0.7, 1.5),
            // Чуть короче dash_back_duration: callback приходит раньше fallback таймера
            dash_back_length: 0.35,
        }
    }
}

impl ClipLibrary {
    pub fn attack(&self, kind: AttackKind) -> ClipTiming {
        match kind {
            AttackKind::Light => self.light,
            AttackKind::Heavy => self.heavy,
            AttackKind::Charge => self.charge,
            AttackKind::Unblockable => self.unblockable,
            AttackKind::LegSweep => self.leg_sweep,
            AttackKind::SwordSlam => self.sword_slam,
        }
    }
}

/// Which clip is playing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clip {
    Attack(AttackKind),
    DashBack,
}

#[derive(Debug, Clone, Copy)]
struct PlayingClip {
    clip: Clip,
    elapsed: f32,
    /// Swing, для которого играет клип (другой swing = новый клип)
    swing: u32,
    impact_sent: bool,
    end_sent: bool,
}

/// Headless "AnimationTree" одного combatant'а.
#[derive(Component, Debug, Default)]
pub struct ClipPlayer {
    playing: Option<PlayingClip>,
}

impl ClipPlayer {
    pub fn current(&self) -> Option<Clip> {
        self.playing.map(|playing| playing.clip)
    }

    pub fn elapsed(&self) -> f32 {
        self.playing.map_or(0.0, |playing| playing.elapsed)
    }

    /// Advance one tick; returns the signals the clip emits this tick.
    pub fn advance(
        &mut self,
        entity: Entity,
        state: EnemyState,
        swing: u32,
        delta: f32,
        library: &ClipLibrary,
    ) -> Vec<AnimationEvent> {
        let clip = match state {
            EnemyState::Attacking { kind } => Clip::Attack(kind),
            EnemyState::DashingBack => Clip::DashBack,
            _ => {
                self.playing = None;
                return Vec::new();
            }
        };

        let restarted = match self.playing {
            None => true,
            Some(playing) => {
                playing.clip != clip || (matches!(clip, Clip::Attack(_)) && swing != playing.swing)
            }
        };

        let playing = if restarted {
            self.playing.insert(PlayingClip {
                clip,
                elapsed: 0.0,
                swing,
                impact_sent: false,
                end_sent: false,
            })
        } else {
            match self.playing.as_mut() {
                Some(playing) => {
                    playing.elapsed += delta;
                    playing
                }
                None => return Vec::new(),
            }
        };

        let mut signals = Vec::new();
        match clip {
            Clip::Attack(kind) => {
                let timing = library.attack(kind);
                if !playing.impact_sent && playing.elapsed >= timing.impact_at {
                    playing.impact_sent = true;
                    signals.push(AnimationEvent::impact(entity, kind, playing.swing));
                }
                if !playing.end_sent && playing.elapsed >= timing.length {
                    playing.end_sent = true;
                    signals.push(AnimationEvent::attack_end(entity, playing.swing));
                }
            }
            Clip::DashBack => {
                if !playing.end_sent && playing.elapsed >= library.dash_back_length {
                    playing.end_sent = true;
                    signals.push(AnimationEvent::dash_back_end(entity));
                }
            }
        }
        signals
    }
}

/// Система: headless clip playback → AnimationEvent
///
/// Сигналы доставляются на следующем fixed тике (`SimulationSet::Callbacks`),
/// как и callbacks от настоящего AnimationTree.
pub fn drive_clips(
    mut players: Query<(Entity, &Combatant, &mut ClipPlayer), Without<Dead>>,
    library: Res<ClipLibrary>,
    mut animation_events: EventWriter<AnimationEvent>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, combatant, mut player) in players.iter_mut() {
        let signals = player.advance(entity, combatant.state(), combatant.swing(), delta, &library);
        for signal in signals {
            animation_events.write(signal);
        }
    }
}

/// Headless Plugin (только для запуска без движка: тесты, demo binary)
pub struct HeadlessPlugin;

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ClipLibrary>()
            .add_systems(FixedUpdate, drive_clips.in_set(crate::SimulationSet::Locomotion));
    }
}
