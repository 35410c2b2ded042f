//! Presentation cues (ECS → tactical layer).

use bevy::prelude::*;

use super::PresentationSink;

/// A single cue emitted by a combatant during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    /// One-shot animation trigger ("QuadPunch", "Hit", "Die", ...)
    Trigger(String),
    /// Continuous animator parameter ("Speed", "Blocking", ...)
    Continuous { param: String, value: f32 },
}

/// Event: cue for the tactical layer (AnimationTree / audio).
#[derive(Event, Debug, Clone)]
pub struct PresentationCue {
    pub entity: Entity,
    pub cue: Cue,
}

/// Buffers cues in emission order.
///
/// ECS drains it into `PresentationCue` events after each combatant call;
/// tests inspect it directly.
#[derive(Debug, Clone, Default)]
pub struct CueRecorder {
    pub cues: Vec<Cue>,
}

impl CueRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all triggers fired so far.
    pub fn triggers(&self) -> Vec<&str> {
        self.cues
            .iter()
            .filter_map(|cue| match cue {
                Cue::Trigger(name) => Some(name.as_str()),
                Cue::Continuous { .. } => None,
            })
            .collect()
    }

    pub fn was_triggered(&self, name: &str) -> bool {
        self.triggers().contains(&name)
    }

    /// Latest value written to a continuous parameter.
    pub fn last_value(&self, param: &str) -> Option<f32> {
        self.cues.iter().rev().find_map(|cue| match cue {
            Cue::Continuous { param: p, value } if p == param => Some(*value),
            _ => None,
        })
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Cue> {
        self.cues.drain(..)
    }

    pub fn clear(&mut self) {
        self.cues.clear();
    }
}

impl PresentationSink for CueRecorder {
    fn trigger(&mut self, cue: &str) {
        self.cues.push(Cue::Trigger(cue.to_string()));
    }

    fn set_continuous(&mut self, param: &str, value: f32) {
        self.cues.push(Cue::Continuous {
            param: param.to_string(),
            value,
        });
    }
}
