//! AI systems (strategic layer logic)

pub mod fsm;
pub mod movement;
pub mod reactions;
pub mod roster;

pub use fsm::*;
pub use movement::*;
pub use reactions::*;
pub use roster::*;

use bevy::prelude::*;

use crate::bridge::{CueRecorder, PresentationCue};

/// Forward cues buffered during one combatant call as `PresentationCue` events.
pub(crate) fn flush_cues(entity: Entity, recorder: &mut CueRecorder, writer: &mut EventWriter<PresentationCue>) {
    for cue in recorder.drain() {
        writer.write(PresentationCue { entity, cue });
    }
}
