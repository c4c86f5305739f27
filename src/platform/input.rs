//! Keyboard mapping
//!
//! Keys arrive as DOM `KeyboardEvent.key` strings.

use crate::audio::AudioSink;
use crate::engine::{Engine, TapOutcome};

/// A player command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Tap / confirm
    Tap,
    TogglePause,
    ToggleMute,
    Reset,
}

impl Command {
    /// Map a key to a command; the confirm keys are Space and Enter
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "Spacebar" | "Enter" => Some(Command::Tap),
            "Escape" | "p" | "P" => Some(Command::TogglePause),
            "m" | "M" => Some(Command::ToggleMute),
            "r" | "R" => Some(Command::Reset),
            _ => None,
        }
    }

    /// Run the command against the engine at `now`
    pub fn dispatch<S: AudioSink>(self, engine: &mut Engine<S>, now: f64) -> Option<TapOutcome> {
        match self {
            Command::Tap => return Some(engine.on_tap(now)),
            Command::TogglePause => engine.toggle_pause(),
            Command::ToggleMute => engine.toggle_mute(),
            Command::Reset => engine.reset(now),
        }
        None
    }
}
