//! Tap Ladder - A rhythm reflex game
//!
//! Core modules:
//! - `engine`: Beat scheduling, tap judgment and progression state
//! - `audio`: Beat cue sinks (Web Audio in the browser, silent elsewhere)
//! - `platform`: Time sources, key mapping and the per-frame callback handle
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod engine;
pub mod platform;
pub mod tuning;

pub use audio::{AudioSink, NullSink};
pub use engine::{Engine, EngineSnapshot, FrameInput, GamePhase, ProgressionState, TapResult};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Tempo at level 1
    pub const INITIAL_BPM: f64 = 100.0;
    /// Tempo added per level gained
    pub const BPM_PER_LEVEL: f64 = 10.0;
    /// Lives at the start of a run
    pub const INITIAL_LIVES: u32 = 3;
    /// Rungs climbed per level
    pub const RUNGS_PER_LEVEL: u32 = 10;
    /// Full acceptance window at level 1, as a fraction of the beat interval
    pub const BASE_WINDOW_FRACTION: f64 = 0.3;
    /// Window multiplier applied once per level (5% tighter each level)
    pub const WINDOW_SHRINK_FACTOR: f64 = 0.95;
    /// Base points for a hit, multiplied by the combo
    pub const POINTS_PER_HIT: u64 = 10;

    /// Beat cue pitch (A4)
    pub const CUE_FREQUENCY_HZ: f32 = 440.0;
    /// Beat cue length in seconds
    pub const CUE_DURATION_S: f64 = 0.05;
}

/// Milliseconds per beat at the given tempo
#[inline]
pub fn beat_interval_ms(bpm: f64) -> f64 {
    60_000.0 / bpm
}
