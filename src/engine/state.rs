//! Progression state
//!
//! The single record presentation reads after every transition.

use serde::{Deserialize, Serialize};

use crate::beat_interval_ms;
use crate::tuning::Tuning;

/// Feedback for the most recent tap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TapResult {
    /// Tap landed inside the timing window
    Perfect,
    /// Reserved grade; the judge never produces it
    Good,
    /// Tap landed outside the timing window
    Miss,
    /// No tap judged since the last reset
    #[default]
    None,
}

/// Coarse engine mode, derived from the state flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a tap to start (or resume) the run
    Paused,
    /// Beat is running and taps are judged
    Running,
    /// Out of lives; next tap resets
    GameOver,
}

/// Score, lives and ladder position for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub score: u64,
    /// Score multiplier, never below 1
    pub combo: u32,
    pub level: u32,
    pub lives: u32,
    /// Ladder position
    pub rung: u32,
    pub bpm: f64,
    pub is_paused: bool,
    pub is_game_over: bool,
    pub is_muted: bool,
    pub last_tap_result: TapResult,
}

impl ProgressionState {
    /// Fresh run: paused, muted, nothing scored
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            combo: 1,
            level: 1,
            lives: tuning.initial_lives,
            rung: 0,
            bpm: tuning.bpm_for_level(1),
            is_paused: true,
            is_game_over: false,
            is_muted: true,
            last_tap_result: TapResult::None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.is_game_over {
            GamePhase::GameOver
        } else if self.is_paused {
            GamePhase::Paused
        } else {
            GamePhase::Running
        }
    }

    /// Milliseconds per beat at the current tempo
    pub fn beat_interval_ms(&self) -> f64 {
        beat_interval_ms(self.bpm)
    }

    /// Full acceptance window (ms) at the current level
    pub fn timing_window_ms(&self, tuning: &Tuning) -> f64 {
        tuning.timing_window_ms(self.level)
    }

    /// Move to a rung, keeping level and tempo in lockstep with it
    pub(crate) fn set_rung(&mut self, rung: u32, tuning: &Tuning) {
        self.rung = rung;
        self.level = tuning.level_for_rung(rung);
        self.bpm = tuning.bpm_for_level(self.level);
    }
}
