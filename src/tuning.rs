//! Game balance
//!
//! Defaults come from [`crate::consts`]; a page or embedder may supply a JSON
//! override. Every field is optional in JSON and falls back to its default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::beat_interval_ms;
use crate::consts::*;

/// Errors produced while loading a tuning override
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("Failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("initial_bpm must be positive, got {0}")]
    NonPositiveBpm(f64),

    #[error("bpm_per_level must not be negative, got {0}")]
    NegativeBpmStep(f64),

    #[error("initial_lives must be at least 1")]
    NoLives,

    #[error("rungs_per_level must be at least 1")]
    NoRungsPerLevel,

    #[error("base_window_fraction must be in (0, 1], got {0}")]
    WindowFraction(f64),

    #[error("window_shrink_factor must be in (0, 1), got {0}")]
    ShrinkFactor(f64),
}

/// Balance constants for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Tempo at level 1
    pub initial_bpm: f64,
    /// Tempo added per level
    pub bpm_per_level: f64,
    /// Lives at the start of a run
    pub initial_lives: u32,
    /// Rungs climbed per level
    pub rungs_per_level: u32,
    /// Level 1 window as a fraction of the beat interval
    pub base_window_fraction: f64,
    /// Geometric window shrink per level
    pub window_shrink_factor: f64,
    /// Base points per hit
    pub points_per_hit: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_bpm: INITIAL_BPM,
            bpm_per_level: BPM_PER_LEVEL,
            initial_lives: INITIAL_LIVES,
            rungs_per_level: RUNGS_PER_LEVEL,
            base_window_fraction: BASE_WINDOW_FRACTION,
            window_shrink_factor: WINDOW_SHRINK_FACTOR,
            points_per_hit: POINTS_PER_HIT,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON override
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would break the progression invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.initial_bpm > 0.0) {
            return Err(TuningError::NonPositiveBpm(self.initial_bpm));
        }
        if !(self.bpm_per_level >= 0.0) {
            return Err(TuningError::NegativeBpmStep(self.bpm_per_level));
        }
        if self.initial_lives == 0 {
            return Err(TuningError::NoLives);
        }
        if self.rungs_per_level == 0 {
            return Err(TuningError::NoRungsPerLevel);
        }
        if !(self.base_window_fraction > 0.0 && self.base_window_fraction <= 1.0) {
            return Err(TuningError::WindowFraction(self.base_window_fraction));
        }
        if !(self.window_shrink_factor > 0.0 && self.window_shrink_factor < 1.0) {
            return Err(TuningError::ShrinkFactor(self.window_shrink_factor));
        }
        Ok(())
    }

    /// Level reached at a given rung (1-based)
    pub fn level_for_rung(&self, rung: u32) -> u32 {
        rung / self.rungs_per_level + 1
    }

    /// Tempo for a level
    pub fn bpm_for_level(&self, level: u32) -> f64 {
        self.initial_bpm + level.saturating_sub(1) as f64 * self.bpm_per_level
    }

    /// Full acceptance window (ms) for a level, centered on the beat
    pub fn timing_window_ms(&self, level: u32) -> f64 {
        let shrink = self
            .window_shrink_factor
            .powi(level.saturating_sub(1) as i32);
        beat_interval_ms(self.bpm_for_level(level)) * self.base_window_fraction * shrink
    }
}
