//! Tap judgment and its effect on progression

use super::state::{ProgressionState, TapResult};
use crate::tuning::Tuning;

/// Hit or miss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Hit,
    Miss,
}

/// Outcome of judging one tap against the beat grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Judgment {
    pub verdict: Verdict,
    /// Distance (ms) to the nearer beat boundary
    pub error_ms: f64,
    /// Signed distance to the nearer boundary: negative = early, positive = late
    pub offset_ms: f64,
}

impl Judgment {
    pub fn is_hit(&self) -> bool {
        self.verdict == Verdict::Hit
    }

    /// Feedback label for presentation
    pub fn result(&self) -> TapResult {
        match self.verdict {
            Verdict::Hit => TapResult::Perfect,
            Verdict::Miss => TapResult::Miss,
        }
    }
}

/// Judge a tap `since_last_beat_ms` after the previous boundary
///
/// The error is measured to whichever boundary is nearer, so a tap just
/// before the upcoming beat counts the same as one just after the last.
/// A tap exactly half a window away is still a hit.
///
/// Time is folded onto the beat grid first: a tap landing after a boundary
/// the scheduler has not observed yet is measured from that boundary.
pub fn judge(since_last_beat_ms: f64, beat_interval_ms: f64, timing_window_ms: f64) -> Judgment {
    let into_beat = since_last_beat_ms.rem_euclid(beat_interval_ms);
    let to_next_beat = beat_interval_ms - into_beat;
    let (error_ms, offset_ms) = if into_beat <= to_next_beat {
        (into_beat, into_beat)
    } else {
        (to_next_beat, -to_next_beat)
    };

    let verdict = if error_ms <= timing_window_ms / 2.0 {
        Verdict::Hit
    } else {
        Verdict::Miss
    };

    Judgment {
        verdict,
        error_ms,
        offset_ms,
    }
}

/// Apply a judged tap to the state. Returns true if the run just ended.
pub(crate) fn apply(state: &mut ProgressionState, judgment: &Judgment, tuning: &Tuning) -> bool {
    match judgment.verdict {
        Verdict::Hit => {
            state.score += tuning.points_per_hit * state.combo as u64;
            state.combo += 1;
            state.set_rung(state.rung + 1, tuning);
            state.last_tap_result = TapResult::Perfect;
            false
        }
        Verdict::Miss => {
            state.combo = 1;
            state.lives = state.lives.saturating_sub(1);
            state.set_rung(state.rung.saturating_sub(1), tuning);
            state.last_tap_result = TapResult::Miss;
            if state.lives == 0 {
                state.is_game_over = true;
                state.is_paused = true;
                return true;
            }
            false
        }
    }
}
