//! Demo player
//!
//! Taps near each upcoming beat with seeded jitter. Same seed, same run.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::game::{Engine, TapOutcome};
use super::tick::FrameInput;
use crate::audio::AudioSink;
use crate::platform::{ManualClock, TimeSource};

/// Seeded player that aims for the next beat
#[derive(Debug, Clone)]
pub struct AutoPlayer {
    rng: Pcg32,
    /// Maximum deviation (ms) from the aimed beat, either side
    jitter_ms: f64,
    /// Beat boundary the current or last plan aimed at
    aimed_at: Option<f64>,
    /// Planned tap time
    planned: Option<f64>,
}

impl AutoPlayer {
    /// A non-finite `jitter_ms` is treated as 0
    pub fn new(seed: u64, jitter_ms: f64) -> Self {
        let jitter_ms = if jitter_ms.is_finite() { jitter_ms.abs() } else { 0.0 };
        Self {
            rng: Pcg32::seed_from_u64(seed),
            jitter_ms,
            aimed_at: None,
            planned: None,
        }
    }

    /// Decide whether to tap on the frame at `now`
    pub fn wants_tap<S: AudioSink>(&mut self, engine: &Engine<S>, now: f64) -> bool {
        let state = engine.state();
        if state.is_game_over {
            return false;
        }
        if state.is_paused {
            // Tap to start
            self.planned = None;
            return true;
        }
        let Some(last_beat) = engine.last_beat() else {
            return false;
        };

        let target = match self.planned {
            Some(t) => t,
            None => {
                let interval = engine.beat_interval_ms();
                let mut beat = last_beat + interval;
                // Already tapped for this one (early tap, boundary not crossed yet)
                if let Some(prev) = self.aimed_at {
                    if beat - prev < interval / 2.0 {
                        beat += interval;
                    }
                }
                self.aimed_at = Some(beat);
                let t = beat + self.rng.random_range(-self.jitter_ms..=self.jitter_ms);
                self.planned = Some(t);
                t
            }
        };

        if now >= target {
            self.planned = None;
            true
        } else {
            false
        }
    }
}

/// Totals from a headless run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationReport {
    pub frames: u64,
    pub beats: u64,
    pub hits: u32,
    pub misses: u32,
}

/// Drive `engine` with fixed-rate frames until `frames` elapse or the run ends
///
/// The first frame runs at the clock's current time; the clock is advanced
/// by `frame_ms` after each frame.
pub fn simulate<S: AudioSink>(
    engine: &mut Engine<S>,
    player: &mut AutoPlayer,
    clock: &ManualClock,
    frame_ms: f64,
    frames: u64,
) -> SimulationReport {
    let mut report = SimulationReport::default();
    let mut input = FrameInput::default();

    for _ in 0..frames {
        let now = clock.now_ms();
        clock.advance(frame_ms);
        input.tap = player.wants_tap(engine, now);

        let frame = engine.frame(now, &input);
        input.clear();
        report.frames += 1;

        if frame.beat.is_some() {
            report.beats += 1;
        }
        if let Some(TapOutcome::Judged(j)) = frame.tap {
            if j.is_hit() {
                report.hits += 1;
            } else {
                report.misses += 1;
            }
        }
        if engine.state().is_game_over {
            break;
        }
    }

    report
}
