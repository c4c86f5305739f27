//! Beat scheduler
//!
//! Fed one timestamp per display refresh. Crossing a boundary re-anchors the
//! clock at the frame time and yields a [`BeatTick`] for the audio cue.

use super::clock::BeatClock;

/// A crossed beat boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatTick {
    /// Frame time the boundary was observed at (the new anchor)
    pub timestamp: f64,
    /// How far past the ideal boundary the frame landed
    pub late_by_ms: f64,
}

/// Keeps the beat clock aligned with wall-clock time while running
#[derive(Debug, Clone, Default)]
pub struct BeatScheduler {
    clock: BeatClock,
    running: bool,
    beats: u64,
}

impl BeatScheduler {
    pub fn clock(&self) -> &BeatClock {
        &self.clock
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Beat ticks emitted since construction
    pub fn beats(&self) -> u64 {
        self.beats
    }

    /// Begin scheduling from the current anchor; an unanchored clock is
    /// anchored by the next tick
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Suspend scheduling; ticks are ignored until `start`
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Anchor the clock directly (used on reset)
    pub fn anchor(&mut self, timestamp: f64) {
        self.clock.anchor(timestamp);
    }

    /// Drop the anchor so the next tick after `start` re-anchors
    pub fn disarm(&mut self) {
        self.clock.disarm();
    }

    /// Process one frame
    ///
    /// `beat_interval_ms` is taken fresh on every call since tempo changes
    /// between levels.
    pub fn tick(&mut self, timestamp: f64, beat_interval_ms: f64) -> Option<BeatTick> {
        if !self.running {
            return None;
        }

        let Some(since) = self.clock.since_last_beat(timestamp) else {
            self.clock.anchor(timestamp);
            return None;
        };

        if since < beat_interval_ms {
            return None;
        }

        self.clock.anchor(timestamp);
        self.beats += 1;
        Some(BeatTick {
            timestamp,
            late_by_ms: since - beat_interval_ms,
        })
    }
}
