//! Beat clock: where the last beat boundary fell

/// Timestamp (ms) of the most recently crossed beat boundary
///
/// `None` means the clock is disarmed and the next frame re-anchors it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BeatClock {
    last_beat: Option<f64>,
}

impl BeatClock {
    pub fn last_beat(&self) -> Option<f64> {
        self.last_beat
    }

    pub fn is_anchored(&self) -> bool {
        self.last_beat.is_some()
    }

    /// Record a beat boundary at `timestamp`
    pub fn anchor(&mut self, timestamp: f64) {
        self.last_beat = Some(timestamp);
    }

    /// Forget the anchor so stale time is never measured against
    pub fn disarm(&mut self) {
        self.last_beat = None;
    }

    /// Time since the last beat, if anchored
    pub fn since_last_beat(&self, now: f64) -> Option<f64> {
        self.last_beat.map(|beat| now - beat)
    }

    /// Fraction of the current beat elapsed at `now`
    ///
    /// Not wrapped: a caller sampling past a boundary the scheduler has not
    /// crossed yet sees a value above 1.
    pub fn phase(&self, now: f64, beat_interval_ms: f64) -> f64 {
        self.since_last_beat(now)
            .map(|since| since / beat_interval_ms)
            .unwrap_or(0.0)
    }
}
