//! Per-frame input
//!
//! Commands collected between frames are applied together so that a tap and
//! a beat boundary landing in the same frame see one consistent tempo, and
//! the tap is judged against the clock as it stood before this frame's beat.

use super::game::{Engine, TapOutcome};
use super::scheduler::BeatTick;
use crate::audio::AudioSink;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Tap / confirm
    pub tap: bool,
    /// Pause toggle
    pub toggle_pause: bool,
    /// Mute toggle
    pub toggle_mute: bool,
    /// Start over
    pub reset: bool,
}

impl FrameInput {
    /// Clear one-shot commands after a frame has consumed them
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        !(self.tap || self.toggle_pause || self.toggle_mute || self.reset)
    }
}

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub tap: Option<TapOutcome>,
    pub beat: Option<BeatTick>,
}

impl<S: AudioSink> Engine<S> {
    /// Apply a frame's commands, then advance the beat to `timestamp`
    ///
    /// Order: reset, mute, pause, tap, beat.
    pub fn frame(&mut self, timestamp: f64, input: &FrameInput) -> FrameReport {
        if input.reset {
            self.reset(timestamp);
        }
        if input.toggle_mute {
            self.toggle_mute();
        }
        if input.toggle_pause {
            self.toggle_pause();
        }
        let tap = input.tap.then(|| self.on_tap(timestamp));
        let beat = self.on_frame(timestamp);

        FrameReport { tap, beat }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tap::Verdict;

    #[test]
    fn test_tap_judged_before_beat_reanchors() {
        let mut engine = Engine::silent();
        engine.frame(0.0, &FrameInput { tap: true, ..Default::default() });
        engine.frame(16.0, &FrameInput::default());
        assert_eq!(engine.last_beat(), Some(0.0));

        // Frame lands 20ms past the boundary with a tap in it
        let report = engine.frame(620.0, &FrameInput { tap: true, ..Default::default() });

        let Some(TapOutcome::Judged(j)) = report.tap else {
            panic!("tap should be judged, got {:?}", report.tap);
        };
        // Judged against the 0ms anchor: 20ms late for the 600ms beat
        assert_eq!(j.verdict, Verdict::Hit);
        assert_eq!(j.error_ms, 20.0);
        assert_eq!(j.offset_ms, 20.0);

        assert!(report.beat.is_some());
        assert_eq!(engine.last_beat(), Some(620.0));
    }

    #[test]
    fn test_first_frame_start_anchors_same_frame() {
        let mut engine = Engine::silent();
        let report = engine.frame(100.0, &FrameInput { tap: true, ..Default::default() });
        assert_eq!(report.tap, Some(TapOutcome::Started));
        assert_eq!(report.beat, None);
        assert_eq!(engine.last_beat(), Some(100.0));
    }

    #[test]
    fn test_reset_then_tap_starts_fresh_run() {
        let mut engine = Engine::silent();
        engine.frame(0.0, &FrameInput { tap: true, ..Default::default() });
        engine.frame(0.0, &FrameInput::default());
        engine.frame(300.0, &FrameInput { tap: true, ..Default::default() });
        assert_eq!(engine.state().lives, 2);

        let input = FrameInput {
            reset: true,
            tap: true,
            ..Default::default()
        };
        let report = engine.frame(1000.0, &input);
        assert_eq!(report.tap, Some(TapOutcome::Started));
        assert_eq!(engine.state().lives, 3);
        assert!(!engine.state().is_paused);
    }

    #[test]
    fn test_pause_frame_emits_no_beat() {
        let mut engine = Engine::silent();
        engine.frame(0.0, &FrameInput { tap: true, ..Default::default() });
        let input = FrameInput {
            toggle_pause: true,
            ..Default::default()
        };
        let report = engine.frame(5000.0, &input);
        assert_eq!(report, FrameReport::default());
        assert!(engine.state().is_paused);
    }

    #[test]
    fn test_clear() {
        let mut input = FrameInput {
            tap: true,
            toggle_mute: true,
            ..Default::default()
        };
        assert!(!input.is_empty());
        input.clear();
        assert!(input.is_empty());
    }
}
