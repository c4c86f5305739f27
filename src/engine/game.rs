//! The timing and progression engine
//!
//! Owns the progression state and the beat scheduler. The driver feeds it
//! frame timestamps and discrete commands; presentation reads snapshots.

use serde::Serialize;

use super::scheduler::{BeatScheduler, BeatTick};
use super::state::{GamePhase, ProgressionState};
use super::tap::{self, Judgment};
use crate::audio::{AudioSink, NullSink};
use crate::tuning::{Tuning, TuningError};

/// What a tap did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapOutcome {
    /// Tap unpaused the run; nothing scored
    Started,
    /// Tap after game over reset the run; still paused
    Restarted,
    /// Running but the clock has not been anchored by a frame yet
    Ignored,
    /// Tap was judged against the beat
    Judged(Judgment),
}

/// Read-only view handed to presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub state: ProgressionState,
    pub game_phase: GamePhase,
    /// Fraction of the current beat elapsed (unclamped)
    pub phase: f64,
    pub beat_interval_ms: f64,
    pub timing_window_ms: f64,
}

/// Beat scheduling, tap judgment and mode transitions for one player
pub struct Engine<S: AudioSink = NullSink> {
    tuning: Tuning,
    state: ProgressionState,
    scheduler: BeatScheduler,
    audio: S,
    audio_acquired: bool,
}

impl Engine {
    /// Default tuning, no audio
    pub fn silent() -> Self {
        Self::with_valid_tuning(Tuning::default(), NullSink)
    }
}

impl<S: AudioSink> Engine<S> {
    /// New engine: paused, muted, clock unanchored
    ///
    /// Fails if `tuning` does not pass [`Tuning::validate`].
    pub fn new(tuning: Tuning, audio: S) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::with_valid_tuning(tuning, audio))
    }

    fn with_valid_tuning(tuning: Tuning, audio: S) -> Self {
        Self {
            state: ProgressionState::new(&tuning),
            tuning,
            scheduler: BeatScheduler::default(),
            audio,
            audio_acquired: false,
        }
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn audio(&self) -> &S {
        &self.audio
    }

    /// Timestamp of the last beat boundary, if the clock is anchored
    pub fn last_beat(&self) -> Option<f64> {
        self.scheduler.clock().last_beat()
    }

    /// Beat ticks emitted so far
    pub fn beats(&self) -> u64 {
        self.scheduler.beats()
    }

    pub fn beat_interval_ms(&self) -> f64 {
        self.state.beat_interval_ms()
    }

    pub fn timing_window_ms(&self) -> f64 {
        self.state.timing_window_ms(&self.tuning)
    }

    /// Beat progress at `now`; 0 while paused
    pub fn phase(&self, now: f64) -> f64 {
        if self.state.is_paused {
            return 0.0;
        }
        self.scheduler
            .clock()
            .phase(now, self.beat_interval_ms())
    }

    pub fn snapshot(&self, now: f64) -> EngineSnapshot {
        EngineSnapshot {
            state: self.state.clone(),
            game_phase: self.state.phase(),
            phase: self.phase(now),
            beat_interval_ms: self.beat_interval_ms(),
            timing_window_ms: self.timing_window_ms(),
        }
    }

    /// Whether the driver should keep its per-frame callback alive
    pub fn wants_frames(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Advance beat bookkeeping to `timestamp`; plays the cue on a crossed beat
    pub fn on_frame(&mut self, timestamp: f64) -> Option<BeatTick> {
        if self.state.is_paused {
            return None;
        }

        let tick = self.scheduler.tick(timestamp, self.beat_interval_ms())?;
        log::debug!(
            "Beat at {:.1}ms ({:.1}ms late, {} bpm)",
            tick.timestamp,
            tick.late_by_ms,
            self.state.bpm
        );
        if !self.state.is_muted {
            self.audio.play_beat_cue();
        }
        Some(tick)
    }

    /// Handle a tap at `now`
    pub fn on_tap(&mut self, now: f64) -> TapOutcome {
        if self.state.is_game_over {
            self.reset(now);
            return TapOutcome::Restarted;
        }

        if self.state.is_paused {
            self.resume();
            return TapOutcome::Started;
        }

        let Some(since) = self.scheduler.clock().since_last_beat(now) else {
            return TapOutcome::Ignored;
        };

        let judgment = tap::judge(since, self.beat_interval_ms(), self.timing_window_ms());
        let level_before = self.state.level;
        let game_over = tap::apply(&mut self.state, &judgment, &self.tuning);

        log::debug!(
            "Tap {:?}: offset {:+.1}ms, score {}, combo {}",
            judgment.verdict,
            judgment.offset_ms,
            self.state.score,
            self.state.combo
        );
        if self.state.level > level_before {
            log::info!("Level {} ({} bpm)", self.state.level, self.state.bpm);
        }
        if game_over {
            self.scheduler.stop();
            log::info!(
                "Game over: score {}, rung {}",
                self.state.score,
                self.state.rung
            );
        }

        TapOutcome::Judged(judgment)
    }

    /// Pause or resume; ignored after game over
    ///
    /// Pausing drops the beat anchor, so whichever command resumes the run
    /// re-anchors on its first frame instead of firing a catch-up beat.
    pub fn toggle_pause(&mut self) {
        if self.state.is_game_over {
            return;
        }
        if self.state.is_paused {
            self.resume();
        } else {
            self.state.is_paused = true;
            self.scheduler.stop();
            self.scheduler.disarm();
            log::info!("Paused");
        }
    }

    /// Flip mute; the first call acquires the audio output
    pub fn toggle_mute(&mut self) {
        if !self.audio_acquired {
            self.audio.acquire();
            self.audio_acquired = true;
        }
        self.state.is_muted = !self.state.is_muted;
    }

    /// Start over, keeping the mute preference. The run waits for a tap and
    /// keeps the beat grid anchored at `now`.
    pub fn reset(&mut self, now: f64) {
        let is_muted = self.state.is_muted;
        self.state = ProgressionState {
            is_muted,
            ..ProgressionState::new(&self.tuning)
        };
        self.scheduler.stop();
        self.scheduler.anchor(now);
        log::info!("Reset");
    }

    fn resume(&mut self) {
        self.state.is_paused = false;
        self.scheduler.start();
        log::info!("Running at {} bpm", self.state.bpm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TapResult;
    use crate::engine::tap::Verdict;

    /// Counts cues instead of playing them
    #[derive(Default)]
    struct CountingSink {
        acquired: u32,
        cues: u32,
    }

    impl AudioSink for CountingSink {
        fn acquire(&mut self) {
            self.acquired += 1;
        }

        fn play_beat_cue(&mut self) {
            self.cues += 1;
        }
    }

    /// Running engine with its first beat anchored at t=0
    fn running_engine() -> Engine {
        let mut engine = Engine::silent();
        assert_eq!(engine.on_tap(0.0), TapOutcome::Started);
        engine.on_frame(0.0);
        assert_eq!(engine.last_beat(), Some(0.0));
        engine
    }

    fn judged(outcome: TapOutcome) -> Judgment {
        match outcome {
            TapOutcome::Judged(j) => j,
            other => panic!("expected a judgment, got {other:?}"),
        }
    }

    #[test]
    fn test_hit_on_window_edge() {
        let mut engine = running_engine();
        assert_eq!(engine.beat_interval_ms(), 600.0);
        assert_eq!(engine.timing_window_ms(), 180.0);

        let j = judged(engine.on_tap(90.0));
        assert_eq!(j.verdict, Verdict::Hit);
        assert_eq!(j.error_ms, 90.0);

        let s = engine.state();
        assert_eq!(s.score, 10);
        assert_eq!(s.combo, 2);
        assert_eq!(s.rung, 1);
        assert_eq!(s.last_tap_result, TapResult::Perfect);
    }

    #[test]
    fn test_miss_just_past_window() {
        let mut engine = running_engine();

        let j = judged(engine.on_tap(91.0));
        assert_eq!(j.verdict, Verdict::Miss);

        let s = engine.state();
        assert_eq!(s.combo, 1);
        assert_eq!(s.lives, 2);
        assert_eq!(s.rung, 0);
        assert_eq!(s.score, 0);
        assert_eq!(s.last_tap_result, TapResult::Miss);
    }

    #[test]
    fn test_last_life_ends_run_and_pauses() {
        let mut engine = running_engine();
        engine.on_tap(300.0);
        engine.on_tap(300.0);
        assert_eq!(engine.state().lives, 1);
        assert!(!engine.state().is_game_over);

        engine.on_tap(300.0);
        let s = engine.state();
        assert_eq!(s.lives, 0);
        assert!(s.is_game_over);
        assert!(s.is_paused);
        assert_eq!(s.phase(), GamePhase::GameOver);
        assert!(!engine.wants_frames());
    }

    #[test]
    fn test_tap_while_paused_starts_without_scoring() {
        let mut engine = Engine::silent();
        let before = engine.state().clone();

        assert_eq!(engine.on_tap(500.0), TapOutcome::Started);
        let s = engine.state();
        assert!(!s.is_paused);
        assert_eq!(s.score, before.score);
        assert_eq!(s.rung, before.rung);
        assert_eq!(s.lives, before.lives);
        assert!(engine.wants_frames());
    }

    #[test]
    fn test_tap_before_first_frame_is_ignored() {
        let mut engine = Engine::silent();
        engine.on_tap(0.0);
        assert_eq!(engine.on_tap(10.0), TapOutcome::Ignored);
        assert_eq!(engine.state().lives, 3);
    }

    #[test]
    fn test_level_up_raises_tempo_and_tightens_window() {
        let mut engine = running_engine();
        let window_level_one = engine.timing_window_ms();

        // Nine hits, one per beat, right on the boundary
        let mut t = 0.0;
        for _ in 0..9 {
            t += engine.beat_interval_ms();
            assert!(engine.on_frame(t).is_some());
            assert!(judged(engine.on_tap(t)).is_hit());
        }
        assert_eq!(engine.state().rung, 9);
        assert_eq!(engine.state().level, 1);
        assert_eq!(engine.state().bpm, 100.0);

        t += engine.beat_interval_ms();
        engine.on_frame(t);
        assert!(judged(engine.on_tap(t)).is_hit());

        let s = engine.state();
        assert_eq!(s.rung, 10);
        assert_eq!(s.level, 2);
        assert_eq!(s.bpm, 110.0);
        let expected = 60_000.0 / 110.0 * 0.3 * 0.95;
        assert!((engine.timing_window_ms() - expected).abs() < 1e-9);
        assert!(engine.timing_window_ms() < window_level_one);
    }

    #[test]
    fn test_combo_scales_score() {
        let mut engine = running_engine();
        let mut t = 0.0;
        for _ in 0..3 {
            t += 600.0;
            engine.on_frame(t);
            engine.on_tap(t);
        }
        // 10 + 20 + 30
        assert_eq!(engine.state().score, 60);
        assert_eq!(engine.state().combo, 4);

        engine.on_tap(t + 300.0);
        assert_eq!(engine.state().combo, 1);
        assert_eq!(engine.state().rung, 2);
    }

    #[test]
    fn test_phase_is_a_pure_read() {
        let engine = running_engine();
        let a = engine.phase(150.0);
        let b = engine.phase(150.0);
        assert_eq!(a, b);
        assert_eq!(a, 0.25);
        assert_eq!(engine.last_beat(), Some(0.0));
    }

    #[test]
    fn test_phase_zero_while_paused() {
        let mut engine = running_engine();
        engine.toggle_pause();
        assert_eq!(engine.phase(450.0), 0.0);
    }

    #[test]
    fn test_reset_restores_initial_state_but_keeps_mute() {
        let mut engine = running_engine();
        engine.toggle_mute();
        assert!(!engine.state().is_muted);
        engine.on_tap(0.0);
        engine.on_tap(300.0);

        engine.reset(1000.0);

        let expected = ProgressionState {
            is_muted: false,
            ..ProgressionState::new(engine.tuning())
        };
        assert_eq!(engine.state(), &expected);
        assert_eq!(engine.last_beat(), Some(1000.0));
        assert!(!engine.wants_frames());
    }

    #[test]
    fn test_start_after_reset_keeps_reset_beat_grid() {
        let mut engine = running_engine();
        engine.reset(1000.0);

        assert_eq!(engine.on_tap(1100.0), TapOutcome::Started);
        assert!(engine.on_frame(1116.0).is_none());
        assert_eq!(engine.last_beat(), Some(1000.0));

        // Ten ms before the first beat after the reset anchor
        let j = judged(engine.on_tap(1590.0));
        assert_eq!(j.verdict, Verdict::Hit);
        assert_eq!(j.error_ms, 10.0);
        assert_eq!(j.offset_ms, -10.0);

        let tick = engine.on_frame(1600.0).unwrap();
        assert_eq!(tick.late_by_ms, 0.0);
    }

    #[test]
    fn test_tap_resume_after_pause_reanchors() {
        let mut engine = running_engine();
        engine.toggle_pause();
        assert_eq!(engine.last_beat(), None);

        assert_eq!(engine.on_tap(5000.0), TapOutcome::Started);
        assert!(engine.on_frame(5000.0).is_none());
        assert_eq!(engine.last_beat(), Some(5000.0));
    }

    #[test]
    fn test_rejects_invalid_tuning() {
        let tuning = Tuning {
            rungs_per_level: 0,
            ..Default::default()
        };
        assert!(matches!(
            Engine::new(tuning, NullSink),
            Err(TuningError::NoRungsPerLevel)
        ));

        let tuning = Tuning {
            bpm_per_level: 0.0,
            window_shrink_factor: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            Engine::new(tuning, NullSink),
            Err(TuningError::ShrinkFactor(_))
        ));
    }

    #[test]
    fn test_game_over_tap_resets_then_next_tap_starts() {
        let mut engine = running_engine();
        for _ in 0..3 {
            engine.on_tap(300.0);
        }
        assert!(engine.state().is_game_over);

        assert_eq!(engine.on_tap(400.0), TapOutcome::Restarted);
        assert!(!engine.state().is_game_over);
        assert!(engine.state().is_paused);
        assert_eq!(engine.state().lives, 3);

        assert_eq!(engine.on_tap(500.0), TapOutcome::Started);
        assert_eq!(engine.state().phase(), GamePhase::Running);
    }

    #[test]
    fn test_toggle_pause_ignored_after_game_over() {
        let mut engine = running_engine();
        for _ in 0..3 {
            engine.on_tap(300.0);
        }
        engine.toggle_pause();
        assert!(engine.state().is_paused);
        assert!(engine.state().is_game_over);
    }

    #[test]
    fn test_unpause_does_not_fast_forward() {
        let mut engine = Engine::new(Tuning::default(), CountingSink::default()).unwrap();
        engine.toggle_mute();
        engine.on_tap(0.0);
        engine.on_frame(0.0);
        assert!(engine.on_frame(600.0).is_some());
        assert_eq!(engine.audio().cues, 1);

        engine.toggle_pause();
        assert!(engine.on_frame(1200.0).is_none());

        // Ten seconds later
        engine.toggle_pause();
        assert!(engine.on_frame(11_200.0).is_none());
        assert_eq!(engine.last_beat(), Some(11_200.0));
        assert_eq!(engine.audio().cues, 1);
        assert!(engine.on_frame(11_800.0).is_some());
        assert_eq!(engine.audio().cues, 2);
    }

    #[test]
    fn test_muted_engine_never_plays_cues() {
        let mut engine = Engine::new(Tuning::default(), CountingSink::default()).unwrap();
        engine.on_tap(0.0);
        engine.on_frame(0.0);
        for i in 1..=5 {
            assert!(engine.on_frame(i as f64 * 600.0).is_some());
        }
        assert_eq!(engine.audio().cues, 0);
        assert_eq!(engine.audio().acquired, 0);
        assert_eq!(engine.beats(), 5);
    }

    #[test]
    fn test_audio_acquired_once() {
        let mut engine = Engine::new(Tuning::default(), CountingSink::default()).unwrap();
        engine.toggle_mute();
        engine.toggle_mute();
        engine.toggle_mute();
        assert_eq!(engine.audio().acquired, 1);
        assert!(!engine.state().is_muted);
    }

    #[test]
    fn test_snapshot_reports_derived_values() {
        let engine = running_engine();
        let snap = engine.snapshot(300.0);
        assert_eq!(snap.game_phase, GamePhase::Running);
        assert_eq!(snap.phase, 0.5);
        assert_eq!(snap.beat_interval_ms, 600.0);
        assert_eq!(snap.timing_window_ms, 180.0);
        assert_eq!(&snap.state, engine.state());
    }

    #[test]
    fn test_custom_tuning() {
        let tuning = Tuning {
            initial_bpm: 120.0,
            initial_lives: 1,
            ..Default::default()
        };
        let mut engine = Engine::new(tuning, NullSink).unwrap();
        engine.on_tap(0.0);
        engine.on_frame(0.0);
        assert_eq!(engine.beat_interval_ms(), 500.0);

        engine.on_tap(250.0);
        assert!(engine.state().is_game_over);
    }
}
