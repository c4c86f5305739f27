//! Beat cue output
//!
//! The engine only ever fires cues through an injected [`AudioSink`]; it never
//! touches audio hardware itself. Cues are fire-and-forget: a sink that cannot
//! play simply stays silent.

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioSink;

/// Something that can play the beat cue
pub trait AudioSink {
    /// Acquire the output device. Called once, on the first mute toggle,
    /// which is also the first point a browser allows audio to start.
    fn acquire(&mut self) {}

    /// Play one beat cue. Must not block and must not fail loudly.
    fn play_beat_cue(&mut self);
}

/// Sink that never makes a sound
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play_beat_cue(&mut self) {}
}

/// Logs cues instead of playing them (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn acquire(&mut self) {
        log::info!("Audio output acquired (log only)");
    }

    fn play_beat_cue(&mut self) {
        log::trace!("beat cue");
    }
}
