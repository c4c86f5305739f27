//! Web Audio beat cue
//!
//! Procedurally generated blip - no external files needed.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use super::AudioSink;
use crate::consts::{CUE_DURATION_S, CUE_FREQUENCY_HZ};

/// Plays the beat cue through a lazily created `AudioContext`
pub struct WebAudioSink {
    ctx: Option<AudioContext>,
}

impl Default for WebAudioSink {
    fn default() -> Self {
        Self::new()
    }
}

impl WebAudioSink {
    /// No context yet; browsers refuse one before a user gesture
    pub fn new() -> Self {
        Self { ctx: None }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(ctx: &AudioContext, freq: f32) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }
}

impl AudioSink for WebAudioSink {
    fn acquire(&mut self) {
        if self.ctx.is_some() {
            return;
        }
        // May fail outside a secure context
        match AudioContext::new() {
            Ok(ctx) => {
                log::info!("AudioContext created");
                self.ctx = Some(ctx);
            }
            Err(_) => log::warn!("Failed to create AudioContext - beat cue disabled"),
        }
    }

    fn play_beat_cue(&mut self) {
        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let Some((osc, gain)) = Self::create_osc(ctx, CUE_FREQUENCY_HZ) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(CUE_FREQUENCY_HZ, t).ok();
        gain.gain().set_value_at_time(1.0, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.00001, t + CUE_DURATION_S)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + CUE_DURATION_S).ok();
    }
}
