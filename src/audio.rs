//! Audio system using Web Audio API
//!
//! Every cue is a short sine tone - no external files needed!

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Tone gain at full volume
const TONE_GAIN: f32 = 0.15;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            ctx: None,
            muted: false,
        }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Create the context lazily; browsers only allow it after a user gesture
    fn context(&mut self) -> Option<&AudioContext> {
        if self.ctx.is_none() {
            self.ctx = AudioContext::new().ok();
            if self.ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
        }
        let ctx = self.ctx.as_ref()?;
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        Some(ctx)
    }

    /// Create an oscillator routed through a gain node
    fn create_osc(ctx: &AudioContext, freq: f32) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Play a sine tone at `frequency` Hz for `duration` seconds
    pub fn play_tone(&mut self, frequency: f32, duration: f32) {
        if self.muted {
            return;
        }
        let Some(ctx) = self.context() else { return };
        let Some((osc, gain)) = Self::create_osc(ctx, frequency) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value(TONE_GAIN);
        osc.start().ok();
        osc.stop_with_when(t + duration as f64).ok();
    }
}
