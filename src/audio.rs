//! Audio sink using the Web Audio API
//!
//! Every cue is synthesized with oscillators, so there are no assets that
//! could fail to load. Anything that does go wrong is swallowed.

use std::collections::HashSet;

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::{AudioSink, cues};

/// Web Audio implementation of [`AudioSink`]
pub struct AudioManager {
    ctx: Option<AudioContext>,
    sfx_gain: f32,
    music_gain: f32,
    /// Looping battle drone, if playing
    music: Option<(OscillatorNode, GainNode)>,
    /// Unknown cue keys already reported
    warned: HashSet<String>,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            sfx_gain: settings.sfx_gain(),
            music_gain: settings.music_gain(),
            music: None,
            warned: HashSet::new(),
        }
    }

    fn stop_music(&mut self) {
        if let Some((osc, _)) = self.music.take() {
            osc.stop_with_when(0.0).ok();
        }
    }

    fn live_context(&self) -> Option<&AudioContext> {
        let ctx = self.ctx.as_ref()?;
        // Browsers suspend the context until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        Some(ctx)
    }

    fn create_osc(
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Cannon report - short square bark dropping in pitch
    fn play_fire(ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = Self::create_osc(ctx, 220.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.12)
            .ok();
        osc.frequency().set_value_at_time(220.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(70.0, t + 0.12)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Explosion - low rumble plus crackle
    fn play_explosion(ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = Self::create_osc(ctx, 90.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.5)
                .ok();
            osc.frequency().set_value_at_time(90.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(25.0, t + 0.5)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.55).ok();
        }

        if let Some((osc, gain)) = Self::create_osc(ctx, 1200.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.1, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.frequency().set_value_at_time(1200.0, t).ok();
            osc.frequency().set_value_at_time(400.0, t + 0.03).ok();
            osc.frequency().set_value_at_time(900.0, t + 0.06).ok();
            osc.frequency().set_value_at_time(200.0, t + 0.1).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.18).ok();
        }
    }

    /// Ricochet - metallic ping sliding up
    fn play_ricochet(ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = Self::create_osc(ctx, 1800.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.25)
            .ok();
        osc.frequency().set_value_at_time(1800.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(3200.0, t + 0.2)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.3).ok();
    }

    /// Dash - engine whoosh
    fn play_dash(ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = Self::create_osc(ctx, 80.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.3)
            .ok();
        osc.frequency().set_value_at_time(80.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(400.0, t + 0.25)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.3).ok();
    }

    fn start_music(&mut self, vol: f32) {
        self.stop_music();
        let Some(ctx) = self.live_context() else {
            return;
        };
        let Some((osc, gain)) = Self::create_osc(ctx, 55.0, OscillatorType::Triangle) else {
            return;
        };
        gain.gain().set_value(vol * 0.05);
        osc.start().ok();
        self.music = Some((osc, gain));
    }
}

impl AudioSink for AudioManager {
    /// Resume audio context (required after user gesture)
    fn resume(&mut self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    fn set_volumes(&mut self, sfx: f32, music: f32) {
        self.sfx_gain = sfx;
        self.music_gain = music;
        if let Some((_, gain)) = &self.music {
            gain.gain().set_value(music * 0.05);
        }
    }

    fn play_cue(&mut self, key: &str, looped: bool, volume: f32) {
        if looped {
            let vol = self.music_gain * volume;
            if vol > 0.0 {
                self.start_music(vol);
            }
            return;
        }

        let vol = self.sfx_gain * volume;
        if vol <= 0.0 {
            return;
        }

        let play: fn(&AudioContext, f32) = match key {
            cues::FIRE => Self::play_fire,
            cues::EXPLOSION => Self::play_explosion,
            cues::RICOCHET => Self::play_ricochet,
            cues::DASH => Self::play_dash,
            _ => {
                if self.warned.insert(key.to_string()) {
                    log::warn!("No sound for cue '{key}'");
                }
                return;
            }
        };
        if let Some(ctx) = self.live_context() {
            play(ctx, vol);
        }
    }
}
