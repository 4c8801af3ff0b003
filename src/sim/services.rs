//! Collaborators the simulation calls out to
//!
//! Audio and the economy/HUD live outside the core. The tick calls these at
//! fixed points and never reads anything back, so a failing or missing
//! implementation can't disturb the simulation.

/// Audio cue keys
pub mod cues {
    pub const FIRE: &str = "fire";
    pub const EXPLOSION: &str = "explosion";
    pub const RICOCHET: &str = "ricochet";
    pub const DASH: &str = "dash";
    pub const BGM_BATTLE: &str = "bgm_battle";
}

/// Fire-and-forget sound playback
///
/// Implementations must swallow their own failures (missing asset, blocked
/// audio context).
pub trait AudioSink {
    fn play_cue(&mut self, key: &str, looped: bool, volume: f32);

    /// Unlock playback; called from a user gesture
    fn resume(&mut self) {}

    /// Output gains (0.0 - 1.0) for effects and music
    fn set_volumes(&mut self, _sfx: f32, _music: f32) {}
}

/// Silent audio, for headless runs and tests
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_cue(&mut self, _key: &str, _looped: bool, _volume: f32) {}
}

/// Economy and HUD notifications
pub trait GameHooks {
    /// An enemy died and paid out its reward
    fn grant_funds(&mut self, amount: u32);
    /// Player hp changed (hit or ricochet feedback)
    fn hp_changed(&mut self);
    fn game_over(&mut self);
    /// Level timer expired on a regular level
    fn level_complete(&mut self);
    /// The boss death sequence finished
    fn victory(&mut self);
}

/// Everything a tick may call out to
pub struct Services<'a> {
    pub audio: &'a mut dyn AudioSink,
    pub hooks: &'a mut dyn GameHooks,
}

impl<'a> Services<'a> {
    pub fn new(audio: &'a mut dyn AudioSink, hooks: &'a mut dyn GameHooks) -> Self {
        Self { audio, hooks }
    }

    pub fn cue(&mut self, key: &str, volume: f32) {
        self.audio.play_cue(key, false, volume);
    }
}
