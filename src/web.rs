//! Browser frame driver
//!
//! JavaScript owns the canvas, the DOM screens and `requestAnimationFrame`.
//! It forwards raw input here, calls `frame` once per animation frame and
//! draws from the JSON snapshot.

use std::collections::HashSet;

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::audio::AudioManager;
use crate::campaign::Campaign;
use crate::consts::MAX_TICK_MS;
use crate::settings::Settings;
use crate::sim::TickInput;
use crate::tuning::{TankClass, Tuning};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by an earlier module instance
        return;
    }
    log::info!("Steel Siege starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    campaign: Campaign,
    keys: HashSet<String>,
    pointer: Vec2,
    trigger: bool,
    autopilot: bool,
    last_time: Option<f64>,
}

#[wasm_bindgen]
impl WebGame {
    /// New run with the tank picked in the garage
    ///
    /// `settings_json` and `tuning_json` are optional overrides.
    #[wasm_bindgen(constructor)]
    pub fn new(
        tank: &str,
        width: f32,
        height: f32,
        settings_json: Option<String>,
        tuning_json: Option<String>,
    ) -> Result<WebGame, JsError> {
        let class =
            TankClass::parse(tank).ok_or_else(|| JsError::new(&format!("Unknown tank '{tank}'")))?;
        let settings = match settings_json {
            Some(json) => Settings::from_json(&json)?,
            None => Settings::default(),
        };
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json)?,
            None => Tuning::default(),
        };

        let seed = js_sys::Date::now() as u64;
        let mut campaign = Campaign::new(class, tuning, seed, Vec2::new(width, height))?
            .with_audio(Box::new(AudioManager::new(&settings)));
        campaign.apply_settings(&settings);

        Ok(Self {
            campaign,
            keys: HashSet::new(),
            pointer: Vec2::ZERO,
            trigger: false,
            autopilot: false,
            last_time: None,
        })
    }

    pub fn key_down(&mut self, key: &str) {
        self.campaign.resume_audio();
        self.keys.insert(key.to_string());
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.remove(key);
    }

    /// Pointer position in canvas (screen) coordinates
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.pointer = Vec2::new(x, y);
    }

    pub fn pointer_down(&mut self) {
        self.campaign.resume_audio();
        self.trigger = true;
    }

    pub fn pointer_up(&mut self) {
        self.trigger = false;
    }

    /// Window lost focus: release everything held
    pub fn blur(&mut self) {
        self.keys.clear();
        self.trigger = false;
    }

    /// Apply settings JSON from the options screen
    pub fn apply_settings(&mut self, settings_json: &str) -> Result<(), JsError> {
        let settings = Settings::from_json(settings_json)?;
        self.campaign.apply_settings(&settings);
        Ok(())
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.autopilot = on;
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.campaign.world.viewport = Vec2::new(width, height);
    }

    pub fn toggle_pause(&mut self) {
        self.campaign.toggle_pause();
        // Don't count the paused time as one huge frame
        self.last_time = None;
    }

    /// Advance to `timestamp` (ms, from `requestAnimationFrame`)
    pub fn frame(&mut self, timestamp: f64) {
        let dt = match self.last_time {
            Some(last) => (timestamp - last).clamp(0.0, MAX_TICK_MS),
            None => 0.0,
        };
        self.last_time = Some(timestamp);

        let mut input = TickInput::from_keys(
            self.keys.iter().map(String::as_str),
            self.pointer,
            self.trigger,
        );
        input.autopilot = self.autopilot;
        self.campaign.frame(&input, dt);
    }

    pub fn funds(&self) -> u32 {
        self.campaign.funds()
    }

    pub fn purchase(&mut self, upgrade_id: &str) -> Result<(), JsError> {
        self.campaign.purchase_upgrade(upgrade_id)?;
        Ok(())
    }

    pub fn next_level(&mut self) -> Result<(), JsError> {
        self.campaign.start_next_level()?;
        self.last_time = None;
        Ok(())
    }

    pub fn snapshot_json(&self) -> Result<String, JsError> {
        Ok(self.campaign.snapshot().to_json()?)
    }

    /// Upgrades on offer for the current tank
    pub fn shop_json(&self) -> Result<String, JsError> {
        let offers: Vec<_> = self.campaign.shop().collect();
        Ok(serde_json::to_string(&offers)?)
    }

    pub fn ledger_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.campaign.ledger)?)
    }
}
