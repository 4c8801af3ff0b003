//! Level progression, funds and the upgrade shop
//!
//! `Campaign` is the outer controller around a [`World`]: it owns the funds
//! ledger and the audio sink, feeds them to every tick, and moves the run
//! from one level to the next.

use glam::Vec2;
use serde::Serialize;

use crate::error::{GameError, Result};
use crate::settings::Settings;
use crate::sim::{
    AudioSink, GameHooks, NullAudio, PlayerTank, Services, Snapshot, TickInput, World,
    apply_upgrade, cues, tick,
};
use crate::tuning::{TankClass, Tuning, UpgradeDef};

/// Funds and notification counters kept outside the simulation
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ledger {
    /// Spendable funds
    pub funds: u32,
    /// Total ever granted
    pub earned: u32,
    pub kills: u32,
    pub hp_updates: u32,
    pub game_overs: u32,
    pub levels_completed: u32,
    pub victories: u32,
}

impl GameHooks for Ledger {
    fn grant_funds(&mut self, amount: u32) {
        self.funds = self.funds.saturating_add(amount);
        self.earned = self.earned.saturating_add(amount);
        self.kills += 1;
    }

    fn hp_changed(&mut self) {
        self.hp_updates += 1;
    }

    fn game_over(&mut self) {
        self.game_overs += 1;
    }

    fn level_complete(&mut self) {
        self.levels_completed += 1;
    }

    fn victory(&mut self) {
        self.victories += 1;
    }
}

/// One run: tank choice through to victory or defeat
pub struct Campaign {
    pub world: World,
    pub ledger: Ledger,
    audio: Box<dyn AudioSink>,
}

impl Campaign {
    /// Start a run with the chosen tank on the first level
    pub fn new(tank: TankClass, tuning: Tuning, seed: u64, viewport: Vec2) -> Result<Self> {
        tuning.validate()?;
        let spec = tuning.tank(tank).ok_or(GameError::UnknownTank(tank))?;
        log::info!("New campaign: {} (seed {})", spec.name, seed);
        let player = PlayerTank::new(spec, viewport * 0.5);
        let world = World::new(tuning, player, seed, viewport)?;
        Ok(Self {
            world,
            ledger: Ledger::default(),
            audio: Box::new(NullAudio),
        })
    }

    /// Route cues to `audio` and start the battle music
    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = audio;
        self.audio.play_cue(cues::BGM_BATTLE, true, 0.4);
        self
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.world.max_particles = settings.max_particles();
        self.world.particles.truncate(self.world.max_particles);
        self.audio
            .set_volumes(settings.sfx_gain(), settings.music_gain());
    }

    /// Unlock audio; call from a user gesture
    pub fn resume_audio(&mut self) {
        self.audio.resume();
    }

    /// Run one animation frame
    pub fn frame(&mut self, input: &TickInput, dt_ms: f64) {
        let mut services = Services::new(self.audio.as_mut(), &mut self.ledger);
        tick(&mut self.world, input, dt_ms, &mut services);
    }

    pub fn funds(&self) -> u32 {
        self.ledger.funds
    }

    pub fn toggle_pause(&mut self) {
        // Level-complete and victory pauses are lifted only by the next level
        if self.world.level_complete || self.world.victory || self.world.game_over {
            return;
        }
        self.world.paused = !self.world.paused;
    }

    /// Upgrades the shop offers the current tank
    pub fn shop(&self) -> impl Iterator<Item = &UpgradeDef> {
        self.world.tuning.upgrades_for(self.world.player.class)
    }

    /// Buy an upgrade; it applies to the player for the rest of the run
    pub fn purchase_upgrade(&mut self, id: &str) -> Result<()> {
        let def = self
            .world
            .tuning
            .upgrade(id)
            .ok_or_else(|| GameError::UnknownUpgrade(id.to_string()))?;
        let class = self.world.player.class;
        if def.tank != class {
            return Err(GameError::UpgradeNotOffered {
                upgrade: id.to_string(),
                tank: class,
            });
        }
        if self.ledger.funds < def.cost {
            return Err(GameError::InsufficientFunds {
                cost: def.cost,
                funds: self.ledger.funds,
            });
        }

        self.ledger.funds -= def.cost;
        let player = self.world.player.clone();
        self.world.player = apply_upgrade(player, &def.effect);
        log::debug!("Purchased {} for {}, {} left", def.name, def.cost, self.ledger.funds);
        Ok(())
    }

    /// Brief and start the level after the current one
    pub fn start_next_level(&mut self) -> Result<()> {
        self.world.start_level(self.world.level_index + 1)?;
        self.audio.play_cue(cues::BGM_BATTLE, true, 0.4);
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::of(&self.world)
    }
}
