//! World state
//!
//! The `World` exclusively owns every entity collection. Entities never see
//! it; the tick hands them the slices they need (player position, map size,
//! obstacles).

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::enemy::Enemy;
use super::obstacle::{self, Obstacle};
use super::particle::{self, Particle};
use super::player::PlayerTank;
use super::projectile::Projectile;
use crate::consts::*;
use crate::error::{GameError, Result};
use crate::tuning::{LevelParams, Tuning};

/// Default particle budget when no settings are applied
pub const DEFAULT_MAX_PARTICLES: usize = 1500;

/// Deferred effect, fired once the simulation clock reaches `due_ms`
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled {
    pub due_ms: f64,
    pub effect: ScheduledEffect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduledEffect {
    /// One staggered blast of the boss death sequence
    BossBurst { pos: Vec2, spread: f32 },
    /// The boss death sequence is over
    Victory,
}

#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub level_index: usize,
    pub level: LevelParams,
    /// Time spent in the current level (ms)
    pub level_timer_ms: f64,
    pub spawn_accumulator_ms: f64,
    pub boss_spawned: bool,
    /// Simulation clock (ms), sampled once per tick
    pub clock_ms: f64,
    pub map_size: Vec2,
    pub viewport: Vec2,
    /// Top-left of the viewport in world space
    pub camera: Vec2,
    pub paused: bool,
    pub game_over: bool,
    /// Set when the level timer completed a regular level
    pub level_complete: bool,
    pub victory: bool,
    pub ice: bool,
    pub player: PlayerTank,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub obstacles: Vec<Obstacle>,
    /// Visual only
    pub particles: Vec<Particle>,
    pub max_particles: usize,
    pub scheduled: Vec<Scheduled>,
    pub(crate) rng: Pcg32,
}

impl World {
    /// New world on the first level
    pub fn new(tuning: Tuning, player: PlayerTank, seed: u64, viewport: Vec2) -> Result<Self> {
        let level = tuning
            .levels
            .first()
            .cloned()
            .ok_or(GameError::NoMoreLevels(0))?;
        let mut world = Self {
            seed,
            tuning,
            level_index: 0,
            level,
            level_timer_ms: 0.0,
            spawn_accumulator_ms: 0.0,
            boss_spawned: false,
            clock_ms: 0.0,
            map_size: viewport,
            viewport,
            camera: Vec2::ZERO,
            paused: false,
            game_over: false,
            level_complete: false,
            victory: false,
            ice: false,
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            obstacles: Vec::new(),
            particles: Vec::new(),
            max_particles: DEFAULT_MAX_PARTICLES,
            scheduled: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        world.start_level(0)?;
        Ok(world)
    }

    /// Brief and start level `index`: size the arena, lay out obstacles and
    /// put the player back in the middle
    pub fn start_level(&mut self, index: usize) -> Result<()> {
        let level = self
            .tuning
            .levels
            .get(index)
            .cloned()
            .ok_or(GameError::NoMoreLevels(index))?;

        self.map_size = self.viewport.max(level.map_size);
        let spec = self.tuning.obstacles.get(level.obstacle_kind);
        self.obstacles = obstacle::layout(
            level.obstacle_count,
            level.obstacle_kind,
            spec,
            self.map_size,
            &mut self.rng,
        );
        self.ice = level.ice;

        self.enemies.clear();
        self.projectiles.clear();
        self.particles.clear();
        self.scheduled.clear();
        self.level_timer_ms = 0.0;
        self.spawn_accumulator_ms = 0.0;
        self.boss_spawned = false;
        self.level_complete = false;
        self.paused = false;

        self.player.respawn_at(self.map_size * 0.5);
        self.camera = self.camera_target();

        log::info!(
            "Level {} '{}' started: {}x{} arena, {} obstacles{}",
            level.id,
            level.name,
            self.map_size.x,
            self.map_size.y,
            self.obstacles.len(),
            if level.ice { ", ice" } else { "" }
        );
        self.level_index = index;
        self.level = level;
        Ok(())
    }

    /// Wrap up a regular level: clear the field and pause until the next one
    pub fn complete_level(&mut self) {
        self.enemies.clear();
        self.projectiles.clear();
        self.paused = true;
        self.level_complete = true;
        self.level_timer_ms = 0.0;
        log::info!("Level {} complete", self.level.id);
    }

    /// Spawn one regular enemy just outside a random arena edge
    pub fn spawn_enemy(&mut self) {
        let w = self.map_size.x;
        let h = self.map_size.y;
        let pos = if self.rng.random_bool(0.5) {
            let y = if self.rng.random_bool(0.5) {
                -SPAWN_OFFSET
            } else {
                h + SPAWN_OFFSET
            };
            Vec2::new(self.rng.random_range(0.0..=w), y)
        } else {
            let x = if self.rng.random_bool(0.5) {
                -SPAWN_OFFSET
            } else {
                w + SPAWN_OFFSET
            };
            Vec2::new(x, self.rng.random_range(0.0..=h))
        };

        let class = self.level.pick_enemy(&mut self.rng);
        let profile = self.tuning.enemies.get(class);
        let enemy = Enemy::new(class, profile, pos, self.clock_ms, &mut self.rng);
        log::debug!("Spawned {:?} enemy at ({:.0}, {:.0})", class, pos.x, pos.y);
        self.enemies.push(enemy);
    }

    pub fn spawn_boss(&mut self) {
        let pos = Vec2::new(self.map_size.x * 0.5, BOSS_ENTRY_Y);
        self.enemies
            .push(Enemy::boss(&self.tuning.boss, pos, self.clock_ms));
        self.boss_spawned = true;
        log::info!("Boss entered the arena");
    }

    /// Boss is dead: stagger the death blasts, then declare victory
    pub fn schedule_boss_death(&mut self, pos: Vec2, spread: f32) {
        for i in 0..BOSS_DEATH_BURSTS {
            self.scheduled.push(Scheduled {
                due_ms: self.clock_ms + f64::from(i) * BOSS_DEATH_BURST_INTERVAL_MS,
                effect: ScheduledEffect::BossBurst { pos, spread },
            });
        }
        self.scheduled.push(Scheduled {
            due_ms: self.clock_ms + BOSS_VICTORY_DELAY_MS,
            effect: ScheduledEffect::Victory,
        });
    }

    /// Remove and return every scheduled effect that is due, in due order
    pub fn take_due(&mut self) -> Vec<ScheduledEffect> {
        let now = self.clock_ms;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.scheduled.drain(..).partition(|s| s.due_ms <= now);
        self.scheduled = pending;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due.into_iter().map(|s| s.effect).collect()
    }

    /// Particle burst, respecting the particle budget
    pub fn emit(&mut self, origin: Vec2, colors: &[u32], count: usize) {
        particle::burst(
            &mut self.particles,
            self.max_particles,
            origin,
            colors,
            count,
            &mut self.rng,
        );
    }

    /// Uniform roll in [0, 1)
    pub fn roll(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Where the camera wants to be: viewport centred on the player, never
    /// showing past the arena edge
    pub fn camera_target(&self) -> Vec2 {
        let max = (self.map_size - self.viewport).max(Vec2::ZERO);
        (self.player.pos - self.viewport * 0.5).clamp(Vec2::ZERO, max)
    }

    pub fn update_camera(&mut self) {
        let target = self.camera_target();
        self.camera += (target - self.camera) * CAMERA_SMOOTHING;
    }

    /// Drop every inactive entity
    pub fn reap(&mut self) {
        self.projectiles.retain(|p| p.active);
        self.enemies.retain(|e| e.active);
        self.obstacles.retain(|o| o.active);
        self.particles.retain(|p| p.active);
    }

    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.is_boss())
    }

    /// Time left on the level clock; `None` on boss levels
    pub fn time_remaining_ms(&self) -> Option<f64> {
        if self.level.is_boss_level() {
            None
        } else {
            Some((self.level.duration_ms - self.level_timer_ms).max(0.0))
        }
    }
}
