//! Read-only view of the world for a renderer or HUD

use glam::Vec2;
use serde::Serialize;

use super::enemy::Enemy;
use super::obstacle::Obstacle;
use super::particle::Particle;
use super::player::PlayerTank;
use super::projectile::Projectile;
use super::state::World;
use crate::error::{GameError, Result};

#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub level: u32,
    pub level_name: &'a str,
    pub clock_ms: f64,
    /// `None` on boss levels
    pub time_remaining_ms: Option<f64>,
    pub map_size: Vec2,
    pub camera: Vec2,
    pub paused: bool,
    pub game_over: bool,
    pub level_complete: bool,
    pub victory: bool,
    pub ice: bool,
    pub player: &'a PlayerTank,
    pub enemies: &'a [Enemy],
    pub projectiles: &'a [Projectile],
    pub obstacles: &'a [Obstacle],
    pub particles: &'a [Particle],
}

impl<'a> Snapshot<'a> {
    pub fn of(world: &'a World) -> Self {
        Self {
            level: world.level.id,
            level_name: &world.level.name,
            clock_ms: world.clock_ms,
            time_remaining_ms: world.time_remaining_ms(),
            map_size: world.map_size,
            camera: world.camera,
            paused: world.paused,
            game_over: world.game_over,
            level_complete: world.level_complete,
            victory: world.victory,
            ice: world.ice,
            player: &world.player,
            enemies: &world.enemies,
            projectiles: &world.projectiles,
            obstacles: &world.obstacles,
            particles: &world.particles,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(GameError::Serialize)
    }
}
