//! Shells fired by tanks and turrets

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{PROJECTILE_MARGIN, PROJECTILE_RADIUS};
use crate::heading;

/// A straight-flying projectile
///
/// Angle and speed are fixed at creation; there is no homing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub angle: f32,
    /// Units per tick
    pub speed: f32,
    pub damage: f32,
    pub from_player: bool,
    /// Splashes on impact
    pub area_effect: bool,
    pub radius: f32,
    pub active: bool,
}

impl Projectile {
    pub fn new(pos: Vec2, angle: f32, speed: f32, damage: f32, from_player: bool) -> Self {
        Self {
            pos,
            angle,
            speed,
            damage,
            from_player,
            area_effect: false,
            radius: PROJECTILE_RADIUS,
            active: true,
        }
    }

    pub fn with_area_effect(mut self, area_effect: bool) -> Self {
        self.area_effect = area_effect;
        self
    }

    /// Move one tick and cull once clear of the arena
    pub fn advance(&mut self, map_size: Vec2) {
        self.pos += heading(self.angle) * self.speed;

        let min = -PROJECTILE_MARGIN;
        let max = map_size + Vec2::splat(PROJECTILE_MARGIN);
        if self.pos.x < min || self.pos.x > max.x || self.pos.y < min || self.pos.y > max.y {
            self.active = false;
        }
    }
}
