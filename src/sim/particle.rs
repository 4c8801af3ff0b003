//! Cosmetic particles
//!
//! Particles never affect gameplay; they exist so that hits, deaths and
//! ricochets leave something for the renderer to draw.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::heading;

/// Particle colors (0xRRGGBB)
pub mod palette {
    pub const HIT: u32 = 0xffffff;
    pub const SPARK: u32 = 0xffeb3b;
    pub const FOLIAGE: u32 = 0x4caf50;
    pub const RUBBLE: u32 = 0x9e9e9e;
    pub const ENEMY_WRECK: [u32; 3] = [0xff9800, 0xf44336, 0x212121];
    pub const PLAYER_WRECK: [u32; 3] = [0xff5722, 0xd32f2f, 0xff9800];
    pub const BLAST: [u32; 3] = [0xff5722, 0xff9800, 0xffeb3b];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    /// Units per tick
    pub vel: Vec2,
    pub color: u32,
    /// 1.0 at birth, dead at 0
    pub life: f32,
    /// Life lost per tick
    pub decay: f32,
    pub radius: f32,
    pub active: bool,
}

impl Particle {
    /// Random spark flying out of `origin`
    pub fn spark(origin: Vec2, color: u32, rng: &mut impl Rng) -> Self {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let speed = rng.random_range(1.0..=4.0);
        Self {
            pos: origin,
            vel: heading(angle) * speed,
            color,
            life: 1.0,
            decay: rng.random_range(0.02..=0.05),
            radius: rng.random_range(1.0..=3.0),
            active: true,
        }
    }

    pub fn advance(&mut self) {
        self.pos += self.vel;
        self.life -= self.decay;
        self.active = self.life > 0.0;
    }
}

/// Append `count` sparks at `origin`, cycling through `colors`, without
/// growing the collection past `cap`
pub fn burst(
    particles: &mut Vec<Particle>,
    cap: usize,
    origin: Vec2,
    colors: &[u32],
    count: usize,
    rng: &mut impl Rng,
) {
    if colors.is_empty() {
        return;
    }
    let room = cap.saturating_sub(particles.len());
    for _ in 0..count.min(room) {
        let color = colors[rng.random_range(0..colors.len())];
        particles.push(Particle::spark(origin, color, rng));
    }
}
