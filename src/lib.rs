//! Steel Siege - A top-down tank arena arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, weapons, collisions, damage)
//! - `campaign`: Level progression, funds and the upgrade shop
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences (particle budget, volumes)
//! - `web`: Browser frame driver (wasm32 only)

pub mod campaign;
pub mod error;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use campaign::{Campaign, Ledger};
pub use error::GameError;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Fixed simulation constants
///
/// Content numbers (tank stats, levels, upgrades) live in [`tuning::Tuning`];
/// these are the rules of the arena itself.
pub mod consts {
    /// Nominal frame length the per-tick speeds are balanced for (60 Hz)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Longest step a single tick will simulate (ms)
    pub const MAX_TICK_MS: f64 = 250.0;

    /// Projectiles survive this far outside the arena before culling
    pub const PROJECTILE_MARGIN: f32 = 20.0;
    pub const PROJECTILE_RADIUS: f32 = 4.0;

    /// Area-effect blast
    pub const AOE_RADIUS: f32 = 80.0;
    pub const AOE_DAMAGE_FACTOR: f32 = 0.5;
    pub const AOE_PARTICLES: usize = 30;

    /// Regular enemies
    pub const ENEMY_RADIUS: f32 = 20.0;
    /// Enemies stop and shoot inside this distance
    pub const ENEMY_STANDOFF: f32 = 200.0;
    pub const ENEMY_FIRE_RANGE: f32 = 500.0;
    pub const ENEMY_TURN_RATE: f32 = 0.1;
    pub const ENEMY_PROJECTILE_SPEED: f32 = 5.0;
    /// Max random delay added to an enemy's first shot (ms)
    pub const ENEMY_FIRE_JITTER_MS: f64 = 1000.0;
    /// Enemies spawn this far outside the arena edge
    pub const SPAWN_OFFSET: f32 = 30.0;
    pub const ENEMY_DEATH_PARTICLES: usize = 20;

    /// Boss
    pub const BOSS_TURN_RATE: f32 = 0.02;
    pub const BOSS_PHASE_MS: f64 = 5000.0;
    pub const BOSS_FIRE_INTERVAL_MS: f64 = 200.0;
    pub const BOSS_FIRE_RANGE: f32 = 1200.0;
    pub const BOSS_MAIN_PROJECTILE_SPEED: f32 = 6.0;
    pub const BOSS_SUB_PROJECTILE_SPEED: f32 = 4.0;
    /// Sub-turret offset from the bearing while tracking (radians)
    pub const BOSS_SUB_OFFSET: f32 = 0.2;
    pub const BOSS_SUB_FIRE_CHANCE: f64 = 0.3;
    pub const BOSS_MAIN_SPIN: f32 = 0.05;
    pub const BOSS_SUB_SPIN: f32 = 0.08;
    pub const BOSS_DEATH_BURSTS: u32 = 100;
    pub const BOSS_DEATH_BURST_INTERVAL_MS: f64 = 50.0;
    pub const BOSS_BURST_PARTICLES: usize = 5;
    pub const BOSS_VICTORY_DELAY_MS: f64 = 6000.0;
    /// Boss enters at this y coordinate, centred horizontally
    pub const BOSS_ENTRY_Y: f32 = 200.0;

    /// Player tank
    pub const TANK_RADIUS: f32 = 20.0;
    /// Muzzle sits this many radii ahead of the hull centre
    pub const MUZZLE_REACH: f32 = 1.5;
    /// Lateral offset of each barrel with twin guns
    pub const DUAL_GUN_OFFSET: f32 = 8.0;
    pub const PLAYER_DEATH_PARTICLES: usize = 30;
    pub const RICOCHET_PARTICLES: usize = 8;

    /// Obstacles
    pub const OBSTACLE_DEBRIS_PARTICLES: usize = 15;
    /// Keep-out radius around the map centre when laying out obstacles
    pub const OBSTACLE_SAFE_RADIUS: f32 = 200.0;
    pub const OBSTACLE_EDGE_MARGIN: f32 = 100.0;
    pub const OBSTACLE_MIN_RADIUS: f32 = 30.0;
    pub const OBSTACLE_MAX_RADIUS: f32 = 60.0;

    /// Camera follow rate per tick
    pub const CAMERA_SMOOTHING: f32 = 0.1;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along `angle`
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Bearing from `from` to `to` (radians)
#[inline]
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Move `current` a fraction `rate` of the way toward `target` along the
/// shortest arc
#[inline]
pub fn lerp_angle(current: f32, target: f32, rate: f32) -> f32 {
    let delta = normalize_angle(target - current);
    normalize_angle(current + delta * rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_lerp_angle_takes_short_way() {
        // From just below +π to just above -π should cross the seam, not sweep back
        let a = lerp_angle(PI - 0.1, -PI + 0.1, 0.5);
        assert!(a.abs() > PI - 0.01);
    }

    #[test]
    fn test_bearing() {
        let b = bearing(Vec2::ZERO, Vec2::new(0.0, 10.0));
        assert!((b - PI / 2.0).abs() < 1e-6);
    }
}
