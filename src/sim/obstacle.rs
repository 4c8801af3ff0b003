//! Static terrain: walls and trees
//!
//! Obstacles are laid out when a level starts and only ever lose hp.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::ObstacleSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    /// Trees and brush
    Terrain,
    Wall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: ObstacleKind,
    pub hp: f32,
    pub max_hp: f32,
    pub destructible: bool,
    pub blocks_movement: bool,
    pub blocks_projectiles: bool,
    pub active: bool,
}

impl Obstacle {
    pub fn new(pos: Vec2, radius: f32, kind: ObstacleKind, spec: &ObstacleSpec) -> Self {
        Self {
            pos,
            radius,
            kind,
            hp: spec.hp,
            max_hp: spec.hp,
            destructible: spec.destructible,
            blocks_movement: spec.blocks_movement,
            blocks_projectiles: spec.blocks_projectiles,
            active: true,
        }
    }

    /// Apply damage; returns true only on the hit that destroys it
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if !self.destructible || !self.active {
            return false;
        }
        self.hp = (self.hp - amount).clamp(0.0, self.max_hp);
        if self.hp <= 0.0 {
            self.active = false;
            return true;
        }
        false
    }

    /// Debris color when destroyed
    pub fn debris_color(&self) -> u32 {
        match self.kind {
            ObstacleKind::Terrain => super::palette::FOLIAGE,
            ObstacleKind::Wall => super::palette::RUBBLE,
        }
    }
}

/// Scatter `count` obstacles over the arena, keeping the centre clear for
/// the player's entry point
pub fn layout(
    count: u32,
    kind: ObstacleKind,
    spec: &ObstacleSpec,
    map_size: Vec2,
    rng: &mut impl Rng,
) -> Vec<Obstacle> {
    let center = map_size * 0.5;
    let lo = Vec2::splat(OBSTACLE_EDGE_MARGIN);
    // Tiny arenas collapse the spawn band to the centre line
    let hi = (map_size - Vec2::splat(OBSTACLE_EDGE_MARGIN)).max(lo);

    (0..count)
        .map(|_| {
            let radius = rng.random_range(OBSTACLE_MIN_RADIUS..=OBSTACLE_MAX_RADIUS);
            let mut pos = Vec2::new(
                rng.random_range(lo.x..=hi.x),
                rng.random_range(lo.y..=hi.y),
            );

            let offset = pos - center;
            let keep_out = OBSTACLE_SAFE_RADIUS + radius;
            if offset.length() < keep_out {
                let dir = if offset.length_squared() > 1e-6 {
                    offset.normalize()
                } else {
                    Vec2::X
                };
                pos = center + dir * keep_out;
            }

            Obstacle::new(pos, radius, kind, spec)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::ObstacleSpecs;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn wall() -> Obstacle {
        Obstacle::new(Vec2::ZERO, 40.0, ObstacleKind::Wall, &ObstacleSpecs::default().wall)
    }

    #[test]
    fn test_destroyed_exactly_once() {
        let mut obs = wall();
        assert!(!obs.apply_damage(150.0));
        assert!(obs.active);
        assert!(obs.apply_damage(150.0));
        assert_eq!(obs.hp, 0.0);
        assert!(!obs.active);
        // Further damage is a no-op
        assert!(!obs.apply_damage(10.0));
    }

    #[test]
    fn test_indestructible_ignores_damage() {
        let mut obs = wall();
        obs.destructible = false;
        assert!(!obs.apply_damage(1.0e6));
        assert_eq!(obs.hp, obs.max_hp);
        assert!(obs.active);
    }

    #[test]
    fn test_layout_keeps_center_clear() {
        let mut rng = Pcg32::seed_from_u64(11);
        let map = Vec2::new(1600.0, 1200.0);
        let spec = ObstacleSpecs::default().terrain;
        let obstacles = layout(200, ObstacleKind::Terrain, &spec, map, &mut rng);
        assert_eq!(obstacles.len(), 200);
        for o in &obstacles {
            let d = o.pos.distance(map * 0.5);
            assert!(d >= OBSTACLE_SAFE_RADIUS + o.radius - 1e-3);
        }
    }
}
