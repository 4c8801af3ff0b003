//! Property tests for the simulation invariants

use glam::Vec2;
use proptest::prelude::*;

use steel_siege::consts::{BOSS_PHASE_MS, FRAME_MS, PROJECTILE_MARGIN};
use steel_siege::sim::{
    AttackPhase, BossState, Obstacle, ObstacleKind, Projectile, TickInput, intersects,
};
use steel_siege::tuning::{ObstacleSpecs, TankClass, Tuning};
use steel_siege::Campaign;

const MAP: Vec2 = Vec2::new(1600.0, 1200.0);

fn point() -> impl Strategy<Value = Vec2> {
    (-2000.0f32..2000.0, -2000.0f32..2000.0).prop_map(|(x, y)| Vec2::new(x, y))
}

proptest! {
    #[test]
    fn intersects_is_symmetric(a in point(), b in point(), ra in 0.0f32..200.0, rb in 0.0f32..200.0) {
        prop_assert_eq!(intersects(a, ra, b, rb), intersects(b, rb, a, ra));
    }

    #[test]
    fn outward_shell_past_margin_is_culled(y in 0.0f32..1200.0, speed in 0.1f32..20.0) {
        let mut p = Projectile::new(Vec2::new(MAP.x + 25.0, y), 0.0, speed, 10.0, true);
        p.advance(MAP);
        prop_assert!(!p.active);
    }

    #[test]
    fn inward_shell_near_edge_survives(y in 0.0f32..1200.0, speed in 0.0f32..20.0) {
        let mut p = Projectile::new(
            Vec2::new(MAP.x - 1.0, y),
            std::f32::consts::PI,
            speed,
            10.0,
            true,
        );
        p.advance(MAP);
        prop_assert!(p.active);
        prop_assert!(p.pos.x <= MAP.x + PROJECTILE_MARGIN);
    }

    #[test]
    fn indestructible_obstacle_never_changes(hits in prop::collection::vec(0.0f32..1.0e6, 1..20)) {
        let mut spec = ObstacleSpecs::default().wall;
        spec.destructible = false;
        let mut obs = Obstacle::new(Vec2::ZERO, 40.0, ObstacleKind::Wall, &spec);
        for hit in hits {
            prop_assert!(!obs.apply_damage(hit));
            prop_assert_eq!(obs.hp, obs.max_hp);
            prop_assert!(obs.active);
        }
    }

    #[test]
    fn obstacle_hp_stays_in_range(hits in prop::collection::vec(0.0f32..120.0, 1..20)) {
        let spec = ObstacleSpecs::default().terrain;
        let mut obs = Obstacle::new(Vec2::ZERO, 40.0, ObstacleKind::Terrain, &spec);
        let mut destroyed = 0;
        for hit in hits {
            if obs.apply_damage(hit) {
                destroyed += 1;
            }
            prop_assert!(obs.hp >= 0.0 && obs.hp <= obs.max_hp);
            prop_assert_eq!(obs.active, obs.hp > 0.0);
        }
        prop_assert!(destroyed <= 1);
    }

    #[test]
    fn boss_phase_flips_once_per_period(
        parts in prop::sample::select(vec![1u32, 2, 4, 5, 8, 10, 20, 25, 40, 50, 100, 125, 200, 250])
    ) {
        let step = BOSS_PHASE_MS / f64::from(parts);
        let mut boss = BossState::new(15.0);
        let mut flips = 0;
        for _ in 0..parts {
            flips += boss.advance_phase(step);
        }
        prop_assert_eq!(flips, 1);
        prop_assert_eq!(boss.phase, AttackPhase::Barrage);
    }

    #[test]
    fn reap_leaves_only_active_entities(seed in 0u64..1000, ticks in 1usize..120) {
        let mut c = Campaign::new(TankClass::Tiger, Tuning::default(), seed, Vec2::new(1280.0, 720.0))
            .unwrap();
        let input = TickInput { autopilot: true, ..Default::default() };
        for _ in 0..ticks {
            c.frame(&input, FRAME_MS * 8.0);
            let w = &c.world;
            prop_assert!(w.projectiles.iter().all(|p| p.active));
            prop_assert!(w.enemies.iter().all(|e| e.active));
            prop_assert!(w.obstacles.iter().all(|o| o.active));
            prop_assert!(w.particles.iter().all(|p| p.active));
        }
    }

    #[test]
    fn player_hp_stays_in_range(seed in 0u64..500) {
        let mut c = Campaign::new(TankClass::Sherman, Tuning::default(), seed, Vec2::new(1280.0, 720.0))
            .unwrap();
        let input = TickInput { autopilot: true, ..Default::default() };
        for _ in 0..600 {
            c.frame(&input, FRAME_MS);
            let p = &c.world.player;
            prop_assert!(p.hp >= 0.0 && p.hp <= p.max_hp);
            prop_assert_eq!(c.world.game_over, p.hp == 0.0);
        }
    }
}
