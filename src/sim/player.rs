//! The player's tank
//!
//! Movement is the inertial model: 8-way input accelerates the hull, velocity
//! decays by a surface friction factor each tick (ice barely slows it), and
//! the hull rotates toward the direction of travel at the class turn rate.
//! Any contact with a blocking obstacle stops the tank dead.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::intersects;
use super::obstacle::Obstacle;
use super::projectile::Projectile;
use crate::consts::*;
use crate::tuning::{Physics, TankClass, TankSpec, UpgradeEffect};
use crate::{bearing, heading, normalize_angle};

/// Abilities unlocked by upgrades
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Shells splash on impact
    pub area_damage: bool,
    /// Slow self-repair
    pub regen: bool,
    /// Two barrels fire side by side
    pub dual_guns: bool,
    pub dash: bool,
}

impl Capabilities {
    pub fn union(self, other: Capabilities) -> Capabilities {
        Capabilities {
            area_damage: self.area_damage || other.area_damage,
            regen: self.regen || other.regen,
            dual_guns: self.dual_guns || other.dual_guns,
            dash: self.dash || other.dash,
        }
    }
}

/// Per-tick controls for the tank
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub dash: bool,
    /// Fire button held
    pub trigger: bool,
    /// Aim point in world space
    pub aim: Vec2,
}

impl PlayerInput {
    /// Unit movement direction, or zero with no keys held (y grows downward)
    pub fn direction(&self) -> Vec2 {
        let x = self.right as i32 - self.left as i32;
        let y = self.down as i32 - self.up as i32;
        Vec2::new(x as f32, y as f32).normalize_or_zero()
    }
}

/// World state the tank moves through
pub struct MoveContext<'a> {
    pub obstacles: &'a [Obstacle],
    pub map_size: Vec2,
    pub ice: bool,
    pub physics: &'a Physics,
    pub now_ms: f64,
}

/// What happened during a player update
#[derive(Debug, Default)]
pub struct PlayerUpdate {
    pub shots: Vec<Projectile>,
    pub dashed: bool,
    /// Movement was stopped by an obstacle
    pub blocked: bool,
}

/// Outcome of an incoming hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageIntake {
    /// Damage actually applied (0 on ricochet)
    pub applied: f32,
    pub ricochet: bool,
    /// This hit destroyed the tank
    pub fatal: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTank {
    pub class: TankClass,
    pub pos: Vec2,
    pub radius: f32,
    pub body_angle: f32,
    pub turret_angle: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Top speed (units/tick)
    pub speed: f32,
    /// Hull rotation limit (radians/tick)
    pub turn_rate: f32,
    pub fire_interval_ms: f64,
    pub damage: f32,
    pub projectile_speed: f32,
    /// Chance in [0, 1] an incoming hit is deflected
    pub ricochet: f32,
    pub vel: Vec2,
    pub last_fire_ms: Option<f64>,
    pub last_dash_ms: Option<f64>,
    pub caps: Capabilities,
}

impl PlayerTank {
    pub fn new(spec: &TankSpec, pos: Vec2) -> Self {
        let up = -std::f32::consts::FRAC_PI_2;
        Self {
            class: spec.class,
            pos,
            radius: TANK_RADIUS,
            body_angle: up,
            turret_angle: up,
            hp: spec.max_hp,
            max_hp: spec.max_hp,
            speed: spec.speed,
            turn_rate: spec.turn_rate,
            fire_interval_ms: spec.fire_interval_ms,
            damage: spec.damage,
            projectile_speed: spec.projectile_speed,
            ricochet: spec.ricochet.clamp(0.0, 1.0),
            vel: Vec2::ZERO,
            last_fire_ms: None,
            last_dash_ms: None,
            caps: Capabilities::default(),
        }
    }

    /// A destroyed tank ignores all input
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Place the tank at a level's entry point, at rest
    pub fn respawn_at(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
    }

    pub fn update(&mut self, input: &PlayerInput, ctx: &MoveContext) -> PlayerUpdate {
        let mut out = PlayerUpdate::default();
        if !self.is_alive() {
            return out;
        }

        let physics = ctx.physics;
        let friction = if ctx.ice {
            physics.ice_friction
        } else {
            physics.ground_friction
        };
        // Less grip on ice: slower to build speed, same top speed as ground
        let grip = (1.0 - friction) / (1.0 - physics.ground_friction);

        let dir = input.direction();
        if dir != Vec2::ZERO {
            self.vel += dir * self.speed * physics.accel_factor * grip;
            let target = dir.y.atan2(dir.x);
            let step = normalize_angle(target - self.body_angle).clamp(-self.turn_rate, self.turn_rate);
            self.body_angle = normalize_angle(self.body_angle + step);
        }

        if input.dash && self.dash_ready(ctx.now_ms, physics.dash_cooldown_ms) {
            let push = if dir != Vec2::ZERO {
                dir
            } else {
                heading(self.body_angle)
            };
            self.vel += push * self.speed * physics.dash_multiplier;
            self.last_dash_ms = Some(ctx.now_ms);
            out.dashed = true;
        }

        self.vel *= friction;

        // Inelastic stop on any blocking obstacle
        let tentative = self.pos + self.vel;
        let blocked = ctx
            .obstacles
            .iter()
            .filter(|o| o.active && o.blocks_movement)
            .any(|o| intersects(tentative, self.radius, o.pos, o.radius));
        if blocked {
            self.vel = Vec2::ZERO;
            out.blocked = true;
        } else {
            self.pos = tentative;
        }

        let lo = Vec2::splat(self.radius);
        let hi = (ctx.map_size - Vec2::splat(self.radius)).max(lo);
        self.pos = self.pos.clamp(lo, hi);

        self.turret_angle = bearing(self.pos, input.aim);

        if self.caps.regen && self.hp < self.max_hp {
            self.hp = (self.hp + physics.regen_per_tick).min(self.max_hp);
        }

        if input.trigger && self.gun_ready(ctx.now_ms) {
            self.last_fire_ms = Some(ctx.now_ms);
            out.shots = self.shells();
        }

        out
    }

    fn dash_ready(&self, now_ms: f64, cooldown_ms: f64) -> bool {
        self.caps.dash
            && self
                .last_dash_ms
                .is_none_or(|last| now_ms - last >= cooldown_ms)
    }

    fn gun_ready(&self, now_ms: f64) -> bool {
        self.last_fire_ms
            .is_none_or(|last| now_ms - last > self.fire_interval_ms)
    }

    /// Shells for one trigger pull, leaving from the muzzle(s)
    fn shells(&self) -> Vec<Projectile> {
        let aim = heading(self.turret_angle);
        let muzzle = self.pos + aim * self.radius * MUZZLE_REACH;
        let shell = |from: Vec2| {
            Projectile::new(from, self.turret_angle, self.projectile_speed, self.damage, true)
                .with_area_effect(self.caps.area_damage)
        };

        if self.caps.dual_guns {
            let side = heading(self.turret_angle + std::f32::consts::FRAC_PI_2) * DUAL_GUN_OFFSET;
            vec![shell(muzzle + side), shell(muzzle - side)]
        } else {
            vec![shell(muzzle)]
        }
    }

    /// Resolve a hit against a uniform `roll` in [0, 1)
    ///
    /// A roll under the ricochet chance negates the hit entirely.
    pub fn absorb_hit(&mut self, amount: f32, roll: f32) -> DamageIntake {
        if !self.is_alive() {
            return DamageIntake {
                applied: 0.0,
                ricochet: false,
                fatal: false,
            };
        }
        if roll < self.ricochet {
            return DamageIntake {
                applied: 0.0,
                ricochet: true,
                fatal: false,
            };
        }
        self.hp = (self.hp - amount).max(0.0);
        DamageIntake {
            applied: amount,
            ricochet: false,
            fatal: self.hp <= 0.0,
        }
    }

    /// Take a hit; returns the damage actually applied (0 on ricochet)
    pub fn take_damage(&mut self, amount: f32, rng: &mut impl Rng) -> f32 {
        self.absorb_hit(amount, rng.random::<f32>()).applied
    }
}

/// Apply an upgrade's stat changes for the rest of the run
pub fn apply_upgrade(mut player: PlayerTank, effect: &UpgradeEffect) -> PlayerTank {
    player.ricochet = (player.ricochet + effect.ricochet_bonus).clamp(0.0, 1.0);
    player.damage += effect.damage_bonus;
    if effect.projectile_speed_delta != 0.0 {
        player.projectile_speed =
            (player.projectile_speed + effect.projectile_speed_delta).max(effect.min_projectile_speed);
    }
    player.max_hp += effect.max_hp_bonus;
    player.hp = (player.hp + effect.max_hp_bonus).min(player.max_hp);
    player.fire_interval_ms /= effect.fire_interval_divisor;
    player.speed *= effect.speed_multiplier;
    player.caps = player.caps.union(effect.grants);
    player
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::ObstacleKind;
    use crate::tuning::{ObstacleSpecs, Tuning};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const MAP: Vec2 = Vec2::new(2000.0, 2000.0);

    fn sherman() -> PlayerTank {
        let t = Tuning::default();
        PlayerTank::new(t.tank(TankClass::Sherman).unwrap(), Vec2::new(1000.0, 1000.0))
    }

    fn ctx<'a>(obstacles: &'a [Obstacle], physics: &'a Physics, ice: bool, now_ms: f64) -> MoveContext<'a> {
        MoveContext {
            obstacles,
            map_size: MAP,
            ice,
            physics,
            now_ms,
        }
    }

    fn coast(tank: &mut PlayerTank, physics: &Physics, ice: bool, ticks: usize) -> f32 {
        let start = tank.pos;
        let idle = PlayerInput::default();
        for _ in 0..ticks {
            tank.update(&idle, &ctx(&[], physics, ice, 0.0));
        }
        tank.pos.distance(start)
    }

    #[test]
    fn test_accelerates_toward_input() {
        let physics = Physics::default();
        let mut tank = sherman();
        let input = PlayerInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..30 {
            tank.update(&input, &ctx(&[], &physics, false, 0.0));
        }
        assert!(tank.pos.x > 1000.0);
        assert!((tank.pos.y - 1000.0).abs() < 1e-3);
        // Terminal speed settles near top speed on normal ground
        assert!(tank.vel.x > 0.0 && tank.vel.x <= tank.speed * 1.01);
    }

    #[test]
    fn test_ice_top_speed_matches_ground() {
        let physics = Physics::default();
        let input = PlayerInput {
            right: true,
            ..Default::default()
        };
        let mut ground = sherman();
        let mut ice = sherman();
        ground.pos = Vec2::new(100.0, 1000.0);
        ice.pos = Vec2::new(100.0, 1000.0);
        for _ in 0..30 {
            ground.update(&input, &ctx(&[], &physics, false, 0.0));
            ice.update(&input, &ctx(&[], &physics, true, 0.0));
        }
        // Ice is slower to get going
        assert!(ice.vel.x < ground.vel.x);

        for _ in 0..400 {
            ice.update(&input, &ctx(&[], &physics, true, 0.0));
            ice.pos.x = 100.0;
        }
        assert!(ice.vel.x <= ice.speed * 1.01, "ice terminal {}", ice.vel.x);
        assert!(ice.vel.x > ice.speed * 0.9);
    }

    #[test]
    fn test_ice_slides_further() {
        let physics = Physics::default();
        let mut ground = sherman();
        let mut ice = sherman();
        ground.vel = Vec2::new(4.0, 0.0);
        ice.vel = Vec2::new(4.0, 0.0);
        let ground_slide = coast(&mut ground, &physics, false, 60);
        let ice_slide = coast(&mut ice, &physics, true, 60);
        assert!(ice_slide > ground_slide * 3.0, "ice {ice_slide} ground {ground_slide}");
    }

    #[test]
    fn test_blocked_by_obstacle_stops_dead() {
        let physics = Physics::default();
        let spec = ObstacleSpecs::default().wall;
        let wall = [Obstacle::new(Vec2::new(1062.0, 1000.0), 40.0, ObstacleKind::Wall, &spec)];
        let mut tank = sherman();
        tank.vel = Vec2::new(5.0, 0.0);
        let before = tank.pos;
        let out = tank.update(&PlayerInput::default(), &ctx(&wall, &physics, false, 0.0));
        assert!(out.blocked);
        assert_eq!(tank.pos, before);
        assert_eq!(tank.vel, Vec2::ZERO);
    }

    #[test]
    fn test_projectile_only_obstacle_does_not_block() {
        let physics = Physics::default();
        let spec = ObstacleSpecs::default().wall;
        let mut wall = Obstacle::new(Vec2::new(1062.0, 1000.0), 40.0, ObstacleKind::Wall, &spec);
        wall.blocks_movement = false;
        let mut tank = sherman();
        tank.vel = Vec2::new(5.0, 0.0);
        let out = tank.update(&PlayerInput::default(), &ctx(&[wall], &physics, false, 0.0));
        assert!(!out.blocked);
        assert!(tank.pos.x > 1000.0);
    }

    #[test]
    fn test_clamped_to_arena() {
        let physics = Physics::default();
        let mut tank = sherman();
        tank.pos = Vec2::new(5.0, 5.0);
        tank.vel = Vec2::new(-10.0, -10.0);
        tank.update(&PlayerInput::default(), &ctx(&[], &physics, false, 0.0));
        assert_eq!(tank.pos, Vec2::splat(tank.radius));
    }

    #[test]
    fn test_turret_tracks_aim() {
        let physics = Physics::default();
        let mut tank = sherman();
        let input = PlayerInput {
            aim: Vec2::new(1000.0, 1500.0),
            ..Default::default()
        };
        tank.update(&input, &ctx(&[], &physics, false, 0.0));
        assert!((tank.turret_angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_fire_cooldown() {
        let physics = Physics::default();
        let mut tank = sherman();
        let input = PlayerInput {
            trigger: true,
            aim: Vec2::new(1500.0, 1000.0),
            ..Default::default()
        };
        assert_eq!(tank.update(&input, &ctx(&[], &physics, false, 0.0)).shots.len(), 1);
        assert!(tank.update(&input, &ctx(&[], &physics, false, 100.0)).shots.is_empty());
        let shots = tank.update(&input, &ctx(&[], &physics, false, 260.0)).shots;
        assert_eq!(shots.len(), 1);
        assert!(shots[0].from_player);
        assert_eq!(shots[0].speed, 12.0);
    }

    #[test]
    fn test_dual_guns_fire_side_by_side() {
        let physics = Physics::default();
        let mut tank = sherman();
        tank.caps.dual_guns = true;
        let input = PlayerInput {
            trigger: true,
            aim: Vec2::new(1500.0, 1000.0),
            ..Default::default()
        };
        let shots = tank.update(&input, &ctx(&[], &physics, false, 0.0)).shots;
        assert_eq!(shots.len(), 2);
        assert!(((shots[0].pos.y - shots[1].pos.y).abs() - 2.0 * DUAL_GUN_OFFSET).abs() < 1e-3);
        assert!((shots[0].pos.x - shots[1].pos.x).abs() < 1e-3);
    }

    #[test]
    fn test_dash_impulse_and_cooldown() {
        let physics = Physics::default();
        let mut tank = sherman();
        tank.caps.dash = true;
        let input = PlayerInput {
            dash: true,
            right: true,
            ..Default::default()
        };
        let out = tank.update(&input, &ctx(&[], &physics, false, 0.0));
        assert!(out.dashed);
        assert!(tank.vel.x > tank.speed * 3.0);
        let out = tank.update(&input, &ctx(&[], &physics, false, 1000.0));
        assert!(!out.dashed);
        let out = tank.update(&input, &ctx(&[], &physics, false, 3000.0));
        assert!(out.dashed);
    }

    #[test]
    fn test_dash_needs_capability() {
        let physics = Physics::default();
        let mut tank = sherman();
        let input = PlayerInput {
            dash: true,
            ..Default::default()
        };
        assert!(!tank.update(&input, &ctx(&[], &physics, false, 0.0)).dashed);
    }

    #[test]
    fn test_regen_caps_at_max() {
        let physics = Physics::default();
        let mut tank = sherman();
        tank.caps.regen = true;
        tank.hp = tank.max_hp - 0.03;
        tank.update(&PlayerInput::default(), &ctx(&[], &physics, false, 0.0));
        assert!((tank.hp - (tank.max_hp - 0.01)).abs() < 1e-4);
        tank.update(&PlayerInput::default(), &ctx(&[], &physics, false, 0.0));
        assert_eq!(tank.hp, tank.max_hp);
    }

    #[test]
    fn test_ricochet_negates_hit() {
        let mut tank = sherman();
        tank.ricochet = 0.5;
        let intake = tank.absorb_hit(20.0, 0.49);
        assert!(intake.ricochet);
        assert_eq!(intake.applied, 0.0);
        assert_eq!(tank.hp, 100.0);

        let intake = tank.absorb_hit(20.0, 0.5);
        assert!(!intake.ricochet);
        assert_eq!(intake.applied, 20.0);
        assert_eq!(tank.hp, 80.0);
    }

    #[test]
    fn test_fatal_hit_clamps_and_freezes() {
        let physics = Physics::default();
        let mut tank = sherman();
        tank.ricochet = 0.0;
        let intake = tank.absorb_hit(500.0, 0.9);
        assert!(intake.fatal);
        assert_eq!(tank.hp, 0.0);

        let before = tank.pos;
        let input = PlayerInput {
            right: true,
            trigger: true,
            ..Default::default()
        };
        let out = tank.update(&input, &ctx(&[], &physics, false, 10_000.0));
        assert!(out.shots.is_empty());
        assert_eq!(tank.pos, before);
    }

    #[test]
    fn test_ricochet_rate_matches_probability() {
        let mut rng = Pcg32::seed_from_u64(99);
        let mut tank = sherman();
        tank.ricochet = 0.3;
        let trials = 20_000;
        let mut negated = 0;
        for _ in 0..trials {
            tank.hp = tank.max_hp;
            let applied = tank.take_damage(5.0, &mut rng);
            if applied == 0.0 {
                negated += 1;
            } else {
                assert_eq!(applied, 5.0);
            }
        }
        let rate = negated as f32 / trials as f32;
        assert!((rate - 0.3).abs() < 0.02, "rate = {rate}");
    }

    #[test]
    fn test_apply_upgrades() {
        let t = Tuning::default();
        let tiger = PlayerTank::new(t.tank(TankClass::Tiger).unwrap(), Vec2::ZERO);

        let armored = apply_upgrade(tiger.clone(), &t.upgrade("t_armor").unwrap().effect);
        assert!((armored.ricochet - 0.6).abs() < 1e-6);

        let gunned = apply_upgrade(tiger.clone(), &t.upgrade("t_gun").unwrap().effect);
        assert_eq!(gunned.damage, 80.0);
        assert_eq!(gunned.projectile_speed, 6.0);
        assert!(gunned.caps.area_damage);

        let repaired = apply_upgrade(tiger, &t.upgrade("t_hp").unwrap().effect);
        assert_eq!(repaired.max_hp, 300.0);
        assert_eq!(repaired.hp, 300.0);
        assert!(repaired.caps.regen);

        let sherman = sherman();
        let twin = apply_upgrade(sherman.clone(), &t.upgrade("s_gun").unwrap().effect);
        assert_eq!(twin.fire_interval_ms, 125.0);
        assert!(twin.caps.dual_guns);

        let turbo = apply_upgrade(sherman, &t.upgrade("s_engine").unwrap().effect);
        assert!((turbo.speed - 5.4).abs() < 1e-5);
        assert!(turbo.caps.dash);
    }

    #[test]
    fn test_ricochet_upgrade_caps_at_one() {
        let t = Tuning::default();
        let mut tiger = PlayerTank::new(t.tank(TankClass::Tiger).unwrap(), Vec2::ZERO);
        for _ in 0..5 {
            tiger = apply_upgrade(tiger, &t.upgrade("t_armor").unwrap().effect);
        }
        assert_eq!(tiger.ricochet, 1.0);
    }
}
