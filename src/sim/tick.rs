//! Variable-timestep simulation tick
//!
//! One call advances the world by `dt_ms` in a fixed order: scheduled
//! effects, level timer, spawner, player, enemies, projectiles, particles,
//! collisions, reap, camera.

use glam::Vec2;
use rand::Rng;

use super::collision::{in_blast, intersects};
use super::enemy::DamageOutcome;
use super::particle::palette;
use super::player::{MoveContext, PlayerInput};
use super::projectile::Projectile;
use super::services::{Services, cues};
use super::state::{ScheduledEffect, World};
use crate::consts::*;

/// Autopilot backs off from enemies closer than this
const AUTOPILOT_RETREAT: f32 = 250.0;
/// Autopilot holds the trigger inside this distance
const AUTOPILOT_ENGAGE: f32 = 700.0;
/// Autopilot flips its strafing direction this often (ms)
const AUTOPILOT_STRAFE_MS: f64 = 3000.0;

/// Input snapshot for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub dash: bool,
    /// Pointer button held
    pub trigger: bool,
    /// Pointer position in screen space
    pub pointer: Vec2,
    /// Idle/demo mode - the autopilot drives the tank
    pub autopilot: bool,
}

impl TickInput {
    /// Build from the set of held keys (DOM `KeyboardEvent.key` names)
    pub fn from_keys<'a>(
        keys: impl IntoIterator<Item = &'a str>,
        pointer: Vec2,
        trigger: bool,
    ) -> Self {
        let mut input = Self {
            pointer,
            trigger,
            ..Default::default()
        };
        for key in keys {
            match key {
                "w" | "W" | "ArrowUp" => input.up = true,
                "s" | "S" | "ArrowDown" => input.down = true,
                "a" | "A" | "ArrowLeft" => input.left = true,
                "d" | "D" | "ArrowRight" => input.right = true,
                " " | "Shift" => input.dash = true,
                _ => {}
            }
        }
        input
    }

    /// Controls for the tank, with the pointer moved into world space
    pub fn player_input(&self, camera: Vec2) -> PlayerInput {
        PlayerInput {
            up: self.up,
            down: self.down,
            left: self.left,
            right: self.right,
            dash: self.dash,
            trigger: self.trigger,
            aim: self.pointer + camera,
        }
    }
}

/// Advance the world by `dt_ms` milliseconds
pub fn tick(world: &mut World, input: &TickInput, dt_ms: f64, services: &mut Services) {
    if world.paused {
        return;
    }
    let dt_ms = if dt_ms.is_finite() {
        dt_ms.clamp(0.0, MAX_TICK_MS)
    } else {
        0.0
    };
    world.clock_ms += dt_ms;

    run_scheduled(world, services);
    if world.paused {
        return;
    }

    if !world.game_over {
        advance_level(world, dt_ms, services);
        if world.level_complete {
            return;
        }
        run_spawner(world, dt_ms);
    }

    let controls = if input.autopilot {
        autopilot(world)
    } else {
        input.player_input(world.camera)
    };
    // Enemies chase where the player was at the start of the tick
    let lagged_player_pos = world.player.pos;
    update_player(world, &controls, services);
    update_enemies(world, lagged_player_pos, dt_ms, services);

    let map_size = world.map_size;
    for projectile in &mut world.projectiles {
        projectile.advance(map_size);
    }
    for particle in &mut world.particles {
        particle.advance();
    }

    resolve_collisions(world, services);
    world.reap();
    world.update_camera();
}

fn run_scheduled(world: &mut World, services: &mut Services) {
    for effect in world.take_due() {
        match effect {
            ScheduledEffect::BossBurst { pos, spread } => {
                let offset = Vec2::new(
                    world.rng.random_range(-spread..=spread),
                    world.rng.random_range(-spread..=spread),
                );
                world.emit(pos + offset, &palette::BLAST, BOSS_BURST_PARTICLES);
                services.cue(cues::EXPLOSION, 0.3);
            }
            ScheduledEffect::Victory => {
                // A player who died during the death sequence stays dead
                if world.game_over || world.victory {
                    continue;
                }
                world.victory = true;
                world.paused = true;
                services.hooks.victory();
                log::info!("Victory at {:.0} ms", world.clock_ms);
            }
        }
    }
}

/// Level clock: completes regular levels, brings in the boss on boss levels
fn advance_level(world: &mut World, dt_ms: f64, services: &mut Services) {
    world.level_timer_ms += dt_ms;

    if let Some(delay) = world.level.boss_delay_ms {
        if !world.boss_spawned && world.level_timer_ms > delay {
            world.spawn_boss();
            services.cue(cues::EXPLOSION, 0.8);
        }
        return;
    }

    if world.level_timer_ms >= world.level.duration_ms {
        world.complete_level();
        services.hooks.level_complete();
    }
}

fn run_spawner(world: &mut World, dt_ms: f64) {
    // The boss fights alone
    if world.boss_spawned {
        return;
    }
    world.spawn_accumulator_ms += dt_ms;
    if world.spawn_accumulator_ms > world.level.spawn_interval_ms {
        world.spawn_accumulator_ms = 0.0;
        world.spawn_enemy();
    }
}

fn update_player(world: &mut World, controls: &PlayerInput, services: &mut Services) {
    let ctx = MoveContext {
        obstacles: &world.obstacles,
        map_size: world.map_size,
        ice: world.ice,
        physics: &world.tuning.physics,
        now_ms: world.clock_ms,
    };
    let out = world.player.update(controls, &ctx);

    if out.dashed {
        services.cue(cues::DASH, 0.5);
    }
    if !out.shots.is_empty() {
        services.cue(cues::FIRE, 0.4);
        world.projectiles.extend(out.shots);
    }
}

fn update_enemies(world: &mut World, player_pos: Vec2, dt_ms: f64, services: &mut Services) {
    let mut shots = Vec::new();
    for enemy in &mut world.enemies {
        let fired = enemy.update(
            player_pos,
            world.map_size,
            world.clock_ms,
            dt_ms,
            &mut world.rng,
        );
        if !fired.is_empty() {
            services.cue(cues::FIRE, 0.2);
            shots.extend(fired);
        }
    }
    world.projectiles.extend(shots);
}

/// Resolve every live projectile against obstacles, then tanks
///
/// Runs back to front; one projectile hits at most one target.
fn resolve_collisions(world: &mut World, services: &mut Services) {
    for i in (0..world.projectiles.len()).rev() {
        let shot = world.projectiles[i].clone();
        if !shot.active {
            continue;
        }

        // Obstacles intercept before anything reaches a tank
        let blocker = world.obstacles.iter().position(|o| {
            o.active && o.blocks_projectiles && intersects(shot.pos, shot.radius, o.pos, o.radius)
        });
        if let Some(idx) = blocker {
            world.projectiles[i].active = false;
            damage_obstacle(world, idx, shot.damage, services);
            impact(world, &shot, services);
            continue;
        }

        if shot.from_player {
            let target = world
                .enemies
                .iter()
                .position(|e| e.active && intersects(shot.pos, shot.radius, e.pos, e.radius));
            if let Some(idx) = target {
                world.projectiles[i].active = false;
                damage_enemy(world, idx, shot.damage, services);
                impact(world, &shot, services);
            }
        } else if world.player.is_alive()
            && intersects(shot.pos, shot.radius, world.player.pos, world.player.radius)
        {
            world.projectiles[i].active = false;
            hit_player(world, shot.damage, services);
        }
    }
}

/// Splash (if any) and the hit spark, after the direct damage landed
fn impact(world: &mut World, shot: &Projectile, services: &mut Services) {
    if shot.area_effect {
        area_blast(world, shot.pos, shot.damage, services);
    }
    world.emit(shot.pos, &[palette::HIT], 1);
}

/// Splash damage to every enemy and obstacle the blast circle touches,
/// including whatever the shell hit directly
pub fn area_blast(world: &mut World, center: Vec2, base_damage: f32, services: &mut Services) {
    let splash = base_damage * AOE_DAMAGE_FACTOR;
    services.cue(cues::EXPLOSION, 0.4);
    world.emit(center, &palette::BLAST, AOE_PARTICLES);

    for idx in 0..world.enemies.len() {
        let e = &world.enemies[idx];
        if in_blast(center, AOE_RADIUS, e.pos, e.radius) {
            damage_enemy(world, idx, splash, services);
        }
    }
    for idx in 0..world.obstacles.len() {
        let o = &world.obstacles[idx];
        if in_blast(center, AOE_RADIUS, o.pos, o.radius) {
            damage_obstacle(world, idx, splash, services);
        }
    }
}

fn damage_enemy(world: &mut World, idx: usize, amount: f32, services: &mut Services) {
    let radius = world.enemies[idx].radius;
    if let DamageOutcome::Destroyed { reward, pos, boss } = world.enemies[idx].apply_damage(amount)
    {
        services.hooks.grant_funds(reward);
        services.cue(cues::EXPLOSION, 0.5);
        world.emit(pos, &palette::ENEMY_WRECK, ENEMY_DEATH_PARTICLES);
        if boss {
            log::info!("Boss destroyed");
            world.schedule_boss_death(pos, radius);
        }
    }
}

fn damage_obstacle(world: &mut World, idx: usize, amount: f32, services: &mut Services) {
    let obstacle = &mut world.obstacles[idx];
    if obstacle.apply_damage(amount) {
        let (pos, color) = (obstacle.pos, obstacle.debris_color());
        world.emit(pos, &[color], OBSTACLE_DEBRIS_PARTICLES);
        services.cue(cues::EXPLOSION, 0.3);
    }
}

fn hit_player(world: &mut World, amount: f32, services: &mut Services) {
    let roll = world.roll();
    let intake = world.player.absorb_hit(amount, roll);
    let pos = world.player.pos;
    services.hooks.hp_changed();

    if intake.ricochet {
        world.emit(pos, &[palette::SPARK], RICOCHET_PARTICLES);
        services.cue(cues::RICOCHET, 0.6);
    }
    if intake.fatal {
        world.emit(pos, &palette::PLAYER_WRECK, PLAYER_DEATH_PARTICLES);
        services.cue(cues::EXPLOSION, 1.0);
        if !world.game_over {
            world.game_over = true;
            services.hooks.game_over();
            log::info!("Game over on level {}", world.level.id);
        }
    }
}

/// Demo-mode controls: engage the nearest enemy, strafe at mid range and
/// back off when something gets close
fn autopilot(world: &World) -> PlayerInput {
    let player = &world.player;
    let nearest = world
        .enemies
        .iter()
        .filter(|e| e.active)
        .min_by(|a, b| {
            a.pos
                .distance_squared(player.pos)
                .partial_cmp(&b.pos.distance_squared(player.pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let Some(target) = nearest else {
        // Nothing to fight: drift back to the middle of the arena
        let home = world.map_size * 0.5 - player.pos;
        let mut input = steer(if home.length() > 100.0 { home } else { Vec2::ZERO });
        input.aim = player.pos + crate::heading(player.turret_angle) * 100.0;
        return input;
    };

    let offset = target.pos - player.pos;
    let dist = offset.length();
    let desired = if dist < AUTOPILOT_RETREAT {
        -offset
    } else if dist > ENEMY_FIRE_RANGE {
        offset
    } else {
        let strafe = Vec2::new(-offset.y, offset.x);
        if ((world.clock_ms / AUTOPILOT_STRAFE_MS) as i64) % 2 == 0 {
            strafe
        } else {
            -strafe
        }
    };

    let mut input = steer(desired);
    input.aim = target.pos;
    input.trigger = dist < AUTOPILOT_ENGAGE;
    input.dash = dist < AUTOPILOT_RETREAT * 0.5;
    input
}

/// 8-way keys approximating `desired`
fn steer(desired: Vec2) -> PlayerInput {
    // sin(22.5°): beyond this a diagonal key is added
    const AXIS: f32 = 0.38;
    let dir = desired.normalize_or_zero();
    PlayerInput {
        up: dir.y < -AXIS,
        down: dir.y > AXIS,
        left: dir.x < -AXIS,
        right: dir.x > AXIS,
        ..Default::default()
    }
}
