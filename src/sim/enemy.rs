//! Enemy tanks and the boss
//!
//! Regular enemies and the boss share one record (hp, reward, death) and
//! differ only in how they move and shoot. The boss keeps its extra turret
//! state in [`BossState`] inside [`EnemyKind::Boss`].

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::projectile::Projectile;
use crate::consts::*;
use crate::tuning::{BossProfile, EnemyClass, EnemyProfile};
use crate::{bearing, heading, lerp_angle, normalize_angle};

/// Regular enemy state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    /// Closing the distance to the player
    Chase,
    /// Inside standoff range, holding position
    Shooting,
}

/// Boss attack cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPhase {
    /// All turrets aim at the player
    Tracking,
    /// Turrets spin regardless of the player
    Barrage,
}

impl AttackPhase {
    fn flipped(self) -> Self {
        match self {
            AttackPhase::Tracking => AttackPhase::Barrage,
            AttackPhase::Barrage => AttackPhase::Tracking,
        }
    }
}

/// Boss-only turret and phase state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossState {
    pub sub_turret_angles: [f32; 2],
    pub phase: AttackPhase,
    /// Time spent in the current phase (ms)
    pub phase_timer_ms: f64,
    pub sub_damage: f32,
}

impl BossState {
    pub fn new(sub_damage: f32) -> Self {
        Self {
            sub_turret_angles: [0.0; 2],
            phase: AttackPhase::Tracking,
            phase_timer_ms: 0.0,
            sub_damage,
        }
    }

    /// Accumulate phase time; returns how many times the phase flipped
    pub fn advance_phase(&mut self, dt_ms: f64) -> u32 {
        self.phase_timer_ms += dt_ms.max(0.0);
        if !self.phase_timer_ms.is_finite() {
            self.phase_timer_ms = 0.0;
            return 0;
        }
        let flips = (self.phase_timer_ms / BOSS_PHASE_MS) as u32;
        self.phase_timer_ms -= f64::from(flips) * BOSS_PHASE_MS;
        if flips % 2 == 1 {
            self.phase = self.phase.flipped();
        }
        flips
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic(EnemyClass),
    Boss(BossState),
}

/// Result of applying damage to an enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Already dead; nothing changed
    Ignored,
    Survived,
    /// This hit killed it
    Destroyed { reward: u32, pos: Vec2, boss: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Units per tick
    pub speed: f32,
    /// Damage per shot
    pub damage: f32,
    pub fire_interval_ms: f64,
    pub body_angle: f32,
    pub turret_angle: f32,
    pub last_fire_ms: f64,
    pub reward: u32,
    pub behavior: Behavior,
    pub kind: EnemyKind,
    pub active: bool,
}

impl Enemy {
    /// Regular enemy; the first shot is delayed by a random jitter so
    /// enemies spawned together do not fire in volleys
    pub fn new(
        class: EnemyClass,
        profile: &EnemyProfile,
        pos: Vec2,
        now_ms: f64,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            pos,
            radius: ENEMY_RADIUS,
            hp: profile.hp,
            max_hp: profile.hp,
            speed: profile.speed,
            damage: profile.damage,
            fire_interval_ms: profile.fire_interval_ms,
            body_angle: 0.0,
            turret_angle: 0.0,
            last_fire_ms: now_ms + rng.random_range(0.0..ENEMY_FIRE_JITTER_MS),
            reward: profile.reward,
            behavior: Behavior::Chase,
            kind: EnemyKind::Basic(class),
            active: true,
        }
    }

    pub fn boss(profile: &BossProfile, pos: Vec2, now_ms: f64) -> Self {
        Self {
            pos,
            radius: profile.radius,
            hp: profile.hp,
            max_hp: profile.hp,
            speed: profile.speed,
            damage: profile.damage,
            fire_interval_ms: BOSS_FIRE_INTERVAL_MS,
            body_angle: std::f32::consts::FRAC_PI_2,
            turret_angle: std::f32::consts::FRAC_PI_2,
            last_fire_ms: now_ms,
            reward: profile.reward,
            behavior: Behavior::Chase,
            kind: EnemyKind::Boss(BossState::new(profile.sub_damage)),
            active: true,
        }
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EnemyKind::Boss(_))
    }

    pub fn boss_state(&self) -> Option<&BossState> {
        match &self.kind {
            EnemyKind::Boss(b) => Some(b),
            EnemyKind::Basic(_) => None,
        }
    }

    /// Advance one tick toward `player_pos`; returns any shots fired
    pub fn update(
        &mut self,
        player_pos: Vec2,
        map_size: Vec2,
        now_ms: f64,
        dt_ms: f64,
        rng: &mut impl Rng,
    ) -> Vec<Projectile> {
        if !self.active {
            return Vec::new();
        }
        let shots = if self.is_boss() {
            self.update_boss(player_pos, now_ms, dt_ms, rng)
        } else {
            self.update_basic(player_pos, now_ms)
        };
        self.clamp_to(map_size);
        shots
    }

    fn update_basic(&mut self, player_pos: Vec2, now_ms: f64) -> Vec<Projectile> {
        let dist = self.pos.distance(player_pos);
        let aim = bearing(self.pos, player_pos);

        // Turret aim is perfect, the hull turns slowly
        self.turret_angle = aim;
        if dist > ENEMY_STANDOFF {
            self.behavior = Behavior::Chase;
            self.body_angle = lerp_angle(self.body_angle, aim, ENEMY_TURN_RATE);
            self.pos += heading(self.body_angle) * self.speed;
        } else {
            self.behavior = Behavior::Shooting;
        }

        if now_ms - self.last_fire_ms > self.fire_interval_ms && dist < ENEMY_FIRE_RANGE {
            self.last_fire_ms = now_ms;
            let muzzle = self.pos + heading(self.turret_angle) * self.radius * MUZZLE_REACH;
            return vec![Projectile::new(
                muzzle,
                self.turret_angle,
                ENEMY_PROJECTILE_SPEED,
                self.damage,
                false,
            )];
        }
        Vec::new()
    }

    fn update_boss(
        &mut self,
        player_pos: Vec2,
        now_ms: f64,
        dt_ms: f64,
        rng: &mut impl Rng,
    ) -> Vec<Projectile> {
        let dist = self.pos.distance(player_pos);
        let aim = bearing(self.pos, player_pos);

        self.behavior = Behavior::Chase;
        self.body_angle = lerp_angle(self.body_angle, aim, BOSS_TURN_RATE);
        self.pos += heading(self.body_angle) * self.speed;

        let EnemyKind::Boss(boss) = &mut self.kind else {
            return Vec::new();
        };
        if boss.advance_phase(dt_ms) > 0 {
            log::debug!("Boss phase -> {:?}", boss.phase);
        }

        match boss.phase {
            AttackPhase::Tracking => {
                self.turret_angle = aim;
                boss.sub_turret_angles = [aim + BOSS_SUB_OFFSET, aim - BOSS_SUB_OFFSET];
            }
            AttackPhase::Barrage => {
                self.turret_angle = normalize_angle(self.turret_angle + BOSS_MAIN_SPIN);
                for angle in &mut boss.sub_turret_angles {
                    *angle = normalize_angle(*angle - BOSS_SUB_SPIN);
                }
            }
        }

        if now_ms - self.last_fire_ms <= self.fire_interval_ms || dist >= BOSS_FIRE_RANGE {
            return Vec::new();
        }
        self.last_fire_ms = now_ms;

        let mut shots = Vec::with_capacity(3);
        let muzzle = self.pos + heading(self.turret_angle) * self.radius * MUZZLE_REACH;
        shots.push(
            Projectile::new(
                muzzle,
                self.turret_angle,
                BOSS_MAIN_PROJECTILE_SPEED,
                self.damage,
                false,
            )
            .with_area_effect(true),
        );

        let subs_fire = match boss.phase {
            AttackPhase::Tracking => rng.random_bool(BOSS_SUB_FIRE_CHANCE),
            AttackPhase::Barrage => true,
        };
        if subs_fire {
            for &angle in &boss.sub_turret_angles {
                let muzzle = self.pos + heading(angle) * self.radius * MUZZLE_REACH;
                shots.push(
                    Projectile::new(
                        muzzle,
                        angle,
                        BOSS_SUB_PROJECTILE_SPEED,
                        boss.sub_damage,
                        false,
                    )
                    .with_area_effect(true),
                );
            }
        }
        shots
    }

    fn clamp_to(&mut self, map_size: Vec2) {
        let lo = Vec2::splat(self.radius);
        let hi = (map_size - Vec2::splat(self.radius)).max(lo);
        self.pos = self.pos.clamp(lo, hi);
    }

    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        if !self.active {
            return DamageOutcome::Ignored;
        }
        self.hp -= amount;
        if self.hp <= 0.0 {
            self.hp = 0.0;
            self.active = false;
            return DamageOutcome::Destroyed {
                reward: self.reward,
                pos: self.pos,
                boss: self.is_boss(),
            };
        }
        DamageOutcome::Survived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const MAP: Vec2 = Vec2::new(2000.0, 2000.0);

    fn light(pos: Vec2) -> Enemy {
        let mut rng = Pcg32::seed_from_u64(5);
        let t = Tuning::default();
        Enemy::new(EnemyClass::Light, t.enemies.get(EnemyClass::Light), pos, 0.0, &mut rng)
    }

    #[test]
    fn test_chase_then_hold() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut e = light(Vec2::new(1000.0, 500.0));
        let player = Vec2::new(1000.0, 1000.0);

        e.update(player, MAP, 0.0, 16.0, &mut rng);
        assert_eq!(e.behavior, Behavior::Chase);
        // Turret snaps to the bearing; hull only starts turning
        assert!((e.turret_angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert!(e.body_angle < e.turret_angle);

        e.pos = Vec2::new(1000.0, 850.0);
        let before = e.pos;
        e.update(player, MAP, 0.0, 16.0, &mut rng);
        assert_eq!(e.behavior, Behavior::Shooting);
        assert_eq!(e.pos, before);
    }

    #[test]
    fn test_fire_gate() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut e = light(Vec2::new(500.0, 500.0));
        e.last_fire_ms = 0.0;
        let player = Vec2::new(500.0, 800.0);

        assert!(e.update(player, MAP, 1999.0, 16.0, &mut rng).is_empty());
        let shots = e.update(player, MAP, 2001.0, 16.0, &mut rng);
        assert_eq!(shots.len(), 1);
        assert!(!shots[0].from_player);
        assert_eq!(shots[0].speed, ENEMY_PROJECTILE_SPEED);
        assert_eq!(shots[0].damage, 10.0);
        // Cooldown restarts
        assert!(e.update(player, MAP, 2100.0, 16.0, &mut rng).is_empty());
    }

    #[test]
    fn test_out_of_range_holds_fire() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut e = light(Vec2::new(100.0, 100.0));
        e.last_fire_ms = 0.0;
        assert!(e.update(Vec2::new(1500.0, 1500.0), MAP, 10_000.0, 16.0, &mut rng).is_empty());
    }

    #[test]
    fn test_clamped_into_arena() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut e = light(Vec2::new(-30.0, 500.0));
        e.update(Vec2::new(1000.0, 1000.0), MAP, 0.0, 16.0, &mut rng);
        assert!(e.pos.x >= e.radius);
    }

    #[test]
    fn test_two_hits_kill_light() {
        let mut e = light(Vec2::new(500.0, 500.0));
        assert_eq!(e.apply_damage(20.0), DamageOutcome::Survived);
        assert_eq!(e.hp, 10.0);
        assert!(matches!(
            e.apply_damage(20.0),
            DamageOutcome::Destroyed { reward: 10, boss: false, .. }
        ));
        assert_eq!(e.hp, 0.0);
        assert!(!e.active);
        assert_eq!(e.apply_damage(20.0), DamageOutcome::Ignored);
    }

    #[test]
    fn test_boss_phase_flips_once_after_5s() {
        for step in [1000.0, 500.0, 250.0, 125.0, 50.0] {
            let mut boss = BossState::new(15.0);
            let mut flips = 0;
            let mut elapsed = 0.0;
            while elapsed < 5000.0 {
                flips += boss.advance_phase(step);
                elapsed += step;
            }
            assert_eq!(flips, 1, "step {step}");
            assert_eq!(boss.phase, AttackPhase::Barrage);
        }
    }

    #[test]
    fn test_boss_phase_long_step() {
        let mut boss = BossState::new(15.0);
        assert_eq!(boss.advance_phase(3.5 * BOSS_PHASE_MS), 3);
        assert_eq!(boss.phase, AttackPhase::Barrage);
        assert_eq!(boss.phase_timer_ms, 0.5 * BOSS_PHASE_MS);

        assert_eq!(boss.advance_phase(f64::INFINITY), 0);
        assert_eq!(boss.phase_timer_ms, 0.0);
        assert_eq!(boss.phase, AttackPhase::Barrage);
    }

    #[test]
    fn test_boss_barrage_spins_turrets() {
        let mut rng = Pcg32::seed_from_u64(1);
        let t = Tuning::default();
        let mut e = Enemy::boss(&t.boss, Vec2::new(1000.0, 200.0), 0.0);
        if let EnemyKind::Boss(b) = &mut e.kind {
            b.phase = AttackPhase::Barrage;
        }
        let main_before = e.turret_angle;
        e.update(Vec2::new(1000.0, 1500.0), MAP, 0.0, 16.0, &mut rng);
        assert!((normalize_angle(e.turret_angle - main_before) - BOSS_MAIN_SPIN).abs() < 1e-5);
    }

    #[test]
    fn test_boss_barrage_fires_all_turrets() {
        let mut rng = Pcg32::seed_from_u64(1);
        let t = Tuning::default();
        let mut e = Enemy::boss(&t.boss, Vec2::new(1000.0, 200.0), 0.0);
        if let EnemyKind::Boss(b) = &mut e.kind {
            b.phase = AttackPhase::Barrage;
        }
        let shots = e.update(Vec2::new(1000.0, 900.0), MAP, 250.0, 16.0, &mut rng);
        assert_eq!(shots.len(), 3);
        assert!(shots.iter().all(|s| s.area_effect && !s.from_player));
        assert_eq!(shots[0].speed, BOSS_MAIN_PROJECTILE_SPEED);
        assert_eq!(shots[1].speed, BOSS_SUB_PROJECTILE_SPEED);
        assert!(shots[1].damage < shots[0].damage);
        // Every barrel fires from the same reach off the hull centre
        let reach = e.radius * MUZZLE_REACH;
        for shot in &shots {
            assert!((shot.pos.distance(e.pos) - reach).abs() < 1e-3);
        }
    }

    #[test]
    fn test_boss_tracking_aims_subs_around_bearing() {
        let mut rng = Pcg32::seed_from_u64(1);
        let t = Tuning::default();
        let mut e = Enemy::boss(&t.boss, Vec2::new(1000.0, 200.0), 0.0);
        e.update(Vec2::new(1000.0, 1500.0), MAP, 0.0, 16.0, &mut rng);
        let b = e.boss_state().unwrap();
        let aim = bearing(e.pos, Vec2::new(1000.0, 1500.0));
        assert!((b.sub_turret_angles[0] - (aim + BOSS_SUB_OFFSET)).abs() < 0.01);
        assert!((b.sub_turret_angles[1] - (aim - BOSS_SUB_OFFSET)).abs() < 0.01);
    }
}
