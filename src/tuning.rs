//! Data-driven game balance
//!
//! Every content number the simulation reads (tank classes, enemy profiles,
//! the level table, upgrade deltas, movement physics) lives here so it can be
//! tuned from JSON without touching the rules in [`crate::consts`].

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::sim::{Capabilities, ObstacleKind};

/// Selectable player tank classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TankClass {
    /// Heavy: slow, hard-hitting, high ricochet chance
    Tiger,
    /// Medium: fast, rapid fire, thin armor
    Sherman,
}

impl TankClass {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tiger" => Some(TankClass::Tiger),
            "sherman" => Some(TankClass::Sherman),
            _ => None,
        }
    }
}

/// Base stat bundle for a player tank class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankSpec {
    pub class: TankClass,
    pub name: String,
    pub max_hp: f32,
    /// Top speed (units/tick)
    pub speed: f32,
    /// Hull turn rate (radians/tick)
    pub turn_rate: f32,
    pub fire_interval_ms: f64,
    pub damage: f32,
    pub projectile_speed: f32,
    /// Chance in [0, 1] that an incoming hit is deflected
    pub ricochet: f32,
}

/// Regular enemy weight classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyClass {
    Light,
    Medium,
    Heavy,
}

/// Immutable stat bundle for an enemy class
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnemyProfile {
    pub hp: f32,
    pub speed: f32,
    pub damage: f32,
    pub fire_interval_ms: f64,
    pub reward: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyProfiles {
    pub light: EnemyProfile,
    pub medium: EnemyProfile,
    pub heavy: EnemyProfile,
}

impl EnemyProfiles {
    pub fn get(&self, class: EnemyClass) -> &EnemyProfile {
        match class {
            EnemyClass::Light => &self.light,
            EnemyClass::Medium => &self.medium,
            EnemyClass::Heavy => &self.heavy,
        }
    }
}

impl Default for EnemyProfiles {
    fn default() -> Self {
        Self {
            light: EnemyProfile {
                hp: 30.0,
                speed: 1.5,
                damage: 10.0,
                fire_interval_ms: 2000.0,
                reward: 10,
            },
            medium: EnemyProfile {
                hp: 60.0,
                speed: 1.2,
                damage: 20.0,
                fire_interval_ms: 3000.0,
                reward: 25,
            },
            heavy: EnemyProfile {
                hp: 150.0,
                speed: 0.8,
                damage: 40.0,
                fire_interval_ms: 4000.0,
                reward: 50,
            },
        }
    }
}

/// Boss stat bundle (fire timing and ranges are fixed in `consts`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BossProfile {
    pub hp: f32,
    pub speed: f32,
    pub radius: f32,
    /// Main turret damage per shot
    pub damage: f32,
    /// Sub-turret damage per shot
    pub sub_damage: f32,
    pub reward: u32,
}

impl Default for BossProfile {
    fn default() -> Self {
        Self {
            hp: 2000.0,
            speed: 0.6,
            radius: 60.0,
            damage: 30.0,
            sub_damage: 15.0,
            reward: 500,
        }
    }
}

/// Material properties for one obstacle kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub hp: f32,
    pub destructible: bool,
    pub blocks_movement: bool,
    pub blocks_projectiles: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleSpecs {
    pub terrain: ObstacleSpec,
    pub wall: ObstacleSpec,
}

impl ObstacleSpecs {
    pub fn get(&self, kind: ObstacleKind) -> &ObstacleSpec {
        match kind {
            ObstacleKind::Terrain => &self.terrain,
            ObstacleKind::Wall => &self.wall,
        }
    }
}

impl Default for ObstacleSpecs {
    fn default() -> Self {
        Self {
            terrain: ObstacleSpec {
                hp: 50.0,
                destructible: true,
                blocks_movement: true,
                blocks_projectiles: true,
            },
            wall: ObstacleSpec {
                hp: 200.0,
                destructible: true,
                blocks_movement: true,
                blocks_projectiles: true,
            },
        }
    }
}

/// One weighted entry of a level's enemy pool
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoolEntry {
    pub class: EnemyClass,
    pub weight: u32,
}

/// Parameters for one level, read by the tick every frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelParams {
    pub id: u32,
    pub name: String,
    /// Level length; ignored on boss levels
    pub duration_ms: f64,
    pub spawn_interval_ms: f64,
    pub enemy_pool: Vec<PoolEntry>,
    /// Requested arena size (never smaller than the viewport)
    pub map_size: Vec2,
    pub obstacle_count: u32,
    pub obstacle_kind: ObstacleKind,
    #[serde(default)]
    pub ice: bool,
    /// Boss level: the boss appears after this much level time
    #[serde(default)]
    pub boss_delay_ms: Option<f64>,
}

impl LevelParams {
    pub fn is_boss_level(&self) -> bool {
        self.boss_delay_ms.is_some()
    }

    /// Sum of the pool weights, widened so no table can overflow it
    pub fn total_weight(&self) -> u64 {
        self.enemy_pool.iter().map(|e| u64::from(e.weight)).sum()
    }

    /// Weighted draw from the enemy pool
    pub fn pick_enemy(&self, rng: &mut impl Rng) -> EnemyClass {
        let total = self.total_weight();
        if total == 0 {
            return EnemyClass::Light;
        }
        let mut roll = rng.random_range(0..total);
        for entry in &self.enemy_pool {
            let weight = u64::from(entry.weight);
            if roll < weight {
                return entry.class;
            }
            roll -= weight;
        }
        EnemyClass::Light
    }
}

/// Stat changes granted by an upgrade
///
/// Deltas are additive, factors multiplicative; unset fields are no-ops.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeEffect {
    pub ricochet_bonus: f32,
    pub damage_bonus: f32,
    pub projectile_speed_delta: f32,
    /// Floor applied after the projectile speed delta
    pub min_projectile_speed: f32,
    pub max_hp_bonus: f32,
    pub fire_interval_divisor: f64,
    pub speed_multiplier: f32,
    /// Capabilities switched on by this upgrade
    pub grants: Capabilities,
}

impl Default for UpgradeEffect {
    fn default() -> Self {
        Self {
            ricochet_bonus: 0.0,
            damage_bonus: 0.0,
            projectile_speed_delta: 0.0,
            min_projectile_speed: 0.0,
            max_hp_bonus: 0.0,
            fire_interval_divisor: 1.0,
            speed_multiplier: 1.0,
            grants: Capabilities::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeDef {
    pub id: String,
    pub name: String,
    pub tank: TankClass,
    pub cost: u32,
    pub effect: UpgradeEffect,
}

/// Player movement physics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Physics {
    /// Acceleration per tick as a fraction of top speed
    pub accel_factor: f32,
    /// Velocity retained per tick on normal ground
    pub ground_friction: f32,
    /// Velocity retained per tick on ice
    pub ice_friction: f32,
    /// Dash impulse as a multiple of top speed
    pub dash_multiplier: f32,
    pub dash_cooldown_ms: f64,
    /// Healing per tick with the regen capability
    pub regen_per_tick: f32,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            accel_factor: 0.15,
            ground_friction: 0.85,
            ice_friction: 0.98,
            dash_multiplier: 4.5,
            dash_cooldown_ms: 3000.0,
            regen_per_tick: 0.02,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub tanks: Vec<TankSpec>,
    pub enemies: EnemyProfiles,
    pub boss: BossProfile,
    pub obstacles: ObstacleSpecs,
    pub levels: Vec<LevelParams>,
    pub upgrades: Vec<UpgradeDef>,
    pub physics: Physics,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tanks: default_tanks(),
            enemies: EnemyProfiles::default(),
            boss: BossProfile::default(),
            obstacles: ObstacleSpecs::default(),
            levels: default_levels(),
            upgrades: default_upgrades(),
            physics: Physics::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate tuning JSON; missing sections fall back to defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json).map_err(GameError::TuningParse)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn tank(&self, class: TankClass) -> Option<&TankSpec> {
        self.tanks.iter().find(|t| t.class == class)
    }

    pub fn upgrade(&self, id: &str) -> Option<&UpgradeDef> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    /// Upgrades offered in the shop for a tank class
    pub fn upgrades_for(&self, class: TankClass) -> impl Iterator<Item = &UpgradeDef> {
        self.upgrades.iter().filter(move |u| u.tank == class)
    }

    /// Reject tables that would corrupt the simulation
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(GameError::InvalidTuning(msg));

        if self.tanks.is_empty() {
            return invalid("tank catalog is empty".into());
        }
        for tank in &self.tanks {
            if !(0.0..=1.0).contains(&tank.ricochet) {
                return invalid(format!("{:?} ricochet {} outside [0, 1]", tank.class, tank.ricochet));
            }
            if tank.max_hp <= 0.0 || tank.fire_interval_ms <= 0.0 {
                return invalid(format!("{:?} needs positive hp and fire interval", tank.class));
            }
        }

        for class in [EnemyClass::Light, EnemyClass::Medium, EnemyClass::Heavy] {
            let p = self.enemies.get(class);
            if p.hp <= 0.0 || p.fire_interval_ms <= 0.0 {
                return invalid(format!("{class:?} enemy needs positive hp and fire interval"));
            }
        }
        if self.boss.hp <= 0.0 || self.boss.radius <= 0.0 {
            return invalid("boss needs positive hp and radius".into());
        }

        if self.levels.is_empty() {
            return invalid("level table is empty".into());
        }
        for level in &self.levels {
            if level.spawn_interval_ms <= 0.0 {
                return invalid(format!("level {} spawn interval must be positive", level.id));
            }
            if !level.is_boss_level() && level.duration_ms <= 0.0 {
                return invalid(format!("level {} duration must be positive", level.id));
            }
            if level.map_size.x <= 0.0 || level.map_size.y <= 0.0 {
                return invalid(format!("level {} map size must be positive", level.id));
            }
            if level.total_weight() == 0 {
                return invalid(format!("level {} enemy pool is empty", level.id));
            }
        }

        for upgrade in &self.upgrades {
            let e = &upgrade.effect;
            if e.fire_interval_divisor <= 0.0 || e.speed_multiplier <= 0.0 {
                return invalid(format!("upgrade {} has a non-positive factor", upgrade.id));
            }
        }

        let p = &self.physics;
        if !(0.0..1.0).contains(&p.ground_friction) || !(0.0..1.0).contains(&p.ice_friction) {
            return invalid("friction must be in [0, 1)".into());
        }
        Ok(())
    }
}

fn default_tanks() -> Vec<TankSpec> {
    vec![
        TankSpec {
            class: TankClass::Tiger,
            name: "Tiger Heavy Tank".into(),
            max_hp: 200.0,
            speed: 2.0,
            turn_rate: 0.03,
            fire_interval_ms: 800.0,
            damage: 50.0,
            projectile_speed: 8.0,
            ricochet: 0.3,
        },
        TankSpec {
            class: TankClass::Sherman,
            name: "Sherman Medium Tank".into(),
            max_hp: 100.0,
            speed: 4.5,
            turn_rate: 0.06,
            fire_interval_ms: 250.0,
            damage: 15.0,
            projectile_speed: 12.0,
            ricochet: 0.05,
        },
    ]
}

fn pool(entries: &[(EnemyClass, u32)]) -> Vec<PoolEntry> {
    entries
        .iter()
        .map(|&(class, weight)| PoolEntry { class, weight })
        .collect()
}

fn default_levels() -> Vec<LevelParams> {
    use EnemyClass::*;
    vec![
        LevelParams {
            id: 1,
            name: "Breakout at Dawn".into(),
            duration_ms: 60_000.0,
            spawn_interval_ms: 2000.0,
            enemy_pool: pool(&[(Light, 1)]),
            map_size: Vec2::new(1600.0, 1200.0),
            obstacle_count: 10,
            obstacle_kind: ObstacleKind::Wall,
            ice: false,
            boss_delay_ms: None,
        },
        LevelParams {
            id: 2,
            name: "The Bridge".into(),
            duration_ms: 80_000.0,
            spawn_interval_ms: 1500.0,
            enemy_pool: pool(&[(Light, 1), (Medium, 1)]),
            map_size: Vec2::new(2000.0, 1000.0),
            obstacle_count: 20,
            obstacle_kind: ObstacleKind::Wall,
            ice: false,
            boss_delay_ms: None,
        },
        LevelParams {
            id: 3,
            name: "Steel Forest".into(),
            duration_ms: 100_000.0,
            spawn_interval_ms: 1200.0,
            enemy_pool: pool(&[(Medium, 2), (Heavy, 1)]),
            map_size: Vec2::new(2500.0, 2500.0),
            obstacle_count: 50,
            obstacle_kind: ObstacleKind::Terrain,
            ice: false,
            boss_delay_ms: None,
        },
        LevelParams {
            id: 4,
            name: "Ardennes Blizzard".into(),
            duration_ms: 100_000.0,
            spawn_interval_ms: 1800.0,
            enemy_pool: pool(&[(Heavy, 1)]),
            map_size: Vec2::new(3000.0, 3000.0),
            obstacle_count: 30,
            obstacle_kind: ObstacleKind::Terrain,
            ice: true,
            boss_delay_ms: None,
        },
        LevelParams {
            id: 5,
            name: "Fall of the Arsenal".into(),
            duration_ms: 120_000.0,
            spawn_interval_ms: 1000.0,
            enemy_pool: pool(&[(Light, 1), (Medium, 1), (Heavy, 1)]),
            map_size: Vec2::new(2000.0, 3000.0),
            obstacle_count: 20,
            obstacle_kind: ObstacleKind::Wall,
            ice: false,
            boss_delay_ms: Some(8000.0),
        },
    ]
}

fn default_upgrades() -> Vec<UpgradeDef> {
    vec![
        UpgradeDef {
            id: "t_armor".into(),
            name: "Sloped Armor".into(),
            tank: TankClass::Tiger,
            cost: 70,
            effect: UpgradeEffect {
                ricochet_bonus: 0.3,
                ..Default::default()
            },
        },
        UpgradeDef {
            id: "t_gun".into(),
            name: "88mm High-Explosive Gun".into(),
            tank: TankClass::Tiger,
            cost: 140,
            effect: UpgradeEffect {
                damage_bonus: 30.0,
                projectile_speed_delta: -2.0,
                min_projectile_speed: 4.0,
                grants: Capabilities {
                    area_damage: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        },
        UpgradeDef {
            id: "t_hp".into(),
            name: "Field Repair Bay".into(),
            tank: TankClass::Tiger,
            cost: 105,
            effect: UpgradeEffect {
                max_hp_bonus: 100.0,
                grants: Capabilities {
                    regen: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        },
        UpgradeDef {
            id: "s_gun".into(),
            name: "Twin Guns".into(),
            tank: TankClass::Sherman,
            cost: 70,
            effect: UpgradeEffect {
                fire_interval_divisor: 2.0,
                grants: Capabilities {
                    dual_guns: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        },
        UpgradeDef {
            id: "s_engine".into(),
            name: "Turbo Overdrive".into(),
            tank: TankClass::Sherman,
            cost: 105,
            effect: UpgradeEffect {
                speed_multiplier: 1.2,
                grants: Capabilities {
                    dash: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        },
        UpgradeDef {
            id: "s_pierce".into(),
            name: "Tungsten Rounds".into(),
            tank: TankClass::Sherman,
            cost: 140,
            effect: UpgradeEffect {
                damage_bonus: 30.0,
                ..Default::default()
            },
        },
    ]
}
