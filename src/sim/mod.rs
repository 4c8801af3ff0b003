//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Explicit delta-time and simulation clock, never wall-clock reads
//! - Seeded RNG only
//! - Fixed update order within a tick
//! - No rendering, audio or DOM dependencies (those are behind `services`)

pub mod collision;
pub mod enemy;
pub mod obstacle;
pub mod particle;
pub mod player;
pub mod projectile;
pub mod services;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::{in_blast, intersects};
pub use enemy::{AttackPhase, Behavior, BossState, DamageOutcome, Enemy, EnemyKind};
pub use obstacle::{Obstacle, ObstacleKind};
pub use particle::{Particle, palette};
pub use player::{Capabilities, PlayerInput, PlayerTank, apply_upgrade};
pub use projectile::Projectile;
pub use services::{AudioSink, GameHooks, NullAudio, Services, cues};
pub use snapshot::Snapshot;
pub use state::{Scheduled, ScheduledEffect, World};
pub use tick::{TickInput, tick};
