//! Castle Catapult - a physics-driven siege game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (rigid bodies, destructible entities, levels, scoring)
//! - `scene`: Renderer collaborator interface
//! - `progress`: Per-level best scores and aggregate stats
//! - `persistence`: Save storage backends (LocalStorage on web)
//! - `leaderboard`: Remote leaderboard wire types and validation
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod leaderboard;
pub mod persistence;
pub mod progress;
pub mod scene;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{ConfigError, LeaderboardError, PersistenceError};
pub use progress::{LevelRecord, ProgressBook, TotalStats};
pub use tuning::Tuning;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Gravity magnitude (m/s²). Shared by the world and the trajectory preview.
    pub const GRAVITY: f32 = 9.82;
    /// Fixed physics substep (60 Hz)
    pub const PHYSICS_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per `World::step` call
    pub const MAX_SUBSTEPS: u32 = 3;
    /// Largest frame time fed to the physics step (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Anything below this height has fallen out of the world
    pub const FALL_FLOOR_Y: f32 = -10.0;

    /// Projectile defaults
    pub const PROJECTILE_RADIUS: f32 = 0.4;
    pub const PROJECTILE_MASS: f32 = 5.0;
    /// Hard lifetime of a fired projectile (seconds)
    pub const PROJECTILE_TTL: f32 = 10.0;

    /// Building damage: impacts below this force are ignored
    pub const DAMAGE_THRESHOLD: f32 = 10.0;
    /// Building damage per unit of force above the threshold
    pub const DAMAGE_MULTIPLIER: f32 = 2.0;

    /// Target proximity hit radius (meters, center to center)
    pub const TARGET_HIT_RADIUS: f32 = 1.5;
    /// Damage dealt to a target per proximity hit
    pub const TARGET_HIT_DAMAGE: f32 = 100.0;

    /// Delay after a shot ends before the next shot / outcome check (seconds)
    pub const SETTLE_DELAY: f32 = 2.0;
}

/// Unit direction for a yaw (around +Y, 0 = +X) and pitch (elevation above the horizon)
#[inline]
pub fn direction_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    let (sp, cp) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();
    Vec3::new(cp * cy, sp, -cp * sy)
}

/// Round to one decimal place
#[inline]
pub fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
