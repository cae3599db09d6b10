//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Fixed physics substep, bounded per frame
//! - Seeded RNG only (levels regenerate identically)
//! - Stable iteration order (bodies by slot, entities by id)
//! - No rendering or platform dependencies; visuals go through [`crate::scene`]

pub mod building;
pub mod catapult;
pub mod entity;
pub mod generator;
pub mod layouts;
pub mod level;
pub mod projectile;
pub mod rng;
pub mod scenery;
pub mod scoring;
pub mod session;
pub mod shape;
pub mod target;
pub mod trajectory;
pub mod world;

pub use building::{Archetype, Building, BuildingCategory, BuildingId, BuildingMaterial, DamageRules};
pub use catapult::{AimInput, Catapult};
pub use entity::{EntityCore, Health, LifeEvent, SimContext, Transition, Vitality};
pub use layouts::{BuildingPlacement, LevelPlan, TargetPlacement};
pub use level::{Level, LevelEvent, ProximityReport};
pub use projectile::{Projectile, ProjectileState, SpentReason};
pub use rng::{SeededRng, level_seed};
pub use scenery::{Scenery, SceneryKind};
pub use scoring::{ShotTally, compute_score};
pub use session::{GamePhase, GameSession, TickEvent, TickInput};
pub use shape::Shape;
pub use target::{Target, TargetId, TargetKind};
pub use trajectory::{Trajectory, TrajectoryConfig, predict};
pub use world::{
    BodyDesc, BodyHandle, CallbackId, CollisionEvent, ContactMaterial, ContactMaterialTable,
    BodyState, MaterialTag, World,
};
