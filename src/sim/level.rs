//! One level instance: live buildings, targets and scenery, plus the
//! collision routing that turns projectile impacts into building damage.
//!
//! Struck bodies are matched to their owner through an explicit registry
//! (`BodyHandle -> BuildingId`), never by object identity. The World
//! callback only records impacts; [`Level::apply_impacts`] applies them
//! right after the physics step, inside the same tick.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::building::{Building, BuildingCategory, BuildingId, DamageRules};
use super::entity::SimContext;
use super::generator;
use super::layouts::{self, LevelPlan};
use super::projectile::Projectile;
use super::rng::{SeededRng, level_seed};
use super::scenery::{self, Scenery};
use super::target::{Target, TargetId, TargetKind};
use super::world::{BodyHandle, CallbackId, World};
use crate::tuning::Tuning;

/// Scenery draws from its own stream so props never shift the layout
const SCENERY_SALT: u64 = 0x5CE7_E41E;

/// A projectile/object contact waiting to be applied
#[derive(Debug, Clone, Copy, PartialEq)]
struct Impact {
    object: BodyHandle,
    force: f32,
}

type Inbox = Rc<RefCell<Vec<Impact>>>;

/// Something the session needs to score or announce
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LevelEvent {
    BuildingDestroyed {
        id: BuildingId,
        category: BuildingCategory,
        score_value: f32,
        fell: bool,
    },
    TargetDestroyed {
        id: TargetId,
        kind: TargetKind,
        score_value: f32,
        fell: bool,
    },
}

/// Result of one proximity scan
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProximityReport {
    pub hits: u32,
    pub destroyed: u32,
    /// Score value of targets destroyed by this scan
    pub score: f32,
}

pub struct Level {
    index: u32,
    rng: SeededRng,
    ammo: u32,
    buildings: Vec<Building>,
    targets: Vec<Target>,
    scenery: Vec<Scenery>,
    registry: HashMap<BodyHandle, BuildingId>,
    next_building_id: u32,
    next_target_id: u32,
    inbox: Inbox,
    handler: Option<CallbackId>,
    rules: DamageRules,
    hit_radius: f32,
    hit_damage: f32,
    events: Vec<LevelEvent>,
}

impl std::fmt::Debug for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Level")
            .field("index", &self.index)
            .field("seed", &self.rng.seed())
            .field("buildings", &self.buildings.len())
            .field("targets", &self.targets.len())
            .field("handler", &self.handler)
            .finish()
    }
}

impl Level {
    /// Create a level and install its collision handler. Any handler left
    /// in the World by a previous level is dropped first.
    pub fn new(index: u32, base_seed: u64, world: &mut World, tuning: &Tuning) -> Self {
        let mut level = Self {
            index,
            rng: SeededRng::new(level_seed(base_seed, index)),
            ammo: 0,
            buildings: Vec::new(),
            targets: Vec::new(),
            scenery: Vec::new(),
            registry: HashMap::new(),
            next_building_id: 0,
            next_target_id: 0,
            inbox: Rc::new(RefCell::new(Vec::new())),
            handler: None,
            rules: DamageRules::from(tuning),
            hit_radius: tuning.target_hit_radius,
            hit_damage: tuning.target_hit_damage,
            events: Vec::new(),
        };
        level.install_handler(world);
        level
    }

    fn install_handler(&mut self, world: &mut World) {
        world.clear_collision_callbacks();
        let inbox = Rc::clone(&self.inbox);
        let id = world.register_collision_callback(Box::new(move |event| {
            inbox.borrow_mut().push(Impact {
                object: event.object,
                force: event.impact_force,
            });
        }));
        self.handler = Some(id);
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn scenery(&self) -> &[Scenery] {
        &self.scenery
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// The layout this level would load
    pub fn plan(&self) -> LevelPlan {
        let mut rng = self.rng.clone();
        rng.reset();
        layouts::authored(self.index).unwrap_or_else(|| generator::generate(self.index, &mut rng))
    }

    /// Populate the level. Deterministic for (index, seed). Returns live targets.
    pub fn load(&mut self, ctx: &mut SimContext<'_>) -> usize {
        self.rng.reset();
        let plan = self.plan();
        self.load_plan(&plan, ctx)
    }

    /// Populate from an explicit plan (editor content goes through here too)
    pub fn load_plan(&mut self, plan: &LevelPlan, ctx: &mut SimContext<'_>) -> usize {
        if self.handler.is_none() {
            self.install_handler(ctx.world);
        }
        ctx.world.create_ground_body();

        self.ammo = plan.ammo;
        for b in &plan.buildings {
            self.add_building(b.category, b.base, b.yaw, ctx);
        }
        for t in &plan.targets {
            self.add_target(t.kind, t.base, ctx);
        }

        let mut props_rng = SeededRng::new(self.rng.seed() ^ SCENERY_SALT);
        self.scenery = scenery::scatter(&mut props_rng, ctx.scene);

        log::info!(
            "level {} loaded: {} buildings, {} targets, {} shots",
            self.index,
            self.buildings.len(),
            self.targets.len(),
            self.ammo
        );
        self.remaining_targets()
    }

    /// Place a building resting on `base`
    pub fn add_building(
        &mut self,
        category: BuildingCategory,
        base: Vec3,
        yaw: f32,
        ctx: &mut SimContext<'_>,
    ) -> BuildingId {
        let id = BuildingId(self.next_building_id);
        self.next_building_id += 1;
        let center = base + Vec3::Y * category.stats().shape.bottom_offset();
        let building = Building::spawn(id, category, center, yaw, ctx);
        if let Some(body) = building.body() {
            self.registry.insert(body, id);
        }
        self.buildings.push(building);
        id
    }

    /// Place a target standing on `base`
    pub fn add_target(&mut self, kind: TargetKind, base: Vec3, ctx: &mut SimContext<'_>) -> TargetId {
        let id = TargetId(self.next_target_id);
        self.next_target_id += 1;
        let center = base + Vec3::Y * kind.shape().bottom_offset();
        self.targets.push(Target::spawn(id, kind, center, ctx));
        id
    }

    /// Route impacts recorded during the last physics step to their buildings.
    /// Returns the number of buildings destroyed.
    pub fn apply_impacts(&mut self, ctx: &mut SimContext<'_>) -> u32 {
        let impacts = std::mem::take(&mut *self.inbox.borrow_mut());
        let mut destroyed = 0;
        for impact in impacts {
            let Some(id) = self.registry.get(&impact.object).copied() else {
                continue;
            };
            let Ok(slot) = self.buildings.binary_search_by_key(&id, |b| b.id) else {
                continue;
            };
            let building = &mut self.buildings[slot];
            log::debug!("impact {:.1} on {} #{}", impact.force, building.category, id.0);
            if building.take_damage(impact.force, &self.rules, ctx) {
                self.registry.remove(&impact.object);
                self.events.push(LevelEvent::BuildingDestroyed {
                    id,
                    category: building.category,
                    score_value: building.score_value(),
                    fell: false,
                });
                destroyed += 1;
            }
        }
        destroyed
    }

    /// Proximity scan of live targets around a projectile
    pub fn check_collisions(&mut self, projectile: &Projectile, ctx: &mut SimContext<'_>) -> ProximityReport {
        let mut report = ProximityReport::default();
        let Some(shot) = projectile.body().and_then(|b| ctx.world.position(b)) else {
            return report;
        };
        for target in self.targets.iter_mut().filter(|t| !t.is_destroyed()) {
            let Some(pos) = target.body().and_then(|b| ctx.world.position(b)) else {
                continue;
            };
            if shot.distance(pos) >= self.hit_radius {
                continue;
            }
            report.hits += 1;
            if target.take_damage(self.hit_damage, ctx) {
                report.destroyed += 1;
                report.score += target.score_value();
                self.events.push(LevelEvent::TargetDestroyed {
                    id: target.id,
                    kind: target.kind,
                    score_value: target.score_value(),
                    fell: false,
                });
            }
        }
        report
    }

    /// Sync entities, animate scenery, then prune the dead
    pub fn update(&mut self, dt: f32, ctx: &mut SimContext<'_>) {
        for building in &mut self.buildings {
            if building.update(ctx) {
                self.events.push(LevelEvent::BuildingDestroyed {
                    id: building.id,
                    category: building.category,
                    score_value: building.score_value(),
                    fell: true,
                });
            }
        }
        for target in &mut self.targets {
            if target.update(ctx) {
                self.events.push(LevelEvent::TargetDestroyed {
                    id: target.id,
                    kind: target.kind,
                    score_value: target.score_value(),
                    fell: true,
                });
            }
        }
        for prop in &mut self.scenery {
            prop.update(dt, ctx.scene);
        }

        self.buildings.retain(|b| !b.is_destroyed());
        self.targets.retain(|t| !t.is_destroyed());
        let buildings = &self.buildings;
        self.registry
            .retain(|_, id| buildings.binary_search_by_key(id, |b| b.id).is_ok());
    }

    /// Live targets; zero means the level is won
    pub fn remaining_targets(&self) -> usize {
        self.targets.iter().filter(|t| !t.is_destroyed()).count()
    }

    /// Events since the last drain
    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        std::mem::take(&mut self.events)
    }

    /// Tear everything down and drop every World collision handler.
    /// A following `load` re-installs this level's handler.
    pub fn clear(&mut self, ctx: &mut SimContext<'_>) {
        for building in &mut self.buildings {
            building.destroy(ctx);
        }
        for target in &mut self.targets {
            target.destroy(ctx);
        }
        for prop in &mut self.scenery {
            prop.remove(ctx.scene);
        }
        self.buildings.clear();
        self.targets.clear();
        self.scenery.clear();
        self.registry.clear();
        self.inbox.borrow_mut().clear();
        self.events.clear();
        self.ammo = 0;

        ctx.world.clear_collision_callbacks();
        self.handler = None;
        log::info!("level {} cleared", self.index);
    }
}
