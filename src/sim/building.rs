//! Destructible structures
//!
//! Stats come from two small tables: a material row (base health, base
//! score, density) and an archetype row (dimensions, multiplier). A new
//! structure type is a new row, not a new branch.

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::entity::{EntityCore, Health, SimContext};
use super::shape::Shape;
use super::world::{BodyDesc, BodyHandle, MaterialTag};
use crate::scene::RenderNode;

/// Building materials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingMaterial {
    Wood,
    Stone,
    /// Indestructible, static
    Iron,
}

/// Structure archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Block,
    Plank,
    Platform,
    Wall,
    Tower,
    Castle,
}

struct MaterialRow {
    material: BuildingMaterial,
    tag: &'static str,
    base_health: f32,
    base_score: f32,
    density: f32,
    indestructible: bool,
}

struct ArchetypeRow {
    archetype: Archetype,
    tag: &'static str,
    /// Full width, height, depth
    size: [f32; 3],
    multiplier: f32,
}

static MATERIALS: [MaterialRow; 3] = [
    MaterialRow {
        material: BuildingMaterial::Wood,
        tag: "wood",
        base_health: 40.0,
        base_score: 0.1,
        density: 15.0,
        indestructible: false,
    },
    MaterialRow {
        material: BuildingMaterial::Stone,
        tag: "stone",
        base_health: 100.0,
        base_score: 0.25,
        density: 40.0,
        indestructible: false,
    },
    MaterialRow {
        material: BuildingMaterial::Iron,
        tag: "iron",
        base_health: f32::INFINITY,
        base_score: 0.0,
        density: 0.0,
        indestructible: true,
    },
];

static ARCHETYPES: [ArchetypeRow; 6] = [
    ArchetypeRow {
        archetype: Archetype::Block,
        tag: "block",
        size: [1.0, 1.0, 1.0],
        multiplier: 1.0,
    },
    ArchetypeRow {
        archetype: Archetype::Plank,
        tag: "plank",
        size: [3.0, 0.3, 1.0],
        multiplier: 1.0,
    },
    ArchetypeRow {
        archetype: Archetype::Platform,
        tag: "platform",
        size: [4.0, 0.5, 3.0],
        multiplier: 1.5,
    },
    ArchetypeRow {
        archetype: Archetype::Wall,
        tag: "wall",
        size: [0.6, 2.5, 4.0],
        multiplier: 2.0,
    },
    ArchetypeRow {
        archetype: Archetype::Tower,
        tag: "tower",
        size: [1.6, 5.0, 1.6],
        multiplier: 3.0,
    },
    ArchetypeRow {
        archetype: Archetype::Castle,
        tag: "castle",
        size: [5.0, 4.0, 5.0],
        multiplier: 5.0,
    },
];

impl BuildingMaterial {
    pub const ALL: [BuildingMaterial; 3] = [Self::Wood, Self::Stone, Self::Iron];

    fn row(self) -> &'static MaterialRow {
        let row = &MATERIALS[self as usize];
        debug_assert_eq!(row.material, self, "material table out of order");
        row
    }

    pub fn tag(self) -> &'static str {
        self.row().tag
    }
}

impl Archetype {
    pub const ALL: [Archetype; 6] = [
        Self::Block,
        Self::Plank,
        Self::Platform,
        Self::Wall,
        Self::Tower,
        Self::Castle,
    ];

    fn row(self) -> &'static ArchetypeRow {
        let row = &ARCHETYPES[self as usize];
        debug_assert_eq!(row.archetype, self, "archetype table out of order");
        row
    }

    pub fn tag(self) -> &'static str {
        self.row().tag
    }

    /// Full dimensions (width, height, depth)
    pub fn size(self) -> Vec3 {
        Vec3::from_array(self.row().size)
    }

    pub fn multiplier(self) -> f32 {
        self.row().multiplier
    }
}

/// Derived stats for a category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingStats {
    pub max_health: f32,
    pub score_value: f32,
    /// 0 for indestructible (static) structures
    pub mass: f32,
    pub shape: Shape,
    pub indestructible: bool,
}

/// Category tag: material + archetype ("stone_tower")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingCategory {
    pub material: BuildingMaterial,
    pub archetype: Archetype,
}

impl BuildingCategory {
    pub const fn new(material: BuildingMaterial, archetype: Archetype) -> Self {
        Self {
            material,
            archetype,
        }
    }

    /// Parse a "material_archetype" tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        let (material, archetype) = tag.split_once('_')?;
        let material = *BuildingMaterial::ALL
            .iter()
            .find(|m| m.tag() == material)?;
        let archetype = *Archetype::ALL.iter().find(|a| a.tag() == archetype)?;
        Some(Self::new(material, archetype))
    }

    pub fn tag(&self) -> String {
        format!("{}_{}", self.material.tag(), self.archetype.tag())
    }

    pub fn stats(&self) -> BuildingStats {
        let m = self.material.row();
        let a = self.archetype.row();
        let size = self.archetype.size();
        let shape = Shape::cuboid(size.x, size.y, size.z);
        if m.indestructible {
            return BuildingStats {
                max_health: f32::INFINITY,
                score_value: 0.0,
                mass: 0.0,
                shape,
                indestructible: true,
            };
        }
        BuildingStats {
            max_health: m.base_health * a.multiplier,
            score_value: m.base_score * a.multiplier,
            mass: m.density * shape.volume(),
            shape,
            indestructible: false,
        }
    }
}

impl fmt::Display for BuildingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.material.tag(), self.archetype.tag())
    }
}

/// Force-to-damage conversion for buildings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageRules {
    pub threshold: f32,
    pub multiplier: f32,
}

impl Default for DamageRules {
    fn default() -> Self {
        Self {
            threshold: crate::consts::DAMAGE_THRESHOLD,
            multiplier: crate::consts::DAMAGE_MULTIPLIER,
        }
    }
}

impl From<&crate::Tuning> for DamageRules {
    fn from(tuning: &crate::Tuning) -> Self {
        Self {
            threshold: tuning.damage_threshold,
            multiplier: tuning.damage_multiplier,
        }
    }
}

impl DamageRules {
    /// Damage for an impact; sub-threshold impacts deal nothing (no chip damage)
    pub fn damage_for(&self, force: f32) -> Option<f32> {
        if force >= self.threshold {
            Some((force - self.threshold) * self.multiplier)
        } else {
            None
        }
    }
}

/// Stable building identifier within a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

/// A destructible (or indestructible) structure
#[derive(Debug, Clone)]
pub struct Building {
    pub id: BuildingId,
    pub category: BuildingCategory,
    core: EntityCore,
}

impl Building {
    /// Create the body and renderable. `position` is the center of the box.
    pub fn spawn(
        id: BuildingId,
        category: BuildingCategory,
        position: Vec3,
        yaw: f32,
        ctx: &mut SimContext<'_>,
    ) -> Self {
        let stats = category.stats();
        let orientation = Quat::from_rotation_y(yaw);
        let body = ctx.world.add_body(
            BodyDesc::new(stats.shape, stats.mass, MaterialTag::Object)
                .at(position)
                .rotated(orientation),
        );
        let render = ctx.scene.add(RenderNode::new(
            category.tag(),
            stats.shape,
            position,
            orientation,
        ));
        let health = if stats.indestructible {
            Health::indestructible()
        } else {
            Health::new(stats.max_health)
        };
        Self {
            id,
            category,
            core: EntityCore::new(position, orientation, health, stats.score_value, body, render),
        }
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.core.body()
    }

    pub fn position(&self) -> Vec3 {
        self.core.position
    }

    pub fn health(&self) -> &Health {
        &self.core.health
    }

    pub fn score_value(&self) -> f32 {
        self.core.score_value
    }

    pub fn is_destroyed(&self) -> bool {
        self.core.is_destroyed()
    }

    pub fn is_indestructible(&self) -> bool {
        self.core.health.is_indestructible()
    }

    /// Apply an impact force. Returns true if this call destroyed the building.
    pub fn take_damage(&mut self, force: f32, rules: &DamageRules, ctx: &mut SimContext<'_>) -> bool {
        let Some(damage) = rules.damage_for(force) else {
            return false;
        };
        let destroyed = self.core.take_damage(damage, ctx);
        if destroyed {
            log::debug!("{} #{} destroyed by impact {:.1}", self.category, self.id.0, force);
        }
        destroyed
    }

    /// Idempotent; true on the first call
    pub fn destroy(&mut self, ctx: &mut SimContext<'_>) -> bool {
        self.core.destroy(ctx)
    }

    /// Sync from physics. Returns true if it fell out of the world this call.
    pub fn update(&mut self, ctx: &mut SimContext<'_>) -> bool {
        let fell = self.core.sync(ctx);
        if fell {
            log::debug!("{} #{} fell out of the world", self.category, self.id.0);
        }
        fell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::RecordingScene;
    use crate::sim::World;
    use proptest::prelude::*;

    const STONE_WALL: BuildingCategory =
        BuildingCategory::new(BuildingMaterial::Stone, Archetype::Wall);
    const IRON_WALL: BuildingCategory = BuildingCategory::new(BuildingMaterial::Iron, Archetype::Wall);

    fn spawn(category: BuildingCategory, world: &mut World, scene: &mut RecordingScene) -> Building {
        let mut ctx = SimContext::new(world, scene);
        Building::spawn(BuildingId(1), category, Vec3::new(0.0, 1.25, 0.0), 0.0, &mut ctx)
    }

    #[test]
    fn test_tags_round_trip_through_table() {
        for material in BuildingMaterial::ALL {
            for archetype in Archetype::ALL {
                let category = BuildingCategory::new(material, archetype);
                assert_eq!(BuildingCategory::from_tag(&category.tag()), Some(category));
                assert_eq!(category.to_string(), category.tag());
            }
        }
        assert_eq!(BuildingCategory::from_tag("gold_wall"), None);
        assert_eq!(BuildingCategory::from_tag("wood"), None);
    }

    #[test]
    fn test_stats_scale_with_archetype() {
        let wood_block = BuildingCategory::new(BuildingMaterial::Wood, Archetype::Block).stats();
        let wood_castle = BuildingCategory::new(BuildingMaterial::Wood, Archetype::Castle).stats();
        assert_eq!(wood_block.max_health, 40.0);
        assert_eq!(wood_castle.max_health, 200.0);
        assert!((wood_castle.score_value - 0.5).abs() < 1e-6);

        let stone_wall = STONE_WALL.stats();
        assert_eq!(stone_wall.max_health, 200.0);
        assert!((stone_wall.score_value - 0.5).abs() < 1e-6);
        assert!(stone_wall.mass > 0.0);

        let iron = IRON_WALL.stats();
        assert!(iron.indestructible);
        assert_eq!(iron.max_health, f32::INFINITY);
        assert_eq!(iron.score_value, 0.0);
        assert_eq!(iron.mass, 0.0);
    }

    #[test]
    fn test_threshold_boundary() {
        let rules = DamageRules {
            threshold: 10.0,
            multiplier: 2.0,
        };
        assert_eq!(rules.damage_for(9.99), None);
        assert_eq!(rules.damage_for(10.0), Some(0.0));
        assert_eq!(rules.damage_for(15.0), Some(10.0));
    }

    #[test]
    fn test_building_damage_and_destruction() {
        let mut world = World::default();
        let mut scene = RecordingScene::new();
        let mut wall = spawn(STONE_WALL, &mut world, &mut scene);
        let rules = DamageRules::default();
        let mut ctx = SimContext::new(&mut world, &mut scene);

        // (60 - 10) * 2 = 100 of 200
        assert!(!wall.take_damage(60.0, &rules, &mut ctx));
        assert_eq!(wall.health().current(), 100.0);
        assert!(wall.take_damage(60.0, &rules, &mut ctx));
        assert!(wall.is_destroyed());
        assert!(!wall.take_damage(500.0, &rules, &mut ctx));
        assert!(!wall.destroy(&mut ctx));
        assert_eq!(world.body_count(), 0);
        assert_eq!(scene.live_count(), 0);
    }

    #[test]
    fn test_indestructible_building_is_static() {
        let mut world = World::default();
        let mut scene = RecordingScene::new();
        let wall = spawn(IRON_WALL, &mut world, &mut scene);
        let body = world.body(wall.body().unwrap()).unwrap();
        assert!(body.is_static());
        assert!(wall.is_indestructible());
    }

    proptest! {
        #[test]
        fn prop_sub_threshold_never_hurts(force in 0.0f32..DamageRules::default().threshold) {
            let mut world = World::default();
            let mut scene = RecordingScene::new();
            let mut wall = spawn(STONE_WALL, &mut world, &mut scene);
            let mut ctx = SimContext::new(&mut world, &mut scene);
            for _ in 0..50 {
                prop_assert!(!wall.take_damage(force, &DamageRules::default(), &mut ctx));
            }
            prop_assert_eq!(wall.health().current(), wall.health().max());
        }

        #[test]
        fn prop_iron_never_destroyed(force in 0.0f32..1e6) {
            let mut world = World::default();
            let mut scene = RecordingScene::new();
            let mut wall = spawn(IRON_WALL, &mut world, &mut scene);
            let mut ctx = SimContext::new(&mut world, &mut scene);
            prop_assert!(!wall.take_damage(force, &DamageRules::default(), &mut ctx));
            prop_assert_eq!(wall.health().current(), f32::INFINITY);
        }
    }
}
