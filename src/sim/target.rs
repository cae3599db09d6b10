//! Targets: the defenders that must all fall to win a level
//!
//! Targets take a flat amount of damage per proximity hit; impact force is
//! irrelevant to them.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::entity::{EntityCore, Health, SimContext};
use super::shape::Shape;
use super::world::{BodyDesc, BodyHandle, MaterialTag};
use crate::scene::RenderNode;

/// Target types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Basic,
    Soldier,
    Archer,
    Knight,
    King,
}

/// Per-kind stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetStats {
    pub tag: &'static str,
    pub max_health: f32,
    pub score_value: f32,
    pub mass: f32,
    /// Full width, height, depth
    pub size: [f32; 3],
}

static TARGETS: [TargetStats; 5] = [
    TargetStats {
        tag: "basic",
        max_health: 100.0,
        score_value: 1.0,
        mass: 10.0,
        size: [0.8, 1.6, 0.8],
    },
    TargetStats {
        tag: "soldier",
        max_health: 100.0,
        score_value: 1.0,
        mass: 12.0,
        size: [0.7, 1.8, 0.7],
    },
    TargetStats {
        tag: "archer",
        max_health: 100.0,
        score_value: 1.5,
        mass: 10.0,
        size: [0.7, 1.8, 0.7],
    },
    TargetStats {
        tag: "knight",
        max_health: 200.0,
        score_value: 2.0,
        mass: 25.0,
        size: [0.9, 1.9, 0.9],
    },
    TargetStats {
        tag: "king",
        max_health: 300.0,
        score_value: 3.0,
        mass: 30.0,
        size: [1.0, 2.2, 1.0],
    },
];

impl TargetKind {
    pub const ALL: [TargetKind; 5] = [
        Self::Basic,
        Self::Soldier,
        Self::Archer,
        Self::Knight,
        Self::King,
    ];

    pub fn stats(self) -> &'static TargetStats {
        &TARGETS[self as usize]
    }

    pub fn tag(self) -> &'static str {
        self.stats().tag
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.tag() == tag)
    }

    pub fn shape(self) -> Shape {
        let [w, h, d] = self.stats().size;
        Shape::cuboid(w, h, d)
    }
}

/// Stable target identifier within a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// A target standing in the level
#[derive(Debug, Clone)]
pub struct Target {
    pub id: TargetId,
    pub kind: TargetKind,
    core: EntityCore,
}

impl Target {
    /// Create the body and renderable. `position` is the center of the body.
    pub fn spawn(id: TargetId, kind: TargetKind, position: Vec3, ctx: &mut SimContext<'_>) -> Self {
        let stats = kind.stats();
        let shape = kind.shape();
        let body = ctx.world.add_body(
            BodyDesc::new(shape, stats.mass, MaterialTag::Object)
                .at(position)
                .with_damping(0.1, 0.3),
        );
        let render = ctx
            .scene
            .add(RenderNode::new(kind.tag(), shape, position, Quat::IDENTITY));
        Self {
            id,
            kind,
            core: EntityCore::new(
                position,
                Quat::IDENTITY,
                Health::new(stats.max_health),
                stats.score_value,
                body,
                render,
            ),
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

    /// Flat damage from a proximity hit. True if this call destroyed the target.
    pub fn take_damage(&mut self, amount: f32, ctx: &mut SimContext<'_>) -> bool {
        let destroyed = self.core.take_damage(amount, ctx);
        if destroyed {
            log::debug!("{} #{} defeated", self.kind.tag(), self.id.0);
        }
        destroyed
    }

    pub fn destroy(&mut self, ctx: &mut SimContext<'_>) -> bool {
        self.core.destroy(ctx)
    }

    /// Sync from physics. Returns true if it fell out of the world this call.
    pub fn update(&mut self, ctx: &mut SimContext<'_>) -> bool {
        let fell = self.core.sync(ctx);
        if fell {
            log::debug!("{} #{} fell out of the world", self.kind.tag(), self.id.0);
        }
        fell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::RecordingScene;
    use crate::sim::World;

    #[test]
    fn test_table_matches_enum_order() {
        for kind in TargetKind::ALL {
            assert_eq!(TargetKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(TargetKind::from_tag("dragon"), None);
    }

    #[test]
    fn test_knight_takes_two_hits() {
        let mut world = World::default();
        let mut scene = RecordingScene::new();
        let mut ctx = SimContext::new(&mut world, &mut scene);
        let mut knight = Target::spawn(TargetId(3), TargetKind::Knight, Vec3::Y, &mut ctx);

        assert!(!knight.take_damage(100.0, &mut ctx));
        assert_eq!(knight.health().current(), 100.0);
        assert!(knight.take_damage(100.0, &mut ctx));
        assert!(!knight.take_damage(100.0, &mut ctx));
        assert!(knight.body().is_none());
        assert_eq!(scene.live_count(), 0);
    }
}
