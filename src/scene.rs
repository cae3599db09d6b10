//! Renderer collaborator interface
//!
//! The core never builds meshes. It announces renderables (a category tag
//! plus collision shape), moves them each tick, and removes them when the
//! owning entity goes away. The JS host mirrors a [`RecordingScene`].

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::sim::Shape;

/// Handle to a renderable owned by the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderId(pub u32);

/// What the renderer needs to build a visual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    /// Category tag ("wood_wall", "knight", "projectile", "tree", ...)
    pub tag: String,
    pub shape: Shape,
    pub position: Vec3,
    pub orientation: Quat,
}

impl RenderNode {
    pub fn new(tag: impl Into<String>, shape: Shape, position: Vec3, orientation: Quat) -> Self {
        Self {
            tag: tag.into(),
            shape,
            position,
            orientation,
        }
    }
}

/// Scene graph as seen from the simulation
pub trait SceneSink {
    fn add(&mut self, node: RenderNode) -> RenderId;
    /// Returns false if the id was unknown (already removed)
    fn remove(&mut self, id: RenderId) -> bool;
    fn set_transform(&mut self, id: RenderId, position: Vec3, orientation: Quat);
}

/// Scene that keeps nothing (headless runs)
#[derive(Debug, Default)]
pub struct NullScene {
    next_id: u32,
}

impl SceneSink for NullScene {
    fn add(&mut self, _node: RenderNode) -> RenderId {
        self.next_id += 1;
        RenderId(self.next_id)
    }

    fn remove(&mut self, _id: RenderId) -> bool {
        true
    }

    fn set_transform(&mut self, _id: RenderId, _position: Vec3, _orientation: Quat) {}
}

/// Scene that tracks every live node; used by the web host and leak tests
#[derive(Debug, Default)]
pub struct RecordingScene {
    nodes: BTreeMap<RenderId, RenderNode>,
    next_id: u32,
    removed: usize,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn removed_count(&self) -> usize {
        self.removed
    }

    pub fn get(&self, id: RenderId) -> Option<&RenderNode> {
        self.nodes.get(&id)
    }

    /// Live nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = (RenderId, &RenderNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn count_tag(&self, tag: &str) -> usize {
        self.nodes.values().filter(|n| n.tag == tag).count()
    }
}

impl SceneSink for RecordingScene {
    fn add(&mut self, node: RenderNode) -> RenderId {
        self.next_id += 1;
        let id = RenderId(self.next_id);
        self.nodes.insert(id, node);
        id
    }

    fn remove(&mut self, id: RenderId) -> bool {
        let removed = self.nodes.remove(&id).is_some();
        if removed {
            self.removed += 1;
        }
        removed
    }

    fn set_transform(&mut self, id: RenderId, position: Vec3, orientation: Quat) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = position;
            node.orientation = orientation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_scene_tracks_nodes() {
        let mut scene = RecordingScene::new();
        let a = scene.add(RenderNode::new("tree", Shape::sphere(1.0), Vec3::ZERO, Quat::IDENTITY));
        let b = scene.add(RenderNode::new("rock", Shape::sphere(1.0), Vec3::ZERO, Quat::IDENTITY));
        assert_eq!(scene.live_count(), 2);

        scene.set_transform(a, Vec3::X, Quat::IDENTITY);
        assert_eq!(scene.get(a).unwrap().position, Vec3::X);

        assert!(scene.remove(b));
        assert!(!scene.remove(b));
        assert_eq!(scene.live_count(), 1);
        assert_eq!(scene.removed_count(), 1);
        assert_eq!(scene.count_tag("tree"), 1);
    }
}
