//! Static decorative props around the play area
//!
//! Scenery has no physics body. Clouds drift and wrap, banners sway.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::rng::SeededRng;
use super::shape::Shape;
use crate::scene::{RenderId, RenderNode, SceneSink};

/// Clouds wrap back to -CLOUD_SPAN after drifting past +CLOUD_SPAN
const CLOUD_SPAN: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneryKind {
    Tree,
    Rock,
    Cloud,
    Banner,
}

impl SceneryKind {
    pub fn tag(self) -> &'static str {
        match self {
            SceneryKind::Tree => "tree",
            SceneryKind::Rock => "rock",
            SceneryKind::Cloud => "cloud",
            SceneryKind::Banner => "banner",
        }
    }

    fn shape(self, scale: f32) -> Shape {
        match self {
            SceneryKind::Tree => Shape::cuboid(1.5 * scale, 4.0 * scale, 1.5 * scale),
            SceneryKind::Rock => Shape::sphere(0.8 * scale),
            SceneryKind::Cloud => Shape::cuboid(6.0 * scale, 1.5 * scale, 3.0 * scale),
            SceneryKind::Banner => Shape::cuboid(0.1, 3.0 * scale, 1.0 * scale),
        }
    }
}

/// One prop
#[derive(Debug, Clone)]
pub struct Scenery {
    pub kind: SceneryKind,
    pub position: Vec3,
    pub orientation: Quat,
    /// Animation phase (radians) for banners, drift speed source for clouds
    phase: f32,
    speed: f32,
    render: Option<RenderId>,
}

impl Scenery {
    pub fn spawn(
        kind: SceneryKind,
        position: Vec3,
        scale: f32,
        rng: &mut SeededRng,
        scene: &mut dyn SceneSink,
    ) -> Self {
        let orientation = Quat::from_rotation_y(rng.range(0.0, std::f32::consts::TAU));
        let speed = match kind {
            SceneryKind::Cloud => rng.range(0.5, 2.0),
            SceneryKind::Banner => rng.range(1.5, 3.0),
            _ => 0.0,
        };
        let render = scene.add(RenderNode::new(
            kind.tag(),
            kind.shape(scale),
            position,
            orientation,
        ));
        Self {
            kind,
            position,
            orientation,
            phase: rng.range(0.0, std::f32::consts::TAU),
            speed,
            render: Some(render),
        }
    }

    pub fn update(&mut self, dt: f32, scene: &mut dyn SceneSink) {
        let Some(render) = self.render else {
            return;
        };
        match self.kind {
            SceneryKind::Cloud => {
                self.position.x += self.speed * dt;
                if self.position.x > CLOUD_SPAN {
                    self.position.x -= 2.0 * CLOUD_SPAN;
                }
            }
            SceneryKind::Banner => {
                self.phase = (self.phase + self.speed * dt) % std::f32::consts::TAU;
                let sway = self.phase.sin() * 0.15;
                self.orientation = Quat::from_rotation_y(sway);
            }
            SceneryKind::Tree | SceneryKind::Rock => return,
        }
        scene.set_transform(render, self.position, self.orientation);
    }

    pub fn remove(&mut self, scene: &mut dyn SceneSink) {
        if let Some(render) = self.render.take() {
            scene.remove(render);
        }
    }
}

/// Scatter props outside the play corridor (x in 0..60, |z| < 15)
pub fn scatter(rng: &mut SeededRng, scene: &mut dyn SceneSink) -> Vec<Scenery> {
    let mut props = Vec::new();

    for _ in 0..rng.int_range(8, 14) {
        let side = if rng.chance(0.5) { 1.0 } else { -1.0 };
        let position = Vec3::new(rng.range(-10.0, 70.0), 0.0, side * rng.range(18.0, 40.0));
        let kind = if rng.chance(0.7) {
            SceneryKind::Tree
        } else {
            SceneryKind::Rock
        };
        let scale = rng.range(0.7, 1.4);
        props.push(Scenery::spawn(kind, position, scale, rng, scene));
    }

    for _ in 0..rng.int_range(3, 6) {
        let position = Vec3::new(
            rng.range(-CLOUD_SPAN, CLOUD_SPAN),
            rng.range(25.0, 40.0),
            rng.range(-60.0, 60.0),
        );
        let scale = rng.range(0.8, 2.0);
        props.push(Scenery::spawn(SceneryKind::Cloud, position, scale, rng, scene));
    }

    props.push(Scenery::spawn(
        SceneryKind::Banner,
        Vec3::new(-2.0, 0.0, 3.0),
        1.0,
        rng,
        scene,
    ));
    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::RecordingScene;

    #[test]
    fn test_scatter_is_deterministic() {
        let mut scene = RecordingScene::new();
        let a = scatter(&mut SeededRng::new(11), &mut scene);
        let b = scatter(&mut SeededRng::new(11), &mut scene);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.kind, y.kind);
            assert_eq!(x.position, y.position);
        }
    }

    #[test]
    fn test_clouds_wrap_and_props_release() {
        let mut scene = RecordingScene::new();
        let mut rng = SeededRng::new(3);
        let mut cloud = Scenery::spawn(
            SceneryKind::Cloud,
            Vec3::new(CLOUD_SPAN - 0.01, 30.0, 0.0),
            1.0,
            &mut rng,
            &mut scene,
        );
        cloud.update(1.0, &mut scene);
        assert!(cloud.position.x < 0.0);

        cloud.remove(&mut scene);
        cloud.remove(&mut scene);
        assert_eq!(scene.live_count(), 0);
        cloud.update(1.0, &mut scene);
    }
}
