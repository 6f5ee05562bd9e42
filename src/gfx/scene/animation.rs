//! Random-walk animation of the copper device arms

use rand::Rng;

use crate::error::SceneError;
use crate::gfx::scene::node::{NodeHandle, SceneGraph};

/// Per-frame velocity jitter.
const JITTER: f32 = 0.4;
const ARM_X_LIMIT: f32 = 8.7;
const ARM_Y_RANGE: (f32, f32) = (1.5, 5.5);
/// Ring height relative to the horizontal arm.
const RING_DROP: f32 = 3.75;

#[derive(Debug, Clone, Copy)]
pub struct DeviceAnimator {
    vertical_arm: NodeHandle,
    horizontal_arm: NodeHandle,
    ring: NodeHandle,
    dev_dx: f32,
    dev_dy: f32,
}

impl DeviceAnimator {
    pub fn new(vertical_arm: NodeHandle, horizontal_arm: NodeHandle, ring: NodeHandle) -> Self {
        Self {
            vertical_arm,
            horizontal_arm,
            ring,
            dev_dx: 0.0,
            dev_dy: 0.0,
        }
    }

    /// Looks the device nodes up by their demo-scene names.
    pub fn from_graph(graph: &SceneGraph) -> Result<Self, SceneError> {
        Ok(Self::new(
            graph.handle("deviceArmVertical")?,
            graph.handle("deviceArmHorizontal")?,
            graph.handle("deviceRing")?,
        ))
    }

    pub fn velocity(&self) -> (f32, f32) {
        (self.dev_dx, self.dev_dy)
    }

    pub fn step<R: Rng>(&mut self, rng: &mut R, graph: &mut SceneGraph, dt: f32) {
        self.dev_dx += rng.random_range(-JITTER..JITTER);
        self.dev_dy += rng.random_range(-JITTER..JITTER);

        let vertical = graph.transform_mut(self.vertical_arm);
        if vertical.position.x > ARM_X_LIMIT || vertical.position.x < -ARM_X_LIMIT {
            vertical.position.x = vertical.position.x.clamp(-ARM_X_LIMIT, ARM_X_LIMIT);
            self.dev_dx = 0.0;
        }
        vertical.position.x += self.dev_dx * dt;

        let horizontal = graph.transform_mut(self.horizontal_arm);
        let (low, high) = ARM_Y_RANGE;
        if horizontal.position.y > high || horizontal.position.y < low {
            horizontal.position.y = horizontal.position.y.clamp(low, high);
            self.dev_dy = 0.0;
        }
        horizontal.position.y += self.dev_dy * dt;
        let arm_y = horizontal.position.y;

        graph.transform_mut(self.ring).position.y = arm_y - RING_DROP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::node::SceneNode;
    use crate::gfx::scene::transform::Transform;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn device() -> (SceneGraph, DeviceAnimator) {
        let mut graph = SceneGraph::new();
        let bottom = graph
            .insert(SceneNode::new("deviceFrameBottom", Transform::from_position(0.0, 0.25, -24.0)))
            .unwrap();
        let vertical = graph
            .insert(SceneNode::new("deviceArmVertical", Transform::from_position(0.0, 3.75, 0.0)).with_parent(bottom))
            .unwrap();
        graph
            .insert(SceneNode::new("deviceArmHorizontal", Transform::from_position(0.0, 3.5, 0.0)).with_parent(bottom))
            .unwrap();
        graph
            .insert(SceneNode::new("deviceRing", Transform::default()).with_parent(vertical))
            .unwrap();
        let animator = DeviceAnimator::from_graph(&graph).unwrap();
        (graph, animator)
    }

    #[test]
    fn arms_stay_near_their_ranges() {
        let (mut graph, mut animator) = device();
        let mut rng = StdRng::seed_from_u64(3);
        let vertical = graph.handle("deviceArmVertical").unwrap();
        let horizontal = graph.handle("deviceArmHorizontal").unwrap();
        let ring = graph.handle("deviceRing").unwrap();
        let dt = 1.0 / 60.0;
        for _ in 0..5000 {
            animator.step(&mut rng, &mut graph, dt);
            let x = graph.transform(vertical).position.x;
            let y = graph.transform(horizontal).position.y;
            // one step past the clamp at most
            let (dx, dy) = animator.velocity();
            assert!(x.abs() <= ARM_X_LIMIT + dx.abs() * dt + 1e-5);
            assert!(y >= ARM_Y_RANGE.0 - dy.abs() * dt - 1e-5);
            assert!(y <= ARM_Y_RANGE.1 + dy.abs() * dt + 1e-5);
            assert!((graph.transform(ring).position.y - (y - RING_DROP)).abs() < 1e-5);
        }
    }

    #[test]
    fn clamping_resets_velocity() {
        let (mut graph, mut animator) = device();
        let vertical = graph.handle("deviceArmVertical").unwrap();
        graph.transform_mut(vertical).position.x = 20.0;
        let mut rng = StdRng::seed_from_u64(11);
        animator.step(&mut rng, &mut graph, 0.5);
        assert_eq!(animator.velocity().0, 0.0);
        assert_eq!(graph.transform(vertical).position.x, ARM_X_LIMIT);
    }

    #[test]
    fn missing_device_nodes_are_reported() {
        let graph = SceneGraph::new();
        assert_eq!(
            DeviceAnimator::from_graph(&graph).unwrap_err(),
            SceneError::UnknownNode("deviceArmVertical".into())
        );
    }
}
