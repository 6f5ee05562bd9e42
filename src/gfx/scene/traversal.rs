// src/gfx/scene/traversal.rs
//! Walking the free camera through a portal
//!
//! The signed distance to each portal plane is tracked from frame to frame.
//! A front-to-back sign flip whose crossing point lies inside the disk moves
//! the camera to the partner portal.

use cgmath::Point3;

use crate::gfx::camera::FreeCamera;
use crate::gfx::math::transform_point;
use crate::gfx::scene::node::SceneGraph;
use crate::gfx::scene::portal::{PortalPair, PortalSide};

#[derive(Debug, Clone, Copy)]
pub struct PortalTraversal {
    last_eye: Point3<f32>,
    distances: [f32; 2],
}

impl PortalTraversal {
    pub fn new(graph: &SceneGraph, portals: &PortalPair, eye: Point3<f32>) -> Self {
        let mut traversal = Self {
            last_eye: eye,
            distances: [0.0; 2],
        };
        traversal.measure(graph, portals, eye);
        traversal
    }

    /// Last measured signed distance to `side`'s plane.
    pub fn distance(&self, side: PortalSide) -> f32 {
        self.distances[side.index()]
    }

    /// Re-reads both distances without teleporting, e.g. after a camera switch.
    pub fn measure(&mut self, graph: &SceneGraph, portals: &PortalPair, eye: Point3<f32>) {
        self.last_eye = eye;
        for side in PortalSide::BOTH {
            self.distances[side.index()] = portals.signed_distance(graph, side, eye);
        }
    }

    /// Checks the camera's movement since the last call and teleports it when
    /// it passed through a portal. Returns the portal entered.
    pub fn step(&mut self, graph: &SceneGraph, portals: &PortalPair, camera: &mut FreeCamera) -> Option<PortalSide> {
        let eye = camera.position;
        let entered = PortalSide::BOTH.into_iter().find(|&side| {
            let before = self.distances[side.index()];
            let now = portals.signed_distance(graph, side, eye);
            if before <= 0.0 || now > 0.0 {
                return false;
            }
            let t = before / (before - now);
            let crossing = self.last_eye + (eye - self.last_eye) * t;
            portals.within_disk(graph, side, crossing)
        });

        if let Some(side) = entered {
            let offset = portals.offset(graph, side, side.partner());
            let forward = PortalPair::carry_direction(&offset, camera.forward());
            camera.position = transform_point(&offset, camera.position);
            camera.look_along(forward);
            log::debug!("camera passed through portal {side:?}");
        }

        self.measure(graph, portals, camera.position);
        entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::Projection;
    use crate::gfx::math::test_helpers::*;
    use crate::gfx::scene::portal::Portal;
    use crate::gfx::scene::transform::Transform;
    use cgmath::{InnerSpace, Rad, Vector3};
    use std::f32::consts::FRAC_PI_2;

    fn demo_pair() -> (SceneGraph, PortalPair) {
        let mut graph = SceneGraph::new();
        let a = Portal::insert(
            &mut graph,
            "portal_a",
            Transform::from_position(-10.0, 4.0, 10.0).with_orientation(0.0, FRAC_PI_2, 0.0),
            0,
            [2.5, 4.0],
        )
        .unwrap();
        let b = Portal::insert(&mut graph, "portal_b", Transform::from_position(15.0, 4.0, -15.0), 0, [2.5, 4.0]).unwrap();
        (graph, PortalPair::new(a, b))
    }

    fn camera_at(position: Point3<f32>, target: Point3<f32>) -> FreeCamera {
        FreeCamera::looking_at(position, target, Projection::new(Rad(1.0), 1.0, 0.1, 1000.0))
    }

    #[test]
    fn walking_through_portal_a_exits_portal_b() {
        let (graph, pair) = demo_pair();
        let mut camera = camera_at(Point3::new(-8.0, 4.0, 10.0), Point3::new(-20.0, 4.0, 10.0));
        let mut traversal = PortalTraversal::new(&graph, &pair, camera.position);
        assert!((traversal.distance(PortalSide::A) - 2.0).abs() < EPS);

        camera.position = Point3::new(-10.5, 4.0, 10.0);
        assert_eq!(traversal.step(&graph, &pair, &mut camera), Some(PortalSide::A));

        // half a unit behind A becomes half a unit in front of B, heading out of it
        assert!((pair.signed_distance(&graph, PortalSide::B, camera.position) - 0.5).abs() < EPS);
        assert!(pair.within_disk(&graph, PortalSide::B, camera.position));
        assert_vec3_near(camera.forward().normalize(), pair.normal(&graph, PortalSide::B));
        assert!((traversal.distance(PortalSide::B) - 0.5).abs() < EPS);
        assert!(traversal.distance(PortalSide::A) != 0.0);
    }

    #[test]
    fn crossing_the_plane_outside_the_disk_does_not_teleport() {
        let (graph, pair) = demo_pair();
        let mut camera = camera_at(Point3::new(-8.0, 4.0, 20.0), Point3::new(-20.0, 4.0, 20.0));
        let mut traversal = PortalTraversal::new(&graph, &pair, camera.position);
        camera.position = Point3::new(-10.5, 4.0, 20.0);
        assert_eq!(traversal.step(&graph, &pair, &mut camera), None);
        assert_point3_near(camera.position, Point3::new(-10.5, 4.0, 20.0));
    }

    #[test]
    fn back_to_front_crossing_does_not_teleport() {
        let (graph, pair) = demo_pair();
        let mut camera = camera_at(Point3::new(-12.0, 4.0, 10.0), Point3::new(0.0, 4.0, 10.0));
        let mut traversal = PortalTraversal::new(&graph, &pair, camera.position);
        camera.position = Point3::new(-9.0, 4.0, 10.0);
        assert_eq!(traversal.step(&graph, &pair, &mut camera), None);
        assert!(traversal.distance(PortalSide::A) > 0.0);
    }

    #[test]
    fn round_trip_returns_to_start_side() {
        let (graph, pair) = demo_pair();
        let mut camera = camera_at(Point3::new(-9.0, 4.0, 10.0), Point3::new(-20.0, 4.0, 10.0));
        let mut traversal = PortalTraversal::new(&graph, &pair, camera.position);
        camera.position = Point3::new(-10.2, 4.0, 10.0);
        traversal.step(&graph, &pair, &mut camera);

        // turn around in front of B and walk back in
        let back_in = -pair.normal(&graph, PortalSide::B);
        camera.look_along(back_in);
        camera.position += back_in * 0.4;
        assert_eq!(traversal.step(&graph, &pair, &mut camera), Some(PortalSide::B));
        assert!(pair.signed_distance(&graph, PortalSide::A, camera.position) > 0.0);
        assert_vec3_near(camera.forward().normalize(), Vector3::unit_x());
    }
}
