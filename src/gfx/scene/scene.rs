// src/gfx/scene/scene.rs
//! Scene state shared by the update step and every render pass
//!
//! `update` is the only place that mutates node transforms, cameras, shadow
//! entries and the per-frame portal wobble. Render passes take `&SceneState`.

use cgmath::{Matrix4, SquareMatrix};
use rand::rngs::StdRng;
use rand::SeedableRng;
use winit::keyboard::KeyCode;

use crate::gfx::camera::{Camera, CameraMode, CameraRig, FreeCameraController, TargetCameraController};
use crate::gfx::resources::texture_library::TextureLibrary;
use crate::gfx::scene::animation::DeviceAnimator;
use crate::gfx::scene::light::LightSet;
use crate::gfx::scene::mesh::MeshLibrary;
use crate::gfx::scene::node::SceneGraph;
use crate::gfx::scene::portal::{PortalPair, PortalSide};
use crate::gfx::scene::shadow::ShadowMaps;
use crate::gfx::scene::traversal::PortalTraversal;
use crate::input::InputState;

/// Input gathered for one update step.
pub struct FrameInput<'a> {
    pub keys: &'a InputState,
    pub mouse_delta: (f64, f64),
    pub scroll: f32,
    pub screen_width: u32,
}

pub struct SceneState {
    pub graph: SceneGraph,
    pub meshes: MeshLibrary,
    pub textures: TextureLibrary,
    pub lights: LightSet,
    pub shadows: ShadowMaps,
    pub portals: PortalPair,
    pub cameras: CameraRig,
    pub free_controller: FreeCameraController,
    pub target_controller: TargetCameraController,
    animator: Option<DeviceAnimator>,
    traversal: PortalTraversal,
    wobble: [Matrix4<f32>; 2],
    rng: StdRng,
}

impl SceneState {
    pub fn new(
        graph: SceneGraph,
        meshes: MeshLibrary,
        textures: TextureLibrary,
        lights: LightSet,
        portals: PortalPair,
        cameras: CameraRig,
    ) -> Self {
        let mut shadows = ShadowMaps::new();
        shadows.sync(lights.spots());
        let traversal = PortalTraversal::new(&graph, &portals, cameras.free.position);

        Self {
            graph,
            meshes,
            textures,
            lights,
            shadows,
            portals,
            cameras,
            free_controller: FreeCameraController::default(),
            target_controller: TargetCameraController::default(),
            animator: None,
            traversal,
            wobble: [Matrix4::identity(); 2],
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_animator(mut self, animator: DeviceAnimator) -> Self {
        self.animator = Some(animator);
        self
    }

    /// Fixes the random stream, for reproducible animation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn camera(&self) -> &dyn Camera {
        self.cameras.active()
    }

    pub fn traversal(&self) -> &PortalTraversal {
        &self.traversal
    }

    /// Wobble rotation sampled for `side` during the last update.
    pub fn wobble(&self, side: PortalSide) -> Matrix4<f32> {
        self.wobble[side.index()]
    }

    /// World-to-world transform applied to geometry seen through `side`.
    pub fn portal_view(&self, side: PortalSide) -> Matrix4<f32> {
        self.portals.view_offset(&self.graph, side) * self.wobble(side)
    }

    pub fn set_wobble(&mut self, enabled: bool) {
        self.portals.wobble.enabled = enabled;
        log::info!("portal wobble {}", if enabled { "on" } else { "off" });
    }

    pub fn toggle_wobble(&mut self) {
        self.set_wobble(!self.portals.wobble.enabled);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.cameras.resize(width, height);
        self.shadows.resize(width, height);
    }

    pub fn update(&mut self, input: &FrameInput, dt: f32) {
        if input.keys.is_held(KeyCode::Digit1) {
            self.cameras.select(CameraMode::Target);
        } else if input.keys.is_held(KeyCode::Digit2) {
            if self.cameras.mode != CameraMode::Free {
                self.traversal
                    .measure(&self.graph, &self.portals, self.cameras.free.position);
            }
            self.cameras.select(CameraMode::Free);
        }

        match self.cameras.mode {
            CameraMode::Free => {
                self.free_controller.apply(
                    &mut self.cameras.free,
                    input.keys,
                    input.mouse_delta,
                    input.screen_width,
                    dt,
                );
            }
            CameraMode::Target => {
                self.target_controller.apply(
                    &mut self.cameras.target,
                    input.keys,
                    input.mouse_delta,
                    input.scroll,
                );
            }
        }

        if let Some(animator) = self.animator.as_mut() {
            animator.step(&mut self.rng, &mut self.graph, dt);
        }

        if self.cameras.mode == CameraMode::Free {
            self.traversal
                .step(&self.graph, &self.portals, &mut self.cameras.free);
        }

        self.cameras.active_mut().update(dt);
        self.shadows.sync(self.lights.spots());

        for side in PortalSide::BOTH {
            self.wobble[side.index()] = self.portals.wobble.sample(&mut self.rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{FreeCamera, Projection, TargetCamera};
    use crate::gfx::math::test_helpers::*;
    use crate::gfx::scene::light::{DirectionalLight, SpotLight};
    use crate::gfx::scene::portal::Portal;
    use crate::gfx::scene::transform::Transform;
    use cgmath::{Deg, Point3, Vector3};
    use std::f32::consts::FRAC_PI_2;

    fn state() -> SceneState {
        let mut graph = SceneGraph::new();
        let a = Portal::insert(
            &mut graph,
            "portal_a",
            Transform::from_position(-10.0, 4.0, 10.0).with_orientation(0.0, FRAC_PI_2, 0.0),
            0,
            [2.5, 4.0],
        )
        .unwrap();
        let b = Portal::insert(
            &mut graph,
            "portal_b",
            Transform::from_position(15.0, 4.0, -15.0),
            0,
            [2.5, 4.0],
        )
        .unwrap();

        let mut lights = LightSet::new(DirectionalLight::default());
        lights
            .add_spot(SpotLight::new(
                [1.0; 4],
                Point3::new(-16.5, 14.3, 5.0),
                Vector3::new(0.0, -1.0, 0.0),
                0.0,
                0.05,
                0.005,
                10.0,
            ))
            .unwrap();

        let projection = Projection::new(Deg(60.0).into(), 1.0, 0.1, 1000.0);
        let cameras = CameraRig::new(
            FreeCamera::looking_at(Point3::new(30.0, 1.0, 50.0), Point3::new(0.0, 0.0, 0.0), projection),
            TargetCamera::from_eye(Point3::new(0.0, 1.0, 50.0), Point3::new(0.0, 0.0, 0.0), projection),
            CameraMode::Free,
        );

        SceneState::new(
            graph,
            MeshLibrary::new(),
            TextureLibrary::new(),
            lights,
            PortalPair::new(a, b),
            cameras,
        )
        .with_seed(3)
    }

    fn idle(keys: &InputState) -> FrameInput<'_> {
        FrameInput {
            keys,
            mouse_delta: (0.0, 0.0),
            scroll: 0.0,
            screen_width: 800,
        }
    }

    #[test]
    fn number_keys_select_camera() {
        let mut state = state();
        let mut keys = InputState::new();
        keys.press(KeyCode::Digit1);
        state.update(&idle(&keys), 0.016);
        assert_eq!(state.cameras.mode, CameraMode::Target);
        assert_point3_near(state.camera().position(), Point3::new(0.0, 1.0, 50.0));

        keys.release(KeyCode::Digit1);
        keys.press(KeyCode::Digit2);
        state.update(&idle(&keys), 0.016);
        assert_eq!(state.cameras.mode, CameraMode::Free);
    }

    #[test]
    fn target_mode_ignores_movement_keys() {
        let mut state = state();
        state.cameras.select(CameraMode::Target);
        let before = state.cameras.free.position;
        let mut keys = InputState::new();
        keys.press(KeyCode::KeyW);
        state.update(&idle(&keys), 0.5);
        assert_eq!(state.cameras.free.position, before);
    }

    #[test]
    fn shadow_entries_follow_moved_spot() {
        let mut state = state();
        if let Some(spot) = state.lights.spot_mut(0) {
            spot.position = Point3::new(1.0, 2.0, 3.0);
        }
        state.update(&idle(&InputState::new()), 0.016);
        assert_eq!(state.shadows.entries()[0].light_position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn wobble_is_identity_until_enabled() {
        let mut state = state();
        state.update(&idle(&InputState::new()), 0.016);
        assert_mat4_near(&state.wobble(PortalSide::A), &Matrix4::identity());
        assert_mat4_near(
            &state.portal_view(PortalSide::A),
            &state.portals.view_offset(&state.graph, PortalSide::A),
        );

        state.toggle_wobble();
        state.update(&idle(&InputState::new()), 0.016);
        assert!(state.wobble(PortalSide::A) != Matrix4::identity());
        assert!(state.wobble(PortalSide::A) != state.wobble(PortalSide::B));
    }

    #[test]
    fn walking_into_portal_a_teleports_free_camera() {
        let mut state = state();
        // one unit in front of portal A, facing into it
        let camera = FreeCamera::looking_at(
            Point3::new(-9.0, 4.0, 10.0),
            Point3::new(-10.0, 4.0, 10.0),
            Projection::new(Deg(60.0).into(), 1.0, 0.1, 1000.0),
        );
        state.cameras.free = camera;
        state
            .traversal
            .measure(&state.graph, &state.portals, camera.position);

        let mut keys = InputState::new();
        keys.press(KeyCode::KeyW);
        // 20 units/s for 0.075 s carries the eye 1.5 units
        state.update(&idle(&keys), 0.075);

        let exit = state.portals.position(&state.graph, PortalSide::B);
        assert!((state.cameras.free.position - exit).x.abs() < 1.0);
        assert!(state.traversal().distance(PortalSide::B) > 0.0);
    }
}
