use cgmath::{InnerSpace, Vector3, Zero};
use winit::keyboard::KeyCode;

use super::{free_camera::FreeCamera, target_camera::TargetCamera};
use crate::input::InputState;

/// WASD + mouse-look driver for the free camera.
#[derive(Debug, Clone, Copy)]
pub struct FreeCameraController {
    pub move_speed: f32,
    pub sensitivity: f32,
}

impl Default for FreeCameraController {
    fn default() -> Self {
        Self {
            move_speed: 20.0,
            sensitivity: 2.0,
        }
    }
}

impl FreeCameraController {
    pub fn new(move_speed: f32, sensitivity: f32) -> Self {
        Self {
            move_speed,
            sensitivity,
        }
    }

    /// Applies one frame of input. A full window width of mouse travel turns
    /// the camera by `sensitivity * 45°`.
    pub fn apply(
        &self,
        camera: &mut FreeCamera,
        input: &InputState,
        mouse_delta: (f64, f64),
        screen_width: u32,
        dt: f32,
    ) {
        let ratio = std::f32::consts::FRAC_PI_4 / screen_width.max(1) as f32;
        camera.rotate(
            mouse_delta.0 as f32 * ratio * self.sensitivity,
            -(mouse_delta.1 as f32) * ratio * self.sensitivity,
        );

        let movement = self.movement(camera, input);
        if movement != Vector3::zero() {
            camera.translate(movement * self.move_speed * dt);
        }
    }

    /// Unscaled movement direction for the held keys.
    fn movement(&self, camera: &FreeCamera, input: &InputState) -> Vector3<f32> {
        let fw = camera.forward();
        let flat = Vector3::new(fw.x, 0.0, fw.z);
        let forward = if flat.magnitude2() > f32::EPSILON {
            flat.normalize()
        } else {
            Vector3::zero()
        };
        let left = Vector3::new(forward.z, 0.0, -forward.x);

        let mut movement = Vector3::zero();
        if input.is_held(KeyCode::KeyW) {
            movement += forward;
        }
        if input.is_held(KeyCode::KeyS) {
            movement -= forward;
        }
        if input.is_held(KeyCode::KeyA) {
            movement += left;
        }
        if input.is_held(KeyCode::KeyD) {
            movement -= left;
        }
        if input.is_held(KeyCode::Space) {
            movement += Vector3::unit_y();
        }
        if input.is_held(KeyCode::ControlLeft) {
            movement -= Vector3::unit_y();
        }
        movement
    }
}

/// Left-drag orbit and scroll zoom for the target camera.
#[derive(Debug, Clone, Copy)]
pub struct TargetCameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for TargetCameraController {
    fn default() -> Self {
        Self::new(0.005, 2.0)
    }
}

impl TargetCameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
        }
    }

    pub fn apply(&self, camera: &mut TargetCamera, input: &InputState, mouse_delta: (f64, f64), scroll: f32) {
        if input.left_button() {
            camera.add_yaw(-mouse_delta.0 as f32 * self.rotate_speed);
            camera.add_pitch(mouse_delta.1 as f32 * self.rotate_speed);
        }
        if scroll != 0.0 {
            camera.add_distance(-scroll * self.zoom_speed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::Projection;
    use crate::gfx::math::test_helpers::*;
    use cgmath::{Point3, Rad};

    fn projection() -> Projection {
        Projection::new(Rad(1.0), 1.0, 0.1, 1000.0)
    }

    #[test]
    fn forward_movement_stays_horizontal_when_pitched() {
        let mut camera = FreeCamera::new(Point3::new(0.0, 2.0, 0.0), 0.0, 0.5, projection());
        let mut input = InputState::new();
        input.press(KeyCode::KeyW);
        FreeCameraController::new(20.0, 2.0).apply(&mut camera, &input, (0.0, 0.0), 800, 1.0);
        assert_point3_near(camera.position, Point3::new(0.0, 2.0, -20.0));
    }

    #[test]
    fn strafing_moves_along_left_axis() {
        let mut camera = FreeCamera::new(Point3::new(0.0, 0.0, 0.0), 0.0, 0.0, projection());
        let mut input = InputState::new();
        input.press(KeyCode::KeyA);
        FreeCameraController::new(10.0, 2.0).apply(&mut camera, &input, (0.0, 0.0), 800, 0.5);
        assert_point3_near(camera.position, Point3::new(-5.0, 0.0, 0.0));
    }

    #[test]
    fn vertical_keys_move_along_world_up() {
        let mut camera = FreeCamera::new(Point3::new(0.0, 0.0, 0.0), 1.0, 0.3, projection());
        let mut input = InputState::new();
        input.press(KeyCode::Space);
        FreeCameraController::new(4.0, 2.0).apply(&mut camera, &input, (0.0, 0.0), 800, 0.25);
        assert_point3_near(camera.position, Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn full_width_mouse_travel_turns_by_sensitivity_eighths() {
        let mut camera = FreeCamera::new(Point3::new(0.0, 0.0, 0.0), 0.0, 0.0, projection());
        let input = InputState::new();
        FreeCameraController::new(20.0, 2.0).apply(&mut camera, &input, (800.0, 0.0), 800, 0.016);
        assert!((camera.yaw - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn target_orbits_only_while_dragging() {
        let mut camera = TargetCamera::new(20.0, 0.0, 0.0, Point3::new(0.0, 0.0, 0.0), projection());
        let controller = TargetCameraController::default();
        let input = InputState::new();
        controller.apply(&mut camera, &input, (100.0, 0.0), 0.0);
        assert_eq!(camera.yaw, 0.0);
        controller.apply(&mut camera, &input, (0.0, 0.0), 1.0);
        assert!(camera.distance < 20.0);
    }
}
