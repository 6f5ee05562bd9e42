use cgmath::*;

use super::camera_utils::{Camera, Projection};

/// Pitch stays this far short of straight up/down so the view basis never degenerates.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// First-person camera driven by yaw/pitch angles.
///
/// Yaw zero looks down -Z; positive yaw turns right (towards +X).
#[derive(Debug, Clone, Copy)]
pub struct FreeCamera {
    pub position: Point3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    pub projection: Projection,
}

impl FreeCamera {
    pub fn new(position: Point3<f32>, yaw: f32, pitch: f32, projection: Projection) -> Self {
        Self {
            position,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            projection,
        }
    }

    pub fn looking_at(position: Point3<f32>, target: Point3<f32>, projection: Projection) -> Self {
        let mut camera = Self::new(position, 0.0, 0.0, projection);
        camera.look_along(target - position);
        camera
    }

    /// Points the camera along `direction`.
    pub fn look_along(&mut self, direction: Vector3<f32>) {
        if direction.magnitude2() <= f32::EPSILON {
            return;
        }
        let d = direction.normalize();
        self.yaw = d.x.atan2(-d.z);
        self.pitch = d.y.clamp(-1.0, 1.0).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn forward(&self) -> Vector3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vector3::new(sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    pub fn translate(&mut self, delta: Vector3<f32>) {
        self.position += delta;
    }

    /// Adds to yaw and pitch (radians); pitch is clamped short of vertical.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
}

impl Camera for FreeCamera {
    fn projection(&self) -> Matrix4<f32> {
        self.projection.matrix()
    }

    fn view(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.forward(), Vector3::unit_y())
    }

    fn position(&self) -> Point3<f32> {
        self.position
    }

    fn update(&mut self, _dt: f32) {
        // keep yaw bounded so long sessions do not lose precision
        self.yaw = self.yaw.rem_euclid(std::f32::consts::TAU);
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.projection.aspect = aspect;
    }
}
