use super::camera_utils::{Camera, Projection};
use cgmath::*;

/// Camera orbiting a fixed target at a given distance, pitch and yaw.
#[derive(Debug, Clone, Copy)]
pub struct TargetCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub bounds: TargetCameraBounds,
    pub projection: Projection,
}

impl Camera for TargetCamera {
    fn projection(&self) -> Matrix4<f32> {
        self.projection.matrix()
    }

    fn view(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.target, self.up)
    }

    fn position(&self) -> Point3<f32> {
        self.eye
    }

    fn update(&mut self, _dt: f32) {
        self.eye = calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.projection.aspect = aspect;
    }
}

impl TargetCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Point3<f32>, projection: Projection) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: target, // recomputed by `update()` below
            target,
            up: Vector3::unit_y(),
            bounds: TargetCameraBounds::default(),
            projection,
        };
        camera.update(0.0);
        camera
    }

    /// Orbit parameters that put the eye exactly at `eye`.
    pub fn from_eye(eye: Point3<f32>, target: Point3<f32>, projection: Projection) -> Self {
        let offset = eye - target;
        let distance = offset.magnitude().max(f32::EPSILON);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        Self::new(distance, pitch, yaw, target, projection)
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update(0.0);
    }

    /// Zooms proportionally to the current distance.
    pub fn add_distance(&mut self, delta: f32) {
        let corrected_zoom = f32::log10(self.distance.max(1.1)) * delta;
        self.set_distance(self.distance + corrected_zoom);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update(0.0);
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.max(min_yaw);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.min(max_yaw);
        }
        self.yaw = bounded_yaw;
        self.update(0.0);
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TargetCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for TargetCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(2.0),
            max_distance: Some(200.0),
            min_pitch: -std::f32::consts::FRAC_PI_2 + 0.01,
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.01,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

fn calculate_cartesian_eye_position(pitch: f32, yaw: f32, distance: f32, target: Point3<f32>) -> Point3<f32> {
    target
        + Vector3::new(
            distance * yaw.sin() * pitch.cos(),
            distance * pitch.sin(),
            distance * yaw.cos() * pitch.cos(),
        )
}
