//! Camera capability shared by every camera kind, and the rig that picks one

use cgmath::{perspective, Matrix4, Point3, Rad};

use super::{free_camera::FreeCamera, target_camera::TargetCamera};
use crate::gfx::math::OPENGL_TO_WGPU_MATRIX;

/// What every pass needs from a camera.
pub trait Camera {
    /// Clip-space projection (wgpu depth range).
    fn projection(&self) -> Matrix4<f32>;

    fn view(&self) -> Matrix4<f32>;

    /// World-space eye position.
    fn position(&self) -> Point3<f32>;

    /// Per-frame step after input has been applied.
    fn update(&mut self, dt: f32);

    fn set_aspect(&mut self, aspect: f32);

    fn view_projection(&self) -> Matrix4<f32> {
        self.projection() * self.view()
    }
}

/// Perspective parameters shared by both cameras
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fovy: Rad<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new(fovy: Rad<f32>, aspect: f32, znear: f32, zfar: f32) -> Self {
        Self {
            fovy,
            aspect,
            znear,
            zfar,
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Target,
    Free,
}

impl CameraMode {
    pub fn label(self) -> &'static str {
        match self {
            CameraMode::Target => "target",
            CameraMode::Free => "free",
        }
    }
}

/// Both cameras plus the mode selecting which one renders.
pub struct CameraRig {
    pub free: FreeCamera,
    pub target: TargetCamera,
    pub mode: CameraMode,
}

impl CameraRig {
    pub fn new(free: FreeCamera, target: TargetCamera, mode: CameraMode) -> Self {
        Self { free, target, mode }
    }

    pub fn active(&self) -> &dyn Camera {
        match self.mode {
            CameraMode::Target => &self.target,
            CameraMode::Free => &self.free,
        }
    }

    pub fn active_mut(&mut self) -> &mut dyn Camera {
        match self.mode {
            CameraMode::Target => &mut self.target,
            CameraMode::Free => &mut self.free,
        }
    }

    pub fn select(&mut self, mode: CameraMode) {
        if self.mode != mode {
            log::info!("camera -> {}", mode.label());
            self.mode = mode;
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let aspect = width as f32 / height as f32;
        self.free.set_aspect(aspect);
        self.target.set_aspect(aspect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::math::test_helpers::*;
    use cgmath::Vector4;
    use std::f32::consts::FRAC_PI_4;

    fn rig() -> CameraRig {
        let projection = Projection::new(Rad(FRAC_PI_4 * 1.3), 16.0 / 9.0, 0.1, 1000.0);
        CameraRig::new(
            FreeCamera::looking_at(Point3::new(30.0, 1.0, 50.0), Point3::new(0.0, 0.0, 0.0), projection),
            TargetCamera::from_eye(Point3::new(0.0, 1.0, 50.0), Point3::new(0.0, 0.0, 0.0), projection),
            CameraMode::Free,
        )
    }

    #[test]
    fn active_follows_mode() {
        let mut rig = rig();
        assert_point3_near(rig.active().position(), Point3::new(30.0, 1.0, 50.0));
        rig.select(CameraMode::Target);
        assert_point3_near(rig.active().position(), Point3::new(0.0, 1.0, 50.0));
    }

    #[test]
    fn projection_maps_near_and_far_planes_to_wgpu_depth_range() {
        let p = Projection::new(Rad(FRAC_PI_4), 1.0, 0.1, 1000.0).matrix();
        let near = p * Vector4::new(0.0, 0.0, -0.1, 1.0);
        let far = p * Vector4::new(0.0, 0.0, -1000.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn resize_updates_both_cameras() {
        let mut rig = rig();
        rig.resize(800, 800);
        let before = rig.active().projection();
        rig.select(CameraMode::Target);
        assert_mat4_near(&rig.active().projection(), &before);
        // zero-sized windows (minimised) keep the last aspect
        rig.resize(0, 600);
        assert_mat4_near(&rig.active().projection(), &before);
    }
}
