// src/config.rs
//! Application configuration
//!
//! Plain structs with defaults matching the demo scene. A few fields can be
//! overridden from the environment: `RIFT_ASSET_DIR`, `RIFT_WINDOW_SIZE`
//! (`WIDTHxHEIGHT`) and `RIFT_EVENING` (`1` or `true`).

use std::f32::consts::FRAC_PI_4;
use std::path::{Path, PathBuf};

use cgmath::{Point3, Rad};

use crate::gfx::camera::{CameraMode, Projection};
use crate::gfx::rendering::post_process::ColorGrade;
use crate::logging::LoggingConfig;

pub const ASSET_DIR_ENV: &str = "RIFT_ASSET_DIR";
pub const WINDOW_SIZE_ENV: &str = "RIFT_WINDOW_SIZE";
pub const EVENING_ENV: &str = "RIFT_EVENING";

#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub start_mode: CameraMode,
    pub free_position: Point3<f32>,
    pub free_target: Point3<f32>,
    pub target_eye: Point3<f32>,
    pub target_point: Point3<f32>,
    /// World units per second.
    pub move_speed: f32,
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy: Rad(FRAC_PI_4 * 1.3),
            znear: 0.1,
            zfar: 1000.0,
            start_mode: CameraMode::Free,
            free_position: Point3::new(30.0, 1.0, 50.0),
            free_target: Point3::new(0.0, 0.0, 0.0),
            target_eye: Point3::new(0.0, 1.0, 50.0),
            target_point: Point3::new(0.0, 0.0, 0.0),
            move_speed: 20.0,
            sensitivity: 2.0,
        }
    }
}

impl CameraConfig {
    pub fn projection(&self, aspect: f32) -> Projection {
        Projection::new(self.fovy, aspect, self.znear, self.zfar)
    }
}

#[derive(Debug, Clone)]
pub struct ShadowConfig {
    /// Layers match the surface size; this caps their longest edge in texels.
    pub max_size: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self { max_size: 4096 }
    }
}

#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Mask disk semi-axes along the portal's local X and Y.
    pub radii: [f32; 2],
    pub slices: u32,
    pub a_position: Point3<f32>,
    /// Rotation about +Y; zero faces +Z.
    pub a_yaw: Rad<f32>,
    pub b_position: Point3<f32>,
    pub b_yaw: Rad<f32>,
    pub wobble_enabled: bool,
    pub wobble_amplitude: f32,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            radii: [2.5, 4.0],
            slices: 40,
            a_position: Point3::new(-10.0, 4.0, 10.0),
            a_yaw: Rad(std::f32::consts::FRAC_PI_2),
            b_position: Point3::new(15.0, 4.0, -15.0),
            b_yaw: Rad(0.0),
            wobble_enabled: false,
            wobble_amplitude: 0.02,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColorGradeConfig {
    pub initial: ColorGrade,
    /// Radians per second while a hue key is held.
    pub hue_rate: f32,
    pub saturation_rate: f32,
    pub luma_rate: f32,
}

impl Default for ColorGradeConfig {
    fn default() -> Self {
        Self {
            initial: ColorGrade::default(),
            hue_rate: 1.0,
            saturation_rate: 0.5,
            luma_rate: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RiftConfig {
    pub window_title: String,
    pub window_size: (u32, u32),
    pub asset_dir: PathBuf,
    /// Dim reddish sun instead of the neutral daylight ambient.
    pub evening: bool,
    pub camera: CameraConfig,
    pub shadow: ShadowConfig,
    pub portal: PortalConfig,
    pub grade: ColorGradeConfig,
    pub logging: LoggingConfig,
}

impl Default for RiftConfig {
    fn default() -> Self {
        Self {
            window_title: "Rift".to_string(),
            window_size: (1280, 720),
            asset_dir: PathBuf::from("assets"),
            evening: false,
            camera: CameraConfig::default(),
            shadow: ShadowConfig::default(),
            portal: PortalConfig::default(),
            grade: ColorGradeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RiftConfig {
    /// Defaults with the environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = var(ASSET_DIR_ENV).filter(|dir| !dir.is_empty()) {
            self.asset_dir = PathBuf::from(dir);
        }
        if let Some(size) = var(WINDOW_SIZE_ENV) {
            match parse_window_size(&size) {
                Some((width, height)) => self = self.with_window_size(width, height),
                None => log::warn!("ignoring {WINDOW_SIZE_ENV}={size:?}; expected WIDTHxHEIGHT"),
            }
        }
        if let Some(evening) = var(EVENING_ENV) {
            let evening = matches!(evening.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
            self = self.with_evening(evening);
        }
        self
    }

    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = dir.into();
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width.max(1), height.max(1));
        self
    }

    pub fn with_evening(mut self, evening: bool) -> Self {
        self.evening = evening;
        self
    }

    pub fn asset(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.asset_dir.join(relative)
    }
}

fn parse_window_size(value: &str) -> Option<(u32, u32)> {
    let (width, height) = value.trim().split_once(['x', 'X'])?;
    Some((width.trim().parse().ok()?, height.trim().parse().ok()?))
}
