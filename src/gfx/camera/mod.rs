pub mod camera_controller;
pub mod camera_utils;
pub mod free_camera;
pub mod target_camera;

pub use camera_controller::{FreeCameraController, TargetCameraController};
pub use camera_utils::{Camera, CameraMode, CameraRig, Projection};
pub use free_camera::FreeCamera;
pub use target_camera::{TargetCamera, TargetCameraBounds};
