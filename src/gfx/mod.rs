//! # Graphics Module
//!
//! Everything between the scene description and the presented image.
//!
//! ## Architecture Overview
//!
//! - **Scene** ([`scene`]) - transforms, the node arena, lights, portals and
//!   the per-frame `SceneState`
//! - **Camera System** ([`camera`]) - free and target cameras behind one trait
//! - **Rendering Pipeline** ([`rendering`]) - shadow, scene, portal stencil,
//!   portal view and post-process passes
//! - **Resource Management** ([`resources`]) - materials, textures and bind groups
//! - **Geometry** ([`geometry`]) - procedural primitives and OBJ loading
//!
//! ## Usage
//!
//! ```no_run
//! use rift::config::RiftConfig;
//! use rift::gfx::scene::demo_scene;
//!
//! let config = RiftConfig::from_env();
//! let scene = demo_scene::build(&config).expect("demo scene");
//! println!("{} nodes", scene.graph.len());
//! ```

pub mod camera;
pub mod geometry;
pub mod math;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::{Camera, CameraMode, CameraRig};
pub use rendering::render_engine::RenderEngine;
pub use scene::{SceneGraph, SceneState, Transform};
