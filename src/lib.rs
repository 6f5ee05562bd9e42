// src/lib.rs
//! Rift
//!
//! A real-time wgpu renderer built around a hierarchical scene graph,
//! spot-light shadow maps and a pair of stencil-masked portals.
//!
//! ```no_run
//! use rift::{app::RiftApp, config::RiftConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     RiftApp::new(RiftConfig::from_env())?.run()
//! }
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod input;
pub mod logging;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::RiftApp;
pub use config::RiftConfig;
