// src/gfx/rendering/mod.rs
//! Multi-pass frame rendering
//!
//! Each pass owns its bindings and contributes a pipeline config to the
//! shared `PipelineManager`; `RenderEngine` records them in frame order.

pub mod draw_list;
pub mod pipeline_manager;
pub mod portal_pass;
pub mod post_process;
pub mod render_engine;
pub mod scene_pass;
pub mod shaders;
pub mod shadow_pass;
pub mod stencil_pass;
pub mod targets;
pub mod uniforms;

pub use draw_list::{DrawItem, DrawList};
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use post_process::ColorGrade;
pub use render_engine::{PostSettings, RenderEngine};
