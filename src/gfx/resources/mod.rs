//! GPU-side resources shared between passes
//!
//! Bind group layouts and bind groups for the per-frame block (group 0),
//! per-draw node blocks (group 1) and material textures (group 2), plus the
//! texture library and materials.

pub mod global_bindings;
pub mod material;
pub mod material_bindings;
pub mod per_draw_bindings;
pub mod texture_library;
pub mod texture_resource;

pub use global_bindings::{FrameUBO, FrameUniform, GlobalBindings};
pub use material::Material;
pub use material_bindings::MaterialBindings;
pub use per_draw_bindings::PerDrawBindings;
pub use texture_library::{TextureId, TextureKind, TextureLibrary};
pub use texture_resource::TextureResource;
