//! Size-dependent render targets, rebuilt on resize

use crate::gfx::resources::texture_resource::TextureResource;

pub struct FrameTargets {
    /// Scene and portal passes render here; post-process samples it.
    pub colour: TextureResource,
    pub depth_stencil: TextureResource,
    pub width: u32,
    pub height: u32,
}

impl FrameTargets {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        Self {
            colour: TextureResource::create_color_target(device, width, height, "Scene Colour"),
            depth_stencil: TextureResource::create_depth_stencil_texture(
                device,
                width,
                height,
                "Depth Stencil",
            ),
            width,
            height,
        }
    }
}
