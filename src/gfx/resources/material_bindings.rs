//! Group 2: albedo texture, normal map and their sampler
//!
//! Bind groups are built on first use of a texture pair and cached for the
//! rest of the run. Textures are never unloaded, so entries never go stale.

use std::collections::HashMap;

use crate::gfx::rendering::draw_list::MaterialKey;
use crate::gfx::resources::texture_library::TextureLibrary;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
};

pub struct MaterialBindings {
    layout: BindGroupLayoutWithDesc,
    groups: HashMap<MaterialKey, wgpu::BindGroup>,
}

impl MaterialBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Material Bind Group Layout");

        Self {
            layout,
            groups: HashMap::new(),
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout.layout
    }

    /// Creates the bind groups for any keys not seen before.
    pub fn prepare<'k>(
        &mut self,
        device: &wgpu::Device,
        textures: &TextureLibrary,
        keys: impl IntoIterator<Item = &'k MaterialKey>,
    ) {
        for key in keys {
            if self.groups.contains_key(key) {
                continue;
            }
            let (Some(albedo), Some(normals)) = (textures.gpu(key.texture), textures.gpu(key.normal_map)) else {
                log::warn!("textures {:?} not uploaded", key);
                continue;
            };
            let group = BindGroupBuilder::new(&self.layout)
                .texture(&albedo.view)
                .texture(&normals.view)
                .sampler(&albedo.sampler)
                .create(
                    device,
                    &format!("Material {}/{}", key.texture, key.normal_map),
                );
            self.groups.insert(*key, group);
        }
    }

    pub fn get(&self, key: &MaterialKey) -> Option<&wgpu::BindGroup> {
        self.groups.get(key)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
