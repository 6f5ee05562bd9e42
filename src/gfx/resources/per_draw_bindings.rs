//! One bind group over a dynamic uniform buffer with a slot per draw

use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::DynamicUniformBuffer,
};

pub struct PerDrawBindings<Content> {
    layout: BindGroupLayoutWithDesc,
    ubo: DynamicUniformBuffer<Content>,
    bind_group: wgpu::BindGroup,
    label: &'static str,
}

impl<Content: bytemuck::Pod> PerDrawBindings<Content> {
    pub fn new(
        device: &wgpu::Device,
        visibility: wgpu::ShaderStages,
        capacity: usize,
        label: &'static str,
    ) -> Self {
        let layout = BindGroupLayoutBuilder::new()
            .next_binding(
                visibility,
                binding_types::uniform_dynamic(DynamicUniformBuffer::<Content>::binding_size()),
            )
            .create(device, &format!("{label} Bind Group Layout"));
        let ubo = DynamicUniformBuffer::new(device, capacity);
        let bind_group = Self::create_bind_group(device, &layout, &ubo, label);

        Self {
            layout,
            ubo,
            bind_group,
            label,
        }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        ubo: &DynamicUniformBuffer<Content>,
        label: &str,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .buffer_window(ubo.buffer(), DynamicUniformBuffer::<Content>::binding_size())
            .create(device, &format!("{label} Bind Group"))
    }

    /// Writes `contents` into slots `0..contents.len()`.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, contents: &[Content]) {
        if self.ubo.write_all(device, queue, contents) {
            self.bind_group = Self::create_bind_group(device, &self.layout, &self.ubo, self.label);
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn offset(&self, slot: usize) -> wgpu::DynamicOffset {
        self.ubo.offset(slot)
    }
}
