// src/wgpu_utils/uniform_buffer.rs - Uniform buffers, single and per-draw
use std::marker::PhantomData;

fn short_type_name<T>() -> &'static str {
    let type_name = std::any::type_name::<T>();
    match type_name.rfind(':') {
        Some(pos) => &type_name[(pos + 1)..],
        None => type_name,
    }
}

/// Typed wrapper around a single-struct uniform buffer
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    previous_content: Vec<u8>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    /// Create a new uniform buffer
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBuffer: {}", short_type_name::<Content>())),
            size: std::mem::size_of::<Content>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        UniformBuffer {
            buffer,
            content_type: PhantomData,
            previous_content: Vec::new(),
        }
    }

    /// Create buffer with initial data
    pub fn new_with_data(device: &wgpu::Device, initial_content: &Content) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBuffer: {}", short_type_name::<Content>())),
            size: std::mem::size_of::<Content>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: true,
        });

        buffer
            .slice(..)
            .get_mapped_range_mut()
            .clone_from_slice(bytemuck::bytes_of(initial_content));
        buffer.unmap();

        UniformBuffer {
            buffer,
            content_type: PhantomData,
            previous_content: bytemuck::bytes_of(initial_content).to_vec(),
        }
    }

    /// Update buffer content (skips the write when nothing changed)
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) {
        let new_content = bytemuck::bytes_of(&content);
        if self.previous_content == new_content {
            return;
        }
        queue.write_buffer(&self.buffer, 0, new_content);
        self.previous_content = new_content.to_vec();
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

/// Round `size` up to the next multiple of `alignment` (a power of two).
pub fn align_to(size: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    (size + alignment - 1) & !(alignment - 1)
}

/// Uniform buffer holding one `Content` slot per draw call.
///
/// Slots are spaced by the device's `min_uniform_buffer_offset_alignment`
/// and selected at draw time with `set_bind_group(.., &[offset])`. The
/// buffer grows (and must be re-bound) when more slots are requested than
/// it currently holds.
pub struct DynamicUniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    stride: u64,
    capacity: usize,
    staging: Vec<u8>,
}

impl<Content: bytemuck::Pod> DynamicUniformBuffer<Content> {
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = align_to(std::mem::size_of::<Content>() as u64, alignment);
        let capacity = capacity.max(1);

        DynamicUniformBuffer {
            buffer: Self::allocate(device, stride, capacity),
            content_type: PhantomData,
            stride,
            capacity,
            staging: Vec::new(),
        }
    }

    fn allocate(device: &wgpu::Device, stride: u64, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!(
                "DynamicUniformBuffer<{}>",
                short_type_name::<Content>()
            )),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Uploads `contents` into consecutive slots.
    ///
    /// Returns `true` when the buffer was reallocated, in which case every
    /// bind group referencing it has to be rebuilt.
    pub fn write_all(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        contents: &[Content],
    ) -> bool {
        let mut reallocated = false;
        if contents.len() > self.capacity {
            self.capacity = contents.len().next_power_of_two();
            self.buffer = Self::allocate(device, self.stride, self.capacity);
            reallocated = true;
            log::debug!(
                "grew {} to {} slots",
                short_type_name::<Content>(),
                self.capacity
            );
        }

        if contents.is_empty() {
            return reallocated;
        }

        let size = std::mem::size_of::<Content>();
        self.staging.clear();
        self.staging.resize(self.stride as usize * contents.len(), 0);
        for (i, content) in contents.iter().enumerate() {
            let start = i * self.stride as usize;
            self.staging[start..start + size].copy_from_slice(bytemuck::bytes_of(content));
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
        reallocated
    }

    /// Dynamic offset of slot `index`.
    pub fn offset(&self, index: usize) -> wgpu::DynamicOffset {
        (index as u64 * self.stride) as wgpu::DynamicOffset
    }

    /// Size of the window bound for each draw.
    pub fn binding_size() -> wgpu::BufferSize {
        wgpu::BufferSize::new(std::mem::size_of::<Content>() as u64)
            .unwrap_or(wgpu::BufferSize::MIN)
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_to_rounds_up_to_alignment() {
        assert_eq!(align_to(0, 256), 0);
        assert_eq!(align_to(1, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(448, 256), 512);
        assert_eq!(align_to(112, 64), 128);
    }
}
