//! Per-frame uniform bindings shared by the scene and portal view passes
//!
//! Group 0 holds the camera eye, the whole light set and the spot-light
//! shadow map array with its comparison sampler.

use cgmath::Point3;

use crate::{
    gfx::scene::light::{LightSet, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// MUST match `PointLight` in common.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightRaw {
    colour: [f32; 4],
    position: [f32; 4],
    /// constant, linear, quadratic, unused
    falloff: [f32; 4],
}

/// MUST match `SpotLight` in common.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightRaw {
    colour: [f32; 4],
    position: [f32; 4],
    direction: [f32; 4],
    /// constant, linear, quadratic, power
    falloff: [f32; 4],
}

/// MUST match `Frame` in common.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    eye_pos: [f32; 4],
    light_ambient: [f32; 4],
    light_diffuse: [f32; 4],
    light_dir: [f32; 4],
    pn: u32,
    sn: u32,
    _padding: [u32; 2],
    points: [PointLightRaw; MAX_POINT_LIGHTS],
    spots: [SpotLightRaw; MAX_SPOT_LIGHTS],
}
// 5 * 16 + 4 * 48 + 4 * 64 = 528 bytes

impl FrameUniform {
    pub fn new(eye: Point3<f32>, lights: &LightSet) -> Self {
        let directional = &lights.directional;
        let mut points = [PointLightRaw::default(); MAX_POINT_LIGHTS];
        for (raw, light) in points.iter_mut().zip(lights.points()) {
            *raw = PointLightRaw {
                colour: light.colour,
                position: [light.position.x, light.position.y, light.position.z, 1.0],
                falloff: [light.constant, light.linear, light.quadratic, 0.0],
            };
        }
        let mut spots = [SpotLightRaw::default(); MAX_SPOT_LIGHTS];
        for (raw, light) in spots.iter_mut().zip(lights.spots()) {
            *raw = SpotLightRaw {
                colour: light.colour,
                position: [light.position.x, light.position.y, light.position.z, 1.0],
                direction: [light.direction.x, light.direction.y, light.direction.z, 0.0],
                falloff: [light.constant, light.linear, light.quadratic, light.power],
            };
        }

        Self {
            eye_pos: [eye.x, eye.y, eye.z, 1.0],
            light_ambient: directional.ambient,
            light_diffuse: directional.diffuse,
            light_dir: [
                directional.direction.x,
                directional.direction.y,
                directional.direction.z,
                0.0,
            ],
            pn: lights.points().len() as u32,
            sn: lights.spots().len() as u32,
            _padding: [0; 2],
            points,
            spots,
        }
    }

    pub fn point_count(&self) -> u32 {
        self.pn
    }

    pub fn spot_count(&self) -> u32 {
        self.sn
    }
}

pub type FrameUBO = UniformBuffer<FrameUniform>;

/// Layout and bind group for group 0.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(
        device: &wgpu::Device,
        ubo: &FrameUBO,
        shadow_view: &wgpu::TextureView,
        shadow_sampler: &wgpu::Sampler,
    ) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .next_binding_fragment(binding_types::depth_texture_2d_array())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Comparison))
            .create(device, "Frame Bind Group Layout");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .texture(shadow_view)
            .sampler(shadow_sampler)
            .create(device, "Frame Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    /// Points the existing layout at a recreated shadow map array.
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        ubo: &FrameUBO,
        shadow_view: &wgpu::TextureView,
        shadow_sampler: &wgpu::Sampler,
    ) {
        self.bind_group = BindGroupBuilder::new(&self.bind_group_layout)
            .resource(ubo.binding_resource())
            .texture(shadow_view)
            .sampler(shadow_sampler)
            .create(device, "Frame Bind Group");
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
