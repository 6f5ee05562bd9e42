// src/gfx/rendering/post_process.rs
//! Colour grade and UI mask composite onto the swapchain image
//!
//! The graded colour matrix works in YIQ space: luma scales Y, hue rotates
//! the IQ chroma plane and saturation scales it.

use cgmath::{Matrix, Matrix3, SquareMatrix};

use crate::gfx::math::mat3_to_padded;
use crate::gfx::rendering::pipeline_manager::{PipelineConfig, PipelineManager, POST_PROCESS_PIPELINE};
use crate::gfx::rendering::targets::FrameTargets;
use crate::gfx::resources::texture_library::ImageData;
use crate::gfx::resources::texture_resource::TextureResource;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Display gamma applied in the shader; the surface is not sRGB.
pub const DISPLAY_GAMMA: f32 = 2.2;

fn rgb_to_yiq() -> Matrix3<f32> {
    // rows written as columns, then transposed
    Matrix3::new(
        0.299, 0.587, 0.114, //
        0.596, -0.274, -0.322, //
        0.211, -0.523, 0.312,
    )
    .transpose()
}

/// Hue (radians), saturation and luma factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorGrade {
    pub hue: f32,
    pub saturation: f32,
    pub luma: f32,
}

impl Default for ColorGrade {
    fn default() -> Self {
        Self {
            hue: 0.0,
            saturation: 1.0,
            luma: 1.0,
        }
    }
}

impl ColorGrade {
    /// Linear RGB → graded linear RGB.
    pub fn matrix(&self) -> Matrix3<f32> {
        let to_yiq = rgb_to_yiq();
        let Some(from_yiq) = to_yiq.invert() else {
            return Matrix3::identity();
        };
        let (sin, cos) = self.hue.sin_cos();
        let s = self.saturation;
        let adjust = Matrix3::new(
            self.luma, 0.0, 0.0, //
            0.0, s * cos, s * sin, //
            0.0, -s * sin, s * cos,
        );
        from_yiq * adjust * to_yiq
    }

    /// Applies one frame of key-driven change; saturation and luma stay
    /// non-negative.
    pub fn nudge(&mut self, hue: f32, saturation: f32, luma: f32) {
        self.hue = (self.hue + hue).rem_euclid(std::f32::consts::TAU);
        self.saturation = (self.saturation + saturation).max(0.0);
        self.luma = (self.luma + luma).max(0.0);
    }
}

/// Matches `Grade` in post_process.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GradeUniform {
    pub colour: [[f32; 4]; 3],
    pub ui_alpha: f32,
    pub gamma: f32,
    _padding: [f32; 2],
}

impl GradeUniform {
    pub fn new(grade: &ColorGrade, ui_alpha: f32) -> Self {
        Self {
            colour: mat3_to_padded(&grade.matrix()),
            ui_alpha,
            gamma: DISPLAY_GAMMA,
            _padding: [0.0; 2],
        }
    }
}

/// Post-process pass
///
/// Samples the off-screen scene colour, applies the colour grade and the
/// selected UI mask, then gamma-encodes onto the surface.
pub struct PostProcess {
    layout: BindGroupLayoutWithDesc,
    grade: UniformBuffer<GradeUniform>,
    masks: Vec<TextureResource>,
    /// One per UI mask, all sampling the current scene colour target.
    bind_groups: Vec<wgpu::BindGroup>,
}

impl PostProcess {
    /// Uploads the UI masks and binds each to the scene colour target
    ///
    /// # Arguments
    /// * `device` - WGPU device for texture and bind group creation
    /// * `queue` - WGPU queue for the mask uploads
    /// * `targets` - Frame targets whose colour texture is sampled
    /// * `mask_images` - One image per menu page; a blank mask is used when empty
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        targets: &FrameTargets,
        mask_images: &[ImageData],
    ) -> Self {
        let layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::uniform())
            .create(device, "Post Process Bind Group Layout");

        let mut masks: Vec<TextureResource> = mask_images
            .iter()
            .enumerate()
            .map(|(page, image)| {
                TextureResource::create_from_rgba_data(
                    device,
                    queue,
                    &image.rgba,
                    image.width,
                    image.height,
                    &format!("UI Mask {page}"),
                    true,
                    wgpu::AddressMode::ClampToEdge,
                )
            })
            .collect();
        if masks.is_empty() {
            let clear = ImageData::solid(1, 1, [0, 0, 0, 0]);
            masks.push(TextureResource::create_from_rgba_data(
                device,
                queue,
                &clear.rgba,
                1,
                1,
                "UI Mask Empty",
                true,
                wgpu::AddressMode::ClampToEdge,
            ));
        }

        let grade = UniformBuffer::new_with_data(device, &GradeUniform::new(&ColorGrade::default(), 1.0));
        let mut post = Self {
            layout,
            grade,
            masks,
            bind_groups: Vec::new(),
        };
        post.resize(device, targets);
        post
    }

    pub fn pipeline_config(&self, surface_format: wgpu::TextureFormat) -> PipelineConfig {
        PipelineConfig::default()
            .with_label("Post Process Pipeline")
            .with_shader("post_process")
            .with_no_vertex_buffers()
            .with_cull_mode(None)
            .with_bind_group_layouts(vec![self.layout.layout.clone()])
            .with_color_targets(vec![Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })])
    }

    pub fn mask_count(&self) -> usize {
        self.masks.len()
    }

    /// Rebinds the scene colour target after it was recreated.
    pub fn resize(&mut self, device: &wgpu::Device, targets: &FrameTargets) {
        self.bind_groups = self
            .masks
            .iter()
            .enumerate()
            .map(|(page, mask)| {
                BindGroupBuilder::new(&self.layout)
                    .texture(&targets.colour.view)
                    .sampler(&targets.colour.sampler)
                    .texture(&mask.view)
                    .resource(self.grade.binding_resource())
                    .create(device, &format!("Post Process Bind Group {page}"))
            })
            .collect();
    }

    /// Uploads the grade matrix and mask opacity for this frame
    ///
    /// # Arguments
    /// * `queue` - WGPU queue for the uniform write
    /// * `grade` - Current hue, saturation and luma
    /// * `ui_alpha` - Mask opacity; 0 hides the menu
    pub fn prepare(&mut self, queue: &wgpu::Queue, grade: &ColorGrade, ui_alpha: f32) {
        self.grade.update_content(queue, GradeUniform::new(grade, ui_alpha));
    }

    /// Draws the fullscreen triangle into `output` using mask `page`.
    ///
    /// Out-of-range pages clamp to the last mask.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pipelines: &PipelineManager,
        output: &wgpu::TextureView,
        page: usize,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Post Process Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        let (Some(pipeline), Some(bind_group)) = (
            pipelines.get_pipeline(POST_PROCESS_PIPELINE),
            self.bind_groups.get(page.min(self.bind_groups.len().saturating_sub(1))),
        ) else {
            return;
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::math::test_helpers::*;
    use cgmath::Vector3;

    #[test]
    fn default_grade_is_identity() {
        assert_mat3_near(&ColorGrade::default().matrix(), &Matrix3::identity());
        let full_turn = ColorGrade {
            hue: std::f32::consts::TAU,
            ..ColorGrade::default()
        };
        assert_mat3_near(&full_turn.matrix(), &Matrix3::identity());
    }

    #[test]
    fn zero_saturation_is_grey() {
        let grade = ColorGrade {
            saturation: 0.0,
            ..ColorGrade::default()
        };
        let out = grade.matrix() * Vector3::new(0.9, 0.2, 0.1);
        assert!((out.x - out.y).abs() < 1e-3 && (out.y - out.z).abs() < 1e-3);
        let luma = 0.299 * 0.9 + 0.587 * 0.2 + 0.114 * 0.1;
        assert!((out.x - luma).abs() < 1e-3);
    }

    #[test]
    fn luma_scales_grey() {
        let grade = ColorGrade {
            luma: 2.0,
            ..ColorGrade::default()
        };
        assert_vec3_near(grade.matrix() * Vector3::new(0.25, 0.25, 0.25), Vector3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn nudge_clamps_and_wraps() {
        let mut grade = ColorGrade::default();
        grade.nudge(-0.5, -3.0, 0.25);
        assert_eq!(grade.saturation, 0.0);
        assert_eq!(grade.luma, 1.25);
        assert!(grade.hue > 0.0 && grade.hue < std::f32::consts::TAU);
    }

    #[test]
    fn grade_uniform_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<GradeUniform>(), 64);
        let uniform = GradeUniform::new(&ColorGrade::default(), 0.5);
        assert_eq!(uniform.gamma, DISPLAY_GAMMA);
        assert_eq!(uniform.ui_alpha, 0.5);
    }
}
