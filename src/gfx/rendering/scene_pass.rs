// src/gfx/rendering/scene_pass.rs
//! Lit render of every visible node from the active camera
//!
//! Also owns the group 0..2 bindings the portal view pass reuses.

use crate::gfx::rendering::draw_list::{DrawItem, DrawList};
use crate::gfx::rendering::pipeline_manager::{opaque_depth, PipelineConfig, PipelineManager, SCENE_PIPELINE};
use crate::gfx::rendering::shadow_pass::ShadowPass;
use crate::gfx::rendering::targets::FrameTargets;
use crate::gfx::rendering::uniforms::NodeUniform;
use crate::gfx::resources::global_bindings::{FrameUBO, FrameUniform, GlobalBindings};
use crate::gfx::resources::material_bindings::MaterialBindings;
use crate::gfx::resources::per_draw_bindings::PerDrawBindings;
use crate::gfx::resources::texture_resource::TextureResource;
use crate::gfx::scene::mesh::DrawMesh;
use crate::gfx::scene::scene::SceneState;

const CLEAR_COLOUR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.03,
    a: 1.0,
};

/// Scene pass
///
/// Owns the per-frame block (group 0), the dynamic per-node block (group 1)
/// and the material cache (group 2).
pub struct ScenePass {
    frame_ubo: FrameUBO,
    globals: GlobalBindings,
    nodes: PerDrawBindings<NodeUniform>,
    materials: MaterialBindings,
}

impl ScenePass {
    /// Creates the scene bindings
    ///
    /// # Arguments
    /// * `device` - WGPU device for buffer and bind group creation
    /// * `shadows` - Shadow pass whose map array is bound in group 0
    pub fn new(device: &wgpu::Device, shadows: &ShadowPass) -> Self {
        let frame_ubo = FrameUBO::new(device);
        let globals = GlobalBindings::new(
            device,
            &frame_ubo,
            shadows.array_view(),
            shadows.comparison_sampler(),
        );

        Self {
            frame_ubo,
            globals,
            nodes: PerDrawBindings::new(device, wgpu::ShaderStages::VERTEX_FRAGMENT, 64, "Node"),
            materials: MaterialBindings::new(device),
        }
    }

    /// Layouts for groups 0, 1 and 2, in order.
    pub fn layouts(&self) -> Vec<wgpu::BindGroupLayout> {
        vec![
            self.globals.bind_group_layout().clone(),
            self.nodes.layout().clone(),
            self.materials.layout().clone(),
        ]
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_label("Scene Pipeline")
            .with_shader("scene")
            .with_bind_group_layouts(self.layouts())
            .with_depth_stencil(opaque_depth(TextureResource::DEPTH_STENCIL_FORMAT))
            .with_color_targets(vec![Some(wgpu::ColorTargetState {
                format: TextureResource::HDR_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })])
    }

    pub fn nodes(&self) -> &PerDrawBindings<NodeUniform> {
        &self.nodes
    }

    /// Uploads the frame block, every node slot and any new material groups.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &SceneState,
        draws: &DrawList,
    ) {
        self.frame_ubo
            .update_content(queue, FrameUniform::new(scene.camera().position(), &scene.lights));
        self.nodes.upload(device, queue, &draws.uniforms);
        let keys = draws
            .scene
            .iter()
            .chain(draws.portals.iter().flatten())
            .map(|item| &item.material);
        self.materials.prepare(device, &scene.textures, keys);
    }

    /// Records the scene pass, clearing colour, depth and stencil
    ///
    /// # Arguments
    /// * `encoder` - Frame command encoder
    /// * `pipelines` - Pipeline cache
    /// * `targets` - Off-screen colour and depth-stencil targets
    /// * `scene` - Scene supplying meshes
    /// * `draws` - This frame's draw list; only `draws.scene` is drawn
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pipelines: &PipelineManager,
        targets: &FrameTargets,
        scene: &SceneState,
        draws: &DrawList,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &targets.colour.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOUR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.depth_stencil.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        // the colour target is still cleared when the pipeline is missing
        let Some(pipeline) = pipelines.get_pipeline(SCENE_PIPELINE) else {
            return;
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, self.globals.bind_group(), &[]);
        self.draw_items(&mut pass, &draws.scene, scene);
    }

    /// Binds groups 1 and 2 per item and draws it. Group 0 (and 3 for
    /// portals) must already be set.
    pub fn draw_items(&self, pass: &mut wgpu::RenderPass<'_>, items: &[DrawItem], scene: &SceneState) {
        for item in items {
            let (Some(mesh), Some(material)) = (scene.meshes.gpu(item.mesh), self.materials.get(&item.material))
            else {
                continue;
            };
            pass.set_bind_group(1, self.nodes.bind_group(), &[self.nodes.offset(item.slot)]);
            pass.set_bind_group(2, material, &[]);
            pass.draw_mesh(mesh);
        }
    }

    /// Rebinds group 0 after the shadow pass recreated its maps.
    pub fn rebind_shadows(&mut self, device: &wgpu::Device, shadows: &ShadowPass) {
        self.globals.rebind(
            device,
            &self.frame_ubo,
            shadows.array_view(),
            shadows.comparison_sampler(),
        );
    }

    pub fn globals(&self) -> &GlobalBindings {
        &self.globals
    }
}
