// src/gfx/rendering/portal_pass.rs
//! Re-renders the scene through each portal, clipped to its stencil layer
//!
//! Geometry around the partner portal is carried onto the viewed portal by
//! the view offset. Depth is cleared first so the mask depth does not hide
//! anything; the stencil from the mask pass is loaded and tested `Equal`.

use cgmath::{Matrix4, SquareMatrix};

use crate::gfx::rendering::draw_list::DrawList;
use crate::gfx::rendering::pipeline_manager::{PipelineConfig, PipelineManager, PORTAL_VIEW_PIPELINE};
use crate::gfx::rendering::scene_pass::ScenePass;
use crate::gfx::rendering::targets::FrameTargets;
use crate::gfx::rendering::uniforms::PortalUniform;
use crate::gfx::resources::texture_resource::TextureResource;
use crate::gfx::scene::portal::PortalSide;
use crate::gfx::scene::scene::SceneState;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Pass only where the stencil equals the reference; never write it.
pub fn view_stencil_state() -> wgpu::StencilState {
    let face = wgpu::StencilFaceState {
        compare: wgpu::CompareFunction::Equal,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op: wgpu::StencilOperation::Keep,
    };
    wgpu::StencilState {
        front: face,
        back: face,
        read_mask: 0xFF,
        write_mask: 0,
    }
}

/// Portal block for looking through `side`.
pub fn portal_uniform(scene: &SceneState, side: PortalSide) -> PortalUniform {
    let graph = &scene.graph;
    let view = scene.portal_view(side);
    let offset = view.invert().unwrap_or_else(|| {
        log::warn!("portal {side:?} view offset is singular");
        Matrix4::identity()
    });
    PortalUniform::new(
        scene.portals.position(graph, side),
        scene.portals.normal(graph, side),
        scene.portals.normal(graph, side.partner()),
        offset,
    )
}

/// Portal View pass
///
/// Redraws the scene through each portal inside one render pass, clipped to
/// that portal's stencil layer. Holds one group 3 uniform block per portal.
pub struct PortalPass {
    layout: BindGroupLayoutWithDesc,
    ubos: [UniformBuffer<PortalUniform>; 2],
    bind_groups: [wgpu::BindGroup; 2],
}

impl PortalPass {
    /// Creates the group 3 layout and both portal blocks
    ///
    /// # Arguments
    /// * `device` - WGPU device for buffer and bind group creation
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .create(device, "Portal Bind Group Layout");
        let ubos = [UniformBuffer::new(device), UniformBuffer::new(device)];
        let bind_groups = PortalSide::BOTH.map(|side| {
            BindGroupBuilder::new(&layout)
                .resource(ubos[side.index()].binding_resource())
                .create(device, &format!("Portal {side:?} Bind Group"))
        });

        Self {
            layout,
            ubos,
            bind_groups,
        }
    }

    /// Scene pipeline state with `fs_portal`, group 3 and an `Equal` stencil test
    ///
    /// # Arguments
    /// * `scene_pass` - Supplies the group 0..2 layouts shared with the scene pass
    pub fn pipeline_config(&self, scene_pass: &ScenePass) -> PipelineConfig {
        let mut layouts = scene_pass.layouts();
        layouts.push(self.layout.layout.clone());
        PipelineConfig::default()
            .with_label("Portal View Pipeline")
            .with_shader("scene")
            .with_fragment_entry("fs_portal")
            .with_bind_group_layouts(layouts)
            .with_depth_stencil(wgpu::DepthStencilState {
                format: TextureResource::DEPTH_STENCIL_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: view_stencil_state(),
                bias: wgpu::DepthBiasState::default(),
            })
            .with_color_targets(vec![Some(wgpu::ColorTargetState {
                format: TextureResource::HDR_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })])
    }

    /// Uploads both portal blocks, including this frame's wobble.
    pub fn prepare(&mut self, queue: &wgpu::Queue, scene: &SceneState) {
        for side in PortalSide::BOTH {
            self.ubos[side.index()].update_content(queue, portal_uniform(scene, side));
        }
    }

    /// Records the portal view pass
    ///
    /// Colour and stencil are loaded, depth is cleared. Portal A's draws run
    /// with stencil reference 1, then portal B's with reference 2.
    ///
    /// # Arguments
    /// * `encoder` - Frame command encoder
    /// * `pipelines` - Pipeline cache; the pass is skipped without its pipeline
    /// * `targets` - Off-screen colour and depth-stencil targets
    /// * `scene_pass` - Owner of the group 0..2 bindings
    /// * `scene` - Scene supplying meshes
    /// * `draws` - This frame's draw list
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pipelines: &PipelineManager,
        targets: &FrameTargets,
        scene_pass: &ScenePass,
        scene: &SceneState,
        draws: &DrawList,
    ) {
        let Some(pipeline) = pipelines.get_pipeline(PORTAL_VIEW_PIPELINE) else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Portal View Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &targets.colour.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
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
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, scene_pass.globals().bind_group(), &[]);

        for side in PortalSide::BOTH {
            pass.set_stencil_reference(side.stencil_ref());
            pass.set_bind_group(3, &self.bind_groups[side.index()], &[]);
            scene_pass.draw_items(&mut pass, &draws.portals[side.index()], scene);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RiftConfig;
    use crate::gfx::camera::Camera;
    use crate::gfx::math::{test_helpers::*, transform_point};
    use crate::gfx::scene::demo_scene;
    use cgmath::{InnerSpace, Point3, Vector3};

    fn demo() -> SceneState {
        demo_scene::build(&RiftConfig::default().with_asset_dir("/nonexistent/rift-assets")).unwrap()
    }

    #[test]
    fn offset_maps_entry_onto_exit() {
        let scene = demo();
        for side in PortalSide::BOTH {
            let uniform = portal_uniform(&scene, side);
            let offset = Matrix4::from(uniform.offset);
            let entry = Point3::new(uniform.portal_pos[0], uniform.portal_pos[1], uniform.portal_pos[2]);
            assert_point3_near(
                transform_point(&offset, entry),
                scene.portals.position(&scene.graph, side.partner()),
            );
        }
    }

    #[test]
    fn virtual_eye_sits_behind_exit_portal() {
        let scene = demo();
        let uniform = portal_uniform(&scene, PortalSide::A);
        let offset = Matrix4::from(uniform.offset);
        let eye = scene.camera().position();
        let in_front_of_a = scene.portals.signed_distance(&scene.graph, PortalSide::A, eye);

        let virtual_eye = transform_point(&offset, eye);
        let behind_b = scene.portals.signed_distance(&scene.graph, PortalSide::B, virtual_eye);
        assert!((behind_b + in_front_of_a).abs() < 1e-3);
    }

    #[test]
    fn normals_are_entry_then_exit() {
        let scene = demo();
        let uniform = portal_uniform(&scene, PortalSide::B);
        let normal = Vector3::new(uniform.portal_normal[0], uniform.portal_normal[1], uniform.portal_normal[2]);
        let other = Vector3::new(
            uniform.other_portal_normal[0],
            uniform.other_portal_normal[1],
            uniform.other_portal_normal[2],
        );
        assert_vec3_near(normal, Vector3::unit_z());
        assert_vec3_near(other, Vector3::unit_x());
        assert!((normal.magnitude() - 1.0).abs() < EPS);
        assert_eq!(uniform.portal_normal[3], 0.0);
    }

    #[test]
    fn view_state_never_writes() {
        let state = view_stencil_state();
        assert_eq!(state.write_mask, 0);
        assert_eq!(state.front.compare, wgpu::CompareFunction::Equal);
        assert_eq!(state.back, state.front);
    }
}
