// src/gfx/rendering/stencil_pass.rs
//! Writes portal layer ids into the stencil buffer
//!
//! After this pass the stencil holds 0 where no portal is visible, 1 over
//! portal A's disk and 2 over portal B's. Depth from the scene pass is kept
//! so a wall in front of a portal hides its mask.

use crate::gfx::rendering::draw_list::DrawList;
use crate::gfx::rendering::pipeline_manager::{PipelineConfig, PipelineManager, PORTAL_MASK_PIPELINE};
use crate::gfx::rendering::targets::FrameTargets;
use crate::gfx::rendering::uniforms::NodeUniform;
use crate::gfx::resources::per_draw_bindings::PerDrawBindings;
use crate::gfx::resources::texture_resource::TextureResource;
use crate::gfx::scene::mesh::DrawMesh;
use crate::gfx::scene::scene::SceneState;

/// Always pass, replace with the reference.
pub fn mask_stencil_state() -> wgpu::StencilState {
    let face = wgpu::StencilFaceState {
        compare: wgpu::CompareFunction::Always,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op: wgpu::StencilOperation::Replace,
    };
    wgpu::StencilState {
        front: face,
        back: face,
        read_mask: 0xFF,
        write_mask: 0xFF,
    }
}

/// No fragment stage and no colour target; both faces are drawn.
pub fn mask_pipeline_config(node_layout: &wgpu::BindGroupLayout) -> PipelineConfig {
    PipelineConfig::default()
        .with_label("Portal Mask Pipeline")
        .with_shader("portal_mask")
        .with_vertex_only()
        .with_cull_mode(None)
        .with_bind_group_layouts(vec![node_layout.clone()])
        .with_depth_stencil(wgpu::DepthStencilState {
            format: TextureResource::DEPTH_STENCIL_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: mask_stencil_state(),
            bias: wgpu::DepthBiasState::default(),
        })
}

/// Records the portal stencil pass
///
/// Keeps the scene depth and clears stencil to 0, then draws mask A with
/// reference 1 and mask B with reference 2.
///
/// # Arguments
/// * `encoder` - Frame command encoder
/// * `pipelines` - Pipeline cache; the pass only clears without its pipeline
/// * `targets` - Targets holding the depth-stencil texture
/// * `scene` - Scene supplying the mask meshes
/// * `nodes` - Dynamic node bindings holding the mask slots
/// * `draws` - This frame's draw list
pub fn render(
    encoder: &mut wgpu::CommandEncoder,
    pipelines: &PipelineManager,
    targets: &FrameTargets,
    scene: &SceneState,
    nodes: &PerDrawBindings<NodeUniform>,
    draws: &DrawList,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Portal Stencil Pass"),
        color_attachments: &[],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &targets.depth_stencil.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Load,
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

    let Some(pipeline) = pipelines.get_pipeline(PORTAL_MASK_PIPELINE) else {
        return;
    };
    pass.set_pipeline(pipeline);

    for (side, item) in &draws.masks {
        let Some(mesh) = scene.meshes.gpu(item.mesh) else {
            continue;
        };
        pass.set_stencil_reference(side.stencil_ref());
        pass.set_bind_group(0, nodes.bind_group(), &[nodes.offset(item.slot)]);
        pass.draw_mesh(mesh);
    }
}


#[cfg(test)]
mod tests {
    use super::reference::*;
    use super::*;
    use crate::gfx::camera::Projection;
    use crate::gfx::geometry::generate_disk;
    use crate::gfx::math::transform_point;
    use crate::gfx::rendering::portal_pass::view_stencil_state;
    use crate::gfx::scene::node::SceneGraph;
    use crate::gfx::scene::portal::{Portal, PortalSide};
    use crate::gfx::scene::transform::Transform;
    use cgmath::{Deg, Matrix4, Point3, Vector3};

    const RADII: [f32; 2] = [1.0, 1.5];

    /// Two portals side by side ten units in front of a camera at the origin.
    fn layered_stencil() -> (StencilBuffer, [Point3<f32>; 2]) {
        let mut graph = SceneGraph::new();
        let a = Portal::insert(&mut graph, "a", Transform::from_position(-2.5, 0.0, -10.0), 0, RADII).unwrap();
        // B turned away from the camera: culling must stay off
        let b = Portal::insert(
            &mut graph,
            "b",
            Transform::from_position(2.5, 0.0, -10.0).with_orientation(0.0, std::f32::consts::PI, 0.0),
            0,
            RADII,
        )
        .unwrap();

        let view_projection = Projection::new(Deg(60.0).into(), 1.0, 0.1, 100.0).matrix()
            * Matrix4::look_to_rh(Point3::new(0.0, 0.0, 0.0), -Vector3::unit_z(), Vector3::unit_y());

        let disk = generate_disk(40, RADII);
        let state = mask_stencil_state();
        let mut buffer = StencilBuffer::new(96);
        let mut centres = [Point3::new(0.0, 0.0, 0.0); 2];
        for (side, portal) in [(PortalSide::A, a), (PortalSide::B, b)] {
            let mvp = view_projection * graph.composed_transform_matrix(portal.mask);
            draw(&mut buffer, &disk, &mvp, &state, side.stencil_ref());
            centres[side.index()] = transform_point(&mvp, Point3::new(0.0, 0.0, 0.0));
        }
        (buffer, centres)
    }

    #[test]
    fn masks_write_their_layer_ids() {
        let (buffer, [a, b]) = layered_stencil();
        assert_eq!(buffer.at_ndc(a.x, a.y), 1);
        assert_eq!(buffer.at_ndc(b.x, b.y), 2);
        assert_eq!(buffer.at_ndc(0.0, 0.0), 0);
        assert_eq!(buffer.at_ndc(-0.95, 0.95), 0);
        assert!(buffer.values.iter().all(|v| *v <= 2));
    }

    #[test]
    fn later_mask_overwrites_overlap() {
        let disk = generate_disk(40, [0.5, 0.5]);
        let state = mask_stencil_state();
        let mut buffer = StencilBuffer::new(32);
        draw(&mut buffer, &disk, &Matrix4::from_scale(1.0), &state, 1);
        draw(&mut buffer, &disk, &Matrix4::from_translation(Vector3::new(0.25, 0.0, 0.0)), &state, 2);
        assert_eq!(buffer.at_ndc(0.4, 0.0), 2);
        assert_eq!(buffer.at_ndc(-0.4, 0.0), 1);
    }

    #[test]
    fn equal_test_restricts_each_portal_view_to_its_layer() {
        let (buffer, [a, b]) = layered_stencil();
        let state = view_stencil_state();
        for (reference, centre, other) in [(1, a, b), (2, b, a)] {
            let mut stored = buffer.at_ndc(centre.x, centre.y);
            assert!(test(&state, true, reference, &mut stored));
            assert_eq!(stored, reference as u8);

            let mut stored = buffer.at_ndc(other.x, other.y);
            assert!(!test(&state, true, reference, &mut stored));
            let mut stored = buffer.at_ndc(0.0, 0.9);
            assert!(!test(&state, true, reference, &mut stored));
        }
    }
}
