// src/gfx/rendering/draw_list.rs
//! Per-frame draw list
//!
//! Every node uniform a frame needs is built up front so one upload fills
//! the dynamic node buffer. Slots are laid out as: scene draws, portal A
//! draws, portal B draws, then the two masks.

use cgmath::Matrix4;

use crate::gfx::rendering::uniforms::NodeUniform;
use crate::gfx::resources::texture_library::{TextureId, TextureLibrary};
use crate::gfx::scene::mesh::MeshId;
use crate::gfx::scene::node::{NodeHandle, RenderData};
use crate::gfx::scene::portal::PortalSide;
use crate::gfx::scene::scene::SceneState;

/// Albedo and normal map actually bound, after fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialKey {
    pub texture: TextureId,
    pub normal_map: TextureId,
}

impl MaterialKey {
    pub fn for_render(render: &RenderData) -> Self {
        Self {
            texture: render.texture.unwrap_or(TextureLibrary::CHECKERBOARD),
            normal_map: render.normal_map.unwrap_or(TextureLibrary::FLAT_NORMAL),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub node: NodeHandle,
    pub slot: usize,
    pub mesh: MeshId,
    pub material: MaterialKey,
}

#[derive(Debug, Default)]
pub struct DrawList {
    pub uniforms: Vec<NodeUniform>,
    pub scene: Vec<DrawItem>,
    pub portals: [Vec<DrawItem>; 2],
    pub masks: Vec<(PortalSide, DrawItem)>,
}

impl DrawList {
    /// Builds every node uniform for one frame
    ///
    /// # Arguments
    /// * `scene` - Scene after this frame's update
    ///
    /// # Returns
    /// Uniforms in slot order plus the draw items of each pass
    pub fn build(scene: &SceneState) -> Self {
        let camera = scene.camera();
        let view_projection = camera.view_projection();
        let light_view_projections = scene.shadows.view_projections();

        let mut list = Self::default();
        list.scene = list.push_drawables(scene, &view_projection, &light_view_projections);

        for side in PortalSide::BOTH {
            let through = view_projection * scene.portal_view(side);
            list.portals[side.index()] = list.push_drawables(scene, &through, &light_view_projections);
        }

        for side in PortalSide::BOTH {
            let mask = scene.portals.portal(side).mask;
            let Some(render) = scene.graph.get(mask).render else {
                continue;
            };
            let item = list.push(scene, mask, &render, &view_projection, &light_view_projections);
            list.masks.push((side, item));
        }

        list
    }

    fn push_drawables(
        &mut self,
        scene: &SceneState,
        view_projection: &Matrix4<f32>,
        light_view_projections: &[Matrix4<f32>],
    ) -> Vec<DrawItem> {
        scene
            .graph
            .drawables()
            .map(|(handle, _, render)| {
                self.push(scene, handle, render, view_projection, light_view_projections)
            })
            .collect()
    }

    fn push(
        &mut self,
        scene: &SceneState,
        node: NodeHandle,
        render: &RenderData,
        view_projection: &Matrix4<f32>,
        light_view_projections: &[Matrix4<f32>],
    ) -> DrawItem {
        let model = scene.graph.composed_transform_matrix(node);
        let normal = scene.graph.composed_normal_matrix(node);
        self.uniforms.push(NodeUniform::new(
            view_projection,
            &model,
            &normal,
            light_view_projections,
            &render.material,
            render.normal_map.is_some(),
        ));
        DrawItem {
            node,
            slot: self.uniforms.len() - 1,
            mesh: render.mesh,
            material: MaterialKey::for_render(render),
        }
    }

    pub fn len(&self) -> usize {
        self.uniforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uniforms.is_empty()
    }
}
