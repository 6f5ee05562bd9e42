// src/gfx/rendering/shadow_pass.rs
//! Depth-only render of the scene from every spot light
//!
//! Entry `i` renders into layer `i` of the shadow map array. Layers are sized
//! to the surface and rebuilt on resize. Front faces are culled in the
//! pipeline to keep acne off lit surfaces.

use crate::gfx::rendering::pipeline_manager::{opaque_depth, PipelineConfig, PipelineManager, SHADOW_PIPELINE};
use crate::gfx::rendering::uniforms::DepthUniform;
use crate::gfx::resources::per_draw_bindings::PerDrawBindings;
use crate::gfx::resources::texture_resource::TextureResource;
use crate::gfx::scene::light::MAX_SPOT_LIGHTS;
use crate::gfx::scene::mesh::{DrawMesh, MeshId};
use crate::gfx::scene::scene::SceneState;
use crate::gfx::scene::shadow::layer_size;

/// Shadow pass
///
/// Owns the spot-light depth array and one dynamic depth block per
/// light and caster pair.
pub struct ShadowPass {
    bindings: PerDrawBindings<DepthUniform>,
    max_size: u32,
    size: (u32, u32),
    maps: TextureResource,
    layer_views: Vec<wgpu::TextureView>,
    uniforms: Vec<DepthUniform>,
    draws: Vec<MeshId>,
}

impl ShadowPass {
    /// Creates the shadow map array for a `width` x `height` surface.
    ///
    /// # Arguments
    /// * `device` - The wgpu device
    /// * `width`, `height` - Surface size in pixels
    /// * `max_size` - Longest layer edge; larger surfaces are scaled down
    pub fn new(device: &wgpu::Device, width: u32, height: u32, max_size: u32) -> Self {
        let size = layer_size(width, height, max_size);
        let (maps, layer_views) = Self::create_maps(device, size);

        Self {
            bindings: PerDrawBindings::new(device, wgpu::ShaderStages::VERTEX, 64, "Depth"),
            max_size,
            size,
            maps,
            layer_views,
            uniforms: Vec::new(),
            draws: Vec::new(),
        }
    }

    fn create_maps(device: &wgpu::Device, (width, height): (u32, u32)) -> (TextureResource, Vec<wgpu::TextureView>) {
        log::debug!("shadow maps: {MAX_SPOT_LIGHTS} layers of {width}x{height}");
        TextureResource::create_shadow_map_array(device, width, height, MAX_SPOT_LIGHTS as u32)
    }

    /// Rebuilds the layers for a new surface size.
    ///
    /// # Returns
    /// `true` when the array was recreated; bind groups holding
    /// [`array_view`](Self::array_view) must then be rebuilt.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        let size = layer_size(width, height, self.max_size);
        if size == self.size {
            return false;
        }
        (self.maps, self.layer_views) = Self::create_maps(device, size);
        self.size = size;
        true
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_label("Shadow Pipeline")
            .with_shader("shadow")
            .with_vertex_only()
            .with_cull_mode(Some(wgpu::Face::Front))
            .with_bind_group_layouts(vec![self.bindings.layout().clone()])
            .with_depth_stencil(opaque_depth(TextureResource::SHADOW_FORMAT))
    }

    /// Whole-array view sampled by the lit passes.
    pub fn array_view(&self) -> &wgpu::TextureView {
        &self.maps.view
    }

    pub fn comparison_sampler(&self) -> &wgpu::Sampler {
        &self.maps.sampler
    }

    /// Records one depth-only render pass per shadow entry
    ///
    /// Each layer is cleared to 1.0. Entries beyond the layer count are
    /// logged and skipped.
    ///
    /// # Arguments
    /// * `device` - WGPU device, used when the depth uniform buffer must grow
    /// * `queue` - WGPU queue for the depth block upload
    /// * `encoder` - Frame command encoder
    /// * `pipelines` - Pipeline cache; the pass is skipped without its pipeline
    /// * `scene` - Scene supplying casters and shadow entries
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        pipelines: &PipelineManager,
        scene: &SceneState,
    ) {
        let Some(pipeline) = pipelines.get_pipeline(SHADOW_PIPELINE) else {
            return;
        };

        let casters: Vec<_> = scene
            .graph
            .iter()
            .filter_map(|(handle, node)| match node.render {
                Some(render) if render.casts_shadow && scene.meshes.gpu(render.mesh).is_some() => {
                    Some((scene.graph.composed_transform_matrix(handle), render.mesh))
                }
                _ => None,
            })
            .collect();

        let entries = scene.shadows.entries();
        let light_view_projections = scene.shadows.view_projections();
        let layers = light_view_projections.len().min(self.layer_views.len());
        if layers < entries.len() {
            log::warn!("{} shadow entries exceed {} layers", entries.len(), self.layer_views.len());
        }

        self.uniforms.clear();
        self.draws.clear();
        for light in &light_view_projections[..layers] {
            for (model, mesh) in &casters {
                self.uniforms.push(DepthUniform::new(light, model));
                self.draws.push(*mesh);
            }
        }
        self.bindings.upload(device, queue, &self.uniforms);

        for (layer, view) in self.layer_views.iter().enumerate().take(layers) {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(&format!("Shadow Pass {layer}")),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);

            let first = layer * casters.len();
            for (slot, mesh) in self.draws.iter().enumerate().skip(first).take(casters.len()) {
                let Some(mesh) = scene.meshes.gpu(*mesh) else {
                    continue;
                };
                pass.set_bind_group(0, self.bindings.bind_group(), &[self.bindings.offset(slot)]);
                pass.draw_mesh(mesh);
            }
        }
    }
}
