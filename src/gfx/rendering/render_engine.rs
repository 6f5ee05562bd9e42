//! wgpu rendering engine for Rift
//!
//! Owns the surface, device and every pass, and records one frame as
//! Shadow → Scene → Portal Stencil → Portal View → Post-process → overlay.

use std::sync::Arc;
use wgpu::TextureFormat;

use crate::config::RiftConfig;
use crate::error::RenderError;
use crate::gfx::resources::texture_library::ImageData;
use crate::gfx::scene::scene::SceneState;

use super::draw_list::DrawList;
use super::pipeline_manager::{
    PipelineManager, PORTAL_MASK_PIPELINE, PORTAL_VIEW_PIPELINE, POST_PROCESS_PIPELINE, SCENE_PIPELINE,
    SHADOW_PIPELINE,
};
use super::portal_pass::PortalPass;
use super::post_process::{ColorGrade, PostProcess};
use super::scene_pass::ScenePass;
use super::shaders;
use super::shadow_pass::ShadowPass;
use super::stencil_pass;
use super::targets::FrameTargets;

/// What the post-process pass composites this frame.
#[derive(Debug, Clone, Copy)]
pub struct PostSettings {
    pub grade: ColorGrade,
    /// Index into the UI mask images passed to `RenderEngine::new`.
    pub mask_page: usize,
    /// 0 hides the mask entirely.
    pub ui_alpha: f32,
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    targets: FrameTargets,

    shadow_pass: ShadowPass,
    scene_pass: ScenePass,
    portal_pass: PortalPass,
    post_process: PostProcess,
}

impl RenderEngine {
    /// Creates the device and every pass for `window`.
    ///
    /// Shader and pipeline failures are logged and leave the affected pass
    /// disabled; only adapter, device and surface failures are returned.
    ///
    /// # Arguments
    /// * `window` - Surface target
    /// * `width`, `height` - Initial surface size in pixels
    /// * `rift_config` - Supplies the shadow map size cap
    /// * `ui_masks` - One image per menu page for the post-process pass
    ///
    /// # Returns
    /// The engine, or the [`RenderError`] that stopped device creation
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        rift_config: &RiftConfig,
        ui_masks: &[ImageData],
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Rift Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        // gamma is applied by the post-process shader
        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .unwrap_or(TextureFormat::Bgra8Unorm);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let targets = FrameTargets::new(&device, config.width, config.height);
        let shadow_pass = ShadowPass::new(
            &device,
            config.width,
            config.height,
            rift_config.shadow.max_size.min(device.limits().max_texture_dimension_2d),
        );
        let scene_pass = ScenePass::new(&device, &shadow_pass);
        let portal_pass = PortalPass::new(&device);
        let post_process = PostProcess::new(&device, &queue, &targets, ui_masks);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        let sources = [
            ("scene", shaders::scene_source()),
            ("shadow", shaders::SHADOW.to_string()),
            ("portal_mask", shaders::PORTAL_MASK.to_string()),
            ("post_process", shaders::POST_PROCESS.to_string()),
        ];
        for (name, source) in &sources {
            if let Err(e) = pipeline_manager.load_shader(name, source) {
                log::error!("{e}");
            }
        }

        pipeline_manager.register_pipeline(SHADOW_PIPELINE, shadow_pass.pipeline_config());
        pipeline_manager.register_pipeline(SCENE_PIPELINE, scene_pass.pipeline_config());
        pipeline_manager.register_pipeline(
            PORTAL_MASK_PIPELINE,
            stencil_pass::mask_pipeline_config(scene_pass.nodes().layout()),
        );
        pipeline_manager.register_pipeline(PORTAL_VIEW_PIPELINE, portal_pass.pipeline_config(&scene_pass));
        pipeline_manager.register_pipeline(POST_PROCESS_PIPELINE, post_process.pipeline_config(format));
        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for e in errors {
                log::error!("{e}; the pass will be skipped");
            }
        }

        Ok(Self {
            surface,
            device: Arc::new(device),
            queue: Arc::new(queue),
            config,
            format,
            pipeline_manager,
            targets,
            shadow_pass,
            scene_pass,
            portal_pass,
            post_process,
        })
    }

    /// Creates GPU meshes and textures for everything the scene loaded.
    pub fn upload_scene(&self, scene: &mut SceneState) {
        scene.meshes.upload(&self.device);
        scene.textures.upload(&self.device, &self.queue);
        log::info!(
            "uploaded {} meshes and {} textures",
            scene.meshes.len(),
            scene.textures.len()
        );
    }

    /// Records and presents one frame.
    ///
    /// `overlay` draws on top of the post-processed image (the debug UI).
    /// Surface errors are returned before anything is recorded.
    ///
    /// # Arguments
    /// * `scene` - Scene after this frame's update
    /// * `post` - Colour grade and menu mask for the post-process pass
    /// * `overlay` - Records extra UI into the frame encoder
    ///
    /// # Returns
    /// The surface error when no frame could be acquired
    pub fn render_frame<F>(
        &mut self,
        scene: &SceneState,
        post: &PostSettings,
        overlay: F,
    ) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let draws = DrawList::build(scene);

        // PASS 1: one depth layer per spot light
        self.shadow_pass
            .render(&self.device, &self.queue, &mut encoder, &self.pipeline_manager, scene);

        self.scene_pass.prepare(&self.device, &self.queue, scene, &draws);
        self.portal_pass.prepare(&self.queue, scene);
        self.post_process.prepare(&self.queue, &post.grade, post.ui_alpha);

        // PASS 2: lit scene into the off-screen target
        self.scene_pass
            .render(&mut encoder, &self.pipeline_manager, &self.targets, scene, &draws);

        // PASS 3: portal layer ids
        stencil_pass::render(
            &mut encoder,
            &self.pipeline_manager,
            &self.targets,
            scene,
            self.scene_pass.nodes(),
            &draws,
        );

        // PASS 4: both portal views in one pass
        self.portal_pass.render(
            &mut encoder,
            &self.pipeline_manager,
            &self.targets,
            &self.scene_pass,
            scene,
            &draws,
        );

        // PASS 5: grade and UI mask onto the swapchain
        self.post_process.render(
            &mut encoder,
            &self.pipeline_manager,
            &surface_texture_view,
            post.mask_page,
        );

        // PASS 6: debug overlay
        overlay(&self.device, &self.queue, &mut encoder, &surface_texture_view);

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Reconfigures the surface and rebuilds the size-dependent targets.
    ///
    /// Zero sizes (minimised windows) are ignored. Shadow maps follow the
    /// surface size, so group 0 is rebound when they are recreated.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.targets = FrameTargets::new(&self.device, width, height);
        self.post_process.resize(&self.device, &self.targets);
        if self.shadow_pass.resize(&self.device, width, height) {
            self.scene_pass.rebind_shadows(&self.device, &self.shadow_pass);
        }
    }

    /// Reapplies the current configuration after `Lost`/`Outdated`.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}
