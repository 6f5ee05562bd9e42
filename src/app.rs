// src/app.rs
//! Window, event loop and the per-frame update/render driver

use anyhow::Context as _;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowAttributes},
};

use crate::config::RiftConfig;
use crate::gfx::camera::CameraMode;
use crate::gfx::rendering::{ColorGrade, PostSettings, RenderEngine};
use crate::gfx::scene::{demo_scene, FrameInput, SceneState};
use crate::input::InputState;
use crate::ui::{menu, overlay, FrameTimer, MenuState, OverlayStats, UiManager};

/// Side length of the generated UI mask images.
const UI_MASK_SIZE: u32 = 512;

pub struct RiftApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: RiftConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: SceneState,
    input: InputState,
    menu: MenuState,
    grade: ColorGrade,
    timer: FrameTimer,
    show_overlay: bool,
    cursor_captured: bool,
    /// Set when startup fails inside the event loop; returned by `run`.
    error: Option<anyhow::Error>,
}

impl RiftApp {
    /// Builds the demo scene; the window and GPU come up on first resume.
    pub fn new(config: RiftConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        let scene = demo_scene::build(&config).context("failed to build the demo scene")?;
        log::info!("scene ready: {} nodes, {} meshes", scene.graph.len(), scene.meshes.len());

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                grade: config.grade.initial,
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                scene,
                input: InputState::new(),
                menu: MenuState::new(),
                timer: FrameTimer::new(Instant::now()),
                show_overlay: false,
                cursor_captured: false,
                error: None,
            },
        })
    }

    /// Runs until the window closes, Escape is pressed or rendering fails.
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut self.app_state)
            .context("event loop failed")?;

        match self.app_state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// The free camera looks with raw mouse motion, so it locks and hides the
/// cursor while the window is focused and the debug overlay is closed.
fn wants_cursor_capture(mode: CameraMode, focused: bool, show_overlay: bool) -> bool {
    mode == CameraMode::Free && focused && !show_overlay
}

/// Locks the cursor in place, falling back to confining it to the window.
fn set_cursor_capture(window: &Window, captured: bool) {
    let grab = if captured {
        window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
    } else {
        window.set_cursor_grab(CursorGrabMode::None)
    };
    if let Err(e) = grab {
        log::warn!("cursor grab unavailable: {e}");
    }
    window.set_cursor_visible(!captured);
}

impl AppState {
    fn sync_cursor(&mut self) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let wanted = wants_cursor_capture(self.scene.cameras.mode, self.input.is_focused(), self.show_overlay);
        if wanted != self.cursor_captured {
            log::debug!("cursor {}", if wanted { "captured" } else { "released" });
            set_cursor_capture(window, wanted);
            self.cursor_captured = wanted;
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let (width, height) = self.config.window_size;
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(self.config.window_title.clone())
                    .with_inner_size(PhysicalSize::new(width, height)),
            )
            .context("failed to create window")?;
        let window = Arc::new(window);
        let (width, height) = window.inner_size().into();

        let masks = menu::mask_images(UI_MASK_SIZE);
        let renderer = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            &self.config,
            &masks,
        ))
        .context("failed to initialise the renderer")?;
        renderer.upload_scene(&mut self.scene);
        self.scene.resize(width, height);

        self.ui_manager = Some(UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
        ));
        self.render_engine = Some(renderer);
        self.window = Some(window);
        self.timer = FrameTimer::new(Instant::now());
        Ok(())
    }

    fn handle_released(&mut self) {
        for key in self.input.take_released() {
            match key {
                KeyCode::KeyU => self.menu.toggle_visible(),
                KeyCode::KeyP => self.scene.toggle_wobble(),
                KeyCode::Tab => self.menu.next_page(),
                KeyCode::F3 => self.show_overlay = !self.show_overlay,
                _ => {}
            }
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.timer.tick(Instant::now());
        self.handle_released();

        let mut mouse_delta = self.input.take_mouse_delta();
        let mut scroll = self.input.take_scroll();
        let ui_captured = self.show_overlay && self.ui_manager.as_ref().is_some_and(|ui| ui.wants_input());
        if ui_captured {
            mouse_delta = (0.0, 0.0);
            scroll = 0.0;
        }

        self.menu
            .apply_grade_keys(&self.input, &self.config.grade, &mut self.grade, dt);

        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };
        let (screen_width, _) = render_engine.get_surface_size();
        self.scene.update(
            &FrameInput {
                keys: &self.input,
                mouse_delta,
                scroll,
                screen_width,
            },
            dt,
        );
        self.sync_cursor();
        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };

        let post = PostSettings {
            grade: self.grade,
            mask_page: self.menu.page().index(),
            ui_alpha: self.menu.ui_alpha(),
        };

        let result = match (self.show_overlay, self.ui_manager.as_mut(), self.window.as_ref()) {
            (true, Some(ui_manager), Some(window)) => {
                let stats = OverlayStats::capture(&self.scene, &self.timer, &self.grade, &self.menu);
                render_engine.render_frame(&self.scene, &post, |device, queue, encoder, view| {
                    ui_manager.draw(device, queue, encoder, window, view, |ui| {
                        overlay::stats_window(ui, &stats);
                    });
                })
            }
            _ => render_engine.render_frame(&self.scene, &post, |_, _, _, _| {}),
        };

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated; reconfiguring");
                render_engine.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory; exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("frame skipped: {e}"),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.start(event_loop) {
            log::error!("{e:#}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // the overlay only takes input while it is shown
        if self.show_overlay {
            if let Some(ui_manager) = self.ui_manager.as_mut() {
                let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                    window_id,
                    event: event.clone(),
                };
                if ui_manager.handle_input(&window, &ui_event) {
                    self.input.handle_captured_window_event(&event);
                    window.request_redraw();
                    return;
                }
            }
        }

        self.input.handle_window_event(&event);

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
                self.scene.resize(width, height);
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        self.input.handle_device_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_is_captured_only_for_focused_free_look() {
        assert!(wants_cursor_capture(CameraMode::Free, true, false));
        assert!(!wants_cursor_capture(CameraMode::Free, false, false));
        assert!(!wants_cursor_capture(CameraMode::Free, true, true));
        assert!(!wants_cursor_capture(CameraMode::Target, true, false));
    }
}
