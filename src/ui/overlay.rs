// src/ui/overlay.rs
//! Debug stats window, toggled with F3

use std::time::{Duration, Instant};

use imgui::Condition;

use crate::gfx::rendering::post_process::ColorGrade;
use crate::gfx::scene::portal::PortalSide;
use crate::gfx::scene::scene::SceneState;
use crate::ui::menu::MenuState;

/// Frame delta plus a frames-per-second figure refreshed twice a second.
#[derive(Debug)]
pub struct FrameTimer {
    last: Instant,
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FrameTimer {
    const WINDOW: Duration = Duration::from_millis(500);

    pub fn new(now: Instant) -> Self {
        Self {
            last: now,
            window_start: now,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Seconds since the previous tick, capped so a stall does not launch
    /// the camera.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let dt = now.saturating_duration_since(self.last).as_secs_f32().min(0.25);
        self.last = now;

        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= Self::WINDOW {
            self.fps = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.window_start = now;
        }
        dt
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Everything the stats window shows, captured after the update step.
#[derive(Debug, Clone)]
pub struct OverlayStats {
    pub fps: f32,
    pub camera_mode: &'static str,
    pub camera_position: [f32; 3],
    pub portal_distances: [f32; 2],
    pub wobble: bool,
    pub grade: ColorGrade,
    pub menu_page: &'static str,
    pub menu_visible: bool,
    pub nodes: usize,
}

impl OverlayStats {
    pub fn capture(scene: &SceneState, timer: &FrameTimer, grade: &ColorGrade, menu: &MenuState) -> Self {
        let position = scene.camera().position();
        Self {
            fps: timer.fps(),
            camera_mode: scene.cameras.mode.label(),
            camera_position: [position.x, position.y, position.z],
            portal_distances: PortalSide::BOTH.map(|side| scene.traversal().distance(side)),
            wobble: scene.portals.wobble.enabled,
            grade: *grade,
            menu_page: menu.page().label(),
            menu_visible: menu.is_visible(),
            nodes: scene.graph.len(),
        }
    }
}

pub fn stats_window(ui: &imgui::Ui, stats: &OverlayStats) {
    ui.window("Rift")
        .position([10.0, 10.0], Condition::FirstUseEver)
        .always_auto_resize(true)
        .build(|| {
            ui.text(format!("{:.0} fps", stats.fps));
            ui.text(format!("{} nodes", stats.nodes));
            ui.separator();
            let [x, y, z] = stats.camera_position;
            ui.text(format!("camera: {} ({x:.1}, {y:.1}, {z:.1})", stats.camera_mode));
            ui.text(format!(
                "portal distance: A {:.2}  B {:.2}",
                stats.portal_distances[0], stats.portal_distances[1]
            ));
            ui.text(format!("wobble: {}", if stats.wobble { "on" } else { "off" }));
            ui.separator();
            ui.text(format!(
                "grade: hue {:.2} sat {:.2} luma {:.2}",
                stats.grade.hue, stats.grade.saturation, stats.grade.luma
            ));
            ui.text(format!(
                "menu: {}{}",
                stats.menu_page,
                if stats.menu_visible { "" } else { " (hidden)" }
            ));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_reports_delta_and_fps() {
        let start = Instant::now();
        let mut timer = FrameTimer::new(start);
        let mut now = start;
        for _ in 0..30 {
            now += Duration::from_millis(20);
            let dt = timer.tick(now);
            assert!((dt - 0.02).abs() < 1e-4);
        }
        assert!((timer.fps() - 50.0).abs() < 1.0);
    }

    #[test]
    fn long_stall_is_capped() {
        let start = Instant::now();
        let mut timer = FrameTimer::new(start);
        assert_eq!(timer.tick(start + Duration::from_secs(3)), 0.25);
    }
}
