// src/ui/menu.rs
//! Menu pages and the UI masks composited by the post-process pass
//!
//! Each page has one mask image. `Tab` moves to the next page, `U` shows or
//! hides the mask, and the colour grade keys only act on the colour page.

use winit::keyboard::KeyCode;

use crate::config::ColorGradeConfig;
use crate::gfx::rendering::post_process::ColorGrade;
use crate::gfx::resources::texture_library::ImageData;
use crate::input::InputState;

/// Mask opacity while the menu is shown.
const SHOWN_ALPHA: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPage {
    Controls,
    ColourAdjust,
}

impl MenuPage {
    pub const ALL: [MenuPage; 2] = [MenuPage::Controls, MenuPage::ColourAdjust];

    pub fn index(self) -> usize {
        match self {
            MenuPage::Controls => 0,
            MenuPage::ColourAdjust => 1,
        }
    }

    pub fn next(self) -> MenuPage {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuPage::Controls => "Controls",
            MenuPage::ColourAdjust => "Colour adjust",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuState {
    page: MenuPage,
    visible: bool,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            page: MenuPage::Controls,
            visible: true,
        }
    }
}

impl MenuState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> MenuPage {
        self.page
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn next_page(&mut self) {
        self.page = self.page.next();
        log::debug!("menu page: {}", self.page.label());
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    pub fn ui_alpha(&self) -> f32 {
        if self.visible {
            SHOWN_ALPHA
        } else {
            0.0
        }
    }

    /// Grade keys act only while the colour page is on screen.
    pub fn grading_active(&self) -> bool {
        self.visible && self.page == MenuPage::ColourAdjust
    }

    /// Left/Right turn the hue, Up/Down change saturation and
    /// PageUp/PageDown change luma, all per second held. Returns whether
    /// `grade` changed.
    pub fn apply_grade_keys(
        &self,
        keys: &InputState,
        rates: &ColorGradeConfig,
        grade: &mut ColorGrade,
        dt: f32,
    ) -> bool {
        if !self.grading_active() {
            return false;
        }

        let axis = |plus: KeyCode, minus: KeyCode| -> f32 {
            let mut value = 0.0;
            if keys.is_held(plus) {
                value += 1.0;
            }
            if keys.is_held(minus) {
                value -= 1.0;
            }
            value
        };
        let hue = axis(KeyCode::ArrowRight, KeyCode::ArrowLeft) * rates.hue_rate * dt;
        let saturation = axis(KeyCode::ArrowUp, KeyCode::ArrowDown) * rates.saturation_rate * dt;
        let luma = axis(KeyCode::PageUp, KeyCode::PageDown) * rates.luma_rate * dt;
        if hue == 0.0 && saturation == 0.0 && luma == 0.0 {
            return false;
        }

        grade.nudge(hue, saturation, luma);
        true
    }
}

/// One mask per page, in `MenuPage::ALL` order, `size` pixels square.
///
/// Masks are translucent panels: the controls page has a help panel down the
/// left side, the colour page a bar along the bottom with one track per
/// grade channel.
pub fn mask_images(size: u32) -> Vec<ImageData> {
    MenuPage::ALL
        .iter()
        .map(|page| {
            let mut image = ImageData::solid(size, size, [0, 0, 0, 0]);
            let s = size as f32;
            match page {
                MenuPage::Controls => {
                    fill(&mut image, rect(s, 0.03, 0.05, 0.30, 0.60), [20, 24, 32, 200]);
                    fill(&mut image, rect(s, 0.03, 0.05, 0.30, 0.09), [230, 180, 60, 230]);
                }
                MenuPage::ColourAdjust => {
                    fill(&mut image, rect(s, 0.05, 0.78, 0.95, 0.96), [20, 24, 32, 200]);
                    let tracks = [[220, 80, 200, 230], [80, 200, 220, 230], [240, 240, 240, 230]];
                    for (i, colour) in tracks.iter().enumerate() {
                        let y = 0.81 + i as f32 * 0.05;
                        fill(&mut image, rect(s, 0.10, y, 0.90, y + 0.02), *colour);
                    }
                }
            }
            image
        })
        .collect()
}

fn rect(size: f32, x0: f32, y0: f32, x1: f32, y1: f32) -> [u32; 4] {
    [x0, y0, x1, y1].map(|v| (v * size) as u32)
}

fn fill(image: &mut ImageData, [x0, y0, x1, y1]: [u32; 4], rgba: [u8; 4]) {
    for y in y0..y1.min(image.height) {
        for x in x0..x1.min(image.width) {
            let i = ((y * image.width + x) * 4) as usize;
            image.rgba[i..i + 4].copy_from_slice(&rgba);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_cycles_pages() {
        let mut menu = MenuState::new();
        assert_eq!(menu.page(), MenuPage::Controls);
        menu.next_page();
        assert_eq!(menu.page(), MenuPage::ColourAdjust);
        menu.next_page();
        assert_eq!(menu.page(), MenuPage::Controls);
    }

    #[test]
    fn hidden_menu_has_no_alpha() {
        let mut menu = MenuState::new();
        assert!(menu.ui_alpha() > 0.0);
        menu.toggle_visible();
        assert_eq!(menu.ui_alpha(), 0.0);
    }

    #[test]
    fn grade_keys_only_on_colour_page() {
        let rates = ColorGradeConfig::default();
        let mut keys = InputState::new();
        keys.press(KeyCode::ArrowUp);
        keys.press(KeyCode::PageDown);

        let mut menu = MenuState::new();
        let mut grade = ColorGrade::default();
        assert!(!menu.apply_grade_keys(&keys, &rates, &mut grade, 1.0));
        assert_eq!(grade, ColorGrade::default());

        menu.next_page();
        assert!(menu.apply_grade_keys(&keys, &rates, &mut grade, 1.0));
        assert_eq!(grade.saturation, 1.0 + rates.saturation_rate);
        assert_eq!(grade.luma, 1.0 - rates.luma_rate);
        assert_eq!(grade.hue, 0.0);

        menu.toggle_visible();
        let before = grade;
        assert!(!menu.apply_grade_keys(&keys, &rates, &mut grade, 1.0));
        assert_eq!(grade, before);
    }

    #[test]
    fn masks_differ_per_page() {
        let masks = mask_images(64);
        assert_eq!(masks.len(), MenuPage::ALL.len());
        // help panel on the left, grade bar at the bottom
        assert!(masks[0].pixel(8, 16)[3] > 0);
        assert_eq!(masks[1].pixel(8, 16)[3], 0);
        assert!(masks[1].pixel(32, 58)[3] > 0);
        assert_eq!(masks[0].pixel(32, 58)[3], 0);
    }
}
