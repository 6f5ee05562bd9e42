// src/input.rs
//! Per-frame input snapshot
//!
//! Window and device events are folded into `InputState` as they arrive;
//! the update step polls held keys, drains key releases and takes the mouse
//! delta accumulated since the previous frame. Raw mouse motion only counts
//! while the window has focus.

use std::collections::HashSet;

use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug)]
pub struct InputState {
    held: HashSet<KeyCode>,
    released: Vec<KeyCode>,
    mouse_delta: (f64, f64),
    scroll_delta: f32,
    left_button: bool,
    focused: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            held: HashSet::new(),
            released: Vec::new(),
            mouse_delta: (0.0, 0.0),
            scroll_delta: 0.0,
            left_button: false,
            focused: true,
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies only what must not be lost when the debug UI consumes
    /// `event`: key and button releases and focus changes.
    pub fn handle_captured_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => self.captured_key(*code, *state),
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Released,
                ..
            }
            | WindowEvent::Focused(_) => self.handle_window_event(event),
            _ => {}
        }
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => self.key(*code, *state),
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.left_button = *state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 40.0,
                };
            }
            WindowEvent::Focused(false) => {
                // keys released while unfocused never reach us
                self.held.clear();
                self.left_button = false;
                self.mouse_delta = (0.0, 0.0);
                self.focused = false;
            }
            WindowEvent::Focused(true) => self.focused = true,
            _ => {}
        }
    }

    /// Raw mouse motion drives mouse look, so it keeps arriving while the
    /// cursor is locked. Device events are not routed per window and are
    /// dropped while unfocused.
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if !self.focused {
            return;
        }
        if let DeviceEvent::MouseMotion { delta } = event {
            self.add_mouse_motion(delta.0, delta.1);
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn key(&mut self, code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => self.press(code),
            ElementState::Released => self.release(code),
        }
    }

    /// A key event the debug UI consumed: presses are dropped, releases
    /// still lift the key so it cannot stay held.
    pub fn captured_key(&mut self, code: KeyCode, state: ElementState) {
        if state == ElementState::Released {
            self.release(code);
        }
    }

    pub fn press(&mut self, key: KeyCode) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        if self.held.remove(&key) {
            self.released.push(key);
        }
    }

    pub fn add_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    pub fn left_button(&self) -> bool {
        self.left_button
    }

    /// Keys released since the last call, in release order.
    pub fn take_released(&mut self) -> Vec<KeyCode> {
        std::mem::take(&mut self.released)
    }

    /// Mouse movement since the last call.
    pub fn take_mouse_delta(&mut self) -> (f64, f64) {
        std::mem::take(&mut self.mouse_delta)
    }

    pub fn take_scroll(&mut self) -> f32 {
        std::mem::take(&mut self.scroll_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_is_reported_once() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyU);
        assert!(input.is_held(KeyCode::KeyU));
        input.release(KeyCode::KeyU);
        assert!(!input.is_held(KeyCode::KeyU));
        assert_eq!(input.take_released(), vec![KeyCode::KeyU]);
        assert!(input.take_released().is_empty());
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut input = InputState::new();
        input.release(KeyCode::KeyP);
        assert!(input.take_released().is_empty());
    }

    #[test]
    fn mouse_delta_accumulates_until_taken() {
        let mut input = InputState::new();
        input.add_mouse_motion(3.0, -1.0);
        input.add_mouse_motion(2.0, 4.0);
        assert_eq!(input.take_mouse_delta(), (5.0, 3.0));
        assert_eq!(input.take_mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn unfocused_window_ignores_mouse_motion() {
        let mut input = InputState::new();
        let motion = DeviceEvent::MouseMotion { delta: (4.0, 2.0) };
        input.handle_device_event(&motion);

        input.handle_window_event(&WindowEvent::Focused(false));
        assert!(!input.is_focused());
        assert_eq!(input.take_mouse_delta(), (0.0, 0.0));
        input.handle_device_event(&motion);
        assert_eq!(input.take_mouse_delta(), (0.0, 0.0));

        input.handle_window_event(&WindowEvent::Focused(true));
        input.handle_device_event(&motion);
        assert_eq!(input.take_mouse_delta(), (4.0, 2.0));
    }

    #[test]
    fn captured_release_still_lifts_held_key() {
        let mut input = InputState::new();
        input.key(KeyCode::KeyW, ElementState::Pressed);
        assert!(input.is_held(KeyCode::KeyW));

        input.captured_key(KeyCode::KeyW, ElementState::Released);
        assert!(!input.is_held(KeyCode::KeyW));
        assert_eq!(input.take_released(), vec![KeyCode::KeyW]);
    }

    #[test]
    fn captured_press_is_ignored() {
        let mut input = InputState::new();
        input.captured_key(KeyCode::KeyA, ElementState::Pressed);
        assert!(!input.is_held(KeyCode::KeyA));
    }
}
