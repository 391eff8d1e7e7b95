use std::collections::HashSet;

use glam::Vec2;
use log::debug;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Input as seen by one frame. `pressed` sets only hold transitions that
/// happened since the previous frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held_keys: HashSet<KeyCode>,
    pressed_keys: HashSet<KeyCode>,
    mouse_position: Vec2,
    left_held: bool,
    left_pressed: bool,
}

impl InputState {
    pub fn key_held(&self, key: KeyCode) -> bool {
        self.held_keys.contains(&key)
    }

    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Mouse position in logical screen coordinates.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    pub fn left_held(&self) -> bool {
        self.left_held
    }

    pub fn left_pressed(&self) -> bool {
        self.left_pressed
    }

    pub fn with_key_held(mut self, key: KeyCode) -> Self {
        self.held_keys.insert(key);
        self
    }

    pub fn with_key_pressed(mut self, key: KeyCode) -> Self {
        self.held_keys.insert(key);
        self.pressed_keys.insert(key);
        self
    }

    pub fn with_mouse(mut self, position: Vec2) -> Self {
        self.mouse_position = position;
        self
    }

    pub fn with_left_click(mut self) -> Self {
        self.left_held = true;
        self.left_pressed = true;
        self
    }
}

#[derive(Default)]
pub struct InputHandler {
    held_keys: HashSet<KeyCode>,
    frame_pressed: HashSet<KeyCode>,
    mouse_position: Vec2,
    left_held: bool,
    left_pressed: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_keyboard_input_event(
        &mut self,
        keycode: KeyCode,
        pressed: bool,
    ) {
        if pressed {
            if self.held_keys.insert(keycode) {
                self.frame_pressed.insert(keycode);
                debug!("Key pressed: {:?}", keycode);
            }
        } else {
            self.held_keys.remove(&keycode);
        }
    }

    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if button != MouseButton::Left {
            return;
        }
        if pressed && !self.left_held {
            self.left_pressed = true;
        }
        self.left_held = pressed;
    }

    /// `position` must already be in logical coordinates.
    pub fn handle_cursor_moved(&mut self, position: Vec2) {
        self.mouse_position = position;
    }

    /// Focus loss drops held keys so nothing stays stuck down.
    pub fn handle_window_focus(&mut self, focused: bool) {
        if !focused {
            self.held_keys.clear();
            self.left_held = false;
            debug!("Window unfocused, input released");
        }
    }

    /// Snapshot for the coming frame; clears the per-frame transitions.
    pub fn begin_frame(&mut self) -> InputState {
        InputState {
            held_keys: self.held_keys.clone(),
            pressed_keys: std::mem::take(&mut self.frame_pressed),
            mouse_position: self.mouse_position,
            left_held: self.left_held,
            left_pressed: std::mem::replace(&mut self.left_pressed, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_reported_once() {
        let mut handler = InputHandler::new();
        handler.handle_keyboard_input_event(KeyCode::Space, true);
        handler.handle_keyboard_input_event(KeyCode::Space, true);

        let first = handler.begin_frame();
        assert!(first.key_pressed(KeyCode::Space));
        assert!(first.key_held(KeyCode::Space));

        let second = handler.begin_frame();
        assert!(!second.key_pressed(KeyCode::Space));
        assert!(second.key_held(KeyCode::Space));
    }

    #[test]
    fn release_clears_hold() {
        let mut handler = InputHandler::new();
        handler.handle_keyboard_input_event(KeyCode::KeyW, true);
        handler.handle_keyboard_input_event(KeyCode::KeyW, false);
        let state = handler.begin_frame();
        assert!(state.key_pressed(KeyCode::KeyW));
        assert!(!state.key_held(KeyCode::KeyW));
    }

    #[test]
    fn left_click_edge() {
        let mut handler = InputHandler::new();
        handler.handle_mouse_button(MouseButton::Right, true);
        assert!(!handler.begin_frame().left_pressed());

        handler.handle_mouse_button(MouseButton::Left, true);
        let state = handler.begin_frame();
        assert!(state.left_pressed() && state.left_held());
        assert!(!handler.begin_frame().left_pressed());
    }

    #[test]
    fn focus_loss_releases_keys() {
        let mut handler = InputHandler::new();
        handler.handle_keyboard_input_event(KeyCode::KeyA, true);
        handler.handle_window_focus(false);
        assert!(!handler.begin_frame().key_held(KeyCode::KeyA));
    }
}
