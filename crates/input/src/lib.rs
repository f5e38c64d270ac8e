//! Input adapter: a per-tick snapshot of held/pressed keys, narrowed to what the
//! simulation core actually consumes (movement axes, fire, exit) rather than a full
//! game's input surface.

use glam::Vec2;
use std::collections::HashSet;

/// Per-frame keyboard state. Movement keys support both WASD and arrow-key
/// equivalents, matching the same binding on each axis.
#[derive(Debug, Default)]
pub struct InputState {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame press/release sets. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Normalized movement axes: W/Up and S/Down drive the Y axis, A/Left and
    /// D/Right drive the X axis.
    pub fn movement_axes(&self) -> Vec2 {
        let mut movement = Vec2::ZERO;

        if self.is_key_held(KeyCode::KeyW) || self.is_key_held(KeyCode::ArrowUp) {
            movement.y += 1.0;
        }
        if self.is_key_held(KeyCode::KeyS) || self.is_key_held(KeyCode::ArrowDown) {
            movement.y -= 1.0;
        }
        if self.is_key_held(KeyCode::KeyA) || self.is_key_held(KeyCode::ArrowLeft) {
            movement.x -= 1.0;
        }
        if self.is_key_held(KeyCode::KeyD) || self.is_key_held(KeyCode::ArrowRight) {
            movement.x += 1.0;
        }

        if movement.length_squared() > 0.0 {
            movement = movement.normalize();
        }

        movement
    }

    /// Fire was requested this frame (space bar, one-shot per press).
    pub fn is_fire_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::Space)
    }

    /// Exit was requested this frame (Escape).
    pub fn is_exit_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::Escape)
    }
}

// Re-export for convenience.
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_and_arrow_equivalents_agree() {
        let mut wasd = InputState::new();
        wasd.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        wasd.process_keyboard(KeyCode::KeyD, ElementState::Pressed);

        let mut arrows = InputState::new();
        arrows.process_keyboard(KeyCode::ArrowUp, ElementState::Pressed);
        arrows.process_keyboard(KeyCode::ArrowRight, ElementState::Pressed);

        assert!(wasd.movement_axes().abs_diff_eq(arrows.movement_axes(), 1e-5));
    }

    #[test]
    fn fire_is_one_shot_per_press() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::Space, ElementState::Pressed);
        assert!(input.is_fire_pressed());
        input.begin_frame();
        assert!(!input.is_fire_pressed());
        assert!(input.is_key_held(KeyCode::Space));
    }

    #[test]
    fn release_clears_held_and_marks_released() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::Escape, ElementState::Pressed);
        input.begin_frame();
        input.process_keyboard(KeyCode::Escape, ElementState::Released);
        assert!(!input.is_key_held(KeyCode::Escape));
        assert!(input.is_key_released(KeyCode::Escape));
    }
}
