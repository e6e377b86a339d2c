//! Input intent components.
//!
//! Intents carry what the player (or an AI) wants this tick. Gameplay code
//! writes them; the motor systems read and consume them.

use bevy::prelude::*;

/// Dead zone below which an axis reads as zero.
const AXIS_THRESHOLD: f32 = 0.001;

fn snap_axis(value: f32) -> f32 {
    if value > AXIS_THRESHOLD {
        1.0
    } else if value < -AXIS_THRESHOLD {
        -1.0
    } else {
        0.0
    }
}

/// Directional input, each axis snapped to -1, 0 or 1.
///
/// Holding down (`y == -1`) while standing on a one-way platform drops
/// through it.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use msg_platformer_controller::prelude::*;
///
/// let mut input = DirectionalInput::new();
/// input.set(Vec2::new(0.4, -0.9));
/// assert_eq!(input.as_vec2(), Vec2::new(1.0, -1.0));
/// assert!(input.is_dropping());
///
/// input.clear();
/// assert!(!input.is_moving());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct DirectionalInput {
    /// Horizontal axis (-1 = left, 1 = right).
    pub x: f32,
    /// Vertical axis (-1 = down, 1 = up).
    pub y: f32,
}

impl DirectionalInput {
    /// Create a new neutral input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set both axes from an analog vector.
    pub fn set(&mut self, input: Vec2) {
        self.set_x(input.x);
        self.set_y(input.y);
    }

    /// Set the horizontal axis.
    pub fn set_x(&mut self, value: f32) {
        self.x = snap_axis(value);
    }

    /// Set the vertical axis.
    pub fn set_y(&mut self, value: f32) {
        self.y = snap_axis(value);
    }

    /// Both axes as a vector.
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Check if there is horizontal input.
    pub fn is_moving(&self) -> bool {
        self.x != 0.0
    }

    /// Check if down is held.
    pub fn is_dropping(&self) -> bool {
        self.y == -1.0
    }

    /// Reset both axes.
    pub fn clear(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
    }
}

/// Jump button edges since the last fixed tick.
///
/// Gameplay code calls [`press`](Self::press) / [`release`](Self::release)
/// when the button changes; the motor consumes both edges once per tick.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct JumpRequest {
    /// The button went down.
    pub pressed: bool,
    /// The button went up.
    pub released: bool,
}

impl JumpRequest {
    /// Record a button press.
    pub fn press(&mut self) {
        self.pressed = true;
    }

    /// Record a button release.
    pub fn release(&mut self) {
        self.released = true;
    }

    /// Consume the press edge.
    pub fn take_pressed(&mut self) -> bool {
        std::mem::take(&mut self.pressed)
    }

    /// Consume the release edge.
    pub fn take_released(&mut self) -> bool {
        std::mem::take(&mut self.released)
    }

    /// Drop both edges.
    pub fn reset(&mut self) {
        self.pressed = false;
        self.released = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== DirectionalInput Tests ====================

    #[test]
    fn directional_input_new() {
        let input = DirectionalInput::new();
        assert_eq!(input.x, 0.0);
        assert_eq!(input.y, 0.0);
        assert!(!input.is_moving());
        assert!(!input.is_dropping());
    }

    #[test]
    fn directional_input_snaps_axes() {
        let mut input = DirectionalInput::new();
        input.set_x(0.3);
        assert_eq!(input.x, 1.0);

        input.set_x(-5.0);
        assert_eq!(input.x, -1.0);

        input.set_y(-0.2);
        assert_eq!(input.y, -1.0);
        assert!(input.is_dropping());
    }

    #[test]
    fn directional_input_dead_zone() {
        let mut input = DirectionalInput::new();
        input.set(Vec2::new(0.0001, -0.0005)); // Below threshold
        assert_eq!(input.as_vec2(), Vec2::ZERO);
    }

    #[test]
    fn directional_input_clear() {
        let mut input = DirectionalInput::new();
        input.set(Vec2::new(1.0, 1.0));

        input.clear();
        assert_eq!(input.as_vec2(), Vec2::ZERO);
    }

    // ==================== JumpRequest Tests ====================

    #[test]
    fn jump_request_default() {
        let request = JumpRequest::default();
        assert!(!request.pressed);
        assert!(!request.released);
    }

    #[test]
    fn jump_request_edges_are_consumed_once() {
        let mut request = JumpRequest::default();
        request.press();

        assert!(request.take_pressed());
        assert!(!request.take_pressed());
        assert!(!request.take_released());
    }

    #[test]
    fn jump_request_press_and_release_in_one_tick() {
        let mut request = JumpRequest::default();
        request.press();
        request.release();

        assert!(request.take_pressed());
        assert!(request.take_released());
    }

    #[test]
    fn jump_request_reset() {
        let mut request = JumpRequest::default();
        request.press();
        request.release();

        request.reset();
        assert!(!request.pressed);
        assert!(!request.released);
    }
}
