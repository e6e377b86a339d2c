//! Configuration for wall sliding and wall jumps.

use bevy::prelude::*;

/// Configuration for wall sliding and wall jumps.
///
/// Jump vectors are expressed for a wall on the actor's right; the horizontal
/// component is mirrored away from the wall when applied.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct WallJumpingConfig {
    /// Maximum downward speed while sliding along a wall (units/second).
    pub wall_slide_speed_max: f32,

    /// Duration (seconds) the actor stays stuck to a wall while pushing away
    /// from it, giving time to input a leap.
    pub wall_stick_time: f32,

    /// Velocity of a jump while pushing into the wall.
    pub climb: Vec2,

    /// Velocity of a jump with no horizontal input.
    pub hop: Vec2,

    /// Velocity of a jump while pushing away from the wall.
    pub leap: Vec2,
}

impl Default for WallJumpingConfig {
    fn default() -> Self {
        Self {
            wall_slide_speed_max: 3.0,
            wall_stick_time: 0.25,
            climb: Vec2::new(7.5, 16.0),
            hop: Vec2::new(8.5, 7.0),
            leap: Vec2::new(18.0, 17.0),
        }
    }
}
