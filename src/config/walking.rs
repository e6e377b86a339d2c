//! Configuration for horizontal movement.

use bevy::prelude::*;

/// Configuration for horizontal movement.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct WalkingConfig {
    /// Target horizontal speed at full input (units/second).
    pub move_speed: f32,

    /// Smoothing time (seconds) to reach target speed while grounded.
    pub acceleration_time_grounded: f32,

    /// Smoothing time (seconds) to reach target speed while airborne.
    pub acceleration_time_airborne: f32,
}

impl Default for WalkingConfig {
    fn default() -> Self {
        Self {
            move_speed: 8.0,
            acceleration_time_grounded: 0.1,
            acceleration_time_airborne: 0.2,
        }
    }
}
