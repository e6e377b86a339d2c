//! Configuration for jump arcs and gravity.

use bevy::prelude::*;

/// Configuration for jump arcs and gravity.
///
/// Gravity and jump velocities are not configured directly; they are derived
/// from the desired jump heights and the time to reach the apex.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct JumpingConfig {
    /// Apex height of a jump when the button is held (units).
    pub max_jump_height: f32,

    /// Apex height of a jump when the button is released immediately (units).
    pub min_jump_height: f32,

    /// Time (seconds) from take-off to the apex of a full jump.
    pub time_to_jump_apex: f32,
}

impl Default for JumpingConfig {
    fn default() -> Self {
        Self {
            max_jump_height: 4.0,
            min_jump_height: 1.0,
            time_to_jump_apex: 0.4,
        }
    }
}

impl JumpingConfig {
    /// Downward acceleration (negative, units/second^2).
    pub fn gravity(&self) -> f32 {
        -(2.0 * self.max_jump_height) / self.time_to_jump_apex.powi(2)
    }

    /// Take-off velocity of a full jump.
    pub fn max_jump_velocity(&self) -> f32 {
        self.gravity().abs() * self.time_to_jump_apex
    }

    /// Upward velocity a jump is cut to when the button is released.
    pub fn min_jump_velocity(&self) -> f32 {
        (2.0 * self.gravity().abs() * self.min_jump_height).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn derived_kinematics() {
        let config = JumpingConfig::default();
        assert_abs_diff_eq!(config.gravity(), -50.0, epsilon = 1e-3);
        assert_abs_diff_eq!(config.max_jump_velocity(), 20.0, epsilon = 1e-3);
        assert_abs_diff_eq!(config.min_jump_velocity(), 10.0, epsilon = 1e-3);
    }

    #[test]
    fn full_jump_reaches_max_height() {
        let config = JumpingConfig::default();
        let v = config.max_jump_velocity();
        let apex = v * v / (2.0 * config.gravity().abs());
        assert_abs_diff_eq!(apex, config.max_jump_height, epsilon = 1e-3);
    }
}
