//! Configuration for moving platforms.

use bevy::prelude::*;

use super::layers;

/// Configuration for a waypoint-following platform.
///
/// Spawn this next to a collider; the controller builds the runtime
/// [`MovingPlatform`](crate::platform::MovingPlatform) from it on the next tick.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
#[require(Transform)]
pub struct PlatformConfig {
    /// Waypoints relative to the platform's position at spawn.
    pub waypoints: Vec<Vec2>,

    /// Travel speed along each segment (units/second).
    pub speed: f32,

    /// Wrap from the last waypoint back to the first instead of reversing.
    pub cyclic: bool,

    /// Pause (seconds) at each waypoint.
    pub wait_time: f32,

    /// Easing strength, 0 (linear) to 2 (strong ease in/out).
    pub ease_amount: f32,

    /// Layers of actors that ride or get pushed by this platform.
    pub passenger_mask: u32,

    /// Inward offset of passenger probe origins (world units).
    pub skin_width: f32,

    /// Target distance between passenger probe rays (world units).
    pub distance_between_rays: f32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            waypoints: Vec::new(),
            speed: 3.0,
            cyclic: false,
            wait_time: 0.5,
            ease_amount: 0.0,
            passenger_mask: layers::ACTORS,
            skin_width: 0.015,
            distance_between_rays: 0.25,
        }
    }
}

impl PlatformConfig {
    /// Create a configuration following `waypoints` (relative to spawn).
    pub fn new(waypoints: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            waypoints: waypoints.into_iter().collect(),
            ..default()
        }
    }

    /// Set the travel speed.
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the pause at each waypoint.
    #[must_use]
    pub fn with_wait_time(mut self, wait_time: f32) -> Self {
        self.wait_time = wait_time;
        self
    }

    /// Set the easing strength (clamped to 0..=2).
    #[must_use]
    pub fn with_ease_amount(mut self, ease_amount: f32) -> Self {
        self.ease_amount = ease_amount.clamp(0.0, 2.0);
        self
    }

    /// Loop through the waypoints instead of ping-ponging.
    #[must_use]
    pub fn cyclic(mut self) -> Self {
        self.cyclic = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_clamps_easing() {
        let config = PlatformConfig::new([Vec2::ZERO, Vec2::X]).with_ease_amount(5.0);
        assert_eq!(config.ease_amount, 2.0);
        assert_eq!(config.waypoints.len(), 2);
        assert!(!config.cyclic);
    }
}
