//! Configuration for ray-cast collision resolution.

use bevy::prelude::*;

use super::layers;

/// Configuration for ray-cast collision resolution.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct CollisionConfig {
    /// Inward offset of ray origins from the collider boundary (world units).
    pub skin_width: f32,

    /// Target distance between two parallel rays (world units).
    /// Ray counts are derived from this once, at initialization.
    pub distance_between_rays: f32,

    /// Steepest walkable slope, in degrees from world up.
    /// Steeper surfaces are slid down instead of climbed.
    pub max_slope_angle: f32,

    /// Duration (seconds) during which one-way platforms are ignored after
    /// a deliberate drop-through.
    pub drop_through_duration: f32,

    /// Layers that block this actor.
    pub collision_mask: u32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            skin_width: 0.015,
            distance_between_rays: 0.25,
            max_slope_angle: 70.0,
            drop_through_duration: 0.5,
            collision_mask: layers::WORLD,
        }
    }
}
