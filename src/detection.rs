//! Ray hit structures.
//!
//! These structures hold the results of the ray-cast queries used by the
//! collision sweeps and the platform passenger probes.

use bevy::prelude::*;

/// How a surface reacts to an actor moving through it.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SurfaceTag {
    /// Blocks movement from every side.
    #[default]
    Solid,
    /// One-way platform: ignored when moving up, can be dropped through.
    Through,
}

/// Marks a collider as a one-way ("through") platform.
///
/// Backends translate this marker into [`SurfaceTag::Through`] on every ray hit
/// against the entity.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct ThroughPlatform;

/// Information about a single ray-cast hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// Normal of the surface at hit point.
    pub normal: Vec2,
    /// World position of the hit point.
    pub point: Vec2,
    /// Entity that was hit (if any).
    pub entity: Option<Entity>,
    /// Surface behavior of the hit collider.
    pub tag: SurfaceTag,
}

impl RayHit {
    /// Create a hit against a solid surface.
    pub fn new(distance: f32, normal: Vec2, point: Vec2, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
            tag: SurfaceTag::Solid,
        }
    }

    /// Replace the surface tag.
    #[must_use]
    pub fn with_tag(mut self, tag: SurfaceTag) -> Self {
        self.tag = tag;
        self
    }

    /// Whether the hit surface is a one-way platform.
    pub fn is_through(&self) -> bool {
        self.tag == SurfaceTag::Through
    }

    /// Angle of the hit surface from world up, in degrees.
    pub fn slope_angle(&self) -> f32 {
        slope_angle(self.normal)
    }
}

/// Angle between a surface normal and world up, in degrees.
///
/// A flat floor is 0, a vertical wall is 90.
pub fn slope_angle(normal: Vec2) -> f32 {
    normal
        .normalize_or_zero()
        .dot(Vec2::Y)
        .clamp(-1.0, 1.0)
        .acos()
        .to_degrees()
}
