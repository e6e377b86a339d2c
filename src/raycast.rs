//! Ray origins and ray spacing.
//!
//! Rays are cast from the corners of the collider box shrunk inward by the skin
//! width, so a resting contact is always seen at `skin_width` instead of at
//! zero distance.

use bevy::prelude::*;

use crate::error::ConfigError;

/// The four corners rays are cast from, recomputed before every move.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct RaycastOrigins {
    /// Top-left corner of the shrunk box.
    pub top_left: Vec2,
    /// Top-right corner of the shrunk box.
    pub top_right: Vec2,
    /// Bottom-left corner of the shrunk box.
    pub bottom_left: Vec2,
    /// Bottom-right corner of the shrunk box.
    pub bottom_right: Vec2,
}

impl RaycastOrigins {
    /// Corners of `bounds` shrunk by `skin_width` on every side.
    pub fn from_bounds(bounds: Rect, skin_width: f32) -> Self {
        let inner = bounds.inflate(-skin_width);
        Self {
            top_left: Vec2::new(inner.min.x, inner.max.y),
            top_right: inner.max,
            bottom_left: inner.min,
            bottom_right: Vec2::new(inner.max.x, inner.min.y),
        }
    }

    /// Bottom corner on the side of `direction_x` (-1 = left).
    pub fn bottom(&self, direction_x: f32) -> Vec2 {
        if direction_x < 0.0 {
            self.bottom_left
        } else {
            self.bottom_right
        }
    }

    /// Left corner on the side of `direction_y` (-1 = bottom).
    pub fn left(&self, direction_y: f32) -> Vec2 {
        if direction_y < 0.0 {
            self.bottom_left
        } else {
            self.top_left
        }
    }
}

/// Number of rays per side and the distance between them.
///
/// Computed once from the collider size; collider boxes are not expected to
/// change size at runtime.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct RaySpacing {
    /// Rays cast along X, stacked vertically.
    pub horizontal_count: usize,
    /// Rays cast along Y, spread horizontally.
    pub vertical_count: usize,
    /// Vertical distance between horizontal rays.
    pub horizontal_spacing: f32,
    /// Horizontal distance between vertical rays.
    pub vertical_spacing: f32,
}

impl RaySpacing {
    /// Derive ray counts and spacing from a collider box.
    ///
    /// Each count is `round(size / distance_between_rays)`, never less than 2,
    /// so the outermost rays always sit on the shrunk corners.
    pub fn from_bounds(
        bounds: Rect,
        skin_width: f32,
        distance_between_rays: f32,
    ) -> Result<Self, ConfigError> {
        if !(distance_between_rays > 0.0 && distance_between_rays.is_finite()) {
            return Err(ConfigError::InvalidRaySpacing(distance_between_rays));
        }

        let size = bounds.inflate(-skin_width).size();
        if !(size.x > 0.0 && size.y > 0.0 && size.is_finite()) {
            return Err(ConfigError::DegenerateBounds {
                width: size.x,
                height: size.y,
            });
        }

        let horizontal_count = ray_count(size.y, distance_between_rays);
        let vertical_count = ray_count(size.x, distance_between_rays);

        Ok(Self {
            horizontal_count,
            vertical_count,
            horizontal_spacing: size.y / (horizontal_count - 1) as f32,
            vertical_spacing: size.x / (vertical_count - 1) as f32,
        })
    }
}

fn ray_count(length: f32, distance_between_rays: f32) -> usize {
    ((length / distance_between_rays).round() as usize).max(2)
}

/// Direction of a displacement component, treating zero as positive.
#[inline]
pub(crate) fn sign(value: f32) -> f32 {
    if value >= 0.0 {
        1.0
    } else {
        -1.0
    }
}
