//! Configuration errors.
//!
//! These are only produced while building a resolver or a platform. Once an
//! entity is initialized, per-tick resolution never fails.

use thiserror::Error;

/// Errors raised while validating controller or platform configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The collider box (after skin shrinking) has no area.
    #[error("collider bounds are degenerate after skin shrinking ({width} x {height})")]
    DegenerateBounds {
        /// Shrunk width.
        width: f32,
        /// Shrunk height.
        height: f32,
    },

    /// The target distance between rays must be positive and finite.
    #[error("distance between rays must be positive, got {0}")]
    InvalidRaySpacing(f32),

    /// A moving platform needs at least two waypoints.
    #[error("moving platform needs at least 2 waypoints, got {0}")]
    NotEnoughWaypoints(usize),

    /// Two consecutive waypoints coincide, so progress along the segment is undefined.
    #[error("waypoints {from} and {to} are at the same position")]
    ZeroLengthSegment {
        /// Index of the segment start.
        from: usize,
        /// Index of the segment end.
        to: usize,
    },
}
