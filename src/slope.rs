//! Slope climbing, descending and max-slope sliding.
//!
//! These run inside a single collision resolution and rewrite the pending
//! displacement in place. The walkable threshold separates the two regimes:
//! slopes at or under it are climbed and descended, steeper ones are slid down.

use bevy::prelude::*;

use crate::backend::{RayFilter, RaycastQuery};
use crate::collision::CollisionStatus;
use crate::detection::{slope_angle, RayHit};
use crate::raycast::{sign, RaycastOrigins};

/// Slope sub-steps of a collision resolution.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct SlopeHandler {
    /// Steepest walkable slope, in degrees.
    pub max_slope_angle: f32,
    /// Skin width of the actor being resolved.
    pub skin_width: f32,
}

impl SlopeHandler {
    /// Create a handler for the given walkable threshold and skin width.
    pub fn new(max_slope_angle: f32, skin_width: f32) -> Self {
        Self {
            max_slope_angle,
            skin_width,
        }
    }

    /// Whether a surface at `angle` degrees can be walked on.
    pub fn is_walkable(&self, angle: f32) -> bool {
        angle <= self.max_slope_angle
    }

    /// Convert horizontal travel into travel along a walkable slope.
    ///
    /// Leaves the displacement untouched when the actor already moves up
    /// faster than the slope would lift it (mid-jump).
    pub fn climb(
        &self,
        displacement: &mut Vec2,
        angle: f32,
        normal: Vec2,
        status: &mut CollisionStatus,
    ) {
        let move_distance = displacement.x.abs();
        let radians = angle.to_radians();
        let climb_dy = radians.sin() * move_distance;

        if displacement.y > climb_dy {
            return;
        }

        displacement.y = climb_dy;
        displacement.x = radians.cos() * move_distance * sign(displacement.x);

        status.below = true;
        status.climbing_slope = true;
        status.slope_angle = angle;
        status.slope_normal = normal;
    }

    /// Snap a falling actor onto a walkable slope it is walking down, or slide
    /// it off a max slope under exactly one of its feet.
    pub fn descend<Q: RaycastQuery + ?Sized>(
        &self,
        query: &Q,
        filter: RayFilter,
        origins: &RaycastOrigins,
        displacement: &mut Vec2,
        status: &mut CollisionStatus,
    ) {
        let probe_length = displacement.y.abs() + self.skin_width;
        let left_hit = query.cast_ray(origins.bottom_left, Vec2::NEG_Y, probe_length, filter);
        let right_hit = query.cast_ray(origins.bottom_right, Vec2::NEG_Y, probe_length, filter);

        if left_hit.is_some() != right_hit.is_some() {
            self.slide_down_max_slope(left_hit, displacement, status);
            self.slide_down_max_slope(right_hit, displacement, status);
        }

        if status.sliding_down_max_slope {
            return;
        }

        // Trailing foot: the one still over the slope when walking downhill.
        let direction_x = sign(displacement.x);
        let origin = origins.bottom(-direction_x);
        let Some(hit) = query.cast_ray(origin, Vec2::NEG_Y, f32::INFINITY, filter) else {
            return;
        };

        let angle = hit.slope_angle();
        if angle == 0.0 || !self.is_walkable(angle) {
            return;
        }

        if sign(hit.normal.x) != direction_x {
            return;
        }

        let radians = angle.to_radians();
        if hit.distance - self.skin_width > radians.tan() * displacement.x.abs() {
            return;
        }

        let move_distance = displacement.x.abs();
        displacement.x = radians.cos() * move_distance * direction_x;
        displacement.y -= radians.sin() * move_distance;

        status.slope_angle = angle;
        status.descending_slope = true;
        status.below = true;
        status.slope_normal = hit.normal;
    }

    /// Push the actor down and away from a slope steeper than the walkable
    /// threshold. Walkable hits and misses are ignored.
    pub fn slide_down_max_slope(
        &self,
        hit: Option<RayHit>,
        displacement: &mut Vec2,
        status: &mut CollisionStatus,
    ) {
        let Some(hit) = hit else {
            return;
        };

        let angle = slope_angle(hit.normal);
        if self.is_walkable(angle) {
            return;
        }

        displacement.x =
            hit.normal.x * (displacement.y.abs() - hit.distance) / angle.to_radians().tan();

        status.slope_angle = angle;
        status.sliding_down_max_slope = true;
        status.slope_normal = hit.normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::segments::{SegmentShape, SegmentWorld};
    use crate::config::layers;
    use approx::assert_abs_diff_eq;

    fn handler() -> SlopeHandler {
        SlopeHandler::new(70.0, 0.015)
    }

    #[test]
    fn climb_preserves_travel_distance() {
        let mut displacement = Vec2::new(-2.0, 0.0);
        let mut status = CollisionStatus::default();
        let normal = Vec2::new(1.0, 1.0).normalize();

        handler().climb(&mut displacement, 45.0, normal, &mut status);

        assert_abs_diff_eq!(displacement.length(), 2.0, epsilon = 1e-5);
        assert!(displacement.x < 0.0);
        assert!(displacement.y > 0.0);
        assert!(status.climbing_slope);
        assert!(status.below);
        assert_eq!(status.slope_normal, normal);
    }

    #[test]
    fn climb_is_ignored_mid_jump() {
        let mut displacement = Vec2::new(1.0, 5.0);
        let mut status = CollisionStatus::default();

        handler().climb(&mut displacement, 30.0, Vec2::Y, &mut status);

        assert_eq!(displacement, Vec2::new(1.0, 5.0));
        assert!(!status.climbing_slope);
    }

    #[test]
    fn walkable_hits_do_not_slide() {
        let mut displacement = Vec2::new(0.0, -1.0);
        let mut status = CollisionStatus::default();
        let hit = RayHit::new(0.2, Vec2::new(1.0, 1.0).normalize(), Vec2::ZERO, None);

        handler().slide_down_max_slope(Some(hit), &mut displacement, &mut status);
        handler().slide_down_max_slope(None, &mut displacement, &mut status);

        assert_eq!(displacement, Vec2::new(0.0, -1.0));
        assert!(!status.sliding_down_max_slope);
    }

    #[test]
    fn steep_hit_slides_away_from_slope() {
        let angle: f32 = 80.0;
        let normal = Vec2::new(angle.to_radians().sin(), angle.to_radians().cos());
        let hit = RayHit::new(0.1, normal, Vec2::ZERO, None);
        let mut displacement = Vec2::new(0.0, -0.5);
        let mut status = CollisionStatus::default();

        handler().slide_down_max_slope(Some(hit), &mut displacement, &mut status);

        let expected = normal.x * (0.5 - 0.1) / angle.to_radians().tan();
        assert_abs_diff_eq!(displacement.x, expected, epsilon = 1e-5);
        assert_abs_diff_eq!(displacement.y, -0.5);
        assert!(status.sliding_down_max_slope);
        assert_abs_diff_eq!(status.slope_angle, 80.0, epsilon = 1e-3);
    }

    #[test]
    fn descend_ignores_flat_ground() {
        let world = SegmentWorld::new()
            .with(SegmentShape::rectangle(Rect::new(-10.0, -1.0, 10.0, 0.0)));
        let origins = RaycastOrigins::from_bounds(Rect::new(0.0, 0.0, 1.0, 1.0), 0.015);
        let mut displacement = Vec2::new(1.0, -0.1);
        let mut status = CollisionStatus::default();

        handler().descend(
            &world,
            RayFilter::new(layers::WORLD),
            &origins,
            &mut displacement,
            &mut status,
        );

        assert_eq!(displacement, Vec2::new(1.0, -0.1));
        assert!(!status.descending_slope);
        assert!(!status.sliding_down_max_slope);
    }
}
