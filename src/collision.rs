//! Ray-cast collision resolution.
//!
//! [`CollisionResolver`] takes an intended displacement and clamps it against
//! world geometry. Horizontal resolution always runs before vertical
//! resolution, since slope climbing rewrites the vertical component from the
//! resolved horizontal one.

use bevy::prelude::*;

use crate::backend::{RayFilter, RaycastQuery};
use crate::config::CollisionConfig;
use crate::error::ConfigError;
use crate::raycast::{sign, RaySpacing, RaycastOrigins};
use crate::slope::SlopeHandler;

/// Contact and slope state produced by the last collision resolution.
///
/// Most fields describe only the last tick. `slope_angle_old`,
/// `face_direction` and the drop-through window carry over into the next one.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct CollisionStatus {
    /// Blocked while moving up.
    pub above: bool,
    /// Blocked while moving down, on a slope, or carried by a platform.
    pub below: bool,
    /// Blocked while moving left.
    pub left: bool,
    /// Blocked while moving right.
    pub right: bool,

    /// Walking up a walkable slope.
    pub climbing_slope: bool,
    /// Walking down a walkable slope.
    pub descending_slope: bool,
    /// Sliding down a slope steeper than the walkable threshold.
    pub sliding_down_max_slope: bool,

    /// One-way platforms are ignored until `falling_through_until`.
    pub falling_through_platform: bool,
    /// Time at which the drop-through window closes.
    pub falling_through_until: f32,

    /// Angle of the slope under the actor this tick, in degrees.
    pub slope_angle: f32,
    /// Angle of the slope under the actor last tick, in degrees.
    pub slope_angle_old: f32,
    /// Normal of the slope under the actor, zero when none.
    pub slope_normal: Vec2,

    /// Last horizontal direction of travel (-1 or 1).
    pub face_direction: f32,

    /// Displacement requested before resolution.
    pub move_amount_old: Vec2,
}

impl Default for CollisionStatus {
    fn default() -> Self {
        Self {
            above: false,
            below: false,
            left: false,
            right: false,
            climbing_slope: false,
            descending_slope: false,
            sliding_down_max_slope: false,
            falling_through_platform: false,
            falling_through_until: 0.0,
            slope_angle: 0.0,
            slope_angle_old: 0.0,
            slope_normal: Vec2::ZERO,
            face_direction: 1.0,
            move_amount_old: Vec2::ZERO,
        }
    }
}

impl CollisionStatus {
    /// Clear the per-tick flags.
    ///
    /// The current slope angle moves into `slope_angle_old`; the facing
    /// direction and drop-through window are kept.
    pub fn reset(&mut self) {
        self.above = false;
        self.below = false;
        self.left = false;
        self.right = false;
        self.climbing_slope = false;
        self.descending_slope = false;
        self.sliding_down_max_slope = false;

        self.slope_normal = Vec2::ZERO;

        self.slope_angle_old = self.slope_angle;
        self.slope_angle = 0.0;
    }

    /// The state the next resolution starts from.
    #[must_use]
    pub fn carried_forward(&self) -> Self {
        let mut next = *self;
        next.reset();
        next
    }

    /// Standing on something.
    pub fn is_grounded(&self) -> bool {
        self.below
    }

    /// Touching a wall on either side.
    pub fn touches_wall(&self) -> bool {
        self.left || self.right
    }

    /// Direction of the wall being touched (-1 = left), or 0.
    pub fn wall_direction(&self) -> f32 {
        if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        }
    }
}

/// A single displacement to resolve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest {
    /// Intended displacement this tick.
    pub displacement: Vec2,
    /// Directional input, each axis in {-1, 0, 1}.
    pub input: Vec2,
    /// Force `below` after resolution (carried by a platform).
    pub standing_on_platform: bool,
    /// Current time, in seconds.
    pub now: f32,
    /// Entity ignored by every ray, usually the actor itself.
    pub exclude: Option<Entity>,
    /// Platform carrying the actor this move, ignored by every ray.
    pub carrier: Option<Entity>,
}

impl MoveRequest {
    /// Request `displacement` at time `now`, with no input.
    pub fn new(displacement: Vec2, now: f32) -> Self {
        Self {
            displacement,
            input: Vec2::ZERO,
            standing_on_platform: false,
            now,
            exclude: None,
            carrier: None,
        }
    }

    /// Set the directional input.
    #[must_use]
    pub fn with_input(mut self, input: Vec2) -> Self {
        self.input = input;
        self
    }

    /// Mark the actor as carried by a platform.
    #[must_use]
    pub fn standing_on_platform(mut self, standing: bool) -> Self {
        self.standing_on_platform = standing;
        self
    }

    /// Ignore `entity` in every ray cast.
    #[must_use]
    pub fn excluding(mut self, entity: Entity) -> Self {
        self.exclude = Some(entity);
        self
    }

    /// Ignore the platform carrying the actor.
    #[must_use]
    pub fn carried_by(mut self, platform: Entity) -> Self {
        self.carrier = Some(platform);
        self
    }
}

/// Result of resolving a [`MoveRequest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    /// Displacement to apply to the actor.
    pub displacement: Vec2,
    /// Contacts found while resolving.
    pub status: CollisionStatus,
}

/// Per-actor collision resolver, built once from the actor's collider box.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct CollisionResolver {
    spacing: RaySpacing,
    half_size: Vec2,
    center_offset: Vec2,
    skin_width: f32,
    drop_through_duration: f32,
    collision_mask: u32,
    slopes: SlopeHandler,
}

impl CollisionResolver {
    /// Build a resolver for a collider box.
    pub fn new(bounds: Rect, config: &CollisionConfig) -> Result<Self, ConfigError> {
        let spacing =
            RaySpacing::from_bounds(bounds, config.skin_width, config.distance_between_rays)?;

        Ok(Self {
            spacing,
            half_size: bounds.half_size(),
            center_offset: Vec2::ZERO,
            skin_width: config.skin_width,
            drop_through_duration: config.drop_through_duration,
            collision_mask: config.collision_mask,
            slopes: SlopeHandler::new(config.max_slope_angle, config.skin_width),
        })
    }

    /// Remember where the collider box sits relative to `position`, so
    /// [`bounds_at`](Self::bounds_at) can rebuild it after the actor moves.
    #[must_use]
    pub fn anchored_at(mut self, bounds: Rect, position: Vec2) -> Self {
        self.center_offset = bounds.center() - position;
        self
    }

    /// Collider box of the actor when positioned at `position`.
    pub fn bounds_at(&self, position: Vec2) -> Rect {
        Rect::from_center_half_size(position + self.center_offset, self.half_size)
    }

    /// Ray counts and spacing.
    pub fn spacing(&self) -> RaySpacing {
        self.spacing
    }

    /// Resolve `request` for an actor occupying `bounds`.
    ///
    /// `previous` is the status returned by the last resolution of the same
    /// actor. It is never modified; the new status is part of the outcome.
    pub fn resolve<Q: RaycastQuery + ?Sized>(
        &self,
        query: &Q,
        bounds: Rect,
        previous: &CollisionStatus,
        request: MoveRequest,
    ) -> MoveOutcome {
        let mut status = previous.carried_forward();
        if status.falling_through_platform && request.now >= status.falling_through_until {
            status.falling_through_platform = false;
        }
        status.move_amount_old = request.displacement;

        let mut sweep = Sweep {
            resolver: self,
            query,
            filter: RayFilter::new(self.collision_mask)
                .excluding(request.exclude)
                .carried_by(request.carrier),
            origins: RaycastOrigins::from_bounds(bounds, self.skin_width),
            request,
            displacement: request.displacement,
            status,
        };

        if sweep.displacement.y < 0.0 {
            self.slopes.descend(
                query,
                sweep.filter,
                &sweep.origins,
                &mut sweep.displacement,
                &mut sweep.status,
            );
        }

        if sweep.displacement.x != 0.0 {
            sweep.status.face_direction = sign(sweep.displacement.x);
        }

        sweep.horizontal();

        if sweep.displacement.y != 0.0 {
            sweep.vertical();
        }

        if request.standing_on_platform {
            sweep.status.below = true;
        }

        MoveOutcome {
            displacement: sweep.displacement,
            status: sweep.status,
        }
    }
}

/// Working state of one resolution.
struct Sweep<'a, Q: RaycastQuery + ?Sized> {
    resolver: &'a CollisionResolver,
    query: &'a Q,
    filter: RayFilter,
    origins: RaycastOrigins,
    request: MoveRequest,
    displacement: Vec2,
    status: CollisionStatus,
}

impl<Q: RaycastQuery + ?Sized> Sweep<'_, Q> {
    fn horizontal(&mut self) {
        let skin = self.resolver.skin_width;
        let slopes = self.resolver.slopes;
        let direction_x = self.status.face_direction;
        let mut ray_length = self.displacement.x.abs() + skin;
        if self.displacement.x.abs() < skin {
            ray_length = 2.0 * skin;
        }

        for i in 0..self.resolver.spacing.horizontal_count {
            let origin = self.origins.bottom(direction_x)
                + Vec2::Y * (self.resolver.spacing.horizontal_spacing * i as f32);
            let Some(hit) =
                self.query
                    .cast_ray(origin, Vec2::X * direction_x, ray_length, self.filter)
            else {
                continue;
            };

            if hit.distance == 0.0 {
                continue;
            }

            let angle = hit.slope_angle();
            if i == 0 && slopes.is_walkable(angle) {
                let mut distance_to_slope_start = 0.0;
                if angle != self.status.slope_angle_old {
                    distance_to_slope_start = hit.distance - skin;
                    self.displacement.x -= distance_to_slope_start * direction_x;
                }
                slopes.climb(&mut self.displacement, angle, hit.normal, &mut self.status);
                self.displacement.x += distance_to_slope_start * direction_x;
            }

            if self.status.climbing_slope && slopes.is_walkable(angle) {
                continue;
            }

            if self.status.descending_slope {
                self.status.descending_slope = false;
                self.displacement = self.status.move_amount_old;
            }

            self.displacement.x = (hit.distance - skin) * direction_x;
            ray_length = hit.distance;

            if self.status.climbing_slope {
                self.displacement.y =
                    self.status.slope_angle.to_radians().tan() * self.displacement.x.abs();
            }

            self.status.left = direction_x == -1.0;
            self.status.right = direction_x == 1.0;
        }
    }

    fn vertical(&mut self) {
        let skin = self.resolver.skin_width;
        let direction_y = sign(self.displacement.y);
        let mut ray_length = self.displacement.y.abs() + skin;

        for i in 0..self.resolver.spacing.vertical_count {
            let origin = self.origins.left(direction_y)
                + Vec2::X
                    * (self.resolver.spacing.vertical_spacing * i as f32 + self.displacement.x);
            let Some(hit) =
                self.query
                    .cast_ray(origin, Vec2::Y * direction_y, ray_length, self.filter)
            else {
                continue;
            };

            if hit.is_through() {
                if direction_y == 1.0 || hit.distance == 0.0 {
                    continue;
                }

                if self.status.falling_through_platform {
                    continue;
                }

                if self.request.input.y == -1.0 {
                    self.status.falling_through_platform = true;
                    self.status.falling_through_until =
                        self.request.now + self.resolver.drop_through_duration;
                    debug!(
                        "Dropping through one-way platform until t={:.2}",
                        self.status.falling_through_until
                    );
                    continue;
                }
            }

            self.displacement.y = (hit.distance - skin) * direction_y;
            ray_length = hit.distance;

            if self.status.climbing_slope {
                self.displacement.x = self.displacement.y
                    / self.status.slope_angle.to_radians().tan()
                    * sign(self.displacement.x);
            }

            self.status.below = direction_y == -1.0;
            self.status.above = direction_y == 1.0;
        }

        if self.status.climbing_slope {
            self.check_slope_change();
        }
    }

    /// Look ahead along the slope for a change of angle within this tick.
    fn check_slope_change(&mut self) {
        let skin = self.resolver.skin_width;
        let direction_x = sign(self.displacement.x);
        let ray_length = self.displacement.x.abs() + skin;
        let origin = self.origins.bottom(direction_x) + Vec2::Y * self.displacement.y;

        let Some(hit) = self
            .query
            .cast_ray(origin, Vec2::X * direction_x, ray_length, self.filter)
        else {
            return;
        };

        let angle = hit.slope_angle();
        if angle == self.status.slope_angle {
            return;
        }

        self.displacement.x = (hit.distance - skin) * direction_x;
        self.status.slope_angle = angle;
        self.status.slope_normal = hit.normal;
    }
}
