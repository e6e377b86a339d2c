//! Waypoint-following platforms and passenger transport.
//!
//! Every tick a platform computes its own displacement, probes for actors it
//! touches, and moves them in two passes around its own translation: actors
//! it pushes move first, actors riding on top move after it.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use crate::backend::{PassengerMover, RayFilter, RaycastQuery};
use crate::config::PlatformConfig;
use crate::error::ConfigError;
use crate::raycast::{sign, RaySpacing, RaycastOrigins};

/// Easing curve `x^a / (x^a + (1 - x)^a)` with `a = amount + 1`.
///
/// `amount = 0` is linear; higher values ease in and out more strongly.
pub fn ease(x: f32, amount: f32) -> f32 {
    let a = amount + 1.0;
    let head = x.powf(a);
    head / (head + (1.0 - x).powf(a))
}

/// How one passenger is carried this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassengerMovement {
    /// The carried actor.
    pub passenger: Entity,
    /// Displacement handed to the actor's collision resolution.
    pub displacement: Vec2,
    /// The actor rides on top of the platform.
    pub standing_on_platform: bool,
    /// The actor moves before the platform translates.
    pub move_before_platform: bool,
}

/// Runtime state of a waypoint-following platform.
#[derive(Component, Debug, Clone)]
pub struct MovingPlatform {
    global_waypoints: Vec<Vec2>,
    speed: f32,
    cyclic: bool,
    wait_time: f32,
    ease_amount: f32,
    passenger_mask: u32,
    skin_width: f32,
    spacing: RaySpacing,
    half_size: Vec2,
    center_offset: Vec2,
    from_index: usize,
    percent_between: f32,
    next_move_time: f32,
    /// Entities seen by the probes; `false` for entities that cannot be moved.
    passengers: HashMap<Entity, bool>,
}

impl MovingPlatform {
    /// Build a platform from its configuration, collider box and spawn position.
    pub fn new(config: &PlatformConfig, bounds: Rect, position: Vec2) -> Result<Self, ConfigError> {
        let count = config.waypoints.len();
        if count < 2 {
            return Err(ConfigError::NotEnoughWaypoints(count));
        }

        let segments = if config.cyclic { count } else { count - 1 };
        for from in 0..segments {
            let to = (from + 1) % count;
            if config.waypoints[from].distance(config.waypoints[to]) <= f32::EPSILON {
                return Err(ConfigError::ZeroLengthSegment { from, to });
            }
        }

        let spacing =
            RaySpacing::from_bounds(bounds, config.skin_width, config.distance_between_rays)?;

        Ok(Self {
            global_waypoints: config.waypoints.iter().map(|w| *w + position).collect(),
            speed: config.speed,
            cyclic: config.cyclic,
            wait_time: config.wait_time,
            ease_amount: config.ease_amount.clamp(0.0, 2.0),
            passenger_mask: config.passenger_mask,
            skin_width: config.skin_width,
            spacing,
            half_size: bounds.half_size(),
            center_offset: bounds.center() - position,
            from_index: 0,
            percent_between: 0.0,
            next_move_time: 0.0,
            passengers: HashMap::new(),
        })
    }

    /// Waypoints in world space, in current travel order.
    pub fn waypoints(&self) -> &[Vec2] {
        &self.global_waypoints
    }

    /// Index of the waypoint the platform is leaving.
    pub fn from_index(&self) -> usize {
        self.from_index
    }

    /// Collider box of the platform when positioned at `position`.
    pub fn bounds_at(&self, position: Vec2) -> Rect {
        Rect::from_center_half_size(position + self.center_offset, self.half_size)
    }

    /// Advance along the waypoints and return this tick's displacement.
    pub fn calculate_platform_movement(&mut self, position: Vec2, now: f32, delta: f32) -> Vec2 {
        if now < self.next_move_time {
            return Vec2::ZERO;
        }

        let count = self.global_waypoints.len();
        self.from_index %= count;
        let to_index = (self.from_index + 1) % count;
        let from = self.global_waypoints[self.from_index];
        let to = self.global_waypoints[to_index];

        self.percent_between += delta * self.speed / from.distance(to);
        self.percent_between = self.percent_between.clamp(0.0, 1.0);

        let new_position = from.lerp(to, ease(self.percent_between, self.ease_amount));

        if self.percent_between >= 1.0 {
            self.percent_between = 0.0;
            self.from_index += 1;
            if !self.cyclic && self.from_index >= count - 1 {
                self.from_index = 0;
                self.global_waypoints.reverse();
            }
            self.next_move_time = now + self.wait_time;
        }

        new_position - position
    }

    /// Probe for actors the platform will touch when moving by `velocity`.
    ///
    /// Each actor is recorded once; vertical pushes win over horizontal
    /// pushes, which win over riders found by the top probe.
    pub fn calculate_passenger_movement<Q: RaycastQuery + ?Sized>(
        &self,
        query: &Q,
        bounds: Rect,
        velocity: Vec2,
        own: Option<Entity>,
    ) -> Vec<PassengerMovement> {
        let origins = RaycastOrigins::from_bounds(bounds, self.skin_width);
        let filter = RayFilter::new(self.passenger_mask).excluding(own);
        let skin = self.skin_width;
        let direction_x = sign(velocity.x);
        let direction_y = sign(velocity.y);

        let mut moved = HashSet::new();
        let mut movements = Vec::new();
        let mut record = |hit_entity: Option<Entity>, displacement: Vec2, standing: bool, before: bool| {
            let Some(passenger) = hit_entity else {
                return;
            };
            if moved.insert(passenger) {
                movements.push(PassengerMovement {
                    passenger,
                    displacement,
                    standing_on_platform: standing,
                    move_before_platform: before,
                });
            }
        };

        if velocity.y != 0.0 {
            let ray_length = velocity.y.abs() + skin;
            for i in 0..self.spacing.vertical_count {
                let origin = origins.left(direction_y)
                    + Vec2::X * (self.spacing.vertical_spacing * i as f32);
                let Some(hit) = query.cast_ray(origin, Vec2::Y * direction_y, ray_length, filter)
                else {
                    continue;
                };
                if hit.distance == 0.0 {
                    continue;
                }

                let push_x = if direction_y == 1.0 { velocity.x } else { 0.0 };
                let push_y = velocity.y - (hit.distance - skin) * direction_y;
                record(hit.entity, Vec2::new(push_x, push_y), direction_y == 1.0, true);
            }
        }

        if velocity.x != 0.0 {
            let ray_length = velocity.x.abs() + skin;
            for i in 0..self.spacing.horizontal_count {
                let origin = origins.bottom(direction_x)
                    + Vec2::Y * (self.spacing.horizontal_spacing * i as f32);
                let Some(hit) = query.cast_ray(origin, Vec2::X * direction_x, ray_length, filter)
                else {
                    continue;
                };
                if hit.distance == 0.0 {
                    continue;
                }

                let push_x = velocity.x - (hit.distance - skin) * direction_x;
                record(hit.entity, Vec2::new(push_x, -skin), false, true);
            }
        }

        if direction_y == -1.0 || (velocity.y == 0.0 && velocity.x != 0.0) {
            let ray_length = skin * 2.0;
            for i in 0..self.spacing.vertical_count {
                let origin = origins.top_left + Vec2::X * (self.spacing.vertical_spacing * i as f32);
                let Some(hit) = query.cast_ray(origin, Vec2::Y, ray_length, filter) else {
                    continue;
                };
                if hit.distance == 0.0 {
                    continue;
                }

                record(hit.entity, velocity, true, false);
            }
        }

        movements
    }

    /// Hand every movement of one pass to `mover`.
    pub fn move_passengers<M: PassengerMover + ?Sized>(
        &mut self,
        movements: &[PassengerMovement],
        before_platform: bool,
        mover: &mut M,
    ) {
        for movement in movements {
            if movement.move_before_platform != before_platform {
                continue;
            }
            if self.passengers.get(&movement.passenger) == Some(&false) {
                continue;
            }

            let is_actor = mover.move_passenger(
                movement.passenger,
                movement.displacement,
                movement.standing_on_platform,
            );
            self.passengers.insert(movement.passenger, is_actor);
        }
    }

    /// Run one full platform tick: move, push passengers, translate, carry riders.
    ///
    /// Returns the platform's own displacement.
    pub fn step<Q: RaycastQuery + ?Sized, M: PassengerMover + ?Sized>(
        &mut self,
        query: &Q,
        mover: &mut M,
        position: Vec2,
        now: f32,
        delta: f32,
        own: Option<Entity>,
    ) -> Vec2 {
        let bounds = self.bounds_at(position);
        let velocity = self.calculate_platform_movement(position, now, delta);
        let movements = self.calculate_passenger_movement(query, bounds, velocity, own);

        self.move_passengers(&movements, true, mover);
        mover.translate_platform(velocity);
        self.move_passengers(&movements, false, mover);

        velocity
    }

    /// Drop a cached passenger entry so it is looked up again.
    pub fn forget_passenger(&mut self, entity: Entity) {
        self.passengers.remove(&entity);
    }

    /// Whether `entity` is cached as a movable passenger.
    pub fn knows_passenger(&self, entity: Entity) -> Option<bool> {
        self.passengers.get(&entity).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::segments::{SegmentShape, SegmentWorld};
    use crate::config::layers;
    use approx::assert_abs_diff_eq;

    #[derive(Debug, PartialEq)]
    enum Event {
        Passenger(Entity, Vec2, bool),
        Platform(Vec2),
    }

    #[derive(Default)]
    struct RecordingMover {
        events: Vec<Event>,
        non_actors: Vec<Entity>,
    }

    impl PassengerMover for RecordingMover {
        fn move_passenger(&mut self, passenger: Entity, displacement: Vec2, standing: bool) -> bool {
            if self.non_actors.contains(&passenger) {
                return false;
            }
            self.events.push(Event::Passenger(passenger, displacement, standing));
            true
        }

        fn translate_platform(&mut self, displacement: Vec2) {
            self.events.push(Event::Platform(displacement));
        }
    }

    fn platform_bounds() -> Rect {
        Rect::new(-1.0, -0.25, 1.0, 0.25)
    }

    fn horizontal_platform() -> MovingPlatform {
        let config = PlatformConfig::new([Vec2::ZERO, Vec2::new(10.0, 0.0)])
            .with_speed(10.0)
            .with_wait_time(0.0);
        MovingPlatform::new(&config, platform_bounds(), Vec2::ZERO).unwrap()
    }

    #[test]
    fn ease_is_linear_without_amount() {
        assert_abs_diff_eq!(ease(0.25, 0.0), 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(ease(0.0, 2.0), 0.0);
        assert_abs_diff_eq!(ease(1.0, 2.0), 1.0);
        assert_abs_diff_eq!(ease(0.5, 2.0), 0.5, epsilon = 1e-6);
        assert!(ease(0.25, 1.0) < 0.25);
    }

    #[test]
    fn reaches_next_waypoint_after_travel_time() {
        let mut platform = horizontal_platform();
        let mut position = Vec2::ZERO;
        let dt = 0.02;

        for tick in 0..50 {
            position += platform.calculate_platform_movement(position, tick as f32 * dt, dt);
        }

        assert_abs_diff_eq!(position.x, 10.0, epsilon = 0.2);
        assert_abs_diff_eq!(position.y, 0.0);
    }

    #[test]
    fn ping_pongs_without_cyclic() {
        let mut platform = horizontal_platform();
        let mut position = Vec2::ZERO;
        // Exact in binary, so each leg takes a whole number of ticks.
        let dt = 0.125;

        for tick in 0..8 {
            position += platform.calculate_platform_movement(position, tick as f32 * dt, dt);
        }
        assert_abs_diff_eq!(position.x, 10.0, epsilon = 1e-5);
        assert_eq!(platform.waypoints()[0], Vec2::new(10.0, 0.0));

        // The very next tick heads back.
        position += platform.calculate_platform_movement(position, 8.0 * dt, dt);
        assert_abs_diff_eq!(position.x, 8.75, epsilon = 1e-5);

        for tick in 9..12 {
            position += platform.calculate_platform_movement(position, tick as f32 * dt, dt);
        }
        assert_abs_diff_eq!(position.x, 5.0, epsilon = 1e-5);
        assert_abs_diff_eq!(position.y, 0.0);
    }

    #[test]
    fn waits_at_waypoints() {
        let config = PlatformConfig::new([Vec2::ZERO, Vec2::new(1.0, 0.0)])
            .with_speed(1.0)
            .with_wait_time(0.5);
        let mut platform = MovingPlatform::new(&config, platform_bounds(), Vec2::ZERO).unwrap();

        let moved = platform.calculate_platform_movement(Vec2::ZERO, 0.0, 1.0);
        assert_abs_diff_eq!(moved.x, 1.0);

        let position = Vec2::new(1.0, 0.0);
        assert_eq!(platform.calculate_platform_movement(position, 0.25, 0.1), Vec2::ZERO);
        assert!(platform.calculate_platform_movement(position, 0.6, 0.1).x < 0.0);
    }

    #[test]
    fn cyclic_platform_wraps_around() {
        let config = PlatformConfig::new([Vec2::ZERO, Vec2::X, Vec2::new(1.0, 1.0)])
            .with_speed(1.0)
            .with_wait_time(0.0)
            .cyclic();
        let mut platform = MovingPlatform::new(&config, platform_bounds(), Vec2::ZERO).unwrap();
        let mut position = Vec2::ZERO;

        // One tick per unit edge, two for the diagonal.
        for tick in 0..4 {
            position += platform.calculate_platform_movement(position, tick as f32, 1.0);
        }

        assert_eq!(platform.from_index(), 3);
        assert_eq!(platform.waypoints()[0], Vec2::ZERO);
        // Third segment runs diagonally back to the start.
        assert_abs_diff_eq!(position.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(position.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn rejects_bad_waypoints() {
        let bounds = platform_bounds();
        let single = PlatformConfig::new([Vec2::ZERO]);
        assert_eq!(
            MovingPlatform::new(&single, bounds, Vec2::ZERO).unwrap_err(),
            ConfigError::NotEnoughWaypoints(1)
        );

        let repeated = PlatformConfig::new([Vec2::ZERO, Vec2::X, Vec2::X]);
        assert_eq!(
            MovingPlatform::new(&repeated, bounds, Vec2::ZERO).unwrap_err(),
            ConfigError::ZeroLengthSegment { from: 1, to: 2 }
        );

        let closed_loop = PlatformConfig::new([Vec2::ZERO, Vec2::X, Vec2::ZERO]).cyclic();
        assert_eq!(
            MovingPlatform::new(&closed_loop, bounds, Vec2::ZERO).unwrap_err(),
            ConfigError::ZeroLengthSegment { from: 2, to: 0 }
        );
    }

    #[test]
    fn rider_is_carried_after_platform_translates() {
        let mut ecs = World::new();
        let rider = ecs.spawn_empty().id();
        let world = SegmentWorld::new().with(
            SegmentShape::rectangle(Rect::new(-0.5, 0.25, 0.5, 1.25))
                .with_layers(layers::ACTORS)
                .with_entity(rider),
        );
        let mut platform = horizontal_platform();
        let mut mover = RecordingMover::default();

        let velocity = platform.step(&world, &mut mover, Vec2::ZERO, 0.0, 0.02, None);

        assert_abs_diff_eq!(velocity.x, 0.2, epsilon = 1e-6);
        assert_eq!(
            mover.events,
            vec![
                Event::Platform(velocity),
                Event::Passenger(rider, velocity, true),
            ]
        );
    }

    #[test]
    fn rising_platform_pushes_rider_first() {
        let mut ecs = World::new();
        let rider = ecs.spawn_empty().id();
        let world = SegmentWorld::new().with(
            SegmentShape::rectangle(Rect::new(-0.5, 0.25, 0.5, 1.25))
                .with_layers(layers::ACTORS)
                .with_entity(rider),
        );
        let config = PlatformConfig::new([Vec2::ZERO, Vec2::new(0.0, 10.0)])
            .with_speed(10.0)
            .with_wait_time(0.0);
        let mut platform = MovingPlatform::new(&config, platform_bounds(), Vec2::ZERO).unwrap();
        let mut mover = RecordingMover::default();

        let velocity = platform.step(&world, &mut mover, Vec2::ZERO, 0.0, 0.02, None);

        let Event::Passenger(entity, push, standing) = &mover.events[0] else {
            panic!("rider should move before the platform");
        };
        assert_eq!(*entity, rider);
        assert!(*standing);
        assert_abs_diff_eq!(push.y, velocity.y, epsilon = 1e-5);
        assert_eq!(mover.events[1], Event::Platform(velocity));
    }

    #[test]
    fn sideways_push_moves_before_platform() {
        let mut ecs = World::new();
        let actor = ecs.spawn_empty().id();
        let world = SegmentWorld::new().with(
            SegmentShape::rectangle(Rect::new(1.1, -0.25, 2.1, 0.75))
                .with_layers(layers::ACTORS)
                .with_entity(actor),
        );
        let platform = horizontal_platform();

        let movements = platform.calculate_passenger_movement(
            &world,
            platform_bounds(),
            Vec2::new(0.2, 0.0),
            None,
        );

        assert_eq!(movements.len(), 1);
        let push = movements[0];
        assert_eq!(push.passenger, actor);
        assert!(push.move_before_platform);
        assert!(!push.standing_on_platform);
        // Platform edge is 0.1 away: only the remaining 0.1 is pushed.
        assert_abs_diff_eq!(push.displacement.x, 0.1, epsilon = 1e-5);
        assert_abs_diff_eq!(push.displacement.y, -0.015);
    }

    #[test]
    fn passenger_is_recorded_once() {
        let mut ecs = World::new();
        let rider = ecs.spawn_empty().id();
        // Wide rider touched by every top probe ray.
        let world = SegmentWorld::new().with(
            SegmentShape::rectangle(Rect::new(-2.0, 0.25, 2.0, 1.25))
                .with_layers(layers::ACTORS)
                .with_entity(rider),
        );
        let platform = horizontal_platform();

        let movements = platform.calculate_passenger_movement(
            &world,
            platform_bounds(),
            Vec2::new(0.2, 0.0),
            None,
        );

        assert_eq!(movements.len(), 1);
        assert!(!movements[0].move_before_platform);
    }

    #[test]
    fn non_actors_are_cached_and_skipped() {
        let mut ecs = World::new();
        let crate_entity = ecs.spawn_empty().id();
        let world = SegmentWorld::new().with(
            SegmentShape::rectangle(Rect::new(-0.5, 0.25, 0.5, 1.25))
                .with_layers(layers::ACTORS)
                .with_entity(crate_entity),
        );
        let mut platform = horizontal_platform();
        let mut mover = RecordingMover {
            non_actors: vec![crate_entity],
            ..default()
        };

        platform.step(&world, &mut mover, Vec2::ZERO, 0.0, 0.02, None);
        assert_eq!(platform.knows_passenger(crate_entity), Some(false));

        platform.forget_passenger(crate_entity);
        assert_eq!(platform.knows_passenger(crate_entity), None);
    }
}
