//! Core controller systems.
//!
//! Initialization and motor systems are generic over the physics backend.
//! Movement itself needs engine-specific ray casts, so backends call the
//! shared drivers at the bottom of this module with their own
//! [`RaycastQuery`].

use bevy::prelude::*;

use crate::backend::{PassengerMover, PlatformerPhysicsBackend, RaycastQuery};
use crate::collision::{CollisionResolver, CollisionStatus, MoveRequest};
use crate::config::{CollisionConfig, ConfigurationFailed, ControllerConfig, PlatformConfig};
use crate::intent::{DirectionalInput, JumpRequest};
use crate::motor::ActorMotor;
use crate::platform::MovingPlatform;

/// Actors that can be carried by a platform.
pub(crate) type PassengerQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static CollisionResolver,
        &'static mut CollisionStatus,
        &'static mut Transform,
    ),
    Without<MovingPlatform>,
>;

/// Platforms following their waypoints.
pub(crate) type PlatformQuery<'w, 's> = Query<
    'w,
    's,
    (Entity, &'static mut MovingPlatform, &'static mut Transform),
    Without<CollisionResolver>,
>;

/// Actors moving on their own.
pub(crate) type ActorQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static CollisionResolver,
        &'static mut CollisionStatus,
        &'static mut Transform,
        &'static ActorMotor,
        Option<&'static DirectionalInput>,
    ),
    Without<MovingPlatform>,
>;

/// Build a [`CollisionResolver`] for every new actor.
///
/// Entities whose collider is not available yet are retried next tick.
/// Invalid configurations are logged once and tagged [`ConfigurationFailed`].
pub(crate) fn init_collision_resolvers<B: PlatformerPhysicsBackend>(world: &mut World) {
    let pending: Vec<(Entity, CollisionConfig, Vec2)> = world
        .query_filtered::<(Entity, &ControllerConfig, &Transform), (
            Without<CollisionResolver>,
            Without<ConfigurationFailed>,
        )>()
        .iter(world)
        .map(|(entity, config, transform)| {
            (entity, config.collision, transform.translation.truncate())
        })
        .collect();

    for (entity, config, position) in pending {
        let Some(bounds) = B::get_bounds(world, entity) else {
            continue;
        };

        let component = match CollisionResolver::new(bounds, &config) {
            Ok(resolver) => {
                let spacing = resolver.spacing();
                debug!(
                    "Collision resolver ready for {entity}: {}x{} rays",
                    spacing.horizontal_count, spacing.vertical_count
                );
                Ok(resolver.anchored_at(bounds, position))
            }
            Err(err) => {
                error!("Invalid controller configuration on {entity}: {err}");
                Err(ConfigurationFailed(err))
            }
        };

        if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
            match component {
                Ok(resolver) => entity_mut.insert(resolver),
                Err(failure) => entity_mut.insert(failure),
            };
        }
    }
}

/// Build a [`MovingPlatform`] for every new platform.
pub(crate) fn init_moving_platforms<B: PlatformerPhysicsBackend>(world: &mut World) {
    let pending: Vec<(Entity, PlatformConfig, Vec2)> = world
        .query_filtered::<(Entity, &PlatformConfig, &Transform), (
            Without<MovingPlatform>,
            Without<ConfigurationFailed>,
        )>()
        .iter(world)
        .map(|(entity, config, transform)| {
            (entity, config.clone(), transform.translation.truncate())
        })
        .collect();

    for (entity, config, position) in pending {
        let Some(bounds) = B::get_bounds(world, entity) else {
            continue;
        };

        let component = match MovingPlatform::new(&config, bounds, position) {
            Ok(platform) => {
                debug!(
                    "Moving platform ready for {entity}: {} waypoints",
                    platform.waypoints().len()
                );
                Ok(platform)
            }
            Err(err) => {
                error!("Invalid platform configuration on {entity}: {err}");
                Err(ConfigurationFailed(err))
            }
        };

        if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
            match component {
                Ok(platform) => entity_mut.insert(platform),
                Err(failure) => entity_mut.insert(failure),
            };
        }
    }
}

/// Drop cached passenger lookups for entities that gained or lost a resolver.
pub(crate) fn refresh_passenger_registry(
    mut removed: RemovedComponents<CollisionResolver>,
    added: Query<Entity, Added<CollisionResolver>>,
    mut platforms: Query<&mut MovingPlatform>,
) {
    let changed: Vec<Entity> = removed.read().chain(added.iter()).collect();
    if changed.is_empty() {
        return;
    }

    for mut platform in &mut platforms {
        for entity in &changed {
            platform.forget_passenger(*entity);
        }
    }
}

/// Consume jump edges, then integrate input, gravity and wall sliding.
pub(crate) fn update_motor_velocity(
    time: Res<Time>,
    mut actors: Query<
        (
            &ControllerConfig,
            &CollisionStatus,
            &DirectionalInput,
            &mut JumpRequest,
            &mut ActorMotor,
        ),
        Without<ConfigurationFailed>,
    >,
) {
    let delta = time.delta_secs();
    for (config, status, input, mut jump, mut motor) in &mut actors {
        let input = input.as_vec2();

        if jump.take_pressed() {
            motor.on_jump_pressed(config, status, input);
        }
        if jump.take_released() {
            motor.on_jump_released(config);
        }

        motor.calculate_velocity(config, status, input, delta);
        motor.handle_wall_sliding(config, status, input, delta);
    }
}

/// Let each motor react to the contacts of its own move.
pub(crate) fn apply_motor_response(
    time: Res<Time>,
    mut actors: Query<
        (&ControllerConfig, &CollisionStatus, &mut ActorMotor),
        Without<ConfigurationFailed>,
    >,
) {
    let delta = time.delta_secs();
    for (config, status, mut motor) in &mut actors {
        motor.respond_to_collisions(config, status, delta);
    }
}

/// Moves carried actors through their own resolver and translates the
/// carrying platform.
pub(crate) struct EcsCarrier<'a, 'w, 's, Q: RaycastQuery + ?Sized> {
    pub(crate) query: &'a Q,
    pub(crate) passengers: &'a mut PassengerQuery<'w, 's>,
    pub(crate) platform: Entity,
    pub(crate) platform_transform: &'a mut Transform,
    pub(crate) now: f32,
}

impl<Q: RaycastQuery + ?Sized> PassengerMover for EcsCarrier<'_, '_, '_, Q> {
    fn move_passenger(&mut self, passenger: Entity, displacement: Vec2, standing_on_platform: bool) -> bool {
        let Ok((resolver, mut status, mut transform)) = self.passengers.get_mut(passenger) else {
            return false;
        };

        let bounds = resolver.bounds_at(transform.translation.truncate());
        let request = MoveRequest::new(displacement, self.now)
            .standing_on_platform(standing_on_platform)
            .excluding(passenger)
            .carried_by(self.platform);
        let outcome = resolver.resolve(self.query, bounds, &status, request);

        transform.translation += outcome.displacement.extend(0.0);
        *status = outcome.status;
        true
    }

    fn translate_platform(&mut self, displacement: Vec2) {
        self.platform_transform.translation += displacement.extend(0.0);
    }
}

/// Advance every platform and carry its passengers.
pub(crate) fn drive_platforms<Q: RaycastQuery + ?Sized>(
    query: &Q,
    platforms: &mut PlatformQuery,
    passengers: &mut PassengerQuery,
    time: &Time,
) {
    let now = time.elapsed_secs();
    let delta = time.delta_secs();

    for (entity, mut platform, mut transform) in platforms.iter_mut() {
        let position = transform.translation.truncate();
        let mut carrier = EcsCarrier {
            query,
            passengers: &mut *passengers,
            platform: entity,
            platform_transform: &mut *transform,
            now,
        };
        platform.step(query, &mut carrier, position, now, delta, Some(entity));
    }
}

/// Move every motor-driven actor by `velocity * dt`.
pub(crate) fn drive_actors<Q: RaycastQuery + ?Sized>(query: &Q, actors: &mut ActorQuery, time: &Time) {
    let now = time.elapsed_secs();
    let delta = time.delta_secs();

    for (entity, resolver, mut status, mut transform, motor, input) in actors.iter_mut() {
        let bounds = resolver.bounds_at(transform.translation.truncate());
        let request = MoveRequest::new(motor.displacement(delta), now)
            .with_input(input.map(DirectionalInput::as_vec2).unwrap_or_default())
            .excluding(entity);
        let outcome = resolver.resolve(query, bounds, &status, request);

        transform.translation += outcome.displacement.extend(0.0);
        *status = outcome.status;
    }
}
