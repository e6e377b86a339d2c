//! Avian2D physics backend implementation.
//!
//! This module provides the physics backend for Avian2D (bevy_avian2d).
//! Enable with the `avian2d` feature.
//!
//! Actors and platforms are moved by writing their `Transform` directly, so
//! both should be `RigidBody::Kinematic` (or have no rigid body at all). Avian
//! picks up the new positions in `FixedPostUpdate`, which means every ray cast
//! during a fixed tick sees the geometry as it was when the tick started.

use std::collections::HashSet;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::backend::{PlatformerPhysicsBackend, RayFilter, RaycastQuery};
use crate::detection::{RayHit, SurfaceTag, ThroughPlatform};
use crate::systems::{drive_actors, drive_platforms, ActorQuery, PassengerQuery, PlatformQuery};
use crate::PlatformerControllerSet;

/// Avian2D physics backend for the platformer controller.
///
/// Ray casts go through Avian's `SpatialQuery`. Collider layers map directly
/// onto the controller's collision masks: a collider is hit when its
/// `CollisionLayers` memberships intersect the mask.
pub struct Avian2dBackend;

impl PlatformerPhysicsBackend for Avian2dBackend {
    fn plugin() -> impl Plugin {
        Avian2dBackendPlugin
    }

    fn get_bounds(world: &World, entity: Entity) -> Option<Rect> {
        let collider = world.get::<Collider>(entity)?;
        // Transform, not Position: the controller anchors bounds to the
        // translation it writes.
        let position = world.get::<Transform>(entity)?.translation.xy();

        let aabb = collider.aabb(position, Rotation::default());
        Some(Rect {
            min: aabb.min,
            max: aabb.max,
        })
    }
}

/// Plugin that sets up Avian2D-specific systems for the platformer controller.
pub struct Avian2dBackendPlugin;

impl Plugin for Avian2dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            avian_move_actors.in_set(PlatformerControllerSet::Movement),
        );
        app.add_systems(
            FixedUpdate,
            avian_move_platforms.in_set(PlatformerControllerSet::Platforms),
        );
    }
}

/// [`RaycastQuery`] over Avian's spatial query pipeline.
struct AvianRaycaster<'a, 'w, 's> {
    spatial_query: &'a SpatialQuery<'w, 's>,
    through: &'a HashSet<Entity>,
}

impl RaycastQuery for AvianRaycaster<'_, '_, '_> {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        filter: RayFilter,
    ) -> Option<RayHit> {
        let dir = Dir2::new(direction).ok()?;
        let max_distance = if max_distance.is_finite() {
            max_distance
        } else {
            f32::MAX
        };
        let query_filter =
            SpatialQueryFilter::from_mask(filter.mask).with_excluded_entities(filter.excluded());

        self.spatial_query
            .cast_ray(origin, dir, max_distance, true, &query_filter)
            .map(|hit| {
                let tag = if self.through.contains(&hit.entity) {
                    SurfaceTag::Through
                } else {
                    SurfaceTag::Solid
                };
                RayHit::new(hit.distance, hit.normal, origin + *dir * hit.distance, Some(hit.entity))
                    .with_tag(tag)
            })
    }
}

/// Move every motor-driven actor through the Avian spatial query.
fn avian_move_actors(
    spatial_query: SpatialQuery,
    through: Query<Entity, With<ThroughPlatform>>,
    time: Res<Time>,
    mut actors: ActorQuery,
) {
    let through: HashSet<Entity> = through.iter().collect();
    let raycaster = AvianRaycaster {
        spatial_query: &spatial_query,
        through: &through,
    };
    drive_actors(&raycaster, &mut actors, &time);
}

/// Advance platforms and carry their passengers through the Avian spatial query.
fn avian_move_platforms(
    spatial_query: SpatialQuery,
    through: Query<Entity, With<ThroughPlatform>>,
    time: Res<Time>,
    mut platforms: PlatformQuery,
    mut passengers: PassengerQuery,
) {
    let through: HashSet<Entity> = through.iter().collect();
    let raycaster = AvianRaycaster {
        spatial_query: &spatial_query,
        through: &through,
    };
    drive_platforms(&raycaster, &mut platforms, &mut passengers, &time);
}
