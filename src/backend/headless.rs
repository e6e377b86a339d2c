//! Engine-free backend.
//!
//! Colliders are [`SegmentCollider`] polygons. Every fixed tick they are
//! copied, in world space, into the [`SegmentWorld`] resource, which then
//! answers all controller ray casts. Useful for tests, tools and servers that
//! run without a physics engine.

use bevy::prelude::*;

use crate::backend::segments::{SegmentShape, SegmentWorld};
use crate::backend::PlatformerPhysicsBackend;
use crate::detection::{SurfaceTag, ThroughPlatform};
use crate::systems::{drive_actors, drive_platforms, ActorQuery, PassengerQuery, PlatformQuery};
use crate::PlatformerControllerSet;

/// Collider for the headless backend, in the entity's local space.
#[derive(Component, Debug, Clone)]
#[require(Transform)]
pub struct SegmentCollider {
    /// Shape relative to the entity's translation.
    pub shape: SegmentShape,
}

impl SegmentCollider {
    /// Axis-aligned box centered on the entity.
    pub fn rectangle(width: f32, height: f32) -> Self {
        let half_size = Vec2::new(width, height) * 0.5;
        Self {
            shape: SegmentShape::rectangle(Rect::from_center_half_size(Vec2::ZERO, half_size)),
        }
    }

    /// Convex polygon, vertices relative to the entity.
    pub fn polygon(vertices: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            shape: SegmentShape::polygon(vertices),
        }
    }

    /// Set the collision layers.
    #[must_use]
    pub fn with_layers(mut self, layers: u32) -> Self {
        self.shape = self.shape.with_layers(layers);
        self
    }
}

/// Backend answering ray casts from [`SegmentCollider`] geometry.
pub struct HeadlessBackend;

impl PlatformerPhysicsBackend for HeadlessBackend {
    fn plugin() -> impl Plugin {
        HeadlessBackendPlugin
    }

    fn get_bounds(world: &World, entity: Entity) -> Option<Rect> {
        let collider = world.get::<SegmentCollider>(entity)?;
        let transform = world.get::<Transform>(entity)?;
        Some(collider.shape.translated(transform.translation.truncate()).aabb())
    }
}

/// Plugin that sets up the headless backend systems.
pub struct HeadlessBackendPlugin;

impl Plugin for HeadlessBackendPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SegmentWorld>();

        // Geometry is captured once per tick, before anything moves.
        app.add_systems(
            FixedUpdate,
            sync_segment_world.in_set(PlatformerControllerSet::Preparation),
        );
        app.add_systems(
            FixedUpdate,
            headless_move_actors.in_set(PlatformerControllerSet::Movement),
        );
        app.add_systems(
            FixedUpdate,
            headless_move_platforms.in_set(PlatformerControllerSet::Platforms),
        );
    }
}

/// Rebuild the world-space geometry from every collider.
fn sync_segment_world(
    mut segments: ResMut<SegmentWorld>,
    colliders: Query<(Entity, &SegmentCollider, &Transform, Has<ThroughPlatform>)>,
) {
    segments.clear();
    for (entity, collider, transform, through) in &colliders {
        let tag = if through {
            SurfaceTag::Through
        } else {
            SurfaceTag::Solid
        };
        segments.insert(
            collider
                .shape
                .translated(transform.translation.truncate())
                .with_entity(entity)
                .with_tag(tag),
        );
    }
}

fn headless_move_actors(segments: Res<SegmentWorld>, time: Res<Time>, mut actors: ActorQuery) {
    drive_actors(&*segments, &mut actors, &time);
}

fn headless_move_platforms(
    segments: Res<SegmentWorld>,
    time: Res<Time>,
    mut platforms: PlatformQuery,
    mut passengers: PassengerQuery,
) {
    drive_platforms(&*segments, &mut platforms, &mut passengers, &time);
}
