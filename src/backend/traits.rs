//! Physics backend abstraction.
//!
//! The controller never talks to a physics engine directly. It needs three
//! narrow capabilities, each expressed as a trait here:
//!
//! - [`RaycastQuery`]: nearest-hit ray casts against filtered world geometry.
//! - [`PassengerMover`]: moving a carried actor and translating a platform.
//! - [`PlatformerPhysicsBackend`]: the engine glue (plugin and collider bounds).
//!
//! This allows easy swapping between physics engines (Avian2D, the headless
//! segment world, custom, etc.).

use bevy::prelude::*;

use crate::detection::RayHit;

/// Layer mask and exclusions for a single ray cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayFilter {
    /// Only colliders whose layers intersect this mask are hit.
    pub mask: u32,
    /// Entity ignored by the cast, usually the caster itself.
    pub exclude: Option<Entity>,
    /// Platform currently carrying the caster, also ignored.
    pub carrier: Option<Entity>,
}

impl RayFilter {
    /// Filter on a layer mask only.
    pub fn new(mask: u32) -> Self {
        Self {
            mask,
            exclude: None,
            carrier: None,
        }
    }

    /// Ignore `entity`.
    #[must_use]
    pub fn excluding(mut self, entity: Option<Entity>) -> Self {
        self.exclude = entity;
        self
    }

    /// Ignore the platform carrying the caster.
    ///
    /// Ray casts may still see the platform where it stood before this tick's
    /// translation.
    #[must_use]
    pub fn carried_by(mut self, platform: Option<Entity>) -> Self {
        self.carrier = platform;
        self
    }

    /// Whether a collider owned by `entity` passes the exclusions.
    pub fn allows(&self, entity: Option<Entity>) -> bool {
        entity.is_none() || (entity != self.exclude && entity != self.carrier)
    }

    /// Excluded entities.
    pub fn excluded(&self) -> impl Iterator<Item = Entity> {
        self.exclude.into_iter().chain(self.carrier)
    }
}

/// Nearest-hit ray casts against the world.
///
/// Implementations must report a hit at distance zero when the ray starts inside
/// a collider; the sweeps rely on that to skip self-overlapping geometry.
pub trait RaycastQuery {
    /// Cast a ray and return the closest hit within `max_distance`.
    ///
    /// `direction` is axis-aligned and unit length for every cast the
    /// controller performs. `max_distance` may be `f32::INFINITY`.
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        filter: RayFilter,
    ) -> Option<RayHit>;
}

/// Moves actors carried by a platform and the platform itself.
pub trait PassengerMover {
    /// Run `passenger` through its own collision resolution with `displacement`.
    ///
    /// Returns `false` when the entity is not a controllable actor.
    fn move_passenger(
        &mut self,
        passenger: Entity,
        displacement: Vec2,
        standing_on_platform: bool,
    ) -> bool;

    /// Apply the platform's own translation for this tick.
    fn translate_platform(&mut self, displacement: Vec2);
}

/// Trait for physics backend implementations.
///
/// Implement this trait to integrate a physics engine with the controller.
/// The backend's plugin registers the systems that need engine-specific ray
/// casts (actor movement and platform transport) in the matching
/// [`PlatformerControllerSet`](crate::PlatformerControllerSet) phases.
pub trait PlatformerPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// World-space bounding box of an entity's collider.
    ///
    /// Returns `None` while the collider is not available yet; initialization
    /// is retried on the next tick.
    fn get_bounds(world: &World, entity: Entity) -> Option<Rect>;
}
