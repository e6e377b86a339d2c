//! Controller configuration components.
//!
//! Each concern lives in its own struct; [`ControllerConfig`] aggregates the
//! ones an actor needs and [`PlatformConfig`] describes a moving platform.

use bevy::prelude::*;

use crate::collision::CollisionStatus;
use crate::error::ConfigError;

mod collision;
mod jumping;
mod platform;
mod walking;
mod wall_jumping;

pub use collision::CollisionConfig;
pub use jumping::JumpingConfig;
pub use platform::PlatformConfig;
pub use walking::WalkingConfig;
pub use wall_jumping::WallJumpingConfig;

/// Collision layer bits used by the default configuration.
pub mod layers {
    /// Static and moving level geometry. Also the default membership of
    /// colliders that declare no layers.
    pub const WORLD: u32 = 1 << 0;
    /// Actors that can be carried or pushed by platforms.
    pub const ACTORS: u32 = 1 << 1;
}

/// Configuration for a platformer actor.
///
/// Spawning this with a box collider is enough for the actor to be carried by
/// platforms. Add an [`ActorMotor`](crate::motor::ActorMotor) for it to move on
/// its own.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
#[require(CollisionStatus, Transform)]
pub struct ControllerConfig {
    /// Ray-cast collision resolution.
    pub collision: CollisionConfig,
    /// Horizontal movement.
    pub walking: WalkingConfig,
    /// Jump arcs and gravity.
    pub jumping: JumpingConfig,
    /// Wall sliding and wall jumps.
    pub wall_jumping: WallJumpingConfig,
}

impl ControllerConfig {
    /// Default configuration for a player character.
    pub fn player() -> Self {
        Self::default()
    }

    /// Set the layers that block this actor.
    #[must_use]
    pub fn with_collision_mask(mut self, mask: u32) -> Self {
        self.collision.collision_mask = mask;
        self
    }

    /// Set the steepest walkable slope in degrees.
    #[must_use]
    pub fn with_max_slope_angle(mut self, degrees: f32) -> Self {
        self.collision.max_slope_angle = degrees;
        self
    }
}

/// Marks an entity whose configuration was rejected at initialization.
///
/// The entity is skipped by every controller system until the marker is removed.
#[derive(Component, Debug, Clone)]
pub struct ConfigurationFailed(pub ConfigError);
