//! # `msg_platformer_controller`
//!
//! A ray-cast 2D platformer controller with physics backend abstraction.
//!
//! This crate provides a kinematic, pixel-tight platformer controller that:
//! - Resolves movement against the world by casting rays from a shrunk bounding box
//! - Climbs and descends walkable slopes without losing speed along the surface
//! - Slides down slopes steeper than the walkable threshold
//! - Supports one-way ("through") platforms that can be dropped through
//! - Moves platforms along waypoints and carries or pushes actors in their way
//! - Drives actors with a player-style motor (variable jumps, wall slides, wall jumps)
//! - Abstracts the physics backend (Avian2D and a headless polygon world included)
//!
//! ## Architecture
//!
//! Nothing here is simulated by a rigid-body solver. Every fixed tick:
//! 1. The [`ActorMotor`](motor::ActorMotor) turns input and gravity into a velocity
//! 2. The [`CollisionResolver`](collision::CollisionResolver) clamps `velocity * dt`
//!    against world geometry and writes a fresh [`CollisionStatus`](collision::CollisionStatus)
//! 3. The motor reacts to the contacts (landing, ceilings, sliding)
//! 4. Each [`MovingPlatform`](platform::MovingPlatform) advances and carries its passengers
//!
//! ## System Order
//!
//! Systems run in clearly defined phases using [`PlatformerControllerSet`]:
//!
//! 1. **Preparation** - Initialize new actors and platforms, sync backend geometry
//! 2. **Intent** - Consume jump edges, integrate velocity
//! 3. **Movement** - Resolve and apply each actor's displacement
//! 4. **Response** - React to the new collision status
//! 5. **Platforms** - Move platforms and their passengers
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use msg_platformer_controller::prelude::*;
//!
//! // Create controller components
//! let config = ControllerConfig::player();
//! let motor = ActorMotor::default();
//! let input = DirectionalInput::new();
//!
//! // These can be spawned together with a collider for the chosen backend
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod collision;
pub mod config;
pub mod detection;
pub mod error;
pub mod intent;
pub mod motor;
pub mod platform;
pub mod raycast;
pub mod slope;

// Systems are internal - they're added automatically by the plugin
pub(crate) mod systems;

#[cfg(feature = "avian2d")]
pub mod avian;

/// System sets for platformer controller phases.
///
/// These sets run in `FixedUpdate`, chained in this order:
///
/// 1. **Preparation** - Build resolvers and platforms for new entities, refresh passenger caches
/// 2. **Intent** - Motors consume jump edges and integrate input, gravity and wall sliding
/// 3. **Movement** - Actors resolve `velocity * dt` and move
/// 4. **Response** - Motors react to the contacts of their move
/// 5. **Platforms** - Platforms advance along their waypoints and carry passengers
///
/// Ray casts inside one tick all see the geometry as it was when the tick started.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformerControllerSet {
    /// Phase 1: Initialize new entities and sync backend geometry.
    Preparation,
    /// Phase 2: Turn input into motor velocity.
    Intent,
    /// Phase 3: Move actors through collision resolution.
    Movement,
    /// Phase 4: React to the resulting collision status.
    Response,
    /// Phase 5: Move platforms and their passengers.
    Platforms,
}

pub mod prelude {
    //! Convenient re-exports for common usage.
    //!
    //! ```rust,no_run
    //! use bevy::prelude::*;
    //! use msg_platformer_controller::prelude::*;
    //!
    //! fn spawn_level(mut commands: Commands) {
    //!     commands.spawn((
    //!         Transform::from_xyz(0.0, 0.0, 0.0),
    //!         SegmentCollider::rectangle(40.0, 1.0),
    //!     ));
    //!     commands.spawn((
    //!         Transform::from_xyz(0.0, 2.0, 0.0),
    //!         SegmentCollider::rectangle(1.0, 2.0).with_layers(layers::ACTORS),
    //!         ControllerConfig::player(),
    //!         ActorMotor::default(),
    //!     ));
    //!     commands.spawn((
    //!         Transform::from_xyz(5.0, 3.0, 0.0),
    //!         SegmentCollider::rectangle(3.0, 0.5),
    //!         PlatformConfig::new([Vec2::ZERO, Vec2::new(0.0, 4.0)]),
    //!     ));
    //! }
    //! ```

    pub use crate::PlatformerControllerPlugin;
    pub use crate::PlatformerControllerSet;
    pub use crate::backend::{
        HeadlessBackend, PassengerMover, PlatformerPhysicsBackend, RayFilter, RaycastQuery,
        SegmentCollider, SegmentShape, SegmentWorld,
    };
    pub use crate::collision::{CollisionResolver, CollisionStatus, MoveOutcome, MoveRequest};
    pub use crate::config::{
        layers, CollisionConfig, ConfigurationFailed, ControllerConfig, JumpingConfig,
        PlatformConfig, WalkingConfig, WallJumpingConfig,
    };
    pub use crate::detection::{RayHit, SurfaceTag, ThroughPlatform};
    pub use crate::error::ConfigError;
    pub use crate::intent::{DirectionalInput, JumpRequest};
    pub use crate::motor::ActorMotor;
    pub use crate::platform::MovingPlatform;

    #[cfg(feature = "avian2d")]
    pub use crate::avian::Avian2dBackend;
}

/// Main plugin for the platformer controller.
///
/// This plugin is generic over a physics backend `B`, which supplies collider
/// bounds and the ray casts used by the movement systems.
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Avian2dBackend`)
///
/// # Examples
///
/// Headless, without a physics engine:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use msg_platformer_controller::prelude::*;
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(PlatformerControllerPlugin::<HeadlessBackend>::default())
///     .run();
/// ```
pub struct PlatformerControllerPlugin<B: backend::PlatformerPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::PlatformerPhysicsBackend> Default for PlatformerControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::PlatformerPhysicsBackend> PlatformerControllerPlugin<B> {
    /// Create a new platformer controller plugin.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: backend::PlatformerPhysicsBackend> Plugin for PlatformerControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::ControllerConfig>();
        app.register_type::<config::PlatformConfig>();
        app.register_type::<collision::CollisionStatus>();
        app.register_type::<collision::CollisionResolver>();
        app.register_type::<detection::ThroughPlatform>();
        app.register_type::<intent::DirectionalInput>();
        app.register_type::<intent::JumpRequest>();
        app.register_type::<motor::ActorMotor>();

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.configure_sets(
            FixedUpdate,
            (
                PlatformerControllerSet::Preparation,
                PlatformerControllerSet::Intent,
                PlatformerControllerSet::Movement,
                PlatformerControllerSet::Response,
                PlatformerControllerSet::Platforms,
            )
                .chain(),
        );

        // Phase 1: Preparation
        // Registries are refreshed after init so newly built resolvers are seen
        // by platforms in the same tick.
        app.add_systems(
            FixedUpdate,
            (
                systems::init_collision_resolvers::<B>,
                systems::init_moving_platforms::<B>,
                systems::refresh_passenger_registry,
            )
                .chain()
                .in_set(PlatformerControllerSet::Preparation),
        );

        // Phase 2: Intent
        app.add_systems(
            FixedUpdate,
            systems::update_motor_velocity.in_set(PlatformerControllerSet::Intent),
        );

        // Phase 3 and 5 (Movement, Platforms) are registered by the backend,
        // which owns the ray casts.

        // Phase 4: Response
        app.add_systems(
            FixedUpdate,
            systems::apply_motor_response.in_set(PlatformerControllerSet::Response),
        );
    }
}
