mod traits;

pub mod headless;
pub mod segments;

pub use headless::{HeadlessBackend, HeadlessBackendPlugin, SegmentCollider};
pub use segments::{SegmentShape, SegmentWorld};
pub use traits::{PassengerMover, PlatformerPhysicsBackend, RayFilter, RaycastQuery};

#[cfg(feature = "avian2d")]
pub use crate::avian::Avian2dBackend;
