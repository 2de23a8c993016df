//! Collision volumes and hit detection between game objects.

pub mod system;
pub mod volume;

pub use system::{GameObjectCollisionSystem, HitReactionDispatcher};
pub use volume::{bounding_box, CollisionVolume, FlipInfo, HitType, VolumeShape};
