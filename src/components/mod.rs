//! Behaviours attached to game objects.
//!
//! Each component runs in one [`Phase`](crate::phase::Phase) and works on
//! its owner's shared [`GameObjectState`](crate::game_object::GameObjectState).

pub mod background_collision;
pub mod dynamic_collision;
pub mod gravity;
pub mod hit_reaction;
pub mod lifetime;
pub mod movement;
pub mod physics;
pub mod render;
pub mod solid_surface;

pub use background_collision::BackgroundCollisionComponent;
pub use dynamic_collision::DynamicCollisionComponent;
pub use gravity::GravityComponent;
pub use hit_reaction::HitReactionComponent;
pub use lifetime::LifetimeComponent;
pub use movement::MovementComponent;
pub use physics::PhysicsComponent;
pub use render::RenderComponent;
pub use solid_surface::SolidSurfaceComponent;
