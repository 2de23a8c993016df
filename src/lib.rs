//! Library crate providing the Ledge simulation core.
//!
//! Game objects are bundles of phased components updated each frame by a
//! [`Simulation`]; background collision works against tiled levels and
//! object-to-object hits are found by sweep and prune. Rendering is left to
//! a consumer that reads published frames from a
//! [`FrameExchange`](render::FrameExchange).
pub mod camera;
pub mod collision;
pub mod components;
pub mod config;
pub mod constants;
pub mod context;
pub mod factory;
pub mod fixed_array;
pub mod game_object;
pub mod game_thread;
pub mod logging;
pub mod numeric;
pub mod object_manager;
pub mod phase;
pub mod physics;
pub mod pool;
pub mod render;
pub mod simulation;
pub mod time;
pub mod vector_math;
pub mod world;
pub use constants::*;

// Re-export commonly used items
pub use config::{ConfigError, SimulationConfig};
pub use context::SimContext;
pub use fixed_array::{CapacityError, FixedSizeArray};
pub use game_object::{GameObject, GameObjectId, GameObjectManager, GameObjectState};
pub use game_thread::{GameThread, GameThreadError, ThreadControl};
pub use logging::init as init_logging;
pub use phase::Phase;
pub use simulation::{FrameReport, Simulation};
pub use vector_math::{sign, vec_normalize};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use ledge::prelude::*;
    //! ```

    pub use crate::collision::{CollisionVolume, HitType};
    pub use crate::components::{
        BackgroundCollisionComponent, DynamicCollisionComponent, GravityComponent,
        HitReactionComponent, LifetimeComponent, MovementComponent, PhysicsComponent,
        RenderComponent, SolidSurfaceComponent,
    };
    pub use crate::factory::{BlueprintFactory, GameObjectFactory, SpawnKind};
    pub use crate::game_object::{Component, ComponentKind};
    pub use crate::{GameObject, GameObjectId, Phase, Simulation, SimulationConfig};
    pub use glam::Vec2;
}
