//! Tuning constants shared by the simulation systems.

/// Seconds a surface contact stays "touching" after the last collision.
pub const COLLISION_SURFACE_DECAY_TIME: f32 = 0.3;

/// Element count at or below which `find` scans linearly even when sorted.
pub const LINEAR_SEARCH_CUTOFF: usize = 16;

/// Velocity components smaller than this are snapped to zero.
pub const VELOCITY_EPSILON: f32 = 0.01;

/// Activation radius meaning "always update, regardless of the camera".
pub const ALWAYS_ACTIVE: f32 = -1.0;

/// Tolerance used when deciding whether a movement delta is zero.
pub const MOVEMENT_EPSILON: f32 = 0.001;

/// Downward pull applied by the default gravity component, in px/s².
pub const DEFAULT_GRAVITY: f32 = -400.0;
pub const DEFAULT_MASS: f32 = 1.0;
pub const DEFAULT_BOUNCINESS: f32 = 0.1;
pub const DEFAULT_INERTIA: f32 = 0.01;
pub const DEFAULT_STATIC_FRICTION: f32 = 0.05;
pub const DEFAULT_DYNAMIC_FRICTION: f32 = 0.1;

/// Width and height of a background tile in world units.
pub const DEFAULT_TILE_SIZE: f32 = 32.0;

/// Longest frame step the simulation will integrate, in seconds.
pub const MAX_FRAME_DELTA: f32 = 0.1;
