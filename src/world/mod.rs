//! Static level data and background collision.

pub mod collision;
pub mod level;
pub mod segment;
pub mod tiled;
pub mod tiles;

pub use collision::{CollisionSystem, RayHit, TemporarySurface};
pub use level::{LayerKind, LEVEL_SIGNATURE, Level, LevelBounds, LevelLayer, LevelLoadError, LevelSystem};
pub use segment::LineSegment;
pub use tiled::{TileWorldError, TiledWorld, TILED_WORLD_SIGNATURE};
pub use tiles::{CollisionTileError, CollisionTileSet, COLLISION_TILES_SIGNATURE};
