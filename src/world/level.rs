//! Level files and the level bounds collaborator.
//!
//! Binary layout: signature byte (`96`), layer count byte, background layer
//! index byte, then per layer its type byte (0 background, 1 collision,
//! 2 object spawns, 3 hot spots), tile-set index byte, a little-endian
//! `f32` scroll speed and a serialised [`TiledWorld`].

use std::io::Read;
use std::path::Path;

use glam::Vec2;
use log::{debug, info};
use thiserror::Error;

use super::tiled::{TileWorldError, TiledWorld};
use super::tiles::read_f32;
use crate::factory::{GameObjectFactory, SpawnKind};
use crate::game_object::GameObjectManager;
use crate::numeric::{floor_to_i32, tiles_to_f32};

/// Leading byte of a level file.
pub const LEVEL_SIGNATURE: u8 = 96;

/// Level dimensions and static lookups used by the simulation.
pub trait LevelSystem: Send + std::fmt::Debug {
    /// Width of the playable area in world units.
    fn level_width(&self) -> f32;

    /// Height of the playable area in world units.
    fn level_height(&self) -> f32;

    /// Hot-spot tile under `point`, if any.
    fn hot_spot(&self, point: Vec2) -> Option<i32> {
        let _ = point;
        None
    }
}

/// Bare level dimensions, for simulations without a level file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelBounds {
    pub width: f32,
    pub height: f32,
}

impl LevelBounds {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl LevelSystem for LevelBounds {
    fn level_width(&self) -> f32 {
        self.width
    }

    fn level_height(&self) -> f32 {
        self.height
    }
}

#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error("level signature {found}, expected 96")]
    BadSignature { found: u8 },
    #[error("level layer {layer} has unknown type {found}")]
    UnknownLayerType { layer: usize, found: u8 },
    #[error("level layer {layer}: {source}")]
    Layer {
        layer: usize,
        #[source]
        source: TileWorldError,
    },
    #[error("level stream truncated: {0}")]
    Io(#[from] std::io::Error),
}

/// What a layer's tiles mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Background,
    Collision,
    Objects,
    HotSpots,
}

impl LayerKind {
    const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Background),
            1 => Some(Self::Collision),
            2 => Some(Self::Objects),
            3 => Some(Self::HotSpots),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelLayer {
    pub kind: LayerKind,
    pub tile_set: u8,
    pub scroll_speed: f32,
    pub world: TiledWorld,
}

/// A decoded level.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    layers: Vec<LevelLayer>,
    background_index: usize,
    tile_size: Vec2,
}

impl Level {
    /// Decodes a level whose tiles are `tile_size` world units.
    ///
    /// # Errors
    /// Fails on a wrong signature, an unknown layer type, a malformed
    /// layer grid or a truncated stream.
    pub fn from_reader<R: Read>(reader: &mut R, tile_size: Vec2) -> Result<Self, LevelLoadError> {
        let mut header = [0_u8; 3];
        reader.read_exact(&mut header)?;
        let [found, layer_count, background_index] = header;
        if found != LEVEL_SIGNATURE {
            return Err(LevelLoadError::BadSignature { found });
        }
        let mut layers = Vec::with_capacity(usize::from(layer_count));
        for layer in 0..usize::from(layer_count) {
            let mut layer_header = [0_u8; 2];
            reader.read_exact(&mut layer_header)?;
            let [kind_byte, tile_set] = layer_header;
            let kind = LayerKind::from_byte(kind_byte).ok_or(LevelLoadError::UnknownLayerType {
                layer,
                found: kind_byte,
            })?;
            let scroll_speed = read_f32(reader)?;
            let world = TiledWorld::from_reader(reader)
                .map_err(|source| LevelLoadError::Layer { layer, source })?;
            debug!(
                "level layer {layer}: {kind:?} {}x{} scroll {scroll_speed}",
                world.width(),
                world.height()
            );
            layers.push(LevelLayer {
                kind,
                tile_set,
                scroll_speed,
                world,
            });
        }
        let level = Self {
            layers,
            background_index: usize::from(background_index),
            tile_size,
        };
        info!(
            "level loaded: {} layers, {}x{} world units",
            level.layers.len(),
            level.level_width(),
            level.level_height()
        );
        Ok(level)
    }

    /// Decodes a level from an in-memory buffer.
    ///
    /// # Errors
    /// See [`Self::from_reader`].
    pub fn from_bytes(mut bytes: &[u8], tile_size: Vec2) -> Result<Self, LevelLoadError> {
        Self::from_reader(&mut bytes, tile_size)
    }

    /// Reads and decodes the level file at `path`.
    ///
    /// # Errors
    /// See [`Self::from_reader`]; opening the file may also fail.
    pub fn from_path(path: &Path, tile_size: Vec2) -> Result<Self, LevelLoadError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, tile_size)
    }

    #[must_use]
    pub fn layers(&self) -> &[LevelLayer] {
        &self.layers
    }

    #[must_use]
    pub const fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    fn layer(&self, kind: LayerKind) -> Option<&TiledWorld> {
        self.layers
            .iter()
            .find(|layer| layer.kind == kind)
            .map(|layer| &layer.world)
    }

    /// Grid used for background collision.
    #[must_use]
    pub fn collision_world(&self) -> Option<&TiledWorld> {
        self.layer(LayerKind::Collision)
    }

    /// Grid of object spawn markers.
    #[must_use]
    pub fn object_world(&self) -> Option<&TiledWorld> {
        self.layer(LayerKind::Objects)
    }

    /// The layer that defines the level's size: the background layer named
    /// in the header, else the collision layer.
    fn main_world(&self) -> Option<&TiledWorld> {
        self.layers
            .get(self.background_index)
            .map(|layer| &layer.world)
            .or_else(|| self.collision_world())
    }

    /// Spawn markers as object kinds and their world positions.
    ///
    /// The position is the bottom-left corner of the marker tile.
    pub fn spawn_points(&self) -> impl Iterator<Item = (SpawnKind, Vec2)> + '_ {
        let tile_size = self.tile_size;
        self.object_world().into_iter().flat_map(move |world| {
            let height = world.height();
            (0..height).flat_map(move |row| {
                (0..world.width()).filter_map(move |column| {
                    let x = i32::try_from(column).ok()?;
                    let y = i32::try_from(row).ok()?;
                    let kind = u16::try_from(world.tile(x, y)).ok()?;
                    let level = height - 1 - row;
                    Some((
                        SpawnKind(kind),
                        Vec2::new(
                            tiles_to_f32(column) * tile_size.x,
                            tiles_to_f32(level) * tile_size.y,
                        ),
                    ))
                })
            })
        })
    }

    /// Spawns every marker in the object layer through `factory`.
    /// Returns how many objects were created.
    pub fn spawn_objects(
        &self,
        factory: &mut dyn GameObjectFactory,
        objects: &mut GameObjectManager,
    ) -> usize {
        let spawned = self
            .spawn_points()
            .filter_map(|(kind, position)| factory.spawn(kind, position, false, objects))
            .count();
        info!("spawned {spawned} level objects");
        spawned
    }
}

impl LevelSystem for Level {
    fn level_width(&self) -> f32 {
        self.main_world()
            .map_or(0.0, |world| tiles_to_f32(world.width()) * self.tile_size.x)
    }

    fn level_height(&self) -> f32 {
        self.main_world()
            .map_or(0.0, |world| tiles_to_f32(world.height()) * self.tile_size.y)
    }

    fn hot_spot(&self, point: Vec2) -> Option<i32> {
        let world = self.layer(LayerKind::HotSpots)?;
        let column = floor_to_i32(point.x / self.tile_size.x);
        let level = floor_to_i32(point.y / self.tile_size.y);
        let height = i32::try_from(world.height()).ok()?;
        let tile = world.tile(column, height - 1 - level);
        (tile >= 0).then_some(tile)
    }
}
