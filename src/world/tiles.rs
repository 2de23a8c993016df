//! Per-tile collision geometry.
//!
//! Binary layout: signature byte (`52`), tile count byte, then per tile its
//! index byte, a segment count byte, and for every segment six
//! little-endian `f32`: start x/y, end x/y, normal x/y. Coordinates are
//! tile-local with Y pointing up.

use std::io::Read;

use glam::Vec2;
use log::{debug, warn};
use thiserror::Error;

use super::segment::LineSegment;
use crate::numeric::to_index;

/// Leading byte of a serialised [`CollisionTileSet`].
pub const COLLISION_TILES_SIGNATURE: u8 = 52;

#[derive(Debug, Error)]
pub enum CollisionTileError {
    #[error("collision tile signature {found}, expected 52")]
    BadSignature { found: u8 },
    #[error("collision tile stream truncated: {0}")]
    Io(#[from] std::io::Error),
}

/// Segment lists indexed by tile value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionTileSet {
    tiles: Vec<Vec<LineSegment>>,
}

impl CollisionTileSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { tiles: Vec::new() }
    }

    /// Replaces the geometry of tile `index`.
    pub fn set_tile(&mut self, index: usize, segments: Vec<LineSegment>) {
        if self.tiles.len() <= index {
            self.tiles.resize_with(index + 1, Vec::new);
        }
        if let Some(slot) = self.tiles.get_mut(index) {
            *slot = segments;
        }
    }

    /// Geometry of tile `index`; empty for unknown or negative indices.
    #[must_use]
    pub fn segments(&self, index: i32) -> &[LineSegment] {
        to_index(index)
            .and_then(|tile| self.tiles.get(tile))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of tile slots, including ones without geometry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Decodes a tile set from `reader`.
    ///
    /// # Errors
    /// Fails on a wrong signature or a truncated stream.
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, CollisionTileError> {
        let found = read_u8(reader)?;
        if found != COLLISION_TILES_SIGNATURE {
            return Err(CollisionTileError::BadSignature { found });
        }
        let tile_count = read_u8(reader)?;
        let mut set = Self::new();
        for _ in 0..tile_count {
            let index = read_u8(reader)?;
            let segment_count = read_u8(reader)?;
            let mut segments = Vec::with_capacity(usize::from(segment_count));
            for _ in 0..segment_count {
                let start = read_vec2(reader)?;
                let end = read_vec2(reader)?;
                let normal = read_vec2(reader)?;
                if normal == Vec2::ZERO {
                    warn!("collision tile {index} has a segment without a normal");
                }
                segments.push(LineSegment::new(start, end, normal));
            }
            set.set_tile(usize::from(index), segments);
        }
        debug!("loaded {tile_count} collision tiles");
        Ok(set)
    }

    /// Decodes a tile set from an in-memory buffer.
    ///
    /// # Errors
    /// See [`Self::from_reader`].
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self, CollisionTileError> {
        Self::from_reader(&mut bytes)
    }

    /// The four outward-facing edges of a solid `size` square.
    #[must_use]
    pub fn solid_square(size: Vec2) -> Vec<LineSegment> {
        vec![
            LineSegment::new(Vec2::new(0.0, size.y), size, Vec2::Y),
            LineSegment::new(Vec2::ZERO, Vec2::new(size.x, 0.0), Vec2::NEG_Y),
            LineSegment::new(Vec2::ZERO, Vec2::new(0.0, size.y), Vec2::NEG_X),
            LineSegment::new(Vec2::new(size.x, 0.0), size, Vec2::X),
        ]
    }

    /// A 45° slope rising to the right, solid below the diagonal.
    #[must_use]
    pub fn ramp_up(size: Vec2) -> Vec<LineSegment> {
        let slope = Vec2::new(-size.y, size.x).normalize_or_zero();
        vec![
            LineSegment::new(Vec2::ZERO, size, slope),
            LineSegment::new(Vec2::ZERO, Vec2::new(size.x, 0.0), Vec2::NEG_Y),
            LineSegment::new(Vec2::new(size.x, 0.0), size, Vec2::X),
        ]
    }
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, std::io::Error> {
    let mut byte = [0_u8; 1];
    reader.read_exact(&mut byte)?;
    let [value] = byte;
    Ok(value)
}

pub(crate) fn read_f32<R: Read>(reader: &mut R) -> Result<f32, std::io::Error> {
    let mut bytes = [0_u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(f32::from_le_bytes(bytes))
}

fn read_vec2<R: Read>(reader: &mut R) -> Result<Vec2, std::io::Error> {
    Ok(Vec2::new(read_f32(reader)?, read_f32(reader)?))
}
