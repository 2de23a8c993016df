//! Grid of tile indices backing background layers and collision.
//!
//! Binary layout: one signature byte (`42`), width and height as
//! little-endian `i32`, then `width * height` signed tile bytes in
//! row-major order. A negative byte marks an empty tile.

use std::io::Read;

use log::debug;
use thiserror::Error;

use crate::numeric::to_index;

/// Leading byte of a serialised [`TiledWorld`].
pub const TILED_WORLD_SIGNATURE: u8 = 42;

/// Upper bound on `width * height` accepted from a stream.
const MAX_TILE_COUNT: usize = 1 << 24;

/// Errors raised while decoding a [`TiledWorld`].
#[derive(Debug, Error)]
pub enum TileWorldError {
    #[error("tiled world signature {found}, expected 42")]
    BadSignature { found: u8 },
    #[error("tiled world dimensions {width}x{height} are invalid")]
    BadDimensions { width: i64, height: i64 },
    #[error("tiled world stream truncated: {0}")]
    Io(#[from] std::io::Error),
}

/// Row-major grid of tile indices.
///
/// Row 0 is the top of the level. After loading, every empty tile holds the
/// negated length of the run of empty tiles that starts at it and extends
/// to the right within its row, so a walker can jump over empty space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiledWorld {
    tiles: Vec<i32>,
    width: usize,
    height: usize,
}

impl TiledWorld {
    /// An empty grid.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let mut world = Self {
            tiles: vec![-1; width * height],
            width,
            height,
        };
        world.calculate_skips();
        world
    }

    /// Builds a grid from row-major tile values.
    ///
    /// # Errors
    /// Returns [`TileWorldError::BadDimensions`] when `tiles` does not hold
    /// exactly `width * height` entries.
    pub fn from_tiles(width: usize, height: usize, tiles: Vec<i32>) -> Result<Self, TileWorldError> {
        if tiles.len() != width * height {
            return Err(TileWorldError::BadDimensions {
                width: i64::try_from(width).unwrap_or(i64::MAX),
                height: i64::try_from(height).unwrap_or(i64::MAX),
            });
        }
        let mut world = Self {
            tiles,
            width,
            height,
        };
        world.calculate_skips();
        Ok(world)
    }

    /// Decodes a grid from `reader`.
    ///
    /// # Errors
    /// Fails on a wrong signature, non-positive or oversized dimensions, or
    /// a stream that ends early.
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, TileWorldError> {
        let mut signature = [0_u8; 1];
        reader.read_exact(&mut signature)?;
        let [found] = signature;
        if found != TILED_WORLD_SIGNATURE {
            return Err(TileWorldError::BadSignature { found });
        }
        let width = read_i32(reader)?;
        let height = read_i32(reader)?;
        let bad_dimensions = || TileWorldError::BadDimensions {
            width: i64::from(width),
            height: i64::from(height),
        };
        let (Some(columns), Some(rows)) = (to_index(width), to_index(height)) else {
            return Err(bad_dimensions());
        };
        let count = columns
            .checked_mul(rows)
            .filter(|count| *count > 0 && *count <= MAX_TILE_COUNT)
            .ok_or_else(bad_dimensions)?;
        let mut bytes = vec![0_u8; count];
        reader.read_exact(&mut bytes)?;
        let tiles = bytes
            .into_iter()
            .map(|byte| i32::from(i8::from_le_bytes([byte])))
            .collect();
        debug!("loaded tiled world {columns}x{rows}");
        Self::from_tiles(columns, rows, tiles)
    }

    /// Decodes a grid from an in-memory buffer.
    ///
    /// # Errors
    /// See [`Self::from_reader`].
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self, TileWorldError> {
        Self::from_reader(&mut bytes)
    }

    /// Serialises the grid, writing empty tiles as `-1`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.push(TILED_WORLD_SIGNATURE);
        for dimension in [self.width, self.height] {
            let value = i32::try_from(dimension).unwrap_or(i32::MAX);
            out.extend_from_slice(&value.to_le_bytes());
        }
        out.extend(self.tiles.iter().map(|tile| {
            let byte = i8::try_from(*tile).ok().filter(|value| *value >= 0).unwrap_or(-1);
            byte.to_le_bytes()[0]
        }));
    }

    /// Raw tile value at `(x, y)`; `-1` outside the grid.
    ///
    /// Negative values are empty tiles carrying their skip count.
    #[must_use]
    pub fn tile(&self, x: i32, y: i32) -> i32 {
        self.offset(x, y)
            .and_then(|offset| self.tiles.get(offset))
            .copied()
            .unwrap_or(-1)
    }

    /// Whether the tile at `(x, y)` holds a real tile index.
    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.tile(x, y) >= 0
    }

    /// Number of consecutive empty tiles starting at `(x, y)` and running
    /// right; zero for an occupied tile.
    #[must_use]
    pub fn skip_at(&self, x: i32, y: i32) -> usize {
        let tile = self.tile(x, y);
        if tile < 0 {
            usize::try_from(tile.unsigned_abs()).unwrap_or(0)
        } else {
            0
        }
    }

    /// Overwrites one tile and refreshes the skip counts of its row.
    pub fn set_tile(&mut self, x: i32, y: i32, value: i32) {
        if let Some(slot) = self.offset(x, y).and_then(|offset| self.tiles.get_mut(offset)) {
            *slot = value;
            if let Some(row) = to_index(y) {
                self.calculate_row_skips(row);
            }
        }
    }

    /// Recomputes the empty-run lengths for every row.
    pub fn calculate_skips(&mut self) {
        for row in 0..self.height {
            self.calculate_row_skips(row);
        }
    }

    fn calculate_row_skips(&mut self, row: usize) {
        let start = row * self.width;
        let Some(cells) = self.tiles.get_mut(start..start + self.width) else {
            return;
        };
        let mut run = 0;
        for cell in cells.iter_mut().rev() {
            if *cell < 0 {
                run += 1;
                *cell = -run;
            } else {
                run = 0;
            }
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        let column = to_index(x).filter(|column| *column < self.width)?;
        let row = to_index(y).filter(|row| *row < self.height)?;
        Some(row * self.width + column)
    }
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, std::io::Error> {
    let mut bytes = [0_u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(i32::from_le_bytes(bytes))
}
