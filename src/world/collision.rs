//! Ray and box queries against the solid background.
//!
//! The background is a [`TiledWorld`] of tile indices whose geometry comes
//! from a [`CollisionTileSet`]. Grid rows are stored top-down while world Y
//! points up, so a world cell `(column, level)` reads grid row
//! `height - 1 - level`. Objects may also publish temporary surfaces
//! (moving platforms) that live for a single frame.

use glam::Vec2;
use log::trace;

use super::segment::LineSegment;
use super::tiled::TiledWorld;
use super::tiles::CollisionTileSet;
use crate::fixed_array::{CapacityError, FixedSizeArray};
use crate::game_object::GameObjectId;
use crate::numeric::{coord_to_f32, floor_to_i32, tiles_to_f32};

/// Surface a ray or box ran into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec2,
    pub normal: Vec2,
}

/// A surface added for one frame on behalf of an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporarySurface {
    pub segment: LineSegment,
    pub owner: Option<GameObjectId>,
}

/// Background collision queries.
#[derive(Debug, Clone)]
pub struct CollisionSystem {
    world: TiledWorld,
    tiles: CollisionTileSet,
    tile_size: Vec2,
    temporary: FixedSizeArray<TemporarySurface>,
}

impl CollisionSystem {
    #[must_use]
    pub fn new(
        world: TiledWorld,
        tiles: CollisionTileSet,
        tile_size: Vec2,
        max_temporary_surfaces: usize,
    ) -> Self {
        Self {
            world,
            tiles,
            tile_size,
            temporary: FixedSizeArray::new(max_temporary_surfaces),
        }
    }

    #[must_use]
    pub const fn world(&self) -> &TiledWorld {
        &self.world
    }

    #[must_use]
    pub const fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    /// Size of the collision grid in world units.
    #[must_use]
    pub fn extent(&self) -> Vec2 {
        Vec2::new(
            tiles_to_f32(self.world.width()) * self.tile_size.x,
            tiles_to_f32(self.world.height()) * self.tile_size.y,
        )
    }

    /// Drops last frame's temporary surfaces.
    pub fn begin_frame(&mut self) {
        self.temporary.clear();
    }

    /// Adds a surface that lives until the next [`Self::begin_frame`].
    ///
    /// # Errors
    /// Returns [`CapacityError`] when the per-frame surface budget is spent.
    pub fn add_temporary_surface(
        &mut self,
        segment: LineSegment,
        owner: Option<GameObjectId>,
    ) -> Result<(), CapacityError> {
        self.temporary.add(TemporarySurface { segment, owner })
    }

    #[must_use]
    pub fn temporary_surfaces(&self) -> &[TemporarySurface] {
        self.temporary.as_slice()
    }

    /// Closest surface crossed by the ray from `start` to `end`.
    ///
    /// Only surfaces whose normal opposes `filter` are considered; pass
    /// [`Vec2::ZERO`] to accept every surface. Temporary surfaces owned by
    /// `exclude` are ignored.
    #[must_use]
    pub fn cast_ray(
        &self,
        start: Vec2,
        end: Vec2,
        filter: Vec2,
        exclude: Option<GameObjectId>,
    ) -> Option<RayHit> {
        let background = self.cast_through_tiles(start, end, filter);
        let temporary = closest_hit(
            self.temporary
                .iter()
                .filter(|surface| surface.owner.is_none() || surface.owner != exclude)
                .map(|surface| surface.segment),
            start,
            end,
            filter,
        );
        match (background, temporary) {
            (Some(a), Some(b)) => {
                if a.point.distance_squared(start) <= b.point.distance_squared(start) {
                    Some(a)
                } else {
                    Some(b)
                }
            }
            (hit, None) | (None, hit) => hit,
        }
    }

    /// First surface intersecting the box spanning `min..max`.
    #[must_use]
    pub fn test_box(
        &self,
        min: Vec2,
        max: Vec2,
        filter: Vec2,
        exclude: Option<GameObjectId>,
    ) -> Option<RayHit> {
        let (first_column, first_level) = self.cell_of(min);
        let (last_column, last_level) = self.cell_of(max);
        for level in first_level..=last_level {
            for column in first_column..=last_column {
                let tile = self.world.tile(column, self.grid_row(level));
                if tile < 0 {
                    continue;
                }
                let origin = self.cell_origin(column, level);
                let hit = self
                    .tiles
                    .segments(tile)
                    .iter()
                    .map(|segment| segment.translated(origin))
                    .filter(|segment| segment.opposes(filter))
                    .find_map(|segment| box_hit(&segment, min, max));
                if hit.is_some() {
                    return hit;
                }
            }
        }
        self.temporary
            .iter()
            .filter(|surface| surface.owner.is_none() || surface.owner != exclude)
            .filter(|surface| surface.segment.opposes(filter))
            .find_map(|surface| box_hit(&surface.segment, min, max))
    }

    /// Walks the grid cells crossed by the ray in order and returns the
    /// nearest hit inside the first cell that produces one.
    fn cast_through_tiles(&self, start: Vec2, end: Vec2, filter: Vec2) -> Option<RayHit> {
        if self.world.width() == 0 || self.world.height() == 0 {
            return None;
        }
        let direction = end - start;
        let mut cell = self.cell_of(start);
        let end_cell = self.cell_of(end);
        let step = (step_of(direction.x), step_of(direction.y));
        let mut next_boundary = (
            first_boundary(start.x, direction.x, cell.0, self.tile_size.x),
            first_boundary(start.y, direction.y, cell.1, self.tile_size.y),
        );
        let boundary_spacing = (
            spacing(self.tile_size.x, direction.x),
            spacing(self.tile_size.y, direction.y),
        );
        let runs_right = step == (1, 0);
        let mut remaining = (end_cell.0 - cell.0).abs() + (end_cell.1 - cell.1).abs() + 1;

        while remaining > 0 {
            remaining -= 1;
            let tile = self.world.tile(cell.0, self.grid_row(cell.1));
            if tile >= 0 {
                let hit = closest_hit(
                    self.tiles
                        .segments(tile)
                        .iter()
                        .map(|segment| segment.translated(self.cell_origin(cell.0, cell.1))),
                    start,
                    end,
                    filter,
                );
                if hit.is_some() {
                    trace!("ray hit tile {tile} at cell {cell:?}");
                    return hit;
                }
            } else if runs_right {
                let run = i32::try_from(self.world.skip_at(cell.0, self.grid_row(cell.1)))
                    .unwrap_or(1)
                    .max(1);
                if run > 1 {
                    cell.0 += run;
                    remaining -= run - 1;
                    next_boundary.0 += boundary_spacing.0 * coord_to_f32(run);
                    continue;
                }
            }
            if cell == end_cell {
                break;
            }
            if next_boundary.0 < next_boundary.1 {
                if next_boundary.0 > 1.0 {
                    break;
                }
                cell.0 += step.0;
                next_boundary.0 += boundary_spacing.0;
            } else {
                if next_boundary.1 > 1.0 {
                    break;
                }
                cell.1 += step.1;
                next_boundary.1 += boundary_spacing.1;
            }
        }
        None
    }

    /// World cell containing `point`, counted from the bottom-left.
    fn cell_of(&self, point: Vec2) -> (i32, i32) {
        (
            floor_to_i32(point.x / self.tile_size.x),
            floor_to_i32(point.y / self.tile_size.y),
        )
    }

    fn cell_origin(&self, column: i32, level: i32) -> Vec2 {
        Vec2::new(
            coord_to_f32(column) * self.tile_size.x,
            coord_to_f32(level) * self.tile_size.y,
        )
    }

    fn grid_row(&self, level: i32) -> i32 {
        i32::try_from(self.world.height()).unwrap_or(i32::MAX) - 1 - level
    }
}

/// Ray parameter at which the first grid line on one axis is crossed.
fn first_boundary(origin: f32, direction: f32, cell: i32, size: f32) -> f32 {
    if direction > 0.0 {
        (coord_to_f32(cell + 1) * size - origin) / direction
    } else if direction < 0.0 {
        (coord_to_f32(cell) * size - origin) / direction
    } else {
        f32::INFINITY
    }
}

fn step_of(direction: f32) -> i32 {
    if direction > 0.0 {
        1
    } else if direction < 0.0 {
        -1
    } else {
        0
    }
}

fn spacing(size: f32, direction: f32) -> f32 {
    if direction == 0.0 {
        f32::INFINITY
    } else {
        size / direction.abs()
    }
}

fn box_hit(segment: &LineSegment, min: Vec2, max: Vec2) -> Option<RayHit> {
    segment.intersect_box(min, max).map(|point| RayHit {
        point,
        normal: segment.normal,
    })
}

/// Nearest crossing of `start..end` among `segments` that oppose `filter`.
fn closest_hit<I>(segments: I, start: Vec2, end: Vec2, filter: Vec2) -> Option<RayHit>
where
    I: IntoIterator<Item = LineSegment>,
{
    segments
        .into_iter()
        .filter(|segment| segment.opposes(filter))
        .filter_map(|segment| {
            segment.intersection(start, end).map(|point| RayHit {
                point,
                normal: segment.normal,
            })
        })
        .min_by(|a, b| {
            a.point
                .distance_squared(start)
                .total_cmp(&b.point.distance_squared(start))
        })
}
