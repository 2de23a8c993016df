//! Keeps a moving box out of the solid background.
//!
//! Movement is swept with ray casts between last frame's resolved position
//! and this frame's, so fast bodies cannot tunnel through thin walls. The
//! dominant axis is resolved first and each sweep starts from the position
//! the previous one snapped to, which keeps boxes from catching on corners.

use glam::Vec2;
use log::trace;

use crate::context::SimContext;
use crate::game_object::{Component, ComponentKind, GameObjectState};
use crate::phase::Phase;
use crate::vector_math::{is_close, vec_normalize};
use crate::world::{CollisionSystem, LevelSystem};

/// Swept background collision for an axis-aligned box attached to its
/// owner at `offset` from the owner's position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundCollisionComponent {
    size: Vec2,
    offset: Vec2,
    previous_position: Vec2,
}

/// Outcome of resolving one frame of movement.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Contacts {
    horizontal: Vec2,
    vertical: Vec2,
}

impl BackgroundCollisionComponent {
    #[must_use]
    pub const fn new(size: Vec2, offset: Vec2) -> Self {
        Self {
            size,
            offset,
            previous_position: Vec2::ZERO,
        }
    }

    /// Position the next sweep starts from.
    #[must_use]
    pub const fn previous_position(&self) -> Vec2 {
        self.previous_position
    }

    /// Resolves the owner's movement since the last call.
    ///
    /// The first call only records the starting position.
    pub fn resolve(
        &mut self,
        owner: &mut GameObjectState,
        now: f32,
        background: Option<&CollisionSystem>,
        level: Option<&dyn LevelSystem>,
    ) {
        if self.previous_position == Vec2::ZERO {
            self.previous_position = owner.position;
            return;
        }
        let delta = owner.position - self.previous_position;
        let mut position = owner.position;
        let mut contacts = Contacts::default();

        if let Some(world) = background {
            if delta.x.abs() > delta.y.abs() {
                self.sweep_horizontal(world, owner, delta, &mut position, &mut contacts);
                self.sweep_vertical(world, owner, delta, &mut position, &mut contacts);
            } else {
                self.sweep_vertical(world, owner, delta, &mut position, &mut contacts);
                self.sweep_horizontal(world, owner, delta, &mut position, &mut contacts);
            }
        }

        if let Some(bounds) = level {
            self.clamp_to_level(bounds, &mut position, &mut contacts);
        }

        if let Some(world) = background {
            if !is_close(delta.x, 0.0) && !is_close(delta.y, 0.0) {
                self.align(world, owner, delta, &mut position, &mut contacts);
            }
        }

        record_touches(owner, contacts, now);
        owner.background_normal = vec_normalize(contacts.horizontal + contacts.vertical);
        owner.position = position;
        self.previous_position = position;
    }

    fn box_min(&self, position: Vec2) -> Vec2 {
        position + self.offset
    }

    fn box_center(&self, position: Vec2) -> Vec2 {
        self.box_min(position) + self.size * 0.5
    }

    /// Casts from last frame's centre to the current leading vertical edge.
    fn sweep_horizontal(
        &self,
        world: &CollisionSystem,
        owner: &GameObjectState,
        delta: Vec2,
        position: &mut Vec2,
        contacts: &mut Contacts,
    ) {
        if is_close(delta.x, 0.0) {
            return;
        }
        let min = self.box_min(*position);
        let leading_x = if delta.x > 0.0 { min.x + self.size.x } else { min.x };
        let end = Vec2::new(leading_x, self.box_center(*position).y);
        let start = self.box_center(self.previous_position);
        if let Some(hit) = world.cast_ray(start, end, Vec2::new(delta.x, 0.0), owner.id) {
            trace!("horizontal sweep hit at {} normal {}", hit.point, hit.normal);
            position.x = self.snap_x(hit.point.x, delta.x);
            contacts.horizontal = hit.normal;
        }
    }

    /// Casts from last frame's centre to the current leading horizontal edge.
    fn sweep_vertical(
        &self,
        world: &CollisionSystem,
        owner: &GameObjectState,
        delta: Vec2,
        position: &mut Vec2,
        contacts: &mut Contacts,
    ) {
        if is_close(delta.y, 0.0) {
            return;
        }
        let min = self.box_min(*position);
        let leading_y = if delta.y > 0.0 { min.y + self.size.y } else { min.y };
        let end = Vec2::new(self.box_center(*position).x, leading_y);
        let start = self.box_center(self.previous_position);
        if let Some(hit) = world.cast_ray(start, end, Vec2::new(0.0, delta.y), owner.id) {
            trace!("vertical sweep hit at {} normal {}", hit.point, hit.normal);
            position.y = self.snap_y(hit.point.y, delta.y);
            contacts.vertical = hit.normal;
        }
    }

    /// Keeps the box inside `[0, level_width]` and below the level top.
    ///
    /// The level floor is deliberately not enforced; bodies may fall out of
    /// the bottom of the level.
    fn clamp_to_level(&self, bounds: &dyn LevelSystem, position: &mut Vec2, contacts: &mut Contacts) {
        let min = self.box_min(*position);
        let width = bounds.level_width();
        if min.x < 0.0 {
            position.x = -self.offset.x;
            contacts.horizontal = vec_normalize(contacts.horizontal + Vec2::X);
        } else if min.x + self.size.x > width {
            position.x = width - self.size.x - self.offset.x;
            contacts.horizontal = vec_normalize(contacts.horizontal + Vec2::NEG_X);
        }
        let height = bounds.level_height();
        if min.y + self.size.y > height {
            position.y = height - self.size.y - self.offset.y;
            contacts.vertical = vec_normalize(contacts.vertical + Vec2::NEG_Y);
        }
    }

    /// Re-seats a diagonally moving box with one ray per axis running from
    /// its trailing edge to its leading edge, so surfaces the corner sweeps
    /// missed still hold it.
    fn align(
        &self,
        world: &CollisionSystem,
        owner: &GameObjectState,
        delta: Vec2,
        position: &mut Vec2,
        contacts: &mut Contacts,
    ) {
        let center = self.box_center(*position);
        let min = self.box_min(*position);
        let (top, bottom) = (min.y + self.size.y, min.y);
        let (from_y, to_y) = if delta.y > 0.0 { (bottom, top) } else { (top, bottom) };
        if let Some(hit) = world.cast_ray(
            Vec2::new(center.x, from_y),
            Vec2::new(center.x, to_y),
            Vec2::new(0.0, delta.y),
            owner.id,
        ) {
            position.y = self.snap_y(hit.point.y, delta.y);
            contacts.vertical = hit.normal;
        }

        let center_after = self.box_center(*position);
        let min_after = self.box_min(*position);
        let (left, right) = (min_after.x, min_after.x + self.size.x);
        let (from_x, to_x) = if delta.x > 0.0 { (left, right) } else { (right, left) };
        if let Some(hit) = world.cast_ray(
            Vec2::new(from_x, center_after.y),
            Vec2::new(to_x, center_after.y),
            Vec2::new(delta.x, 0.0),
            owner.id,
        ) {
            position.x = self.snap_x(hit.point.x, delta.x);
            contacts.horizontal = hit.normal;
        }
    }

    /// Owner X that puts the leading edge at `edge`.
    fn snap_x(&self, edge: f32, direction: f32) -> f32 {
        if direction > 0.0 {
            edge - self.size.x - self.offset.x
        } else {
            edge - self.offset.x
        }
    }

    /// Owner Y that puts the leading edge at `edge`.
    fn snap_y(&self, edge: f32, direction: f32) -> f32 {
        if direction > 0.0 {
            edge - self.size.y - self.offset.y
        } else {
            edge - self.offset.y
        }
    }
}

fn record_touches(owner: &mut GameObjectState, contacts: Contacts, now: f32) {
    if contacts.horizontal.x > 0.0 {
        owner.last_touched_left_wall = now;
    } else if contacts.horizontal.x < 0.0 {
        owner.last_touched_right_wall = now;
    }
    if contacts.vertical.y > 0.0 {
        owner.last_touched_floor = now;
    } else if contacts.vertical.y < 0.0 {
        owner.last_touched_ceiling = now;
    }
}

impl Component for BackgroundCollisionComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::BackgroundCollision
    }

    fn phase(&self) -> Phase {
        Phase::CollisionResponse
    }

    fn reset(&mut self) {
        self.previous_position = Vec2::ZERO;
    }

    fn update(&mut self, _: f32, owner: &mut GameObjectState, ctx: &mut SimContext) {
        let now = ctx.time.game_time();
        self.resolve(owner, now, ctx.background.as_ref(), ctx.level.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{CollisionTileSet, LevelBounds, LineSegment, TiledWorld};
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    const TILE: f32 = 32.0;

    /// A 10x4 room: solid floor row, solid wall column at x = 9.
    #[fixture]
    fn room() -> CollisionSystem {
        let mut world = TiledWorld::new(10, 4);
        for column in 0..10 {
            world.set_tile(column, 3, 0);
        }
        for row in 0..3 {
            world.set_tile(9, row, 0);
        }
        let mut tiles = CollisionTileSet::new();
        tiles.set_tile(0, CollisionTileSet::solid_square(Vec2::splat(TILE)));
        CollisionSystem::new(world, tiles, Vec2::splat(TILE), 8)
    }

    fn body() -> BackgroundCollisionComponent {
        BackgroundCollisionComponent::new(Vec2::splat(16.0), Vec2::ZERO)
    }

    fn owner_at(position: Vec2) -> GameObjectState {
        GameObjectState {
            position,
            ..GameObjectState::default()
        }
    }

    #[rstest]
    fn first_frame_only_records_position(room: CollisionSystem) {
        let mut collision = body();
        let mut owner = owner_at(Vec2::new(40.0, 10.0));
        collision.resolve(&mut owner, 0.0, Some(&room), None);
        assert_eq!(owner.position, Vec2::new(40.0, 10.0));
        assert_eq!(collision.previous_position(), Vec2::new(40.0, 10.0));
    }

    #[rstest]
    fn falling_body_lands_on_floor(room: CollisionSystem) {
        let mut collision = body();
        let mut owner = owner_at(Vec2::new(40.0, 40.0));
        collision.resolve(&mut owner, 0.0, Some(&room), None);
        owner.position = Vec2::new(40.0, 20.0);
        collision.resolve(&mut owner, 1.0, Some(&room), None);
        assert_relative_eq!(owner.position.y, TILE);
        assert_eq!(owner.background_normal, Vec2::Y);
        assert!(owner.touching_ground(1.1));
    }

    #[rstest]
    fn resting_body_keeps_height_and_ground_contact(room: CollisionSystem) {
        let mut collision = body();
        let mut owner = owner_at(Vec2::new(40.0, 40.0));
        collision.resolve(&mut owner, 0.0, Some(&room), None);
        owner.position.y = 30.0;
        collision.resolve(&mut owner, 1.0, Some(&room), None);
        let rest = owner.position.y;
        for frame in 1..=10 {
            let now = 1.0 + 0.02 * f32::from(u8::try_from(frame).expect("small"));
            collision.resolve(&mut owner, now, Some(&room), None);
            assert_relative_eq!(owner.position.y, rest);
            assert!(owner.touching_ground(now));
        }
    }

    #[rstest]
    fn fast_body_cannot_tunnel_through_wall(room: CollisionSystem) {
        let mut collision = body();
        let mut owner = owner_at(Vec2::new(200.0, 40.0));
        collision.resolve(&mut owner, 0.0, Some(&room), None);
        owner.position.x = 400.0;
        collision.resolve(&mut owner, 1.0, Some(&room), None);
        assert_relative_eq!(owner.position.x, 9.0 * TILE - 16.0);
        assert!(owner.touching_right_wall(1.0));
        assert_eq!(owner.background_normal, Vec2::NEG_X);
    }

    #[rstest]
    #[case::left_edge(Vec2::new(-12.0, 60.0), 0.0, 1.0)]
    #[case::right_edge(Vec2::new(95.0, 60.0), 84.0, -1.0)]
    fn clamps_to_level_width(#[case] target: Vec2, #[case] clamped_x: f32, #[case] normal_sign: f32) {
        let bounds = LevelBounds::new(100.0, 200.0);
        let mut collision = body();
        let mut owner = owner_at(Vec2::new(50.0, 60.0));
        collision.resolve(&mut owner, 0.0, None, Some(&bounds));
        owner.position = target;
        collision.resolve(&mut owner, 1.0, None, Some(&bounds));
        assert_relative_eq!(owner.position.x, clamped_x);
        assert!(owner.background_normal.x * normal_sign > 0.0);
    }

    #[rstest]
    fn level_floor_is_not_enforced() {
        let bounds = LevelBounds::new(100.0, 200.0);
        let mut collision = body();
        let mut owner = owner_at(Vec2::new(50.0, 10.0));
        collision.resolve(&mut owner, 0.0, None, Some(&bounds));
        owner.position.y = -40.0;
        collision.resolve(&mut owner, 1.0, None, Some(&bounds));
        assert_relative_eq!(owner.position.y, -40.0);
    }

    #[rstest]
    fn ceiling_of_level_is_enforced() {
        let bounds = LevelBounds::new(100.0, 100.0);
        let mut collision = body();
        let mut owner = owner_at(Vec2::new(50.0, 70.0));
        collision.resolve(&mut owner, 0.0, None, Some(&bounds));
        owner.position.y = 95.0;
        collision.resolve(&mut owner, 1.0, None, Some(&bounds));
        assert_relative_eq!(owner.position.y, 84.0);
        assert!(owner.touching_ceiling(1.0));
    }

    #[rstest]
    fn diagonal_move_seats_box_on_surface_above_its_centre() {
        let mut tiles = CollisionTileSet::new();
        tiles.set_tile(0, CollisionTileSet::solid_square(Vec2::splat(TILE)));
        let mut shelf = CollisionSystem::new(TiledWorld::new(10, 10), tiles, Vec2::splat(TILE), 4);
        shelf
            .add_temporary_surface(
                LineSegment::new(Vec2::new(0.0, 52.0), Vec2::new(100.0, 52.0), Vec2::Y),
                None,
            )
            .expect("room for one surface");
        let mut collision = body();
        let mut owner = owner_at(Vec2::new(40.0, 40.0));
        collision.resolve(&mut owner, 0.0, Some(&shelf), None);
        owner.position = Vec2::new(42.0, 39.0);
        collision.resolve(&mut owner, 1.0, Some(&shelf), None);
        assert_relative_eq!(owner.position.y, 52.0);
        assert_relative_eq!(owner.position.x, 42.0);
        assert!(owner.touching_ground(1.0));
    }
}
