//! Utility helpers for tests.
//!
//! Builders for small worlds, levels and objects shared by the integration
//! tests of the `ledge` crate.

use glam::Vec2;
use ledge::collision::{CollisionVolume, HitType};
use ledge::components::{DynamicCollisionComponent, HitReactionComponent};
use ledge::world::{CollisionSystem, CollisionTileSet, TiledWorld, LEVEL_SIGNATURE};
use ledge::{CapacityError, GameObject, GameObjectId, GameObjectManager};

/// Edge length of the tiles built by this crate.
pub const TILE: f32 = 32.0;

/// Tile index whose geometry is a solid square.
pub const SOLID: i32 = 0;

/// A tile set where [`SOLID`] is a full square of [`TILE`] units.
pub fn solid_tiles() -> CollisionTileSet {
    let mut tiles = CollisionTileSet::new();
    tiles.set_tile(
        usize::try_from(SOLID).unwrap_or_default(),
        CollisionTileSet::solid_square(Vec2::splat(TILE)),
    );
    tiles
}

/// A `width` x `height` grid whose bottom row is solid floor.
pub fn floored_world(width: usize, height: usize) -> TiledWorld {
    let mut world = TiledWorld::new(width, height);
    let floor = i32::try_from(height).unwrap_or(i32::MAX) - 1;
    for column in 0..i32::try_from(width).unwrap_or(0) {
        world.set_tile(column, floor, SOLID);
    }
    world
}

/// Background collision over `world` built from [`solid_tiles`].
pub fn background(world: TiledWorld) -> CollisionSystem {
    CollisionSystem::new(world, solid_tiles(), Vec2::splat(TILE), 16)
}

/// Serialises a tiled world in its binary form.
///
/// # Examples
/// ```
/// let bytes = test_utils::tiled_world_bytes(1, 1, &[5]);
/// assert_eq!(bytes, vec![42, 1, 0, 0, 0, 1, 0, 0, 0, 5]);
/// ```
pub fn tiled_world_bytes(width: i32, height: i32, tiles: &[i8]) -> Vec<u8> {
    let mut bytes = vec![42];
    bytes.extend_from_slice(&width.to_le_bytes());
    bytes.extend_from_slice(&height.to_le_bytes());
    bytes.extend(tiles.iter().map(|tile| tile.to_le_bytes()[0]));
    bytes
}

/// Serialises a level from `(layer type, world)` pairs. The first layer is
/// the background layer.
pub fn level_bytes(layers: &[(u8, &TiledWorld)]) -> Vec<u8> {
    let count = u8::try_from(layers.len()).unwrap_or(u8::MAX);
    let mut bytes = vec![LEVEL_SIGNATURE, count, 0];
    for (kind, world) in layers {
        bytes.extend_from_slice(&[*kind, 0]);
        bytes.extend_from_slice(&1.0_f32.to_le_bytes());
        world.write_to(&mut bytes);
    }
    bytes
}

/// Allocates an object at `position` with the given extent and life and
/// queues it for activation.
///
/// # Panics
/// Panics when the manager has no room; tests size their managers.
pub fn spawn_body(
    objects: &mut GameObjectManager,
    position: Vec2,
    size: Vec2,
    life: u32,
) -> GameObjectId {
    let id = objects.allocate().expect("pool has room");
    let state = objects.get_mut(id).expect("just allocated").state_mut();
    state.position = position;
    state.width = size.x;
    state.height = size.y;
    state.life = life;
    objects.add(id).expect("activation queue has room");
    id
}

/// Gives `object` a box of `size` that attacks with `hit_type`, plus a
/// hit reaction.
///
/// # Errors
/// Fails when the object has no room for two more components.
pub fn make_attacker(object: &mut GameObject, size: Vec2, hit_type: HitType) -> Result<(), CapacityError> {
    object.add_component(Box::new(DynamicCollisionComponent::new(
        vec![CollisionVolume::aabox(Vec2::ZERO, size, hit_type)],
        Vec::new(),
    )))?;
    object.add_component(Box::new(HitReactionComponent::default()))
}

/// Gives `object` a vulnerable box of `size` and a hit reaction.
///
/// # Errors
/// Fails when the object has no room for two more components.
pub fn make_victim(object: &mut GameObject, size: Vec2) -> Result<(), CapacityError> {
    object.add_component(Box::new(DynamicCollisionComponent::new(
        Vec::new(),
        vec![CollisionVolume::aabox(Vec2::ZERO, size, HitType::Invalid)],
    )))?;
    object.add_component(Box::new(HitReactionComponent::default()))
}
