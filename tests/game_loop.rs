//! Loading a level and running it, on the caller's thread and on the game
//! thread, with a renderer draining published frames.
use std::thread;

use glam::Vec2;
use ledge::components::{
    BackgroundCollisionComponent, GravityComponent, MovementComponent, PhysicsComponent,
    RenderComponent,
};
use ledge::factory::{BlueprintFactory, SpawnKind};
use ledge::render::DrawableId;
use ledge::world::{Level, TiledWorld};
use ledge::{CapacityError, GameObject, GameThread, Simulation, SimulationConfig};
use rstest::{fixture, rstest};
use test_utils::{floored_world, level_bytes, solid_tiles, TILE};

const CRATE: SpawnKind = SpawnKind(1);
const SPRITE: DrawableId = DrawableId(9);
const BOX: f32 = 16.0;

fn falling_crate(object: &mut GameObject) -> Result<(), CapacityError> {
    let state = object.state_mut();
    state.width = BOX;
    state.height = BOX;
    state.life = 1;
    object.add_component(Box::new(GravityComponent::default()))?;
    object.add_component(Box::new(PhysicsComponent::default()))?;
    object.add_component(Box::new(MovementComponent))?;
    object.add_component(Box::new(BackgroundCollisionComponent::new(
        Vec2::splat(BOX),
        Vec2::ZERO,
    )))?;
    object.add_component(Box::new(RenderComponent::new(SPRITE, 1)))
}

/// A 3x3 level with a solid bottom row and one crate marker in the top
/// row.
fn crate_level() -> Level {
    let background = TiledWorld::new(3, 3);
    let collision = floored_world(3, 3);
    let mut markers = TiledWorld::new(3, 3);
    markers.set_tile(1, 0, i32::from(CRATE.0));
    Level::from_bytes(
        &level_bytes(&[(0, &background), (1, &collision), (2, &markers)]),
        Vec2::splat(TILE),
    )
    .expect("valid level")
}

#[fixture]
fn simulation() -> Simulation {
    let mut simulation = Simulation::new(SimulationConfig {
        max_game_objects: 8,
        max_components_per_object: 8,
        target_frame_time: 0.0,
        ..SimulationConfig::default()
    });
    let mut factory = BlueprintFactory::default();
    factory.register(CRATE, falling_crate);
    simulation.set_factory(Box::new(factory));
    simulation
}

#[rstest]
fn level_markers_spawn_and_settle(mut simulation: Simulation) {
    assert_eq!(simulation.load_level(crate_level(), solid_tiles()), 1);

    let mut report = simulation.step(1.0 / 60.0);
    assert_eq!(report.active_objects, 1);
    for _ in 0..120 {
        report = simulation.step(1.0 / 60.0);
    }

    assert_eq!(report.active_objects, 1);
    let id = simulation.objects().active_ids().next().expect("crate is active");
    let position = simulation.objects().get(id).expect("alive").state().position;
    assert!((position.x - TILE).abs() < 1e-3);
    assert!(position.y >= TILE - 0.01 && position.y < TILE + 4.0);
}

#[rstest]
fn each_step_publishes_the_visible_draw_calls(mut simulation: Simulation) {
    simulation.load_level(crate_level(), solid_tiles());
    let exchange = simulation.enable_rendering();

    simulation.step(1.0 / 60.0);
    let frame = exchange.try_take_frame().expect("frame published");
    assert_eq!(frame.number, 1);
    assert_eq!(frame.queue.len(), 1);
    assert_eq!(frame.queue.elements().first().map(|e| e.drawable), Some(SPRITE));
    exchange.recycle(frame.queue);

    simulation.step(1.0 / 60.0);
    simulation.step(1.0 / 60.0);
    let latest = exchange.try_take_frame().expect("frame published");
    assert_eq!(latest.number, 3);
    assert!(exchange.try_take_frame().is_none());
}

#[rstest]
fn game_thread_feeds_a_renderer_until_shutdown(mut simulation: Simulation) {
    simulation.load_level(crate_level(), solid_tiles());
    let exchange = simulation.enable_rendering();
    let renderer = thread::spawn(move || {
        let mut newest = 0;
        while let Some(frame) = exchange.wait_for_frame() {
            assert!(frame.number > newest, "frames arrive in order");
            newest = frame.number;
            exchange.recycle(frame.queue);
        }
        newest
    });

    let game = GameThread::spawn(simulation, Some(5)).expect("thread starts");
    let finished = game.join().expect("loop ends cleanly");

    assert_eq!(finished.frame(), 5);
    assert_eq!(finished.objects().active_count(), 0);
    let newest = renderer.join().expect("renderer ends");
    assert!((1..=5).contains(&newest));
}
