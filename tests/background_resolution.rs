//! Objects moving against the background through full simulation frames.
use glam::Vec2;
use ledge::components::{
    BackgroundCollisionComponent, GravityComponent, MovementComponent, PhysicsComponent,
};
use ledge::world::LevelBounds;
use ledge::{GameObjectId, Simulation, SimulationConfig};
use rstest::{fixture, rstest};
use test_utils::{background, floored_world, spawn_body, TILE};

const BOX: f32 = 16.0;
const FRAME: f32 = 1.0 / 60.0;

#[fixture]
fn simulation() -> Simulation {
    let mut simulation = Simulation::new(SimulationConfig {
        max_game_objects: 4,
        max_components_per_object: 8,
        ..SimulationConfig::default()
    });
    simulation.set_background(background(floored_world(10, 6)));
    simulation
}

fn falling_body(simulation: &mut Simulation, position: Vec2) -> GameObjectId {
    let objects = simulation.objects_mut();
    let id = spawn_body(objects, position, Vec2::splat(BOX), 1);
    let object = objects.get_mut(id).expect("live");
    object
        .add_component(Box::new(GravityComponent::default()))
        .expect("room");
    object
        .add_component(Box::new(PhysicsComponent::default()))
        .expect("room");
    object.add_component(Box::new(MovementComponent)).expect("room");
    object
        .add_component(Box::new(BackgroundCollisionComponent::new(Vec2::splat(BOX), Vec2::ZERO)))
        .expect("room");
    id
}

#[rstest]
fn dropped_body_comes_to_rest_on_the_floor(mut simulation: Simulation) {
    let id = falling_body(&mut simulation, Vec2::new(64.0, 100.0));
    for _ in 0..180 {
        simulation.step(FRAME);
        let y = simulation.objects().get(id).expect("alive").state().position.y;
        assert!(y >= TILE - 0.01, "body sank into the floor at y = {y}");
    }
    let now = simulation.context().time.game_time();
    let state = simulation.objects().get(id).expect("alive").state();
    assert!(state.position.y < TILE + 4.0);
    assert!(state.touching_ground(now));
}

#[rstest]
fn level_edges_clamp_movement() {
    let mut simulation = Simulation::new(SimulationConfig {
        max_game_objects: 2,
        max_components_per_object: 4,
        ..SimulationConfig::default()
    });
    simulation.set_level(Box::new(LevelBounds::new(100.0, 1000.0)));
    let objects = simulation.objects_mut();
    let id = spawn_body(objects, Vec2::new(60.0, 200.0), Vec2::splat(BOX), 1);
    let object = objects.get_mut(id).expect("live");
    object.state_mut().velocity = Vec2::new(600.0, 0.0);
    object.state_mut().target_velocity = Vec2::new(600.0, 0.0);
    object.add_component(Box::new(MovementComponent)).expect("room");
    object
        .add_component(Box::new(BackgroundCollisionComponent::new(Vec2::splat(BOX), Vec2::ZERO)))
        .expect("room");

    for _ in 0..10 {
        simulation.step(FRAME);
    }

    let state = simulation.objects().get(id).expect("alive").state();
    assert!((state.position.x - (100.0 - BOX)).abs() < 1e-3);
    assert!(state.background_normal.x < 0.0);
}
