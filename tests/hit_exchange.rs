//! End-to-end hits between two objects registered in the same frame.
use glam::Vec2;
use ledge::collision::{CollisionVolume, HitType};
use ledge::components::{DynamicCollisionComponent, HitReactionComponent};
use ledge::game_object::ActionType;
use ledge::{GameObjectId, GameObjectManager, Simulation, SimulationConfig};
use rstest::{fixture, rstest};
use test_utils::{make_attacker, make_victim, spawn_body};

#[fixture]
fn simulation() -> Simulation {
    Simulation::new(SimulationConfig {
        max_game_objects: 8,
        max_components_per_object: 4,
        ..SimulationConfig::default()
    })
}

fn pair(objects: &mut GameObjectManager, victim_x: f32) -> (GameObjectId, GameObjectId) {
    let size = Vec2::splat(10.0);
    let attacker = spawn_body(objects, Vec2::ZERO, size, 1);
    let victim = spawn_body(objects, Vec2::new(victim_x, 0.0), size, 3);
    make_attacker(objects.get_mut(attacker).expect("live"), size, HitType::Hit).expect("room");
    make_victim(objects.get_mut(victim).expect("live"), size).expect("room");
    (attacker, victim)
}

#[rstest]
fn overlapping_attack_costs_the_victim_one_life(mut simulation: Simulation) {
    let (attacker, victim) = pair(simulation.objects_mut(), 5.0);

    let report = simulation.step(0.016);

    assert_eq!(report.hits, 1);
    let struck = simulation.objects().get(victim).expect("alive").state();
    assert_eq!(struck.life, 2);
    assert_eq!(struck.action, ActionType::HitReact);
    assert_eq!(struck.last_received_hit, HitType::Hit);
    let striker = simulation.objects().get(attacker).expect("alive").state();
    assert_eq!(striker.life, 1);
}

#[rstest]
fn separated_bounds_produce_no_hits(mut simulation: Simulation) {
    let (_, victim) = pair(simulation.objects_mut(), 50.0);

    let report = simulation.step(0.016);

    assert_eq!(report.hits, 0);
    assert_eq!(simulation.objects().get(victim).expect("alive").state().life, 3);
}

#[rstest]
fn invincible_victims_refuse_the_hit(mut simulation: Simulation) {
    let size = Vec2::splat(10.0);
    let objects = simulation.objects_mut();
    let attacker = spawn_body(objects, Vec2::ZERO, size, 1);
    let victim = spawn_body(objects, Vec2::new(5.0, 0.0), size, 3);
    make_attacker(objects.get_mut(attacker).expect("live"), size, HitType::Hit).expect("room");
    let guarded = objects.get_mut(victim).expect("live");
    guarded
        .add_component(Box::new(DynamicCollisionComponent::new(
            Vec::new(),
            vec![CollisionVolume::aabox(Vec2::ZERO, size, HitType::Hit)],
        )))
        .expect("room");
    let mut reaction = HitReactionComponent::default();
    reaction.invincible = true;
    guarded.add_component(Box::new(reaction)).expect("room");

    let report = simulation.step(0.016);

    assert_eq!(report.hits, 1);
    let untouched = simulation.objects().get(victim).expect("alive").state();
    assert_eq!(untouched.life, 3);
    assert_eq!(untouched.last_received_hit, HitType::Invalid);
}

#[rstest]
fn death_hits_leave_the_victim_lifeless(mut simulation: Simulation) {
    let size = Vec2::splat(10.0);
    let objects = simulation.objects_mut();
    let attacker = spawn_body(objects, Vec2::ZERO, size, 1);
    let victim = spawn_body(objects, Vec2::new(5.0, 0.0), size, 3);
    make_attacker(objects.get_mut(attacker).expect("live"), size, HitType::Death).expect("room");
    make_victim(objects.get_mut(victim).expect("live"), size).expect("room");

    simulation.step(0.016);

    let state = simulation.objects().get(victim).expect("alive").state();
    assert_eq!(state.life, 0);
    assert_eq!(state.action, ActionType::Death);
}
