use crate::context::SimContext;
use crate::game_object::{Component, ComponentKind, GameObjectState};
use crate::phase::Phase;
use crate::physics::approach;

/// Steers velocity toward the target velocity and integrates position.
///
/// Each axis with a non-zero acceleration closes on its target by at most
/// `acceleration * dt`; axes without acceleration keep their velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementComponent;

impl Component for MovementComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Movement
    }

    fn phase(&self) -> Phase {
        Phase::Movement
    }

    fn update(&mut self, time_delta: f32, owner: &mut GameObjectState, _: &mut SimContext) {
        let mut velocity = owner.velocity;
        if owner.acceleration.x != 0.0 {
            velocity.x = approach(velocity.x, owner.target_velocity.x, owner.acceleration.x * time_delta);
        }
        if owner.acceleration.y != 0.0 {
            velocity.y = approach(velocity.y, owner.target_velocity.y, owner.acceleration.y * time_delta);
        }
        owner.velocity = velocity;
        owner.position += velocity * time_delta;
    }
}
