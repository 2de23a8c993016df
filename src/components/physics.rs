//! Integrates impulses into velocity against the background.
use glam::Vec2;

use crate::constants::{
    DEFAULT_BOUNCINESS, DEFAULT_DYNAMIC_FRICTION, DEFAULT_GRAVITY, DEFAULT_INERTIA, DEFAULT_MASS,
    DEFAULT_STATIC_FRICTION,
};
use crate::context::SimContext;
use crate::game_object::{Component, ComponentKind, GameObjectState};
use crate::phase::Phase;
use crate::physics::{clamp_small_velocity, collision_impulse, friction_coefficient, friction_impulse};

/// Turns the frame's accumulated impulse into velocity.
///
/// Impulses pointing into the last background contact are reflected by
/// `bounciness`, friction slows grounded movement, and results slower than
/// `inertia` leave the owner's velocity untouched unless the impulse
/// stopped it dead. Impulse and
/// acceleration are consumed every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsComponent {
    pub mass: f32,
    pub bounciness: f32,
    pub inertia: f32,
    pub static_friction: f32,
    pub dynamic_friction: f32,
    /// Pull used to derive the normal force for friction.
    pub gravity: f32,
}

impl Default for PhysicsComponent {
    fn default() -> Self {
        Self {
            mass: DEFAULT_MASS,
            bounciness: DEFAULT_BOUNCINESS,
            inertia: DEFAULT_INERTIA,
            static_friction: DEFAULT_STATIC_FRICTION,
            dynamic_friction: DEFAULT_DYNAMIC_FRICTION,
            gravity: DEFAULT_GRAVITY,
        }
    }
}

impl PhysicsComponent {
    /// Applies one frame of integration to `owner` at game time `now`.
    pub fn integrate(&self, time_delta: f32, now: f32, owner: &mut GameObjectState) {
        let velocity = owner.velocity;
        let mut impulse = owner.impulse;

        if owner.background_normal != Vec2::ZERO {
            impulse += collision_impulse(velocity + impulse, owner.background_normal, self.bounciness, self.mass);
        }

        if owner.touching_ground(now) && velocity.y <= 0.0 {
            let sliding = velocity.x + impulse.x;
            if sliding != 0.0 {
                let coefficient = friction_coefficient(velocity.x, self.static_friction, self.dynamic_friction);
                impulse.x += friction_impulse(sliding, coefficient, self.gravity, self.mass, time_delta);
            }
        }

        owner.impulse = Vec2::ZERO;
        let result = clamp_small_velocity(velocity + impulse);
        if result.length() < self.inertia {
            // An impulse that cancels the motion outright still stops the body.
            if result == Vec2::ZERO && impulse != Vec2::ZERO {
                owner.velocity = Vec2::ZERO;
                owner.target_velocity = Vec2::ZERO;
            }
            return;
        }
        owner.velocity = result;
        owner.target_velocity = result;
        owner.acceleration = Vec2::ZERO;
    }
}

impl Component for PhysicsComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Physics
    }

    fn phase(&self) -> Phase {
        Phase::Physics
    }

    fn update(&mut self, time_delta: f32, owner: &mut GameObjectState, ctx: &mut SimContext) {
        self.integrate(time_delta, ctx.time.game_time(), owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn physics() -> PhysicsComponent {
        PhysicsComponent::default()
    }

    #[rstest]
    fn stiction_keeps_slow_bodies_unchanged(physics: PhysicsComponent) {
        let slow = Vec2::new(0.004, 0.0);
        let mut owner = GameObjectState {
            velocity: slow,
            ..GameObjectState::default()
        };
        physics.integrate(0.016, 1.0, &mut owner);
        assert_eq!(owner.velocity, slow);
    }

    #[rstest]
    fn impulse_becomes_velocity_and_target(physics: PhysicsComponent) {
        let mut owner = GameObjectState {
            impulse: Vec2::new(5.0, 2.0),
            acceleration: Vec2::new(1.0, 1.0),
            ..GameObjectState::default()
        };
        physics.integrate(0.016, 1.0, &mut owner);
        assert_eq!(owner.velocity, Vec2::new(5.0, 2.0));
        assert_eq!(owner.target_velocity, owner.velocity);
        assert_eq!(owner.impulse, Vec2::ZERO);
        assert_eq!(owner.acceleration, Vec2::ZERO);
    }

    #[rstest]
    fn landing_reflects_by_bounciness(physics: PhysicsComponent) {
        let mut owner = GameObjectState {
            velocity: Vec2::new(0.0, -100.0),
            background_normal: Vec2::Y,
            ..GameObjectState::default()
        };
        physics.integrate(0.016, 1.0, &mut owner);
        assert_relative_eq!(owner.velocity.y, 100.0 * DEFAULT_BOUNCINESS, epsilon = 1e-3);
    }

    #[rstest]
    fn grounded_sliding_slows_down(physics: PhysicsComponent) {
        let mut owner = GameObjectState {
            velocity: Vec2::new(50.0, 0.0),
            last_touched_floor: 0.9,
            ..GameObjectState::default()
        };
        physics.integrate(0.1, 1.0, &mut owner);
        let friction = DEFAULT_DYNAMIC_FRICTION * DEFAULT_GRAVITY.abs() * DEFAULT_MASS * 0.1;
        assert_relative_eq!(owner.velocity.x, 50.0 - friction, epsilon = 1e-4);
    }

    #[rstest]
    fn friction_brings_slow_sliders_to_rest(physics: PhysicsComponent) {
        let mut owner = GameObjectState {
            velocity: Vec2::new(0.5, 0.0),
            target_velocity: Vec2::new(0.5, 0.0),
            last_touched_floor: 0.9,
            ..GameObjectState::default()
        };
        physics.integrate(0.1, 1.0, &mut owner);
        assert_eq!(owner.velocity, Vec2::ZERO);
        assert_eq!(owner.target_velocity, Vec2::ZERO);
    }

    #[rstest]
    fn airborne_bodies_keep_horizontal_speed(physics: PhysicsComponent) {
        let mut owner = GameObjectState {
            velocity: Vec2::new(50.0, 0.0),
            ..GameObjectState::default()
        };
        physics.integrate(0.1, 1.0, &mut owner);
        assert_relative_eq!(owner.velocity.x, 50.0);
    }
}
