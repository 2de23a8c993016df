//! Physics helper functions.
//!
//! Pure calculations behind the physics integrator. They work on plain
//! vectors so they can be tested without building a game object.

use glam::Vec2;

use crate::constants::VELOCITY_EPSILON;
use crate::vector_math::{is_close, sign};

/// Smallest acceptable mass to avoid numerically unstable responses.
const MIN_MASS: f32 = 1e-6;

/// Velocity change that resolves a collision against a static surface.
///
/// `velocity` is the body's velocity including pending impulse, `normal`
/// the surface normal and `bounciness` the coefficient of restitution.
/// Returns zero when the body is already separating from the surface or
/// when `mass` is effectively zero.
///
/// # Examples
///
/// ```
/// use glam::Vec2;
/// use ledge::physics::collision_impulse;
///
/// let landing = collision_impulse(Vec2::new(0.0, -10.0), Vec2::Y, 0.5, 1.0);
/// assert!((landing.y - 15.0).abs() < 1e-5);
/// assert_eq!(collision_impulse(Vec2::new(0.0, 10.0), Vec2::Y, 0.5, 1.0), Vec2::ZERO);
/// ```
#[must_use]
pub fn collision_impulse(velocity: Vec2, normal: Vec2, bounciness: f32, mass: f32) -> Vec2 {
    let Some(unit) = normal.try_normalize() else {
        return Vec2::ZERO;
    };
    let approach = velocity.dot(unit);
    if approach >= 0.0 || mass <= MIN_MASS {
        return Vec2::ZERO;
    }
    // A static surface has infinite mass, leaving only our own mass term.
    let magnitude = -(1.0 + bounciness) * approach / (1.0 / mass);
    unit * (magnitude / mass)
}

/// Horizontal velocity change friction applies to `horizontal_velocity`.
///
/// The friction force is `coefficient` times the normal force
/// `|gravity| * mass`, integrated over `time_delta`; it never reverses the
/// direction of travel.
///
/// # Examples
///
/// ```
/// use ledge::physics::friction_impulse;
///
/// // Strong friction stops slow movement dead.
/// assert!((friction_impulse(2.0, 0.5, 400.0, 1.0, 0.1) + 2.0).abs() < 1e-6);
/// // Weak friction only slows fast movement.
/// assert!((friction_impulse(-50.0, 0.1, 400.0, 1.0, 0.1) - 4.0).abs() < 1e-4);
/// ```
#[must_use]
pub fn friction_impulse(
    horizontal_velocity: f32,
    coefficient: f32,
    gravity: f32,
    mass: f32,
    time_delta: f32,
) -> f32 {
    let friction = coefficient * gravity.abs() * mass * time_delta;
    if horizontal_velocity.abs() <= friction {
        -horizontal_velocity
    } else {
        -sign(horizontal_velocity) * friction
    }
}

/// Zeroes velocity components smaller than [`VELOCITY_EPSILON`].
#[must_use]
pub fn clamp_small_velocity(velocity: Vec2) -> Vec2 {
    let snap = |component: f32| {
        if component.abs() < VELOCITY_EPSILON {
            0.0
        } else {
            component
        }
    };
    Vec2::new(snap(velocity.x), snap(velocity.y))
}

/// Friction coefficient for a body currently moving at
/// `horizontal_velocity`: dynamic while sliding, static from rest.
#[must_use]
pub fn friction_coefficient(horizontal_velocity: f32, static_friction: f32, dynamic_friction: f32) -> f32 {
    if is_close(horizontal_velocity, 0.0) {
        static_friction
    } else {
        dynamic_friction
    }
}

/// Moves `current` toward `target` by at most `step`.
#[must_use]
pub fn approach(current: f32, target: f32, step: f32) -> f32 {
    let step_size = step.abs();
    if current < target {
        (current + step_size).min(target)
    } else {
        (current - step_size).max(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    fn inelastic_landing_stops_vertical_motion() {
        let impulse = collision_impulse(Vec2::new(3.0, -8.0), Vec2::Y, 0.0, 2.0);
        assert_relative_eq!(impulse.y, 8.0);
        assert_relative_eq!(impulse.x, 0.0);
    }

    #[rstest]
    fn slanted_normal_is_normalised() {
        let impulse = collision_impulse(Vec2::new(0.0, -10.0), Vec2::new(1.0, 1.0), 0.0, 1.0);
        assert_relative_eq!(impulse.x, 5.0, epsilon = 1e-5);
        assert_relative_eq!(impulse.y, 5.0, epsilon = 1e-5);
    }

    #[rstest]
    #[case::zero_normal(Vec2::ZERO, 1.0)]
    #[case::massless(Vec2::Y, 0.0)]
    fn degenerate_collisions_do_nothing(#[case] normal: Vec2, #[case] mass: f32) {
        assert_eq!(collision_impulse(Vec2::new(0.0, -5.0), normal, 0.1, mass), Vec2::ZERO);
    }

    #[rstest]
    #[case(0.005, 0.0)]
    #[case(-0.009, 0.0)]
    #[case(0.02, 0.02)]
    fn tiny_components_snap_to_zero(#[case] input: f32, #[case] expected: f32) {
        let clamped = clamp_small_velocity(Vec2::new(input, input));
        assert_relative_eq!(clamped.x, expected);
        assert_relative_eq!(clamped.y, expected);
    }

    #[rstest]
    #[case::rest(0.0, 0.05)]
    #[case::sliding(3.0, 0.1)]
    fn coefficient_depends_on_motion(#[case] velocity: f32, #[case] expected: f32) {
        assert_relative_eq!(friction_coefficient(velocity, 0.05, 0.1), expected);
    }

    #[rstest]
    #[case::rising(0.0, 10.0, 3.0, 3.0)]
    #[case::arrives(9.0, 10.0, 3.0, 10.0)]
    #[case::falling(10.0, 0.0, 4.0, 6.0)]
    fn approach_never_overshoots(#[case] current: f32, #[case] target: f32, #[case] step: f32, #[case] expected: f32) {
        assert_relative_eq!(approach(current, target, step), expected);
    }
}
