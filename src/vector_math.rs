//! Basic vector math helper functions shared by collision and physics.
use glam::Vec2;

use crate::constants::MOVEMENT_EPSILON;

/// Returns `true` when `value` is within [`MOVEMENT_EPSILON`] of `target`.
///
/// # Examples
/// ```
/// use ledge::vector_math::is_close;
/// assert!(is_close(0.0005, 0.0));
/// assert!(!is_close(0.5, 0.0));
/// ```
#[must_use]
pub fn is_close(value: f32, target: f32) -> bool {
    (value - target).abs() <= MOVEMENT_EPSILON
}

/// Sign of `value` as `-1.0`, `0.0` or `1.0`.
///
/// Unlike [`f32::signum`] a zero input yields zero.
#[must_use]
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Returns the unit vector in the direction of `vector`.
///
/// Non-finite or zero vectors normalise to [`Vec2::ZERO`].
///
/// # Examples
///
/// ```
/// use glam::Vec2;
/// use ledge::vec_normalize;
/// let unit = vec_normalize(Vec2::new(3.0, 4.0));
/// assert!((unit.x - 0.6).abs() < 1e-6);
/// assert!((unit.y - 0.8).abs() < 1e-6);
/// assert_eq!(vec_normalize(Vec2::ZERO), Vec2::ZERO);
/// ```
#[must_use]
pub fn vec_normalize(vector: Vec2) -> Vec2 {
    if !vector.is_finite() {
        return Vec2::ZERO;
    }
    vector.try_normalize().unwrap_or(Vec2::ZERO)
}
