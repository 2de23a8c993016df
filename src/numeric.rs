//! Numeric conversion helpers used across the project.
//!
//! Tile grids are indexed with integers while the world lives in `f32`
//! space. These helpers keep the casts in one place.

/// Floor `value` and clamp it into the `i32` domain. `NaN` maps to zero.
#[expect(
    clippy::cast_possible_truncation,
    reason = "The value is clamped to the i32 bounds before casting."
)]
#[must_use]
pub fn floor_to_i32(value: f32) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let floored = f64::from(value).floor();
    floored.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Convert a tile count or index into world units.
#[expect(
    clippy::cast_precision_loss,
    reason = "Tile grids are far smaller than f32's exact integer range."
)]
#[must_use]
pub fn tiles_to_f32(value: usize) -> f32 {
    value as f32
}

/// Convert an `i32` grid coordinate into world units.
#[expect(
    clippy::cast_precision_loss,
    reason = "Grid coordinates stay well inside f32's exact integer range."
)]
#[must_use]
pub fn coord_to_f32(value: i32) -> f32 {
    value as f32
}

/// Convert a signed grid coordinate into an index, rejecting negatives.
#[must_use]
pub fn to_index(value: i32) -> Option<usize> {
    usize::try_from(value).ok()
}
