use glam::Vec2;
use ledge::vec_normalize;
use ledge::vector_math::sign;

#[test]
fn normalize_returns_zero_for_nan() {
    let result = vec_normalize(Vec2::new(f32::NAN, 1.0));
    assert_eq!(result, Vec2::ZERO);
}

#[test]
fn normalize_returns_normalized_vector() {
    let result = vec_normalize(Vec2::new(3.0, 0.0));
    assert_eq!(result, Vec2::X);
}

#[test]
fn sign_of_zero_is_zero() {
    assert_eq!(sign(0.0), 0.0);
    assert_eq!(sign(-2.5), -1.0);
}
