//! Camera collaborator used for activation and visibility.
use glam::Vec2;

/// Supplies the point the simulation is centred on.
pub trait Camera: Send + std::fmt::Debug {
    /// World position the camera is following.
    fn focus(&self) -> Vec2;

    /// Whether a circle at `point` with `radius` overlaps the view.
    fn point_visible(&self, point: Vec2, radius: f32) -> bool;
}

/// A camera that stays wherever it is put.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCamera {
    /// Centre of the view.
    pub focus: Vec2,
    /// Size of the view in world units.
    pub view_size: Vec2,
}

impl FixedCamera {
    #[must_use]
    pub const fn new(focus: Vec2, view_size: Vec2) -> Self {
        Self { focus, view_size }
    }
}

impl Camera for FixedCamera {
    fn focus(&self) -> Vec2 {
        self.focus
    }

    fn point_visible(&self, point: Vec2, radius: f32) -> bool {
        let half = self.view_size * 0.5 + Vec2::splat(radius);
        let offset = (point - self.focus).abs();
        offset.x <= half.x && offset.y <= half.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::centre(Vec2::new(0.0, 0.0), 0.0, true)]
    #[case::just_outside(Vec2::new(60.0, 0.0), 0.0, false)]
    #[case::radius_overlaps(Vec2::new(60.0, 0.0), 12.0, true)]
    fn visibility_respects_view_and_radius(
        #[case] point: Vec2,
        #[case] radius: f32,
        #[case] expected: bool,
    ) {
        let camera = FixedCamera::new(Vec2::ZERO, Vec2::new(100.0, 80.0));
        assert_eq!(camera.point_visible(point, radius), expected);
    }
}
