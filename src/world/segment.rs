//! Line segments that make up the solid background.
use glam::Vec2;

/// A one-sided wall: a segment plus the normal pointing out of the solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Vec2,
    pub end: Vec2,
    pub normal: Vec2,
}

impl LineSegment {
    #[must_use]
    pub const fn new(start: Vec2, end: Vec2, normal: Vec2) -> Self {
        Self { start, end, normal }
    }

    /// The same segment moved by `offset`.
    #[must_use]
    pub fn translated(self, offset: Vec2) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            normal: self.normal,
        }
    }

    /// Whether a body moving along `direction` runs into this surface.
    ///
    /// A zero direction accepts every surface.
    #[must_use]
    pub fn opposes(&self, direction: Vec2) -> bool {
        direction == Vec2::ZERO || direction.dot(self.normal) < 0.0
    }

    /// Point where this segment crosses `other_start..other_end`, endpoints
    /// included. Parallel segments never intersect.
    #[must_use]
    pub fn intersection(&self, other_start: Vec2, other_end: Vec2) -> Option<Vec2> {
        let own = self.end - self.start;
        let other = other_end - other_start;
        let denominator = other.y * own.x - other.x * own.y;
        if denominator == 0.0 {
            return None;
        }
        let gap = self.start - other_start;
        let along_self = (other.x * gap.y - other.y * gap.x) / denominator;
        let along_other = (own.x * gap.y - own.y * gap.x) / denominator;
        let inside = |t: f32| (0.0..=1.0).contains(&t);
        (inside(along_self) && inside(along_other)).then(|| self.start + own * along_self)
    }

    /// First point where this segment touches the box, if it does.
    ///
    /// An endpoint inside the box counts; otherwise each box edge is tested
    /// in turn.
    #[must_use]
    pub fn intersect_box(&self, min: Vec2, max: Vec2) -> Option<Vec2> {
        let contains = |point: Vec2| point.cmpge(min).all() && point.cmple(max).all();
        if contains(self.start) {
            return Some(self.start);
        }
        if contains(self.end) {
            return Some(self.end);
        }
        let corners = [
            Vec2::new(min.x, min.y),
            Vec2::new(max.x, min.y),
            Vec2::new(max.x, max.y),
            Vec2::new(min.x, max.y),
        ];
        corners
            .iter()
            .zip(corners.iter().cycle().skip(1))
            .find_map(|(from, to)| self.intersection(*from, *to))
    }
}
