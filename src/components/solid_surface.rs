use log::trace;

use crate::context::SimContext;
use crate::game_object::{Component, ComponentKind, GameObjectState};
use crate::phase::Phase;
use crate::world::LineSegment;

/// Makes its owner solid to background collision, e.g. a moving platform.
///
/// Segments are relative to the owner's position and are republished as
/// temporary surfaces every frame, before any object resolves against the
/// background. The owner never collides with its own surfaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolidSurfaceComponent {
    segments: Vec<LineSegment>,
}

impl SolidSurfaceComponent {
    #[must_use]
    pub const fn new(segments: Vec<LineSegment>) -> Self {
        Self { segments }
    }

    pub fn add_segment(&mut self, segment: LineSegment) {
        self.segments.push(segment);
    }

    #[must_use]
    pub fn segments(&self) -> &[LineSegment] {
        &self.segments
    }
}

impl Component for SolidSurfaceComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::SolidSurface
    }

    fn phase(&self) -> Phase {
        Phase::CollisionDetection
    }

    fn update(&mut self, _: f32, owner: &mut GameObjectState, ctx: &mut SimContext) {
        let Some(background) = ctx.background.as_mut() else {
            return;
        };
        for segment in &self.segments {
            if background
                .add_temporary_surface(segment.translated(owner.position), owner.id)
                .is_err()
            {
                trace!("{:?} surfaces truncated this frame", owner.id);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_object::GameObjectId;
    use crate::world::{CollisionSystem, CollisionTileSet, TiledWorld};
    use glam::Vec2;
    use rstest::rstest;

    fn deck() -> LineSegment {
        LineSegment::new(Vec2::new(0.0, 8.0), Vec2::new(32.0, 8.0), Vec2::Y)
    }

    #[rstest]
    fn publishes_translated_segments() {
        let mut ctx = SimContext::default();
        ctx.background = Some(CollisionSystem::new(
            TiledWorld::new(4, 4),
            CollisionTileSet::new(),
            Vec2::splat(32.0),
            4,
        ));
        let mut platform = SolidSurfaceComponent::new(vec![deck()]);
        let id = GameObjectId::from_raw(0, 0);
        let mut owner = GameObjectState {
            id: Some(id),
            position: Vec2::new(64.0, 32.0),
            ..GameObjectState::default()
        };
        platform.update(0.016, &mut owner, &mut ctx);
        let surfaces = ctx.background.as_ref().expect("installed").temporary_surfaces();
        assert_eq!(surfaces.len(), 1);
        assert_eq!(surfaces.first().map(|s| s.segment.start), Some(Vec2::new(64.0, 40.0)));
        assert_eq!(surfaces.first().and_then(|s| s.owner), Some(id));
    }

    #[rstest]
    fn absent_background_is_ignored() {
        let mut ctx = SimContext::default();
        let mut platform = SolidSurfaceComponent::new(vec![deck()]);
        platform.update(0.016, &mut GameObjectState::default(), &mut ctx);
        assert!(ctx.background.is_none());
    }
}
