use glam::Vec2;

use crate::context::SimContext;
use crate::game_object::{Component, ComponentKind, GameObjectState};
use crate::phase::Phase;
use crate::render::{DrawableId, RenderElement};

/// Schedules one drawable at its owner's position each frame it is on
/// screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderComponent {
    pub drawable: DrawableId,
    pub priority: i32,
    /// Offset from the owner's position.
    pub offset: Vec2,
    /// Radius used for the visibility test.
    pub radius: f32,
    pub camera_relative: bool,
}

impl RenderComponent {
    #[must_use]
    pub const fn new(drawable: DrawableId, priority: i32) -> Self {
        Self {
            drawable,
            priority,
            offset: Vec2::ZERO,
            radius: 0.0,
            camera_relative: false,
        }
    }
}

impl Component for RenderComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Render
    }

    fn phase(&self) -> Phase {
        Phase::Draw
    }

    fn update(&mut self, _: f32, owner: &mut GameObjectState, ctx: &mut SimContext) {
        let position = owner.position + self.offset;
        let visible = self.camera_relative
            || ctx
                .camera
                .as_ref()
                .is_none_or(|camera| camera.point_visible(position, self.radius));
        if !visible {
            return;
        }
        if let Some(render) = ctx.render.as_mut() {
            render.schedule(RenderElement {
                drawable: self.drawable,
                position,
                priority: self.priority,
                camera_relative: self.camera_relative,
            });
        }
    }
}
