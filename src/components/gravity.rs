use glam::Vec2;

use crate::constants::DEFAULT_GRAVITY;
use crate::context::SimContext;
use crate::game_object::{Component, ComponentKind, GameObjectState};
use crate::phase::Phase;

/// Pulls its owner along `gravity` by adding to the frame's impulse.
///
/// Runs in [`Phase::Physics`]; add it before the physics integrator so the
/// pull is integrated the same frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityComponent {
    pub gravity: Vec2,
}

impl Default for GravityComponent {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, DEFAULT_GRAVITY),
        }
    }
}

impl Component for GravityComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Gravity
    }

    fn phase(&self) -> Phase {
        Phase::Physics
    }

    fn update(&mut self, time_delta: f32, owner: &mut GameObjectState, _: &mut SimContext) {
        owner.impulse += self.gravity * time_delta;
    }
}
