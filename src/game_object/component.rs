//! The component contract every game object behaviour implements.
use std::fmt;

use super::GameObjectState;
use crate::collision::HitType;
use crate::context::{LifecycleRequests, SimContext};
use crate::object_manager::{Managed, Phased};
use crate::phase::Phase;
use crate::time::TimeSystem;

/// Identifies a component within its owner.
///
/// An owner holds at most one component per kind; removal is by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Gravity,
    Movement,
    Physics,
    BackgroundCollision,
    DynamicCollision,
    HitReaction,
    Lifetime,
    SolidSurface,
    Render,
    /// Game-specific behaviour defined outside the core.
    Custom(&'static str),
}

/// Services available while a hit is being dispatched.
#[derive(Debug)]
pub struct HitContext<'a> {
    pub time: &'a mut TimeSystem,
    pub requests: &'a mut LifecycleRequests,
}

impl HitContext<'_> {
    #[must_use]
    pub const fn game_time(&self) -> f32 {
        self.time.game_time()
    }
}

/// A unit of behaviour attached to one game object.
pub trait Component: Send + fmt::Debug {
    fn kind(&self) -> ComponentKind;

    /// Phase in which [`Component::update`] runs.
    fn phase(&self) -> Phase;

    /// Advances the component by `time_delta` seconds of game time.
    fn update(&mut self, time_delta: f32, owner: &mut GameObjectState, ctx: &mut SimContext);

    /// Returns the component to its initial configuration.
    fn reset(&mut self) {}

    /// Offered a hit landed on `owner` by `attacker`.
    ///
    /// Returns `None` when this component does not handle hits, otherwise
    /// whether the hit was accepted.
    fn received_hit(
        &mut self,
        owner: &mut GameObjectState,
        attacker: &GameObjectState,
        hit_type: HitType,
        hit: &mut HitContext<'_>,
    ) -> Option<bool> {
        let _ = (owner, attacker, hit_type, hit);
        None
    }

    /// Told that `owner` landed a hit on `victim`.
    fn hit_victim(
        &mut self,
        owner: &mut GameObjectState,
        victim: &GameObjectState,
        hit_type: HitType,
        accepted: bool,
        hit: &mut HitContext<'_>,
    ) {
        let _ = (owner, victim, hit_type, accepted, hit);
    }
}

impl Managed for Box<dyn Component> {
    type Key = ComponentKind;

    fn key(&self) -> ComponentKind {
        self.kind()
    }
}

impl Phased for Box<dyn Component> {
    fn phase(&self) -> Phase {
        self.as_ref().phase()
    }
}
