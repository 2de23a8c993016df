use crate::collision::{bounding_box, CollisionVolume};
use crate::context::SimContext;
use crate::game_object::{Component, ComponentKind, GameObjectState};
use crate::phase::Phase;

/// Registers its owner's attack and vulnerability volumes every frame.
///
/// The bounding volume covering both lists in either facing is derived
/// from the owner's extent at registration time.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicCollisionComponent {
    attack: Vec<CollisionVolume>,
    vulnerability: Vec<CollisionVolume>,
    /// Whether the owner is told about hits it gives and takes.
    pub reacts: bool,
}

impl DynamicCollisionComponent {
    #[must_use]
    pub const fn new(attack: Vec<CollisionVolume>, vulnerability: Vec<CollisionVolume>) -> Self {
        Self {
            attack,
            vulnerability,
            reacts: true,
        }
    }

    /// Replaces both volume lists, e.g. when an animation frame changes.
    pub fn set_volumes(&mut self, attack: Vec<CollisionVolume>, vulnerability: Vec<CollisionVolume>) {
        self.attack = attack;
        self.vulnerability = vulnerability;
    }

    #[must_use]
    pub fn attack(&self) -> &[CollisionVolume] {
        &self.attack
    }

    #[must_use]
    pub fn vulnerability(&self) -> &[CollisionVolume] {
        &self.vulnerability
    }

    /// Bounds of every volume for an owner of the given extent.
    #[must_use]
    pub fn bounds(&self, width: f32, height: f32) -> Option<CollisionVolume> {
        let attack = bounding_box(&self.attack, width, height);
        let vulnerability = bounding_box(&self.vulnerability, width, height);
        match (attack, vulnerability) {
            (Some(a), Some(v)) => bounding_box(&[a, v], width, height),
            (bounds, None) | (None, bounds) => bounds,
        }
    }
}

impl Component for DynamicCollisionComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::DynamicCollision
    }

    fn phase(&self) -> Phase {
        Phase::FrameEnd
    }

    fn update(&mut self, _: f32, owner: &mut GameObjectState, ctx: &mut SimContext) {
        let Some(bounds) = self.bounds(owner.width, owner.height) else {
            return;
        };
        ctx.collision
            .register_for_collisions(owner, self.reacts, bounds, &self.attack, &self.vulnerability);
    }
}
