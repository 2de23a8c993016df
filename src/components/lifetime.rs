use log::{debug, warn};

use crate::context::{SimContext, SpawnRequest};
use crate::factory::SpawnKind;
use crate::game_object::{ActionType, Component, ComponentKind, GameObjectState};
use crate::phase::Phase;

/// Destroys its owner when its time runs out or its life reaches zero,
/// optionally leaving another object behind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifetimeComponent {
    /// Seconds of game time left, or `None` to live indefinitely.
    pub time_to_live: Option<f32>,
    /// Object spawned where the owner died.
    pub death_spawn: Option<SpawnKind>,
    /// Whether running out of life is fatal.
    pub die_when_lifeless: bool,
    initial_time_to_live: Option<f32>,
    dead: bool,
}

impl Default for LifetimeComponent {
    fn default() -> Self {
        Self {
            time_to_live: None,
            death_spawn: None,
            die_when_lifeless: true,
            initial_time_to_live: None,
            dead: false,
        }
    }
}

impl LifetimeComponent {
    /// A lifetime that expires after `seconds`.
    #[must_use]
    pub fn expiring(seconds: f32) -> Self {
        Self {
            time_to_live: Some(seconds),
            initial_time_to_live: Some(seconds),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_death_spawn(mut self, kind: SpawnKind) -> Self {
        self.death_spawn = Some(kind);
        self
    }

    /// Whether the owner has already been sent to its death.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    fn die(&mut self, owner: &mut GameObjectState, ctx: &mut SimContext) {
        self.dead = true;
        owner.action = ActionType::Death;
        if let Some(kind) = self.death_spawn {
            let request = SpawnRequest {
                kind,
                position: owner.position,
                flip_horizontal: owner.facing.x < 0.0,
            };
            if ctx.lifecycle.request_spawn(request).is_err() {
                warn!("{:?} died without spawning {kind:?}", owner.id);
            }
        }
        if let Some(id) = owner.id {
            if ctx.lifecycle.request_destroy(id).is_ok() {
                debug!("{id:?} expired");
            }
        }
    }
}

impl Component for LifetimeComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Lifetime
    }

    fn phase(&self) -> Phase {
        Phase::Think
    }

    fn reset(&mut self) {
        self.time_to_live = self.initial_time_to_live;
        self.dead = false;
    }

    fn update(&mut self, time_delta: f32, owner: &mut GameObjectState, ctx: &mut SimContext) {
        if self.dead {
            return;
        }
        let expired = match self.time_to_live.as_mut() {
            Some(remaining) => {
                *remaining -= time_delta;
                *remaining <= 0.0
            }
            None => false,
        };
        if expired || (self.die_when_lifeless && owner.life == 0) {
            self.die(owner, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_object::GameObjectId;
    use glam::Vec2;
    use rstest::rstest;

    fn owner(life: u32) -> GameObjectState {
        GameObjectState {
            id: Some(GameObjectId::from_raw(1, 0)),
            position: Vec2::new(5.0, 6.0),
            facing: Vec2::NEG_X,
            life,
            ..GameObjectState::default()
        }
    }

    #[rstest]
    fn expires_after_time_to_live() {
        let mut lifetime = LifetimeComponent::expiring(0.25);
        let mut state = owner(1);
        let mut ctx = SimContext::default();
        lifetime.update(0.2, &mut state, &mut ctx);
        assert!(!lifetime.is_dead());
        lifetime.update(0.1, &mut state, &mut ctx);
        assert!(lifetime.is_dead());
        assert_eq!(ctx.lifecycle.pending_destroys(), &[GameObjectId::from_raw(1, 0)]);
    }

    #[rstest]
    fn lifeless_owner_leaves_a_spawn_behind() {
        let mut lifetime = LifetimeComponent::default().with_death_spawn(SpawnKind(9));
        let mut state = owner(0);
        let mut ctx = SimContext::default();
        lifetime.update(0.016, &mut state, &mut ctx);
        assert_eq!(
            ctx.lifecycle.pending_spawns(),
            &[SpawnRequest {
                kind: SpawnKind(9),
                position: Vec2::new(5.0, 6.0),
                flip_horizontal: true,
            }]
        );
        assert_eq!(state.action, ActionType::Death);
    }

    #[rstest]
    fn dies_only_once() {
        let mut lifetime = LifetimeComponent::default().with_death_spawn(SpawnKind(9));
        let mut state = owner(0);
        let mut ctx = SimContext::default();
        lifetime.update(0.016, &mut state, &mut ctx);
        lifetime.update(0.016, &mut state, &mut ctx);
        assert_eq!(ctx.lifecycle.pending_spawns().len(), 1);
    }

    #[rstest]
    fn immortal_when_lifelessness_is_ignored() {
        let mut lifetime = LifetimeComponent {
            die_when_lifeless: false,
            ..LifetimeComponent::default()
        };
        let mut state = owner(0);
        let mut ctx = SimContext::default();
        lifetime.update(10.0, &mut state, &mut ctx);
        assert!(!lifetime.is_dead());
    }

    #[rstest]
    fn reset_restores_the_clock() {
        let mut lifetime = LifetimeComponent::expiring(0.1);
        let mut state = owner(1);
        let mut ctx = SimContext::default();
        lifetime.update(0.2, &mut state, &mut ctx);
        lifetime.reset();
        assert!(!lifetime.is_dead());
        assert_eq!(lifetime.time_to_live, Some(0.1));
    }
}
