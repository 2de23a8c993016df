//! Decides how an object responds to hits it takes and gives.
use glam::Vec2;
use log::debug;

use crate::collision::HitType;
use crate::context::SimContext;
use crate::game_object::{ActionType, Component, ComponentKind, GameObjectState, HitContext};
use crate::phase::Phase;
use crate::vector_math::sign;

/// Accepts hits unless invincible, applies their effect on life and
/// action, and optionally reacts to landing hits on others.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReactionComponent {
    /// Refuses every hit while set.
    pub invincible: bool,
    /// Seconds after an accepted hit during which further hits are refused.
    pub invincible_time: f32,
    /// Impulse applied away from the attacker on an accepted hit.
    pub knockback: Option<Vec2>,
    /// Destroys the owner as soon as it hits anything (projectiles).
    pub die_on_attack: bool,
    /// Freezes game time this long after landing an accepted hit.
    pub pause_on_attack: Option<f32>,
    last_hit_time: f32,
}

impl Default for HitReactionComponent {
    fn default() -> Self {
        Self {
            invincible: false,
            invincible_time: 0.0,
            knockback: None,
            die_on_attack: false,
            pause_on_attack: None,
            last_hit_time: f32::NEG_INFINITY,
        }
    }
}

impl HitReactionComponent {
    /// Whether a hit arriving at `now` would be refused.
    #[must_use]
    pub fn is_invincible(&self, now: f32) -> bool {
        self.invincible || now - self.last_hit_time < self.invincible_time
    }
}

impl Component for HitReactionComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::HitReaction
    }

    fn phase(&self) -> Phase {
        Phase::PreDraw
    }

    /// Forgets the last hit; configuration is kept for reuse.
    fn reset(&mut self) {
        self.last_hit_time = f32::NEG_INFINITY;
    }

    /// Returns the owner to normal movement once the hit reaction has
    /// played out.
    fn update(&mut self, _: f32, owner: &mut GameObjectState, ctx: &mut SimContext) {
        if owner.action == ActionType::HitReact && !self.is_invincible(ctx.time.game_time()) {
            owner.action = ActionType::Move;
        }
    }

    fn received_hit(
        &mut self,
        owner: &mut GameObjectState,
        attacker: &GameObjectState,
        hit_type: HitType,
        hit: &mut HitContext<'_>,
    ) -> Option<bool> {
        let now = hit.game_time();
        if self.is_invincible(now) {
            return Some(false);
        }
        match hit_type {
            HitType::Hit => {
                owner.damage(1);
                owner.action = if owner.life == 0 {
                    ActionType::Death
                } else {
                    ActionType::HitReact
                };
            }
            HitType::Death => {
                owner.life = 0;
                owner.action = ActionType::Death;
            }
            _ => {}
        }
        owner.last_received_hit = hit_type;
        self.last_hit_time = now;
        if let Some(knockback) = self.knockback {
            let away = sign(owner.center().x - attacker.center().x);
            owner.impulse += Vec2::new(knockback.x * away, knockback.y);
        }
        debug!("{:?} took {hit_type:?}, life {}", owner.id, owner.life);
        Some(true)
    }

    fn hit_victim(
        &mut self,
        owner: &mut GameObjectState,
        _: &GameObjectState,
        _: HitType,
        accepted: bool,
        hit: &mut HitContext<'_>,
    ) {
        if accepted {
            if let Some(pause) = self.pause_on_attack {
                hit.time.freeze(pause);
            }
        }
        if self.die_on_attack {
            owner.life = 0;
            if let Some(id) = owner.id {
                if hit.requests.request_destroy(id).is_err() {
                    debug!("{id:?} left to its lifetime check");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LifecycleRequests;
    use crate::game_object::GameObjectId;
    use crate::time::TimeSystem;
    use rstest::{fixture, rstest};

    struct Services {
        time: TimeSystem,
        requests: LifecycleRequests,
    }

    impl Services {
        fn context(&mut self) -> HitContext<'_> {
            HitContext {
                time: &mut self.time,
                requests: &mut self.requests,
            }
        }
    }

    #[fixture]
    fn services() -> Services {
        let mut time = TimeSystem::new();
        time.update(1.0);
        Services {
            time,
            requests: LifecycleRequests::new(4, 4),
        }
    }

    fn victim(life: u32) -> GameObjectState {
        GameObjectState {
            position: Vec2::new(10.0, 0.0),
            width: 10.0,
            height: 10.0,
            life,
            ..GameObjectState::default()
        }
    }

    #[rstest]
    fn hit_costs_one_life(mut services: Services) {
        let mut reaction = HitReactionComponent::default();
        let mut owner = victim(3);
        let accepted = reaction.received_hit(&mut owner, &GameObjectState::default(), HitType::Hit, &mut services.context());
        assert_eq!(accepted, Some(true));
        assert_eq!(owner.life, 2);
        assert_eq!(owner.action, ActionType::HitReact);
        assert_eq!(owner.last_received_hit, HitType::Hit);
    }

    #[rstest]
    fn death_hit_kills_outright(mut services: Services) {
        let mut reaction = HitReactionComponent::default();
        let mut owner = victim(5);
        reaction.received_hit(&mut owner, &GameObjectState::default(), HitType::Death, &mut services.context());
        assert_eq!(owner.life, 0);
        assert_eq!(owner.action, ActionType::Death);
    }

    #[rstest]
    fn invincibility_window_refuses_follow_up(mut services: Services) {
        let mut reaction = HitReactionComponent {
            invincible_time: 0.5,
            ..HitReactionComponent::default()
        };
        let mut owner = victim(3);
        let attacker = GameObjectState::default();
        assert_eq!(reaction.received_hit(&mut owner, &attacker, HitType::Hit, &mut services.context()), Some(true));
        assert_eq!(reaction.received_hit(&mut owner, &attacker, HitType::Hit, &mut services.context()), Some(false));
        assert_eq!(owner.life, 2);
    }

    #[rstest]
    fn knockback_pushes_away_from_attacker(mut services: Services) {
        let mut reaction = HitReactionComponent {
            knockback: Some(Vec2::new(100.0, 50.0)),
            ..HitReactionComponent::default()
        };
        let mut owner = victim(3);
        let attacker = GameObjectState {
            position: Vec2::new(30.0, 0.0),
            width: 10.0,
            ..GameObjectState::default()
        };
        reaction.received_hit(&mut owner, &attacker, HitType::Hit, &mut services.context());
        assert_eq!(owner.impulse, Vec2::new(-100.0, 50.0));
    }

    #[rstest]
    fn projectiles_die_on_attack_and_pause_time(mut services: Services) {
        let mut reaction = HitReactionComponent {
            die_on_attack: true,
            pause_on_attack: Some(0.2),
            ..HitReactionComponent::default()
        };
        let id = GameObjectId::from_raw(2, 0);
        let mut owner = GameObjectState {
            id: Some(id),
            ..victim(1)
        };
        reaction.hit_victim(&mut owner, &victim(1), HitType::Hit, true, &mut services.context());
        assert_eq!(owner.life, 0);
        assert_eq!(services.requests.pending_destroys(), &[id]);
        assert!(services.time.is_frozen());
    }

    #[rstest]
    fn reset_clears_the_window_but_keeps_configuration(mut services: Services) {
        let mut reaction = HitReactionComponent {
            invincible_time: 0.5,
            knockback: Some(Vec2::new(10.0, 0.0)),
            ..HitReactionComponent::default()
        };
        let mut owner = victim(3);
        let attacker = GameObjectState::default();
        reaction.received_hit(&mut owner, &attacker, HitType::Hit, &mut services.context());
        reaction.reset();
        assert!((reaction.invincible_time - 0.5).abs() < f32::EPSILON);
        assert_eq!(reaction.knockback, Some(Vec2::new(10.0, 0.0)));
        assert_eq!(reaction.received_hit(&mut owner, &attacker, HitType::Hit, &mut services.context()), Some(true));
    }
}
