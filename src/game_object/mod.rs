//! Game objects: shared state plus a phase-ordered list of components.

pub mod component;
pub mod manager;
pub mod stock;

use glam::Vec2;

pub use component::{Component, ComponentKind, HitContext};
pub use manager::{GameObjectManager, HitRouter};
pub use stock::ComponentStock;

use crate::collision::HitType;
use crate::constants::{ALWAYS_ACTIVE, COLLISION_SURFACE_DECAY_TIME};
use crate::context::SimContext;
use crate::factory::SpawnKind;
use crate::fixed_array::CapacityError;
use crate::object_manager::{Managed, PhasedObjectManager};
use crate::phase::Phase;
use crate::pool::{PoolHandle, Poolable};

/// Handle to a game object in a [`GameObjectManager`].
pub type GameObjectId = PoolHandle<GameObject>;

impl Managed for GameObjectId {
    type Key = Self;

    fn key(&self) -> Self {
        *self
    }
}

/// What an object is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActionType {
    #[default]
    Invalid,
    Idle,
    Move,
    Attack,
    HitReact,
    Death,
    Hide,
    Frozen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Team {
    #[default]
    None,
    Player,
    Enemy,
}

/// State every component of an object reads and writes.
///
/// Touch timestamps are game-clock seconds; an object is touching a
/// surface while less than [`COLLISION_SURFACE_DECAY_TIME`] has passed
/// since the last contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameObjectState {
    pub id: Option<GameObjectId>,
    /// Bottom-left corner of the object in world space.
    pub position: Vec2,
    pub velocity: Vec2,
    pub target_velocity: Vec2,
    pub acceleration: Vec2,
    /// One-shot velocity change consumed by the physics integrator.
    pub impulse: Vec2,
    pub facing: Vec2,
    pub width: f32,
    pub height: f32,
    /// Hit points; unsigned, so life can never go negative.
    pub life: u32,
    pub action: ActionType,
    pub last_received_hit: HitType,
    pub last_touched_floor: f32,
    pub last_touched_ceiling: f32,
    pub last_touched_left_wall: f32,
    pub last_touched_right_wall: f32,
    pub team: Team,
    /// Merged normal of the background surfaces hit this frame.
    pub background_normal: Vec2,
    /// Distance from the camera focus within which the object updates, or
    /// [`ALWAYS_ACTIVE`].
    pub activation_radius: f32,
    pub destroy_on_deactivation: bool,
    /// Factory kind the object was built as. Released objects of a known
    /// kind hand their components back for reuse.
    pub spawn_kind: Option<SpawnKind>,
}

impl Default for GameObjectState {
    fn default() -> Self {
        Self {
            id: None,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            target_velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            impulse: Vec2::ZERO,
            facing: Vec2::X,
            width: 0.0,
            height: 0.0,
            life: 0,
            action: ActionType::Invalid,
            last_received_hit: HitType::Invalid,
            last_touched_floor: f32::NEG_INFINITY,
            last_touched_ceiling: f32::NEG_INFINITY,
            last_touched_left_wall: f32::NEG_INFINITY,
            last_touched_right_wall: f32::NEG_INFINITY,
            team: Team::None,
            background_normal: Vec2::ZERO,
            activation_radius: ALWAYS_ACTIVE,
            destroy_on_deactivation: false,
            spawn_kind: None,
        }
    }
}

impl GameObjectState {
    /// Removes `amount` life, stopping at zero.
    pub fn damage(&mut self, amount: u32) {
        self.life = self.life.saturating_sub(amount);
    }

    /// Centre of the object's extent.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + Vec2::new(self.width, self.height) * 0.5
    }

    /// Whether a floor was touched within the decay window before `now`.
    #[must_use]
    pub fn touching_ground(&self, now: f32) -> bool {
        recently(self.last_touched_floor, now)
    }

    /// Whether a ceiling was touched within the decay window before `now`.
    #[must_use]
    pub fn touching_ceiling(&self, now: f32) -> bool {
        recently(self.last_touched_ceiling, now)
    }

    /// Whether a wall on the left was touched within the decay window.
    #[must_use]
    pub fn touching_left_wall(&self, now: f32) -> bool {
        recently(self.last_touched_left_wall, now)
    }

    /// Whether a wall on the right was touched within the decay window.
    #[must_use]
    pub fn touching_right_wall(&self, now: f32) -> bool {
        recently(self.last_touched_right_wall, now)
    }

    /// Whether the object is close enough to `focus` to update.
    #[must_use]
    pub fn in_activation_range(&self, focus: Vec2) -> bool {
        self.activation_radius == ALWAYS_ACTIVE
            || self.position.distance_squared(focus) < self.activation_radius * self.activation_radius
    }
}

fn recently(timestamp: f32, now: f32) -> bool {
    now - timestamp < COLLISION_SURFACE_DECAY_TIME
}

/// Shared state plus the components that drive it.
#[derive(Debug)]
pub struct GameObject {
    state: GameObjectState,
    components: PhasedObjectManager<Box<dyn Component>>,
}

impl GameObject {
    /// An empty object with room for `component_capacity` components.
    #[must_use]
    pub fn new(component_capacity: usize) -> Self {
        Self {
            state: GameObjectState::default(),
            components: PhasedObjectManager::new(component_capacity),
        }
    }

    /// Shared state read by every component.
    #[must_use]
    pub const fn state(&self) -> &GameObjectState {
        &self.state
    }

    /// Mutable shared state, for builders and tests.
    pub fn state_mut(&mut self) -> &mut GameObjectState {
        &mut self.state
    }

    /// Handle the object was allocated under, if it is live.
    #[must_use]
    pub const fn id(&self) -> Option<GameObjectId> {
        self.state.id
    }

    /// Queues a component; it joins the update passes at the next commit.
    ///
    /// # Errors
    /// Returns [`CapacityError`] when the component budget is spent.
    pub fn add_component(&mut self, component: Box<dyn Component>) -> Result<(), CapacityError> {
        self.components.add(component)
    }

    /// Queues removal of the component of `kind`.
    ///
    /// # Errors
    /// Returns [`CapacityError`] when the removal queue is full.
    pub fn remove_component(&mut self, kind: ComponentKind) -> Result<(), CapacityError> {
        self.components.remove(kind)
    }

    /// Applies queued component changes.
    pub fn commit_updates(&mut self) -> bool {
        self.components.commit_updates()
    }

    /// The committed component of `kind`, if any.
    #[must_use]
    pub fn find(&self, kind: ComponentKind) -> Option<&dyn Component> {
        self.components.find(kind).map(AsRef::as_ref)
    }

    /// Number of committed components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Detaches every component, committed or queued.
    pub fn drain_components(&mut self) -> impl Iterator<Item = Box<dyn Component>> + '_ {
        self.components.drain()
    }

    /// Runs every component in phase order.
    pub fn update(&mut self, time_delta: f32, ctx: &mut SimContext) {
        let state = &mut self.state;
        self.components
            .update(|component, _| component.update(time_delta, state, ctx));
    }

    /// Runs only the components of `phase`.
    pub fn update_phase(&mut self, phase: Phase, time_delta: f32, ctx: &mut SimContext) {
        let state = &mut self.state;
        self.components
            .update_phase(phase, |component, _| component.update(time_delta, state, ctx));
    }

    /// Offers a hit from `attacker` to the components; the first one that
    /// handles hits decides. Unhandled hits are refused.
    pub fn received_hit(
        &mut self,
        attacker: &GameObjectState,
        hit_type: HitType,
        hit: &mut HitContext<'_>,
    ) -> bool {
        let state = &mut self.state;
        self.components
            .iter_mut()
            .find_map(|component| component.received_hit(state, attacker, hit_type, hit))
            .unwrap_or(false)
    }

    /// Tells every component that this object hit `victim`.
    pub fn hit_victim(
        &mut self,
        victim: &GameObjectState,
        hit_type: HitType,
        accepted: bool,
        hit: &mut HitContext<'_>,
    ) {
        for component in self.components.iter_mut() {
            component.hit_victim(&mut self.state, victim, hit_type, accepted, hit);
        }
    }
}

impl Poolable for GameObject {
    fn reset(&mut self) {
        self.state = GameObjectState::default();
        self.components.clear();
    }
}
