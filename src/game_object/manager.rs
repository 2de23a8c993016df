//! Owns every game object and decides which ones update each frame.
//!
//! Objects live in a generation-checked pool. Active objects update; those
//! outside their activation radius around the camera focus are parked in
//! an inactive list kept sorted by world X, which lets reactivation stop
//! scanning once candidates are further left than any radius could reach.

use log::{debug, warn};
use ordered_float::OrderedFloat;

use super::component::HitContext;
use super::{ComponentStock, GameObject, GameObjectId, GameObjectState};
use crate::collision::{HitReactionDispatcher, HitType};
use crate::constants::ALWAYS_ACTIVE;
use crate::context::{LifecycleRequests, SimContext};
use crate::factory::SpawnKind;
use crate::fixed_array::{CapacityError, FixedSizeArray};
use crate::object_manager::ObjectManager;
use crate::phase::Phase;
use crate::pool::ObjectPool;
use crate::time::TimeSystem;

#[derive(Debug)]
pub struct GameObjectManager {
    pool: ObjectPool<GameObject>,
    active: ObjectManager<GameObjectId>,
    inactive: FixedSizeArray<GameObjectId>,
    marked_for_death: FixedSizeArray<GameObjectId>,
    stock: ComponentStock,
}

impl GameObjectManager {
    /// Preallocates `capacity` objects with room for `component_capacity`
    /// components each.
    #[must_use]
    pub fn new(capacity: usize, component_capacity: usize) -> Self {
        Self {
            pool: ObjectPool::new(capacity, || GameObject::new(component_capacity)),
            active: ObjectManager::new(capacity),
            inactive: FixedSizeArray::new(capacity),
            marked_for_death: FixedSizeArray::new(capacity),
            stock: ComponentStock::new(),
        }
    }

    /// Takes a blank object from the pool. It stays dormant until passed to
    /// [`Self::add`], or can be handed back with [`Self::discard`].
    pub fn allocate(&mut self) -> Option<GameObjectId> {
        let id = self.pool.allocate()?;
        if let Some(object) = self.pool.get_mut(id) {
            object.state_mut().id = Some(id);
        }
        Some(id)
    }

    /// Queues an allocated object for activation at the next commit.
    ///
    /// # Errors
    /// Returns [`CapacityError`] when the addition queue is full.
    pub fn add(&mut self, id: GameObjectId) -> Result<(), CapacityError> {
        let Some(object) = self.pool.get_mut(id) else {
            warn!("add of stale game object {id:?}");
            return Ok(());
        };
        object.commit_updates();
        self.active.add(id)
    }

    /// Returns an object that was never added straight to the pool.
    pub fn discard(&mut self, id: GameObjectId) -> bool {
        self.pool.release(id)
    }

    /// Schedules `id` for removal at the next commit, whether it is active
    /// or parked.
    pub fn destroy(&mut self, id: GameObjectId) {
        if !self.pool.is_live(id) || self.marked_for_death.find(&id, true).is_some() {
            return;
        }
        if let Some(index) = self.inactive.find(&id, true) {
            self.inactive.swap_with_last(index);
            self.inactive.remove_last();
        } else if self.active.remove(id).is_err() {
            return;
        }
        self.mark_for_death(id);
    }

    /// Schedules every object for removal at the next commit.
    pub fn destroy_all(&mut self) {
        for index in 0..self.active.len() {
            if let Some(id) = self.active.objects().get(index).copied() {
                self.destroy(id);
            }
        }
        while let Some(id) = self.inactive.remove_last() {
            if self.pool.is_live(id) && self.marked_for_death.find(&id, true).is_none() {
                self.mark_for_death(id);
            }
        }
    }

    fn mark_for_death(&mut self, id: GameObjectId) {
        if self.marked_for_death.add(id).is_err() {
            warn!("death list full; {id:?} stays alive");
        }
    }

    /// Fits the allocated object `id` with a stocked component set of
    /// `kind` and copies `template` into its state. Returns `false`, leaving
    /// the object untouched, when no set is stocked.
    ///
    /// # Errors
    /// Returns [`CapacityError`] when the object has no room for the set.
    pub fn reuse_components(
        &mut self,
        id: GameObjectId,
        kind: SpawnKind,
        template: &GameObjectState,
    ) -> Result<bool, CapacityError> {
        let Some(object) = self.pool.get_mut(id) else {
            return Ok(false);
        };
        if !self.stock.restore(kind, object)? {
            return Ok(false);
        }
        *object.state_mut() = GameObjectState {
            id: Some(id),
            ..*template
        };
        Ok(true)
    }

    /// Component sets waiting for a new object of `kind`.
    #[must_use]
    pub fn stocked(&self, kind: SpawnKind) -> usize {
        self.stock.available(kind)
    }

    /// The live object behind `id`; `None` once it was released.
    #[must_use]
    pub fn get(&self, id: GameObjectId) -> Option<&GameObject> {
        self.pool.get(id)
    }

    /// Mutable access to a live object, active or parked.
    pub fn get_mut(&mut self, id: GameObjectId) -> Option<&mut GameObject> {
        self.pool.get_mut(id)
    }

    /// Objects updating this frame.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Objects parked outside their activation range.
    #[must_use]
    pub fn inactive_count(&self) -> usize {
        self.inactive.len()
    }

    /// Whether `id` is live and in the active set.
    #[must_use]
    pub fn is_active(&self, id: GameObjectId) -> bool {
        self.active.contains(id)
    }

    /// Objects currently updating.
    pub fn active_ids(&self) -> impl Iterator<Item = GameObjectId> + '_ {
        self.active.objects().iter().copied()
    }

    /// Live objects in the pool, active or not.
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        self.pool.allocated_count()
    }

    /// Applies queued additions and removals, then returns destroyed objects
    /// to the pool. Components of factory-built objects are reset and
    /// stocked for the next object of the same kind.
    pub fn commit_updates(&mut self) {
        self.active.commit_updates();
        for id in self.marked_for_death.drain() {
            debug!("releasing {id:?}");
            if let Some(object) = self.pool.get_mut(id) {
                if let Some(kind) = object.state().spawn_kind {
                    self.stock.retire(kind, object);
                }
            }
            self.pool.release(id);
        }
    }

    /// Runs one frame: activation bookkeeping, then every phase pass over
    /// the active objects, then the destroy requests raised meanwhile.
    pub fn update(&mut self, time_delta: f32, ctx: &mut SimContext) {
        self.commit_updates();
        if let Some(focus) = ctx.camera_focus() {
            self.deactivate_out_of_range(focus);
            self.reactivate_in_range(focus);
        }

        let count = self.active.len();
        for index in 0..count {
            if let Some(object) = self.active_object_mut(index) {
                object.commit_updates();
            }
        }
        for phase in Phase::ALL {
            for index in 0..count {
                if let Some(object) = self.active_object_mut(index) {
                    object.update_phase(phase, time_delta, ctx);
                }
            }
        }

        for id in ctx.lifecycle.drain_destroys() {
            self.destroy(id);
        }
    }

    /// Splits the manager so the collision system can route hits to
    /// objects while the time and request services stay borrowable.
    pub fn hit_router<'a>(
        &'a mut self,
        time: &'a mut TimeSystem,
        requests: &'a mut LifecycleRequests,
    ) -> HitRouter<'a> {
        HitRouter {
            objects: self,
            time,
            requests,
        }
    }

    fn active_object_mut(&mut self, index: usize) -> Option<&mut GameObject> {
        let id = *self.active.objects().get(index)?;
        self.pool.get_mut(id)
    }

    fn deactivate_out_of_range(&mut self, focus: glam::Vec2) {
        let Self {
            pool,
            active,
            inactive,
            marked_for_death,
            ..
        } = self;
        let objects = active.objects_mut();
        for index in (0..objects.len()).rev() {
            let Some(&id) = objects.get(index) else {
                continue;
            };
            let Some(state) = pool.get(id).map(GameObject::state) else {
                continue;
            };
            if state.in_activation_range(focus) {
                continue;
            }
            let parked = if state.destroy_on_deactivation {
                marked_for_death.add(id)
            } else {
                inactive.add(id)
            };
            if parked.is_ok() {
                objects.swap_with_last(index);
                objects.remove_last();
            }
        }
    }

    fn reactivate_in_range(&mut self, focus: glam::Vec2) {
        let Self {
            pool,
            active,
            inactive,
            ..
        } = self;
        let x_of = |id: &GameObjectId| {
            OrderedFloat(pool.get(*id).map_or(f32::NEG_INFINITY, |object| object.state().position.x))
        };
        inactive.sort_by(false, |a, b| x_of(a).cmp(&x_of(b)));
        // Radii may change while parked, so the bound is taken fresh.
        let max_activation_radius = inactive
            .iter()
            .filter_map(|id| pool.get(*id))
            .map(|object| object.state().activation_radius)
            .filter(|radius| *radius != ALWAYS_ACTIVE)
            .fold(0.0_f32, f32::max);

        for index in (0..inactive.len()).rev() {
            let Some(&id) = inactive.get(index) else {
                continue;
            };
            let Some(state) = pool.get(id).map(GameObject::state) else {
                continue;
            };
            if state.in_activation_range(focus) {
                if active.objects_mut().add(id).is_ok() {
                    inactive.swap_with_last(index);
                    inactive.remove_last();
                }
            } else if state.position.x - focus.x < -max_activation_radius {
                break;
            }
        }
    }
}

/// Routes collision hits to the objects involved.
#[derive(Debug)]
pub struct HitRouter<'a> {
    objects: &'a mut GameObjectManager,
    time: &'a mut TimeSystem,
    requests: &'a mut LifecycleRequests,
}

impl HitReactionDispatcher for HitRouter<'_> {
    fn received_hit(&mut self, victim: GameObjectId, attacker: GameObjectId, hit_type: HitType) -> bool {
        let Some(attacker_state) = self.objects.get(attacker).map(|object| *object.state()) else {
            return false;
        };
        let Some(object) = self.objects.get_mut(victim) else {
            return false;
        };
        let mut hit = HitContext {
            time: &mut *self.time,
            requests: &mut *self.requests,
        };
        object.received_hit(&attacker_state, hit_type, &mut hit)
    }

    fn hit_victim(&mut self, attacker: GameObjectId, victim: GameObjectId, hit_type: HitType, accepted: bool) {
        let Some(victim_state) = self.objects.get(victim).map(|object| *object.state()) else {
            return;
        };
        let Some(object) = self.objects.get_mut(attacker) else {
            return;
        };
        let mut hit = HitContext {
            time: &mut *self.time,
            requests: &mut *self.requests,
        };
        object.hit_victim(&victim_state, hit_type, accepted, &mut hit);
    }
}
