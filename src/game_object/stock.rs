//! Components handed back by released objects, kept for reuse.
//!
//! A released object built by the factory returns its components here,
//! each [`Component::reset`] to its built configuration and grouped by the
//! object's [`SpawnKind`]. The next object of that kind takes the whole set
//! back instead of boxing new components. The set vectors are recycled
//! too, so once every kind has been seen a spawn-release cycle allocates
//! nothing.

use hashbrown::HashMap;
use log::trace;

use super::{Component, GameObject};
use crate::factory::SpawnKind;
use crate::fixed_array::CapacityError;

type ComponentSet = Vec<Box<dyn Component>>;

/// Reset components of released objects, grouped by spawn kind.
#[derive(Debug, Default)]
pub struct ComponentStock {
    sets: HashMap<SpawnKind, Vec<ComponentSet>>,
    spare: Vec<ComponentSet>,
}

impl ComponentStock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets every component of `object` and stores them as one set for
    /// `kind`. Leaves the object without components.
    pub fn retire(&mut self, kind: SpawnKind, object: &mut GameObject) {
        let mut set = self.spare.pop().unwrap_or_default();
        set.extend(object.drain_components().map(|mut component| {
            component.reset();
            component
        }));
        if set.is_empty() {
            self.spare.push(set);
            return;
        }
        trace!("stocked {} components for {kind:?}", set.len());
        self.sets.entry(kind).or_default().push(set);
    }

    /// Moves a stored set for `kind` onto `object`. Returns `false` when no
    /// set is stored.
    ///
    /// # Errors
    /// Returns [`CapacityError`] when `object` has no room for the set; the
    /// components that did not fit are dropped.
    pub fn restore(&mut self, kind: SpawnKind, object: &mut GameObject) -> Result<bool, CapacityError> {
        let Some(mut set) = self.sets.get_mut(&kind).and_then(Vec::pop) else {
            return Ok(false);
        };
        let attached = set
            .drain(..)
            .try_for_each(|component| object.add_component(component));
        self.spare.push(set);
        attached.map(|()| true)
    }

    /// Number of sets waiting for an object of `kind`.
    #[must_use]
    pub fn available(&self, kind: SpawnKind) -> usize {
        self.sets.get(&kind).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::LifetimeComponent;
    use crate::game_object::ComponentKind;
    use rstest::rstest;

    const SPARK: SpawnKind = SpawnKind(3);

    #[rstest]
    fn retired_sets_come_back_in_order() {
        let mut stock = ComponentStock::new();
        let mut old = GameObject::new(2);
        old.add_component(Box::new(LifetimeComponent::expiring(1.0)))
            .expect("room");
        old.commit_updates();
        stock.retire(SPARK, &mut old);
        assert_eq!(old.component_count(), 0);
        assert_eq!(stock.available(SPARK), 1);

        let mut fresh = GameObject::new(2);
        assert!(stock.restore(SPARK, &mut fresh).expect("room"));
        fresh.commit_updates();
        assert!(fresh.find(ComponentKind::Lifetime).is_some());
        assert_eq!(stock.available(SPARK), 0);
    }

    #[rstest]
    fn unknown_kinds_restore_nothing() {
        let mut stock = ComponentStock::new();
        let mut object = GameObject::new(1);
        assert!(!stock.restore(SPARK, &mut object).expect("no set"));
        stock.retire(SPARK, &mut object);
        assert_eq!(stock.available(SPARK), 0);
    }
}
