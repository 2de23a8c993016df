//! Preallocated object arena with generation-checked handles.
//!
//! Every instance is built when the pool is created. `allocate` hands out a
//! [`PoolHandle`] to a free slot and `release` resets the instance and bumps
//! the slot's generation, so stale handles stop resolving instead of
//! aliasing whatever reuses the slot.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use log::{trace, warn};

use crate::fixed_array::FixedSizeArray;

/// Hook run on an instance when it returns to its pool.
pub trait Poolable {
    /// Restores the instance to its freshly constructed state.
    fn reset(&mut self);
}

/// Index plus generation identifying one allocation from an [`ObjectPool`].
pub struct PoolHandle<T> {
    index: u32,
    generation: u32,
    marker: PhantomData<fn() -> T>,
}

impl<T> PoolHandle<T> {
    pub(crate) const fn from_raw(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            marker: PhantomData,
        }
    }

    /// Slot index inside the pool.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot at allocation time.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl<T> Clone for PoolHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PoolHandle<T> {}

impl<T> PartialEq for PoolHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for PoolHandle<T> {}

impl<T> Hash for PoolHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for PoolHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    value: T,
    generation: u32,
    in_use: bool,
}

/// Fixed set of reusable instances.
///
/// # Examples
///
/// ```
/// use ledge::pool::{ObjectPool, Poolable};
///
/// #[derive(Default)]
/// struct Bullet { fired: bool }
/// impl Poolable for Bullet {
///     fn reset(&mut self) { self.fired = false; }
/// }
///
/// let mut pool = ObjectPool::new(1, Bullet::default);
/// let bullet = pool.allocate().unwrap();
/// pool.get_mut(bullet).unwrap().fired = true;
/// assert!(pool.allocate().is_none());
/// assert!(pool.release(bullet));
/// assert!(pool.get(bullet).is_none());
/// ```
#[derive(Debug)]
pub struct ObjectPool<T> {
    slots: Vec<Slot<T>>,
    free: FixedSizeArray<u32>,
}

impl<T: Poolable> ObjectPool<T> {
    /// Builds `capacity` instances with `fill`.
    ///
    /// Capacities beyond `u32::MAX` are truncated.
    pub fn new<F>(capacity: usize, mut fill: F) -> Self
    where
        F: FnMut() -> T,
    {
        let slot_count = capacity.min(u32::MAX as usize);
        let mut slots = Vec::with_capacity(slot_count);
        let mut free = FixedSizeArray::new(slot_count);
        // Free list is popped from the end, so push in reverse to hand out
        // low indices first.
        for index in (0..slot_count).rev() {
            slots.push(Slot {
                value: fill(),
                generation: 0,
                in_use: false,
            });
            if let Ok(slot_index) = u32::try_from(index) {
                if free.add(slot_index).is_err() {
                    break;
                }
            }
        }
        Self { slots, free }
    }

    /// Takes a free instance, or `None` when the pool is exhausted.
    pub fn allocate(&mut self) -> Option<PoolHandle<T>> {
        let Some(index) = self.free.remove_last() else {
            warn!("object pool exhausted ({} slots)", self.slots.len());
            return None;
        };
        let slot = self.slots.get_mut(index as usize)?;
        slot.in_use = true;
        trace!("pool allocate #{index}v{}", slot.generation);
        Some(PoolHandle::from_raw(index, slot.generation))
    }

    /// Resets the instance behind `handle` and makes its slot available.
    ///
    /// Returns `false` for stale or foreign handles.
    pub fn release(&mut self, handle: PoolHandle<T>) -> bool {
        let Some(slot) = self.live_slot_mut(handle) else {
            warn!("release of stale pool handle {handle:?}");
            return false;
        };
        slot.value.reset();
        slot.in_use = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.add(handle.index).is_ok()
    }

    /// Slot behind `handle`, or `None` once the handle is stale.
    #[must_use]
    pub fn get(&self, handle: PoolHandle<T>) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.in_use && slot.generation == handle.generation)
            .map(|slot| &slot.value)
    }

    /// Mutable slot behind `handle`; stale handles yield `None`.
    pub fn get_mut(&mut self, handle: PoolHandle<T>) -> Option<&mut T> {
        self.live_slot_mut(handle).map(|slot| &mut slot.value)
    }

    /// Borrows two distinct live instances mutably at once.
    pub fn get_pair_mut(
        &mut self,
        first: PoolHandle<T>,
        second: PoolHandle<T>,
    ) -> Option<(&mut T, &mut T)> {
        if first.index == second.index {
            return None;
        }
        let (low, high, swapped) = if first.index < second.index {
            (first, second, false)
        } else {
            (second, first, true)
        };
        if high.index as usize >= self.slots.len() {
            return None;
        }
        let (head, tail) = self.slots.split_at_mut(high.index as usize);
        let low_slot = head.get_mut(low.index as usize)?;
        let high_slot = tail.first_mut()?;
        let live = |slot: &Slot<T>, handle: PoolHandle<T>| {
            slot.in_use && slot.generation == handle.generation
        };
        if !live(low_slot, low) || !live(high_slot, high) {
            return None;
        }
        if swapped {
            Some((&mut high_slot.value, &mut low_slot.value))
        } else {
            Some((&mut low_slot.value, &mut high_slot.value))
        }
    }

    /// Whether `handle` still refers to a live allocation.
    #[must_use]
    pub fn is_live(&self, handle: PoolHandle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots currently handed out.
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn live_slot_mut(&mut self, handle: PoolHandle<T>) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.in_use && slot.generation == handle.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[derive(Debug, Default)]
    struct Counter {
        value: u32,
        resets: u32,
    }

    impl Poolable for Counter {
        fn reset(&mut self) {
            self.value = 0;
            self.resets += 1;
        }
    }

    #[fixture]
    fn pool() -> ObjectPool<Counter> {
        ObjectPool::new(2, Counter::default)
    }

    #[rstest]
    fn allocate_until_exhausted(mut pool: ObjectPool<Counter>) {
        assert!(pool.allocate().is_some());
        assert!(pool.allocate().is_some());
        assert!(pool.allocate().is_none());
        assert_eq!(pool.allocated_count(), 2);
    }

    #[rstest]
    fn release_runs_reset_and_invalidates_handle(mut pool: ObjectPool<Counter>) {
        let handle = pool.allocate().expect("free slot");
        pool.get_mut(handle).expect("live").value = 7;
        assert!(pool.release(handle));
        assert!(pool.get(handle).is_none());
        assert!(!pool.release(handle));

        let reused = pool.allocate().expect("slot returned");
        assert_eq!(reused.index(), handle.index());
        assert_ne!(reused, handle);
        let counter = pool.get(reused).expect("live");
        assert_eq!(counter.value, 0);
        assert_eq!(counter.resets, 1);
    }

    #[rstest]
    fn pair_borrow_preserves_argument_order(mut pool: ObjectPool<Counter>) {
        let first = pool.allocate().expect("free slot");
        let second = pool.allocate().expect("free slot");
        {
            let (a, b) = pool.get_pair_mut(second, first).expect("distinct");
            a.value = 2;
            b.value = 1;
        }
        assert_eq!(pool.get(first).map(|c| c.value), Some(1));
        assert_eq!(pool.get(second).map(|c| c.value), Some(2));
        assert!(pool.get_pair_mut(first, first).is_none());
    }
}
