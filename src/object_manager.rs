//! Commit-buffered collections of simulation objects.
//!
//! Additions and removals are queued and only applied by
//! [`ObjectManager::commit_updates`], so members may add or remove objects
//! while the collection is being iterated without disturbing the pass.

use std::fmt;

use log::debug;

use crate::fixed_array::{CapacityError, FixedSizeArray};
use crate::phase::Phase;

/// An object that can be stored in an [`ObjectManager`].
pub trait Managed {
    /// Identity used to find the object again for removal.
    type Key: Copy + PartialEq + fmt::Debug;

    /// The object's identity.
    fn key(&self) -> Self::Key;
}

/// An object that runs in a particular [`Phase`].
pub trait Phased {
    /// Phase the object updates in.
    fn phase(&self) -> Phase;
}

/// Additions and removals waiting for the next commit.
#[derive(Debug)]
pub struct PendingChanges<T: Managed> {
    additions: FixedSizeArray<T>,
    removals: FixedSizeArray<T::Key>,
}

impl<T: Managed> PendingChanges<T> {
    fn new(capacity: usize) -> Self {
        Self {
            additions: FixedSizeArray::new(capacity),
            removals: FixedSizeArray::new(capacity),
        }
    }

    /// Queues `item` for addition.
    ///
    /// # Errors
    /// Returns [`CapacityError`] when the addition queue is full.
    pub fn add(&mut self, item: T) -> Result<(), CapacityError> {
        self.additions.add(item)
    }

    /// Queues removal of the object identified by `key`.
    ///
    /// Removing an object whose addition is still queued cancels the
    /// addition instead.
    ///
    /// # Errors
    /// Returns [`CapacityError`] when the removal queue is full.
    pub fn remove(&mut self, key: T::Key) -> Result<(), CapacityError> {
        if let Some(index) = self.additions.position(|item| item.key() == key) {
            self.additions.remove(index);
            return Ok(());
        }
        self.removals.add(key)
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    /// Number of queued additions.
    #[must_use]
    pub fn additions(&self) -> usize {
        self.additions.len()
    }

    /// Number of queued removals.
    #[must_use]
    pub fn removals(&self) -> usize {
        self.removals.len()
    }
}

/// Ordered collection whose membership changes at commit points.
///
/// # Examples
///
/// ```
/// use ledge::object_manager::{Managed, ObjectManager};
///
/// #[derive(Debug)]
/// struct Ticker(u8, u32);
/// impl Managed for Ticker {
///     type Key = u8;
///     fn key(&self) -> u8 { self.0 }
/// }
///
/// let mut tickers = ObjectManager::new(4);
/// tickers.add(Ticker(1, 0)).unwrap();
/// assert_eq!(tickers.len(), 0);
/// tickers.update(|ticker, _| ticker.1 += 1);
/// assert_eq!(tickers.find(1).map(|t| t.1), Some(1));
/// ```
#[derive(Debug)]
pub struct ObjectManager<T: Managed> {
    objects: FixedSizeArray<T>,
    pending: PendingChanges<T>,
}

impl<T: Managed> ObjectManager<T> {
    /// Creates a manager holding at most `capacity` live objects.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            objects: FixedSizeArray::new(capacity),
            pending: PendingChanges::new(capacity),
        }
    }

    /// Queues `item` for addition at the next commit.
    ///
    /// # Errors
    /// Returns [`CapacityError`] when the addition queue is full.
    pub fn add(&mut self, item: T) -> Result<(), CapacityError> {
        self.pending.add(item)
    }

    /// Queues removal of `key` at the next commit.
    ///
    /// # Errors
    /// Returns [`CapacityError`] when the removal queue is full.
    pub fn remove(&mut self, key: T::Key) -> Result<(), CapacityError> {
        self.pending.remove(key)
    }

    /// Applies queued removals, then queued additions.
    ///
    /// Returns `true` when membership changed. A second call without new
    /// queued work does nothing.
    pub fn commit_updates(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        for key in self.pending.removals.drain() {
            match self.objects.position(|item| item.key() == key) {
                Some(index) => {
                    self.objects.remove(index);
                }
                None => debug!("commit: {key:?} was not a member"),
            }
        }
        for item in self.pending.additions.drain() {
            if self.objects.add(item).is_err() {
                break;
            }
        }
        true
    }

    /// Commits, then visits every live member in order.
    ///
    /// The visitor gets the pending queues so it can add or remove objects;
    /// those changes apply at the next commit.
    pub fn update<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut T, &mut PendingChanges<T>),
    {
        self.commit_updates();
        for item in self.objects.iter_mut() {
            visit(item, &mut self.pending);
        }
    }

    /// Looks up a live member by key.
    #[must_use]
    pub fn find(&self, key: T::Key) -> Option<&T> {
        self.objects.iter().find(|item| item.key() == key)
    }

    /// Mutable lookup of a live member by key.
    pub fn find_mut(&mut self, key: T::Key) -> Option<&mut T> {
        self.objects.iter_mut().find(|item| item.key() == key)
    }

    /// Whether `key` is a live member (queued changes are not considered).
    #[must_use]
    pub fn contains(&self, key: T::Key) -> bool {
        self.find(key).is_some()
    }

    /// Number of live members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether there are no live members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Changes waiting for the next commit.
    #[must_use]
    pub const fn pending(&self) -> &PendingChanges<T> {
        &self.pending
    }

    /// Live members in order.
    #[must_use]
    pub const fn objects(&self) -> &FixedSizeArray<T> {
        &self.objects
    }

    /// Direct access to the live array for callers that reorganise members
    /// in place.
    pub fn objects_mut(&mut self) -> &mut FixedSizeArray<T> {
        &mut self.objects
    }

    /// Takes every live and queued member out, dropping queued removals.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        let Self { objects, pending } = self;
        pending.removals.clear();
        objects.drain().chain(pending.additions.drain())
    }

    /// Drops every live and queued member.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.pending.additions.clear();
        self.pending.removals.clear();
    }
}

/// An [`ObjectManager`] that keeps members sorted by [`Phase`].
///
/// The sort is stable, so members of the same phase keep insertion order.
#[derive(Debug)]
pub struct PhasedObjectManager<T: Managed + Phased> {
    inner: ObjectManager<T>,
}

impl<T: Managed + Phased> PhasedObjectManager<T> {
    /// Creates a manager holding at most `capacity` members.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: ObjectManager::new(capacity),
        }
    }

    /// Queues `item` for addition at the next commit.
    ///
    /// # Errors
    /// Returns [`CapacityError`] when the addition queue is full.
    pub fn add(&mut self, item: T) -> Result<(), CapacityError> {
        self.inner.add(item)
    }

    /// Queues removal of `key` at the next commit.
    ///
    /// # Errors
    /// Returns [`CapacityError`] when the removal queue is full.
    pub fn remove(&mut self, key: T::Key) -> Result<(), CapacityError> {
        self.inner.remove(key)
    }

    /// Applies queued changes and restores phase order.
    pub fn commit_updates(&mut self) -> bool {
        let changed = self.inner.commit_updates();
        self.inner
            .objects
            .sort_by(false, |a, b| a.phase().cmp(&b.phase()));
        changed
    }

    /// Commits, then visits every member in phase order.
    pub fn update<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut T, &mut PendingChanges<T>),
    {
        self.commit_updates();
        let ObjectManager { objects, pending } = &mut self.inner;
        for item in objects.iter_mut() {
            visit(item, pending);
        }
    }

    /// Visits only the members registered for `phase`.
    ///
    /// Does not commit; call [`Self::commit_updates`] once per frame before
    /// the phase passes.
    pub fn update_phase<F>(&mut self, phase: Phase, mut visit: F)
    where
        F: FnMut(&mut T, &mut PendingChanges<T>),
    {
        let ObjectManager { objects, pending } = &mut self.inner;
        for item in objects.iter_mut().filter(|item| item.phase() == phase) {
            visit(item, pending);
        }
    }

    /// Looks up a live member by key.
    #[must_use]
    pub fn find(&self, key: T::Key) -> Option<&T> {
        self.inner.find(key)
    }

    /// Mutable lookup of a live member by key.
    pub fn find_mut(&mut self, key: T::Key) -> Option<&mut T> {
        self.inner.find_mut(key)
    }

    /// Live members in phase order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.inner.objects.iter()
    }

    /// Mutable live members in phase order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.inner.objects.iter_mut()
    }

    /// Number of live members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether there are no live members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Drops every live and queued member.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Takes every live and queued member out.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.inner.drain()
    }
}
