//! Fixed-capacity array used by every per-frame collection.
//!
//! Storage is reserved once at construction and never grows, so adding and
//! removing elements during a frame never touches the allocator. Adding past
//! capacity is rejected and logged rather than growing the buffer.

use std::cmp::Ordering;

use log::warn;
use thiserror::Error;

use crate::constants::LINEAR_SEARCH_CUTOFF;

/// Returned when an element is added to a full [`FixedSizeArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("fixed-size array is full (capacity {capacity})")]
pub struct CapacityError {
    /// Capacity of the array that rejected the element.
    pub capacity: usize,
}

/// Ordering function stored alongside an array for sorting and searching.
pub type Comparator<T> = fn(&T, &T) -> Ordering;

/// A vector with a hard capacity and a lazily maintained sort order.
///
/// `add`, `set` and `swap_with_last` mark the contents unsorted; `sort`
/// only does work when the contents are unsorted or the caller forces it.
///
/// # Examples
///
/// ```
/// use ledge::FixedSizeArray;
///
/// let mut values = FixedSizeArray::with_comparator(2, |a: &i32, b: &i32| a.cmp(b));
/// values.add(9).unwrap();
/// values.add(3).unwrap();
/// assert!(values.add(4).is_err());
/// values.sort(false);
/// assert_eq!(values.as_slice(), &[3, 9]);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeArray<T> {
    contents: Vec<T>,
    capacity: usize,
    sorted: bool,
    comparator: Option<Comparator<T>>,
}

impl<T> FixedSizeArray<T> {
    /// Creates an empty array able to hold `capacity` elements.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            contents: Vec::with_capacity(capacity),
            capacity,
            sorted: true,
            comparator: None,
        }
    }

    /// Creates an empty array that sorts and searches with `comparator`.
    #[must_use]
    pub fn with_comparator(capacity: usize, comparator: Comparator<T>) -> Self {
        let mut array = Self::new(capacity);
        array.comparator = Some(comparator);
        array
    }

    /// Replaces the comparator; the contents are treated as unsorted.
    pub fn set_comparator(&mut self, comparator: Comparator<T>) {
        self.comparator = Some(comparator);
        self.sorted = false;
    }

    /// Appends `item`, or rejects it when the array is full.
    ///
    /// # Errors
    /// Returns [`CapacityError`] and leaves the array untouched when the
    /// array already holds `capacity` elements.
    pub fn add(&mut self, item: T) -> Result<(), CapacityError> {
        if self.contents.len() >= self.capacity {
            warn!("fixed-size array full at {}; element dropped", self.capacity);
            return Err(CapacityError {
                capacity: self.capacity,
            });
        }
        self.contents.push(item);
        self.sorted = false;
        Ok(())
    }

    /// Removes the element at `index`, shifting later elements down.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.contents.len()).then(|| self.contents.remove(index))
    }

    /// Removes and returns the last element.
    pub fn remove_last(&mut self) -> Option<T> {
        self.contents.pop()
    }

    /// Swaps the element at `index` with the last one.
    ///
    /// Paired with [`Self::remove_last`] this is an O(1) unordered removal.
    pub fn swap_with_last(&mut self, index: usize) {
        let len = self.contents.len();
        if len > 1 && index < len - 1 {
            self.contents.swap(index, len - 1);
            self.sorted = false;
        }
    }

    /// Replaces the element at `index`, returning the previous value.
    pub fn set(&mut self, index: usize, item: T) -> Option<T> {
        let slot = self.contents.get_mut(index)?;
        self.sorted = false;
        Some(std::mem::replace(slot, item))
    }

    /// Element at `index`, if within the current length.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.contents.get(index)
    }

    /// Mutable access to the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.contents.get_mut(index)
    }

    /// The most recently added element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.contents.last()
    }

    /// Empties the array without releasing its storage.
    pub fn clear(&mut self) {
        self.contents.clear();
        self.sorted = true;
    }

    /// Moves every element out in order, leaving the array empty.
    pub fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.sorted = true;
        self.contents.drain(..)
    }

    /// Number of elements held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Whether the array holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Fixed element limit set at construction.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether another [`Self::add`] would fail.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.contents.len() >= self.capacity
    }

    /// Whether the contents are known to be in comparator order.
    #[must_use]
    pub const fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// The elements in storage order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.contents
    }

    /// Iterates the elements in storage order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.contents.iter()
    }

    /// Mutable iteration in storage order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.contents.iter_mut()
    }

    /// Sorts with the stored comparator unless already sorted.
    ///
    /// Does nothing when no comparator is set. The sort is stable.
    pub fn sort(&mut self, force: bool) {
        if let Some(comparator) = self.comparator {
            if !self.sorted || force {
                self.contents.sort_by(comparator);
                self.sorted = true;
            }
        }
    }

    /// Sorts with an ad-hoc ordering unless already sorted.
    ///
    /// Use this when the order depends on state outside the elements, such
    /// as positions looked up in an arena.
    pub fn sort_by<F>(&mut self, force: bool, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if !self.sorted || force {
            self.contents.sort_by(compare);
            self.sorted = true;
        }
    }

    /// Locates `item`, returning its index.
    ///
    /// A sorted array larger than [`LINEAR_SEARCH_CUTOFF`] is binary
    /// searched with the comparator. Otherwise the contents are scanned
    /// linearly with the comparator, or with `==` when there is no
    /// comparator or `ignore_comparator` is set.
    #[must_use]
    pub fn find(&self, item: &T, ignore_comparator: bool) -> Option<usize>
    where
        T: PartialEq,
    {
        match self.comparator.filter(|_| !ignore_comparator) {
            Some(comparator)
                if self.sorted && self.contents.len() > LINEAR_SEARCH_CUTOFF =>
            {
                self.contents
                    .binary_search_by(|candidate| comparator(candidate, item))
                    .ok()
            }
            Some(comparator) => self
                .contents
                .iter()
                .position(|candidate| comparator(candidate, item) == Ordering::Equal),
            None => self.contents.iter().position(|candidate| candidate == item),
        }
    }

    /// Index of the first element matching `predicate`.
    pub fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.contents.iter().position(predicate)
    }
}

impl<'a, T> IntoIterator for &'a FixedSizeArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.contents.iter()
    }
}
