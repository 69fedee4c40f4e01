//! Sparse sets over a bounded domain.
//!
//! Based on <https://research.swtch.com/sparse>: a dense `values` array of
//! the present elements plus a sparse `indices` array giving each element's
//! position in `values`. Membership, insertion and removal are O(1) and
//! iteration is O(count), independent of the domain size.

pub(crate) mod storage;

pub use storage::{
    ExtEntries, HeapEntries, InlineEntries, SIZE_PER_ELEMENT, SetStorage, len_for, size_for,
};

use crate::check::check;
use crate::realloc::{AllocError, Heap, Reallocator};
use core::fmt::{Debug, Formatter};
use core::iter::Copied;
use core::slice;

/// Sparse set with arrays embedded in the value.
pub type InlineSparseSet<const MAX: usize> = SparseSet<InlineEntries<MAX>>;

/// Sparse set over a caller-supplied buffer.
pub type ExtSparseSet<'a> = SparseSet<ExtEntries<'a>>;

/// Sparse set owning a buffer from a [`Reallocator`].
pub type HeapSparseSet<A = Heap> = SparseSet<HeapEntries<A>>;

/// A set of `u16` elements in `[0, max)`.
///
/// Elements are kept in a dense order that is stable until the next removal:
/// [`remove`](SparseSet::remove) moves the last element into the freed
/// position.
///
/// # Examples
/// ```
/// use light_slots::InlineSparseSet;
///
/// let mut set = InlineSparseSet::<8>::new();
/// set.insert(3);
/// set.insert(5);
/// set.remove(3);
/// assert_eq!(set.count(), 1);
/// assert_eq!(set.value_at(0), 5);
/// assert!(set.contains(5));
/// assert!(!set.contains(3));
/// ```
#[derive(Clone, Copy, Default)]
pub struct SparseSet<S> {
    storage: S,
    count: u16,
}

impl<const MAX: usize> InlineSparseSet<MAX> {
    /// Creates an empty set.
    ///
    /// # Panics
    /// Panics if `MAX == 0` or `MAX > u16::MAX`.
    pub fn new() -> Self {
        Self::from_storage(InlineEntries::new())
    }

    /// Creates a set holding `elems`, inserted in order.
    ///
    /// Duplicates keep their first position.
    ///
    /// # Panics
    /// Panics if `MAX == 0`, `MAX > u16::MAX` or any element is `>= MAX`.
    ///
    /// # Examples
    /// ```
    /// use light_slots::InlineSparseSet;
    ///
    /// let set = InlineSparseSet::<8>::from_slice(&[6, 2, 6]);
    /// assert_eq!(set.as_slice(), [6, 2]);
    /// ```
    #[inline]
    pub fn from_slice(elems: &[u16]) -> Self {
        let mut set = Self::new();
        set.extend(elems.iter().copied());
        set
    }

    /// Creates an empty set in a `const` context.
    ///
    /// # Compiler Errors
    /// Prevents compilation if `MAX == 0` or `MAX > u16::MAX`.
    pub const fn const_empty() -> Self {
        Self {
            storage: InlineEntries::const_empty(),
            count: 0,
        }
    }
}

impl<'a> ExtSparseSet<'a> {
    /// Creates an empty set over the first [`len_for(max)`] entries of `mem`
    /// and returns the unused tail of `mem`.
    ///
    /// # Panics
    /// Panics (with contract checks enabled) if `max == 0` or `mem` is too
    /// short.
    ///
    /// # Examples
    /// ```
    /// use light_slots::{ExtSparseSet, sparse_set::len_for};
    ///
    /// let mut mem = vec![0u16; len_for(10) + len_for(20)];
    /// let (mut small, rest) = ExtSparseSet::new(10, &mut mem);
    /// let (mut large, rest) = ExtSparseSet::new(20, rest);
    /// assert!(rest.is_empty());
    /// small.insert(9);
    /// large.insert(19);
    /// assert_eq!(small.count() + large.count(), 2);
    /// ```
    ///
    /// [`len_for(max)`]: len_for
    pub fn new(max: u16, mem: &'a mut [u16]) -> (Self, &'a mut [u16]) {
        let (storage, rest) = ExtEntries::carve(max, mem);
        (Self::from_storage(storage), rest)
    }
}

impl HeapSparseSet {
    /// Creates an empty set over `max` elements on the global heap.
    ///
    /// # Errors
    /// Returns [`AllocError::OutOfMemory`] if the arrays cannot be allocated.
    pub fn new(max: u16) -> Result<Self, AllocError> {
        Self::with_allocator(max, Heap)
    }

    /// Creates a set over `max` elements on the global heap holding `elems`,
    /// inserted in order.
    ///
    /// # Errors
    /// Returns [`AllocError::OutOfMemory`] if the arrays cannot be allocated.
    ///
    /// # Panics
    /// Panics (with contract checks enabled) if any element is `>= max`.
    pub fn from_slice(max: u16, elems: &[u16]) -> Result<Self, AllocError> {
        let mut set = Self::new(max)?;
        set.extend(elems.iter().copied());
        Ok(set)
    }
}

impl<A: Reallocator> HeapSparseSet<A> {
    /// Creates an empty set over `max` elements, taking its arrays from
    /// `alloc`.
    ///
    /// # Errors
    /// Returns the allocator's failure unchanged.
    pub fn with_allocator(max: u16, alloc: A) -> Result<Self, AllocError> {
        Ok(Self::from_storage(HeapEntries::allocate(max, alloc)?))
    }

    /// Returns `false` for the [`Default`] value, which holds no buffer.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.storage.is_initialized()
    }

    /// The allocator backing this set.
    pub fn allocator(&self) -> &A {
        self.storage.allocator()
    }
}

impl<S: SetStorage> SparseSet<S> {
    /// Wraps `storage` as an empty set. Existing array contents are ignored.
    pub fn from_storage(storage: S) -> Self {
        Self { storage, count: 0 }
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns `true` if `elem` is present.
    ///
    /// # Panics
    /// Panics if `elem >= max()`.
    #[inline]
    pub fn contains(&self, elem: u16) -> bool {
        check!(elem < self.max(), "Element {elem} out of bounds");
        let pos = self.storage.indices()[elem as usize];
        pos < self.count && self.storage.values()[pos as usize] == elem
    }

    /// Inserts `elem` and returns its dense position.
    ///
    /// Inserting an element that is already present changes nothing and
    /// returns its current position.
    ///
    /// # Panics
    /// Panics if `elem >= max()`, or if `elem` is absent and the set is full.
    #[inline]
    pub fn insert(&mut self, elem: u16) -> u16 {
        if self.contains(elem) {
            return self.storage.indices()[elem as usize];
        }
        check!(self.count < self.max(), "Set full, cannot insert {elem}");

        let pos = self.count;
        let (values, indices) = self.storage.split_mut();
        values[pos as usize] = elem;
        indices[elem as usize] = pos;
        self.count += 1;
        pos
    }

    /// Removes `elem` if present, moving the last element into its position.
    ///
    /// # Panics
    /// Panics if `elem >= max()`.
    #[inline]
    pub fn remove(&mut self, elem: u16) {
        if !self.contains(elem) {
            return;
        }

        let (values, indices) = self.storage.split_mut();
        let last = values[self.count as usize - 1];
        let pos = indices[elem as usize];
        values[pos as usize] = last;
        indices[last as usize] = pos;
        self.count -= 1;
    }

    /// Removes all elements. O(1); array contents are left as they are.
    #[inline]
    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Returns the element at dense position `idx`.
    ///
    /// # Panics
    /// Panics if `idx >= count()`.
    #[inline]
    pub fn value_at(&self, idx: u16) -> u16 {
        check!(idx < self.count, "Position {idx} out of bounds");
        self.storage.values()[idx as usize]
    }

    /// Number of elements present.
    #[inline]
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Returns `true` if no element is present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Domain size: valid elements are `0..max()`.
    #[inline]
    pub fn max(&self) -> u16 {
        self.storage.max()
    }

    /// The present elements in dense order.
    #[inline]
    pub fn as_slice(&self) -> &[u16] {
        &self.storage.values()[..self.count as usize]
    }

    /// Returns an iterator over the present elements in dense order.
    #[inline]
    pub fn iter(&self) -> Copied<slice::Iter<'_, u16>> {
        self.as_slice().iter().copied()
    }
}

impl<S: SetStorage> Extend<u16> for SparseSet<S> {
    fn extend<I: IntoIterator<Item = u16>>(&mut self, iter: I) {
        for elem in iter {
            self.insert(elem);
        }
    }
}

impl<'set, S: SetStorage> IntoIterator for &'set SparseSet<S> {
    type Item = u16;
    type IntoIter = Copied<slice::Iter<'set, u16>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: SetStorage> Debug for SparseSet<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
