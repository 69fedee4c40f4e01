//! Packed bit arrays with slot allocation.
//!
//! [`BitArray`] holds a set of integers in `[0, max)` as one bit per slot,
//! packed into `u64` words supplied by a [`WordStorage`]. Besides single-bit
//! and range updates it can scan for the first or last set/unset bit and
//! allocate a free slot, either the lowest one ([`set_first`]) or round-robin
//! across the domain ([`set_any`]).
//!
//! [`set_first`]: BitArray::set_first
//! [`set_any`]: BitArray::set_any

pub(crate) mod storage;

pub use storage::{
    ExtWords, HeapWords, InlineWords, WORD_BITS, WordStorage, num_slots_for, size_for, slot_count,
};

use crate::check::check;
use crate::realloc::{AllocError, Heap, Reallocator};
use core::fmt::{Debug, Formatter};
use core::iter::FusedIterator;
use tracing::trace;

/// Bit array with words embedded in the value.
///
/// `SLOTS` should only be set via const expression with [`slot_count`].
pub type InlineBitArray<const MAX: u32, const SLOTS: usize> = BitArray<InlineWords<MAX, SLOTS>>;

/// Bit array over a caller-supplied buffer.
pub type ExtBitArray<'a> = BitArray<ExtWords<'a>>;

/// Bit array owning a buffer from a [`Reallocator`].
pub type HeapBitArray<A = Heap> = BitArray<HeapWords<A>>;

/// Isolates the lowest unset bit of `v`.
///
/// ```text
/// v        ..010111
/// !v       ..101000
/// v + 1    ..011000
/// result   ..001000
/// ```
#[inline]
pub(crate) const fn mark_first_unset_bit(v: u64) -> u64 {
    !v & v.wrapping_add(1)
}

/// Extends a single set bit towards the most significant bit.
#[inline]
pub(crate) const fn fill_up(bit: u64) -> u64 {
    let mut v = bit;
    v |= v << 1;
    v |= v << 2;
    v |= v << 4;
    v |= v << 8;
    v |= v << 16;
    v |= v << 32;
    v
}

/// Extends a single set bit towards the least significant bit.
#[inline]
pub(crate) const fn fill_down(bit: u64) -> u64 {
    let mut v = bit;
    v |= v >> 1;
    v |= v >> 2;
    v |= v >> 4;
    v |= v >> 8;
    v |= v >> 16;
    v |= v >> 32;
    v
}

#[inline]
fn idxs(bit: u32) -> (usize, u64) {
    ((bit / WORD_BITS) as usize, 1 << (bit % WORD_BITS))
}

/// A set of integers in `[0, max)` stored as packed bits.
///
/// Generic over its [`WordStorage`]; see [`InlineBitArray`], [`ExtBitArray`]
/// and [`HeapBitArray`] for the provided storages.
///
/// Not synchronized. Bits at or above `max` in the last word are never set by
/// any operation.
#[derive(Clone, Copy, Default)]
pub struct BitArray<S> {
    storage: S,
    /// Word index where [`set_any`](BitArray::set_any) resumes scanning.
    last: u32,
}

impl<const MAX: u32, const SLOTS: usize> InlineBitArray<MAX, SLOTS> {
    /// Creates a new bit array with all bits unset.
    ///
    /// # Panics
    /// Panics if `MAX == 0` or `SLOTS != slot_count(MAX)`.
    ///
    /// # Examples
    /// ```
    /// use light_slots::{InlineBitArray, slot_count};
    ///
    /// let bits = InlineBitArray::<100, { slot_count(100) }>::new();
    /// assert_eq!(bits.count(), 0);
    /// assert_eq!(bits.num_slots(), 2);
    /// ```
    pub fn new() -> Self {
        Self {
            storage: InlineWords::new(),
            last: 0,
        }
    }

    /// Creates a new `const` bit array with all bits unset.
    ///
    /// Equivalent to [`new`], but callable in compile-time contexts such as
    /// const initialization.
    ///
    /// # Compiler Errors
    /// Prevents compilation if either `MAX == 0` or `SLOTS != slot_count(MAX)`
    /// with an unintuitive message like `evaluation of constant value failed`.
    ///
    /// # Examples
    /// ```
    /// use light_slots::{InlineBitArray, slot_count};
    ///
    /// const EMPTY: InlineBitArray<8, { slot_count(8) }> = InlineBitArray::const_empty();
    /// assert_eq!(EMPTY.count(), 0);
    /// ```
    ///
    /// [`new`]: BitArray::new
    pub const fn const_empty() -> Self {
        Self {
            storage: InlineWords::const_empty(),
            last: 0,
        }
    }
}

impl<'a> ExtBitArray<'a> {
    /// Creates a bit array over the first [`num_slots_for(max)`] words of
    /// `mem`, clearing them, and returns the unused tail of `mem`.
    ///
    /// # Panics
    /// Panics (with contract checks enabled) if `max == 0` or `mem` is too
    /// short.
    ///
    /// # Examples
    /// ```
    /// use light_slots::{ExtBitArray, bit_array::num_slots_for};
    ///
    /// let mut mem = [u64::MAX; 4];
    /// let (mut bits, rest) = ExtBitArray::new(100, &mut mem);
    /// assert_eq!(rest.len(), 4 - num_slots_for(100) as usize);
    /// assert_eq!(bits.count(), 0);
    /// bits.set(99);
    /// assert!(bits.is_set(99));
    /// ```
    ///
    /// [`num_slots_for(max)`]: num_slots_for
    pub fn new(max: u32, mem: &'a mut [u64]) -> (Self, &'a mut [u64]) {
        let (storage, rest) = ExtWords::carve(max, mem);
        (Self::from_storage(storage), rest)
    }
}

impl HeapBitArray {
    /// Creates a bit array with `max` unset bits on the global heap.
    ///
    /// # Errors
    /// Returns [`AllocError::OutOfMemory`] if the words cannot be allocated.
    ///
    /// # Examples
    /// ```
    /// use light_slots::HeapBitArray;
    ///
    /// let mut bits = HeapBitArray::new(1000)?;
    /// assert_eq!(bits.set_first(), 0);
    /// assert_eq!(bits.set_first(), 1);
    /// # Ok::<(), light_slots::AllocError>(())
    /// ```
    pub fn new(max: u32) -> Result<Self, AllocError> {
        Self::with_allocator(max, Heap)
    }
}

impl<A: Reallocator> HeapBitArray<A> {
    /// Creates a bit array with `max` unset bits, taking its words from
    /// `alloc`.
    ///
    /// # Errors
    /// Returns the allocator's failure unchanged.
    pub fn with_allocator(max: u32, alloc: A) -> Result<Self, AllocError> {
        Ok(Self {
            storage: HeapWords::allocate(max, alloc)?,
            last: 0,
        })
    }

    /// Returns `false` for the [`Default`] value, which holds no buffer.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.storage.is_initialized()
    }

    /// The allocator backing this array.
    pub fn allocator(&self) -> &A {
        self.storage.allocator()
    }
}

impl<S: WordStorage> BitArray<S> {
    /// Wraps `storage` and clears all of its bits.
    pub fn from_storage(storage: S) -> Self {
        let mut bits = Self { storage, last: 0 };
        bits.reset();
        bits
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Domain size: valid bits are `0..max()`.
    #[inline]
    pub fn max(&self) -> u32 {
        self.storage.max()
    }

    /// Number of backing words.
    #[inline]
    pub fn num_slots(&self) -> u32 {
        self.storage.num_slots()
    }

    /// Sets the bit at the given index.
    ///
    /// # Panics
    /// Panics if `bit >= max()`.
    #[inline]
    pub fn set(&mut self, bit: u32) {
        check!(bit < self.max(), "Bit index {bit} out of bounds");
        let (slot, mask) = idxs(bit);
        self.storage.bits_mut()[slot] |= mask;
    }

    /// Unsets the bit at the given index.
    ///
    /// # Panics
    /// Panics if `bit >= max()`.
    #[inline]
    pub fn unset(&mut self, bit: u32) {
        check!(bit < self.max(), "Bit index {bit} out of bounds");
        let (slot, mask) = idxs(bit);
        self.storage.bits_mut()[slot] &= !mask;
    }

    /// Toggles the bit at the given index and returns its previous value.
    ///
    /// # Panics
    /// Panics if `bit >= max()`.
    ///
    /// # Examples
    /// ```
    /// use light_slots::{InlineBitArray, slot_count};
    ///
    /// let mut bits = InlineBitArray::<8, { slot_count(8) }>::new();
    /// assert_eq!(bits.toggle(4), false);
    /// assert_eq!(bits.toggle(4), true);
    /// ```
    #[inline]
    pub fn toggle(&mut self, bit: u32) -> bool {
        check!(bit < self.max(), "Bit index {bit} out of bounds");
        let (slot, mask) = idxs(bit);
        let word = &mut self.storage.bits_mut()[slot];
        let was_set = *word & mask != 0;
        *word ^= mask;
        was_set
    }

    /// Returns `true` if the bit at the given index is set.
    ///
    /// # Panics
    /// Panics if `bit >= max()`.
    #[inline]
    pub fn is_set(&self, bit: u32) -> bool {
        check!(bit < self.max(), "Bit index {bit} out of bounds");
        let (slot, mask) = idxs(bit);
        self.storage.bits()[slot] & mask != 0
    }

    /// Sets every bit in the inclusive range `begin..=end`.
    ///
    /// Touches only the words the range spans: partial masks on the first and
    /// last word, whole-word fills in between. An allocation cursor inside
    /// the spanned words moves to `end`'s word.
    ///
    /// # Panics
    /// Panics if `begin > end` or `end >= max()`.
    ///
    /// # Examples
    /// ```
    /// use light_slots::{InlineBitArray, slot_count};
    ///
    /// let mut bits = InlineBitArray::<200, { slot_count(200) }>::new();
    /// bits.set_range(60, 130);
    /// assert!(!bits.is_set(59));
    /// assert!(bits.is_set(60) && bits.is_set(130));
    /// assert!(!bits.is_set(131));
    /// assert_eq!(bits.count(), 71);
    /// ```
    pub fn set_range(&mut self, begin: u32, end: u32) {
        self.check_range(begin, end);
        let (first, begin_bit) = idxs(begin);
        let (last, end_bit) = idxs(end);
        let head = fill_up(begin_bit);
        let tail = fill_down(end_bit);
        let bits = self.storage.bits_mut();

        // all within one word
        if first == last {
            bits[first] |= head & tail;
        } else {
            bits[first] |= head;
            bits[first + 1..last].fill(!0);
            bits[last] |= tail;
        }

        if (first..=last).contains(&(self.last as usize)) {
            self.last = last as u32;
        }
    }

    /// Unsets every bit in the inclusive range `begin..=end` and moves the
    /// allocation cursor to `begin`'s word.
    ///
    /// # Panics
    /// Panics if `begin > end` or `end >= max()`.
    pub fn unset_range(&mut self, begin: u32, end: u32) {
        self.check_range(begin, end);
        let (first, begin_bit) = idxs(begin);
        let (last, end_bit) = idxs(end);
        let head = fill_up(begin_bit);
        let tail = fill_down(end_bit);
        let bits = self.storage.bits_mut();

        if first == last {
            bits[first] &= !(head & tail);
        } else {
            bits[first] &= !head;
            bits[first + 1..last].fill(0);
            bits[last] &= !tail;
        }
        self.last = first as u32;
    }

    fn check_range(&self, begin: u32, end: u32) {
        check!(begin <= end, "Range begin {begin} past end {end}");
        check!(end < self.max(), "Range end {end} out of bounds");
    }

    /// In-domain bits of word `slot`.
    #[inline]
    fn domain_mask(&self, slot: usize) -> u64 {
        let tail = self.max() % WORD_BITS;
        if tail != 0 && slot + 1 == self.num_slots() as usize {
            (1 << tail) - 1
        } else {
            !0
        }
    }

    /// Word `slot` with its out-of-domain bits reported as occupied.
    #[inline]
    fn occupied(&self, slot: usize) -> u64 {
        self.storage.bits()[slot] | !self.domain_mask(slot)
    }

    /// Sets the lowest unset in-domain bit of a word known to have one.
    fn set_lowest_unset(&mut self, slot: usize) -> u32 {
        let bit = mark_first_unset_bit(self.occupied(slot));
        self.storage.bits_mut()[slot] |= bit;
        slot as u32 * WORD_BITS + bit.trailing_zeros()
    }

    /// Sets the lowest unset bit and returns its index, or `max()` if every
    /// bit is set.
    ///
    /// # Examples
    /// ```
    /// use light_slots::{InlineBitArray, slot_count};
    ///
    /// let mut bits = InlineBitArray::<3, { slot_count(3) }>::new();
    /// bits.set(0);
    /// assert_eq!(bits.set_first(), 1);
    /// assert_eq!(bits.set_first(), 2);
    /// assert_eq!(bits.set_first(), 3);
    /// ```
    pub fn set_first(&mut self) -> u32 {
        for slot in 0..self.num_slots() as usize {
            if self.occupied(slot) != u64::MAX {
                return self.set_lowest_unset(slot);
            }
        }
        trace!(max = self.max(), "bit array full");
        self.max()
    }

    /// Sets some unset bit and returns its index, or `max()` if every bit is
    /// set.
    ///
    /// The scan starts at a rotating cursor instead of word 0: every fully
    /// occupied word passed over moves the cursor past it, and the scan wraps
    /// around to the words before the cursor. Repeated allocations therefore
    /// spread across the domain rather than piling up at its start. Within a
    /// word the lowest unset bit is chosen.
    ///
    /// # Examples
    /// ```
    /// use light_slots::{InlineBitArray, slot_count};
    ///
    /// let mut bits = InlineBitArray::<128, { slot_count(128) }>::new();
    /// bits.set_range(0, 63);
    /// assert_eq!(bits.set_any(), 64);
    /// bits.unset(3);
    /// // the cursor moved past the full first word
    /// assert_eq!(bits.set_any(), 65);
    /// ```
    pub fn set_any(&mut self) -> u32 {
        let num_slots = self.num_slots();
        let begin = self.last;

        for slot in begin..num_slots {
            if self.occupied(slot as usize) != u64::MAX {
                return self.set_lowest_unset(slot as usize);
            }
            self.last = slot + 1;
        }

        if self.last >= num_slots {
            trace!(num_slots, "allocation cursor wrapped");
            self.last = 0;
        }

        for slot in 0..begin.min(num_slots) {
            if self.occupied(slot as usize) != u64::MAX {
                return self.set_lowest_unset(slot as usize);
            }
            self.last = slot + 1;
        }

        trace!(max = self.max(), "bit array full");
        self.max()
    }

    /// Returns the index of the lowest set bit, or `max()` if none is set.
    ///
    /// # Examples
    /// ```
    /// use light_slots::{InlineBitArray, slot_count};
    ///
    /// let mut bits = InlineBitArray::<4, { slot_count(4) }>::new();
    /// assert_eq!(bits.first_set_bit(), 4);
    /// bits.set(2);
    /// assert_eq!(bits.first_set_bit(), 2);
    /// ```
    pub fn first_set_bit(&self) -> u32 {
        for (slot, word) in self.storage.bits().iter().enumerate() {
            if *word != 0 {
                return slot as u32 * WORD_BITS + word.trailing_zeros();
            }
        }
        self.max()
    }

    /// Returns the index of the highest set bit, or `0` if none is set.
    ///
    /// The empty result is indistinguishable from bit 0 being the only set
    /// bit; check [`count`](BitArray::count) when that matters.
    pub fn last_set_bit(&self) -> u32 {
        for (slot, word) in self.storage.bits().iter().enumerate().rev() {
            if *word != 0 {
                return slot as u32 * WORD_BITS + (WORD_BITS - 1 - word.leading_zeros());
            }
        }
        0
    }

    /// Returns the index of the lowest unset bit, or `max()` if every bit is
    /// set.
    pub fn first_unset_bit(&self) -> u32 {
        for slot in 0..self.num_slots() as usize {
            let occupied = self.occupied(slot);
            if occupied != u64::MAX {
                let bit = mark_first_unset_bit(occupied);
                return slot as u32 * WORD_BITS + bit.trailing_zeros();
            }
        }
        self.max()
    }

    /// Returns the index of the highest unset bit, or `max()` if every bit is
    /// set.
    pub fn last_unset_bit(&self) -> u32 {
        for slot in (0..self.num_slots() as usize).rev() {
            let free = !self.occupied(slot);
            if free != 0 {
                return slot as u32 * WORD_BITS + (WORD_BITS - 1 - free.leading_zeros());
            }
        }
        self.max()
    }

    /// Returns the number of set bits.
    ///
    /// # Examples
    /// ```
    /// use light_slots::{InlineBitArray, slot_count};
    ///
    /// let mut bits = InlineBitArray::<4, { slot_count(4) }>::new();
    /// bits.set_range(1, 2);
    /// assert_eq!(bits.count(), 2);
    /// ```
    #[inline]
    pub fn count(&self) -> u32 {
        self.storage.bits().iter().map(|w| w.count_ones()).sum()
    }

    /// Unsets every bit and rewinds the allocation cursor.
    pub fn reset(&mut self) {
        self.last = 0;
        self.storage.bits_mut().fill(0);
    }

    /// Zeroes the words `start_word..end_word` and rewinds the allocation
    /// cursor.
    ///
    /// # Panics
    /// Panics if `start_word > end_word` or `end_word > num_slots()`.
    pub fn reset_words(&mut self, start_word: u32, end_word: u32) {
        check!(
            start_word <= end_word && end_word <= self.num_slots(),
            "Word range {start_word}..{end_word} out of bounds"
        );
        self.last = 0;
        self.storage.bits_mut()[start_word as usize..end_word as usize].fill(0);
    }

    /// Whether [`resize`](BitArray::resize) is supported by the storage.
    pub fn is_resizable(&self) -> bool {
        self.storage.is_resizable()
    }

    /// Changes the domain to `max` bits, keeping the bits below both the old
    /// and the new size.
    ///
    /// # Errors
    /// Returns [`AllocError::NotResizable`] for fixed storages and the
    /// allocator's failure otherwise; the array is unchanged on error.
    ///
    /// # Examples
    /// ```
    /// use light_slots::HeapBitArray;
    ///
    /// let mut bits = HeapBitArray::new(10)?;
    /// bits.set(9);
    /// bits.resize(200)?;
    /// assert!(bits.is_set(9));
    /// assert_eq!(bits.max(), 200);
    /// # Ok::<(), light_slots::AllocError>(())
    /// ```
    pub fn resize(&mut self, max: u32) -> Result<(), AllocError> {
        self.storage.resize(max)?;
        if self.last >= self.num_slots() {
            self.last = 0;
        }
        Ok(())
    }

    /// Returns an iterator over the indices of all set bits, in ascending
    /// order.
    ///
    /// Iterating through the entire iterator runs in O(max(k, w)) where k is
    /// the number of set bits and w is the number of words.
    ///
    /// # Examples
    /// ```
    /// use light_slots::{InlineBitArray, slot_count};
    ///
    /// let mut bits = InlineBitArray::<130, { slot_count(130) }>::new();
    /// bits.set(0);
    /// bits.set(64);
    /// bits.set(129);
    /// assert!(bits.iter_ones().eq([0, 64, 129]));
    /// ```
    #[inline]
    pub fn iter_ones(&self) -> IterOnes<'_> {
        let words = self.storage.bits();
        IterOnes {
            words,
            word_idx: 0,
            current: words.first().copied().unwrap_or(0),
            max: self.max(),
        }
    }
}

impl<S: WordStorage, T: WordStorage> PartialEq<BitArray<T>> for BitArray<S> {
    fn eq(&self, other: &BitArray<T>) -> bool {
        self.max() == other.max() && self.storage.bits() == other.storage.bits()
    }
}

impl<S: WordStorage> Eq for BitArray<S> {}

impl<'bits, S: WordStorage> IntoIterator for &'bits BitArray<S> {
    type Item = u32;
    type IntoIter = IterOnes<'bits>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_ones()
    }
}

impl<S: WordStorage> Debug for BitArray<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let max = self.max();
        write!(f, "LSB -> ")?;
        for i in 0..max {
            if i % 8 == 0 {
                write!(f, "{i}: ")?;
            }
            write!(f, "{}", if self.is_set(i) { '1' } else { '0' })?;
            if i % 8 == 7 && i < max - 1 {
                write!(f, " ")?;
            }
        }
        write!(f, " <- MSB")?;
        Ok(())
    }
}

/// Iterator over the indices of set bits in a bit array.
///
/// Yields the positions of all bits that are set, in ascending order.
///
/// Returned by [`BitArray::iter_ones()`].
#[derive(Clone, Copy)]
pub struct IterOnes<'bits> {
    words: &'bits [u64],
    word_idx: usize,
    current: u64,
    max: u32,
}

impl Iterator for IterOnes<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        while self.word_idx < self.words.len() {
            if self.current != 0 {
                let idx = self.word_idx as u32 * WORD_BITS + self.current.trailing_zeros();
                if idx >= self.max {
                    self.current = 0;
                    return None;
                }
                self.current &= self.current - 1; // unset LSB
                return Some(idx);
            }

            self.word_idx += 1;
            self.current = self.words.get(self.word_idx).copied().unwrap_or(0);
        }
        None
    }
}

impl FusedIterator for IterOnes<'_> {}
