use crate::check::check;
use crate::realloc::{AllocError, Heap, Reallocator};
use alloc::boxed::Box;
use core::mem::size_of;
use tracing::debug;

/// Number of bits held by one storage word.
pub const WORD_BITS: u32 = u64::BITS;

/// Computes the number of words needed to store `max` bits.
///
/// Meant to be inlined as a const expression into the type annotation of an
/// [`InlineBitArray`](crate::InlineBitArray).
///
/// # Examples
/// ```
/// use light_slots::slot_count;
///
/// assert_eq!(slot_count(1), 1);
/// assert_eq!(slot_count(64), 1);
/// assert_eq!(slot_count(65), 2);
/// ```
pub const fn slot_count(max: u32) -> usize {
    max.div_ceil(WORD_BITS) as usize
}

/// Number of words an [`ExtBitArray`](crate::ExtBitArray) over `max` bits
/// occupies in the caller's buffer.
pub const fn num_slots_for(max: u32) -> u32 {
    max.div_ceil(WORD_BITS)
}

/// Number of bytes an [`ExtBitArray`](crate::ExtBitArray) over `max` bits
/// occupies in the caller's buffer.
pub const fn size_for(max: u32) -> usize {
    num_slots_for(max) as usize * size_of::<u64>()
}

#[allow(clippy::no_effect)]
#[allow(clippy::unnecessary_operation)]
pub(crate) const fn compile_assert_const_params(max: u32, slots: usize) {
    // This will cause a compile-time error if max == 0
    ["MAX must be greater than zero."][(max == 0) as usize];
    // This will cause a compile-time error if slots != slot_count(max)
    ["SLOTS must match slot_count(MAX)."][(slot_count(max) != slots) as usize];
}

pub(crate) fn runtime_assert_const_params(max: u32, slots: usize) {
    assert_ne!(max, 0, "MAX must be greater than zero.");
    assert_eq!(slot_count(max), slots, "SLOTS must match slot_count(MAX).");
}

/// Backing words of a [`BitArray`](crate::BitArray).
///
/// The bit algorithms are written once against this trait. `bits()` must
/// always return exactly `num_slots()` words, enough to hold `max()` bits.
pub trait WordStorage {
    /// The backing words.
    fn bits(&self) -> &[u64];

    /// The backing words, mutably.
    fn bits_mut(&mut self) -> &mut [u64];

    /// Number of backing words.
    fn num_slots(&self) -> u32 {
        self.bits().len() as u32
    }

    /// Domain size in bits.
    fn max(&self) -> u32;

    /// Whether [`resize`](WordStorage::resize) can succeed.
    fn is_resizable(&self) -> bool {
        false
    }

    /// Changes the domain size to `max` bits.
    ///
    /// Words gained are zeroed, bits dropped by shrinking are cleared.
    fn resize(&mut self, max: u32) -> Result<(), AllocError> {
        let _ = max;
        Err(AllocError::NotResizable)
    }
}

/// Words embedded in the value itself, sized at compile time.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InlineWords<const MAX: u32, const SLOTS: usize>([u64; SLOTS]);

impl<const MAX: u32, const SLOTS: usize> InlineWords<MAX, SLOTS> {
    /// Creates zeroed words.
    ///
    /// # Panics
    /// Panics if `MAX == 0` or `SLOTS != slot_count(MAX)`.
    pub fn new() -> Self {
        runtime_assert_const_params(MAX, SLOTS);
        Self([0; SLOTS])
    }

    /// Creates zeroed words in a `const` context.
    ///
    /// # Compiler Errors
    /// Prevents compilation if either `MAX == 0` or `SLOTS != slot_count(MAX)`.
    pub const fn const_empty() -> Self {
        compile_assert_const_params(MAX, SLOTS);
        Self([0; SLOTS])
    }
}

impl<const MAX: u32, const SLOTS: usize> Default for InlineWords<MAX, SLOTS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const MAX: u32, const SLOTS: usize> WordStorage for InlineWords<MAX, SLOTS> {
    #[inline]
    fn bits(&self) -> &[u64] {
        &self.0
    }

    #[inline]
    fn bits_mut(&mut self) -> &mut [u64] {
        &mut self.0
    }

    #[inline]
    fn num_slots(&self) -> u32 {
        SLOTS as u32
    }

    #[inline]
    fn max(&self) -> u32 {
        MAX
    }
}

/// Words borrowed from a caller-supplied buffer.
pub struct ExtWords<'a> {
    bits: &'a mut [u64],
    max: u32,
}

impl<'a> ExtWords<'a> {
    /// Takes the first [`num_slots_for(max)`](num_slots_for) words of `mem`
    /// and returns the unused tail.
    pub(crate) fn carve(max: u32, mem: &'a mut [u64]) -> (Self, &'a mut [u64]) {
        check!(max > 0, "Domain size must be greater than zero.");
        let needed = num_slots_for(max) as usize;
        check!(
            mem.len() >= needed,
            "Buffer of {} words too small, {needed} needed for {max} bits",
            mem.len()
        );
        let (bits, rest) = mem.split_at_mut(needed);
        (Self { bits, max }, rest)
    }
}

impl WordStorage for ExtWords<'_> {
    #[inline]
    fn bits(&self) -> &[u64] {
        &*self.bits
    }

    #[inline]
    fn bits_mut(&mut self) -> &mut [u64] {
        &mut *self.bits
    }

    #[inline]
    fn max(&self) -> u32 {
        self.max
    }
}

/// Words owned by the storage and obtained from a [`Reallocator`].
///
/// The default value is the uninitialized state: no buffer and a domain of
/// zero bits.
pub struct HeapWords<A: Reallocator = Heap> {
    bits: Option<Box<[u64]>>,
    max: u32,
    alloc: A,
}

impl<A: Reallocator> HeapWords<A> {
    pub(crate) fn allocate(max: u32, alloc: A) -> Result<Self, AllocError> {
        check!(max > 0, "Domain size must be greater than zero.");
        let bits = alloc.allocate::<u64>(num_slots_for(max) as usize)?;
        debug!(max, bytes = size_for(max), "allocated bit array words");
        Ok(Self {
            bits: Some(bits),
            max,
            alloc,
        })
    }

    /// Whether a buffer is held.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.bits.is_some()
    }

    /// The allocator the buffer came from.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Clears the bits of the last word that lie at or above `max`.
    fn clear_tail(&mut self) {
        let tail = self.max % WORD_BITS;
        if tail == 0 {
            return;
        }
        if let Some(last) = self.bits_mut().last_mut() {
            *last &= (1u64 << tail) - 1;
        }
    }
}

impl<A: Reallocator + Default> Default for HeapWords<A> {
    fn default() -> Self {
        Self {
            bits: None,
            max: 0,
            alloc: A::default(),
        }
    }
}

impl<A: Reallocator> WordStorage for HeapWords<A> {
    #[inline]
    fn bits(&self) -> &[u64] {
        self.bits.as_deref().unwrap_or_default()
    }

    #[inline]
    fn bits_mut(&mut self) -> &mut [u64] {
        self.bits.as_deref_mut().unwrap_or_default()
    }

    #[inline]
    fn max(&self) -> u32 {
        self.max
    }

    fn is_resizable(&self) -> bool {
        true
    }

    fn resize(&mut self, max: u32) -> Result<(), AllocError> {
        check!(max > 0, "Domain size must be greater than zero.");
        let slots = num_slots_for(max) as usize;
        let bits = match self.bits.take() {
            Some(old) => match self.alloc.reallocate(old, slots) {
                Ok(bits) => bits,
                Err((old, err)) => {
                    self.bits = Some(old);
                    return Err(err);
                }
            },
            None => self.alloc.allocate::<u64>(slots)?,
        };
        debug!(
            from = self.max,
            to = max,
            bytes = size_for(max),
            "resized bit array words"
        );
        self.bits = Some(bits);
        self.max = max;
        self.clear_tail();
        Ok(())
    }
}

impl<A: Reallocator> Drop for HeapWords<A> {
    fn drop(&mut self) {
        if let Some(bits) = self.bits.take() {
            debug!(
                max = self.max,
                bytes = size_for(self.max),
                "released bit array words"
            );
            self.alloc.release(bits);
        }
    }
}
