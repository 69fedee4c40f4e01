use crate::check::check;
use crate::realloc::{AllocError, Heap, Reallocator};
use alloc::boxed::Box;
use core::mem::size_of;
use tracing::debug;

/// Bytes used per element of the domain: one `values` and one `indices` entry.
pub const SIZE_PER_ELEMENT: usize = 2 * size_of::<u16>();

/// Number of `u16` entries an [`ExtSparseSet`](crate::ExtSparseSet) over
/// `max` elements occupies in the caller's buffer.
pub const fn len_for(max: u16) -> usize {
    2 * max as usize
}

/// Number of bytes an [`ExtSparseSet`](crate::ExtSparseSet) over `max`
/// elements occupies in the caller's buffer.
pub const fn size_for(max: u16) -> usize {
    max as usize * SIZE_PER_ELEMENT
}

#[allow(clippy::no_effect)]
#[allow(clippy::unnecessary_operation)]
pub(crate) const fn compile_assert_const_max(max: usize) {
    // This will cause a compile-time error if max == 0
    ["MAX must be greater than zero."][(max == 0) as usize];
    // This will cause a compile-time error if elements don't fit in u16
    ["MAX must not exceed u16::MAX."][(max > u16::MAX as usize) as usize];
}

pub(crate) fn runtime_assert_const_max(max: usize) {
    assert_ne!(max, 0, "MAX must be greater than zero.");
    assert!(max <= u16::MAX as usize, "MAX must not exceed u16::MAX.");
}

/// Backing arrays of a [`SparseSet`](crate::SparseSet).
///
/// Both arrays hold exactly `max()` entries.
pub trait SetStorage {
    /// Dense array of present elements.
    fn values(&self) -> &[u16];

    /// Sparse array mapping each element to its position in `values`.
    fn indices(&self) -> &[u16];

    /// Both arrays, mutably, as `(values, indices)`.
    fn split_mut(&mut self) -> (&mut [u16], &mut [u16]);

    /// Domain size.
    fn max(&self) -> u16;
}

/// Arrays embedded in the value itself, sized at compile time.
#[derive(Clone, Copy)]
pub struct InlineEntries<const MAX: usize> {
    values: [u16; MAX],
    indices: [u16; MAX],
}

impl<const MAX: usize> InlineEntries<MAX> {
    /// Creates zeroed arrays.
    ///
    /// # Panics
    /// Panics if `MAX == 0` or `MAX > u16::MAX`.
    pub fn new() -> Self {
        runtime_assert_const_max(MAX);
        Self {
            values: [0; MAX],
            indices: [0; MAX],
        }
    }

    /// Creates zeroed arrays in a `const` context.
    pub const fn const_empty() -> Self {
        compile_assert_const_max(MAX);
        Self {
            values: [0; MAX],
            indices: [0; MAX],
        }
    }
}

impl<const MAX: usize> Default for InlineEntries<MAX> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const MAX: usize> SetStorage for InlineEntries<MAX> {
    #[inline]
    fn values(&self) -> &[u16] {
        &self.values
    }

    #[inline]
    fn indices(&self) -> &[u16] {
        &self.indices
    }

    #[inline]
    fn split_mut(&mut self) -> (&mut [u16], &mut [u16]) {
        (&mut self.values, &mut self.indices)
    }

    #[inline]
    fn max(&self) -> u16 {
        MAX as u16
    }
}

/// Arrays borrowed from a caller-supplied buffer, `values` first.
pub struct ExtEntries<'a> {
    values: &'a mut [u16],
    indices: &'a mut [u16],
}

impl<'a> ExtEntries<'a> {
    /// Takes the first [`len_for(max)`](len_for) entries of `mem` and returns
    /// the unused tail.
    pub(crate) fn carve(max: u16, mem: &'a mut [u16]) -> (Self, &'a mut [u16]) {
        check!(max > 0, "Domain size must be greater than zero.");
        let needed = len_for(max);
        check!(
            mem.len() >= needed,
            "Buffer of {} entries too small, {needed} needed for {max} elements",
            mem.len()
        );
        let (used, rest) = mem.split_at_mut(needed);
        let (values, indices) = used.split_at_mut(max as usize);
        (Self { values, indices }, rest)
    }
}

impl SetStorage for ExtEntries<'_> {
    #[inline]
    fn values(&self) -> &[u16] {
        &*self.values
    }

    #[inline]
    fn indices(&self) -> &[u16] {
        &*self.indices
    }

    #[inline]
    fn split_mut(&mut self) -> (&mut [u16], &mut [u16]) {
        (&mut *self.values, &mut *self.indices)
    }

    #[inline]
    fn max(&self) -> u16 {
        self.values.len() as u16
    }
}

/// Arrays owned by the storage in one buffer obtained from a
/// [`Reallocator`].
///
/// The default value is the uninitialized state: no buffer and an empty
/// domain.
pub struct HeapEntries<A: Reallocator = Heap> {
    buf: Option<Box<[u16]>>,
    max: u16,
    alloc: A,
}

impl<A: Reallocator> HeapEntries<A> {
    pub(crate) fn allocate(max: u16, alloc: A) -> Result<Self, AllocError> {
        check!(max > 0, "Domain size must be greater than zero.");
        let buf = alloc.allocate::<u16>(len_for(max))?;
        debug!(max, bytes = size_for(max), "allocated sparse set arrays");
        Ok(Self {
            buf: Some(buf),
            max,
            alloc,
        })
    }

    /// Whether a buffer is held.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.buf.is_some()
    }

    /// The allocator the buffer came from.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    #[inline]
    fn buf(&self) -> &[u16] {
        self.buf.as_deref().unwrap_or_default()
    }
}

impl<A: Reallocator + Default> Default for HeapEntries<A> {
    fn default() -> Self {
        Self {
            buf: None,
            max: 0,
            alloc: A::default(),
        }
    }
}

impl<A: Reallocator> SetStorage for HeapEntries<A> {
    #[inline]
    fn values(&self) -> &[u16] {
        &self.buf()[..self.max as usize]
    }

    #[inline]
    fn indices(&self) -> &[u16] {
        &self.buf()[self.max as usize..]
    }

    #[inline]
    fn split_mut(&mut self) -> (&mut [u16], &mut [u16]) {
        let max = self.max as usize;
        self.buf.as_deref_mut().unwrap_or_default().split_at_mut(max)
    }

    #[inline]
    fn max(&self) -> u16 {
        self.max
    }
}

impl<A: Reallocator> Drop for HeapEntries<A> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            debug!(
                max = self.max,
                bytes = size_for(self.max),
                "released sparse set arrays"
            );
            self.alloc.release(buf);
        }
    }
}
