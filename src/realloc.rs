//! Allocation capability for the heap-backed storages.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::mem::size_of;
use thiserror::Error;

/// Errors surfaced by allocator-owned storages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The allocator could not provide the requested buffer.
    #[error("failed to allocate {bytes} bytes")]
    OutOfMemory {
        /// Size of the rejected request.
        bytes: usize,
    },
    /// The storage has a fixed domain and cannot be resized.
    #[error("storage is not resizable")]
    NotResizable,
}

/// Source of the buffers owned by [`HeapBitArray`] and [`HeapSparseSet`].
///
/// Buffers are typed, so they are always aligned for their element type.
/// Implementations report exhaustion as [`AllocError::OutOfMemory`] and must
/// never hand out a buffer shorter than requested.
///
/// [`HeapBitArray`]: crate::HeapBitArray
/// [`HeapSparseSet`]: crate::HeapSparseSet
pub trait Reallocator {
    /// Returns a zero-initialized (`T::default()`) buffer of `len` elements.
    fn allocate<T: Copy + Default>(&self, len: usize) -> Result<Box<[T]>, AllocError>;

    /// Resizes `buf` to `new_len` elements, keeping the common prefix and
    /// filling new elements with `T::default()`.
    ///
    /// On failure the original buffer is handed back alongside the error.
    fn reallocate<T: Copy + Default>(
        &self,
        buf: Box<[T]>,
        new_len: usize,
    ) -> Result<Box<[T]>, (Box<[T]>, AllocError)>;

    /// Gives a buffer back to the allocator.
    fn release<T>(&self, buf: Box<[T]>);
}

impl<R: Reallocator + ?Sized> Reallocator for &R {
    fn allocate<T: Copy + Default>(&self, len: usize) -> Result<Box<[T]>, AllocError> {
        (**self).allocate(len)
    }

    fn reallocate<T: Copy + Default>(
        &self,
        buf: Box<[T]>,
        new_len: usize,
    ) -> Result<Box<[T]>, (Box<[T]>, AllocError)> {
        (**self).reallocate(buf, new_len)
    }

    fn release<T>(&self, buf: Box<[T]>) {
        (**self).release(buf)
    }
}

/// The global allocator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Heap;

impl Reallocator for Heap {
    fn allocate<T: Copy + Default>(&self, len: usize) -> Result<Box<[T]>, AllocError> {
        let mut vec = Vec::new();
        vec.try_reserve_exact(len).map_err(|_| out_of_memory::<T>(len))?;
        vec.resize(len, T::default());
        Ok(vec.into_boxed_slice())
    }

    fn reallocate<T: Copy + Default>(
        &self,
        buf: Box<[T]>,
        new_len: usize,
    ) -> Result<Box<[T]>, (Box<[T]>, AllocError)> {
        let mut vec = buf.into_vec();
        let additional = new_len.saturating_sub(vec.len());
        if vec.try_reserve_exact(additional).is_err() {
            return Err((vec.into_boxed_slice(), out_of_memory::<T>(new_len)));
        }
        vec.resize(new_len, T::default());
        Ok(vec.into_boxed_slice())
    }

    fn release<T>(&self, buf: Box<[T]>) {
        drop(buf);
    }
}

pub(crate) fn out_of_memory<T>(len: usize) -> AllocError {
    AllocError::OutOfMemory {
        bytes: len.saturating_mul(size_of::<T>()),
    }
}
