//! Fixed-capacity index sets written in pure Rust.
//! `no_std` with `alloc`, no `unsafe`.
//!
//! Two structures model "a set of integers in `[0, max)`" for different
//! access patterns:
//!
//! - [`SparseSet`]: O(1) insert, remove and lookup plus iteration over the
//!   present elements only. Best when few elements of a large domain are
//!   present at a time.
//! - [`BitArray`]: one bit per slot, O(1) single-bit operations, word-wise
//!   range updates and scans that find or allocate free slots, including
//!   round-robin allocation for ID pools.
//!
//! # Examples
//! ```
//! use light_slots::{InlineBitArray, InlineSparseSet, slot_count};
//!
//! const MAX: u32 = 100;
//! let mut slots = InlineBitArray::<MAX, { slot_count(MAX) }>::new();
//! let id = slots.set_any();
//! assert!(slots.is_set(id));
//! assert_eq!(slots.count(), 1);
//!
//! let mut live = InlineSparseSet::<100>::new();
//! live.insert(id as u16);
//! assert!(live.contains(id as u16));
//! ```
//!
//! # Storage
//!
//! Both structures are generic over where their memory lives:
//!
//! | storage           | bit array          | sparse set          |
//! |-------------------|--------------------|---------------------|
//! | inline, const     | [`InlineBitArray`] | [`InlineSparseSet`] |
//! | caller's buffer   | [`ExtBitArray`]    | [`ExtSparseSet`]    |
//! | owned, allocator  | [`HeapBitArray`]   | [`HeapSparseSet`]   |
//!
//! Owned storages take their buffers from a [`Reallocator`] ([`Heap`] by
//! default) and surface allocation failure as [`AllocError`]. Custom word
//! storages implement [`WordStorage`](bit_array::WordStorage).
//!
//! # Contracts
//!
//! Out-of-range indices, inserting into a full set and using an
//! uninitialized owned structure are programming errors. They are checked
//! in debug builds or with the `checks` feature, logged through `tracing`
//! and then panic. Without checks the behavior past the violation is
//! unspecified, though never memory-unsafe.

#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod bit_array;
mod check;
mod realloc;
pub mod sparse_set;
#[cfg(test)]
mod tests;

pub use bit_array::{BitArray, ExtBitArray, HeapBitArray, InlineBitArray, IterOnes, slot_count};
pub use realloc::{AllocError, Heap, Reallocator};
pub use sparse_set::{ExtSparseSet, HeapSparseSet, InlineSparseSet, SparseSet};
