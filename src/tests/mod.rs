use crate::{AllocError, Heap, Reallocator};
use core::cell::Cell;
use core::mem::size_of;

mod bit_array;

/// Heap allocator that counts calls and rejects requests above a byte limit.
#[derive(Default)]
pub(crate) struct CountingAlloc {
    limit: Option<usize>,
    allocations: Cell<usize>,
    releases: Cell<usize>,
}

impl CountingAlloc {
    pub(crate) fn with_limit(bytes: usize) -> Self {
        Self {
            limit: Some(bytes),
            ..Self::default()
        }
    }

    pub(crate) fn allocations(&self) -> usize {
        self.allocations.get()
    }

    pub(crate) fn releases(&self) -> usize {
        self.releases.get()
    }

    fn admits<T>(&self, len: usize) -> Result<(), AllocError> {
        let bytes = len * size_of::<T>();
        match self.limit {
            Some(limit) if bytes > limit => Err(AllocError::OutOfMemory { bytes }),
            _ => Ok(()),
        }
    }
}

impl Reallocator for CountingAlloc {
    fn allocate<T: Copy + Default>(&self, len: usize) -> Result<Box<[T]>, AllocError> {
        self.admits::<T>(len)?;
        self.allocations.set(self.allocations.get() + 1);
        Heap.allocate(len)
    }

    fn reallocate<T: Copy + Default>(
        &self,
        buf: Box<[T]>,
        new_len: usize,
    ) -> Result<Box<[T]>, (Box<[T]>, AllocError)> {
        if let Err(err) = self.admits::<T>(new_len) {
            return Err((buf, err));
        }
        Heap.reallocate(buf, new_len)
    }

    fn release<T>(&self, buf: Box<[T]>) {
        self.releases.set(self.releases.get() + 1);
        Heap.release(buf)
    }
}

#[test]
fn test_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/const_tables.rs");
}
