use light_slots::{AllocError, HeapBitArray, HeapSparseSet};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Hands out small integer handles, spreading them over the whole range.
struct IdPool {
    slots: HeapBitArray,
    live: HeapSparseSet,
}

impl IdPool {
    fn new(capacity: u16) -> Result<Self, AllocError> {
        Ok(Self {
            slots: HeapBitArray::new(u32::from(capacity))?,
            live: HeapSparseSet::new(capacity)?,
        })
    }

    fn acquire(&mut self) -> Option<u16> {
        let slot = self.slots.set_any();
        if slot == self.slots.max() {
            return None;
        }
        let id = slot as u16;
        self.live.insert(id);
        Some(id)
    }

    fn release(&mut self, id: u16) {
        self.live.remove(id);
        self.slots.unset(u32::from(id));
    }
}

fn main() -> Result<(), AllocError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut pool = IdPool::new(200)?;
    let first: Vec<u16> = (0..70).filter_map(|_| pool.acquire()).collect();
    info!(acquired = first.len(), "filled the first word");

    for id in first.iter().copied().step_by(3) {
        pool.release(id);
    }
    let next = pool.acquire();
    info!(?next, live = pool.live.count(), "cursor keeps moving forward");

    while pool.acquire().is_some() {}
    info!(live = pool.live.count(), "pool exhausted");
    println!("live handles: {:?}", pool.live);
    Ok(())
}
