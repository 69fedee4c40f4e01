use light_slots::{InlineBitArray, InlineSparseSet, slot_count};

const SLOTS: InlineBitArray<70, { slot_count(70) }> = InlineBitArray::const_empty();
static LIVE: InlineSparseSet<16> = InlineSparseSet::const_empty();

fn main() {
    let mut slots = SLOTS;
    assert_eq!(slots.set_any(), 0);
    assert_eq!(slots.set_first(), 1);
    assert_eq!(SLOTS.count(), 0);
    assert!(LIVE.is_empty());
    assert_eq!(LIVE.max(), 16);
}
