use crate::bit_array::storage::{compile_assert_const_params, runtime_assert_const_params};
use crate::bit_array::{fill_down, fill_up, mark_first_unset_bit};
use crate::{HeapBitArray, InlineBitArray, slot_count};
use rstest::rstest;

type Bits200 = InlineBitArray<200, { slot_count(200) }>;

#[test]
fn test_slot_count() {
    assert_eq!(slot_count(1), 1);
    assert_eq!(slot_count(63), 1);
    assert_eq!(slot_count(64), 1);
    assert_eq!(slot_count(65), 2);
    assert_eq!(slot_count(128), 2);
    assert_eq!(slot_count(129), 3);
    assert_eq!(slot_count(1000), 16);
}

#[test]
fn test_new() {
    macro_rules! test_new_by_max {
        ($($max:expr),+ $(,)?) => {
            $(
                {
                    const MAX: u32 = $max;
                    let bits = InlineBitArray::<MAX, { slot_count(MAX) }>::new();
                    assert_eq!(bits.count(), 0, "Failed for MAX = {}", MAX);
                    assert_eq!(bits.max(), MAX);
                    assert_eq!(bits.num_slots() as usize, slot_count(MAX));
                    assert!((0..MAX).all(|i| !bits.is_set(i)));
                }
            )+
        };
    }

    test_new_by_max!(1, 17, 63, 64, 65, 127, 128, 129, 4097);
}

#[test]
fn test_default_and_const_empty() {
    const EMPTY: InlineBitArray<19, { slot_count(19) }> = InlineBitArray::const_empty();
    let default = InlineBitArray::<19, { slot_count(19) }>::default();
    assert_eq!(EMPTY, default);
    assert_eq!(EMPTY.count(), 0);
}

#[test]
fn test_cover_compile_assert() {
    compile_assert_const_params(45, slot_count(45));
}

#[test]
#[should_panic(expected = "assertion `left != right` failed: MAX must be greater than zero.")]
fn test_runtime_assert_zero_bits() {
    runtime_assert_const_params(0, slot_count(45));
}

#[test]
#[should_panic(expected = "assertion `left == right` failed: SLOTS must match slot_count(MAX).")]
fn test_runtime_assert_max_slots_mismatch() {
    runtime_assert_const_params(65, 1);
}

#[test]
fn test_masks() {
    assert_eq!(fill_up(1), u64::MAX);
    assert_eq!(fill_up(1 << 63), 1 << 63);
    assert_eq!(fill_up(1 << 4), !0b1111);
    assert_eq!(fill_down(1), 1);
    assert_eq!(fill_down(1 << 63), u64::MAX);
    assert_eq!(fill_down(1 << 4), 0b11111);

    assert_eq!(mark_first_unset_bit(0b010111), 0b001000);
    assert_eq!(mark_first_unset_bit(0), 1);
    assert_eq!(mark_first_unset_bit(u64::MAX >> 1), 1 << 63);
    assert_eq!(mark_first_unset_bit(u64::MAX), 0);
}

#[test]
fn test_set_and_unset() {
    let mut bits = Bits200::new();
    for i in [0, 5, 63, 64, 199] {
        bits.set(i);
        assert!(bits.is_set(i));
    }
    assert_eq!(bits.count(), 5);
    bits.set(5);
    assert_eq!(bits.count(), 5);

    bits.unset(64);
    assert!(!bits.is_set(64));
    bits.unset(64);
    assert_eq!(bits.count(), 4);
}

#[test]
#[should_panic(expected = "Bit index 200 out of bounds")]
fn test_set_out_of_bounds() {
    Bits200::new().set(200);
}

#[test]
#[should_panic(expected = "Bit index 4 out of bounds")]
fn test_is_set_out_of_bounds() {
    InlineBitArray::<4, { slot_count(4) }>::new().is_set(4);
}

#[test]
fn test_toggle() {
    let mut bits = Bits200::new();
    assert!(!bits.toggle(130));
    assert!(bits.is_set(130));
    assert!(bits.toggle(130));
    assert!(!bits.is_set(130));
    assert_eq!(bits.count(), 0);
}

#[test]
fn test_small_range_scenario() {
    let mut bits = InlineBitArray::<4, { slot_count(4) }>::new();
    bits.set_range(1, 2);
    assert!(!bits.is_set(0));
    assert!(bits.is_set(1));
    assert!(bits.is_set(2));
    assert!(!bits.is_set(3));
    assert_eq!(bits.first_set_bit(), 1);
    assert_eq!(bits.last_set_bit(), 2);
    assert_eq!(bits.count(), 2);
}

#[rstest]
#[case(0, 0)]
#[case(0, 63)]
#[case(3, 5)]
#[case(63, 64)]
#[case(64, 127)]
#[case(5, 199)]
#[case(130, 199)]
#[case(199, 199)]
fn test_set_range(#[case] begin: u32, #[case] end: u32) {
    let mut bits = Bits200::new();
    bits.set_range(begin, end);
    for i in 0..200 {
        assert_eq!(bits.is_set(i), (begin..=end).contains(&i), "bit {i}");
    }
    assert_eq!(bits.count(), end - begin + 1);
}

#[rstest]
#[case(0, 0)]
#[case(3, 5)]
#[case(62, 65)]
#[case(10, 150)]
#[case(0, 199)]
fn test_unset_range(#[case] begin: u32, #[case] end: u32) {
    let mut bits = Bits200::new();
    bits.set_range(0, 199);
    bits.unset_range(begin, end);
    for i in 0..200 {
        assert_eq!(bits.is_set(i), !(begin..=end).contains(&i), "bit {i}");
    }
    assert_eq!(bits.count(), 200 - (end - begin + 1));
}

#[test]
fn test_set_range_keeps_existing_bits() {
    let mut bits = Bits200::new();
    bits.set(2);
    bits.set(150);
    bits.set_range(10, 20);
    assert!(bits.is_set(2) && bits.is_set(150));
    assert_eq!(bits.count(), 13);
}

#[test]
#[should_panic(expected = "Range begin 5 past end 4")]
fn test_set_range_reversed() {
    Bits200::new().set_range(5, 4);
}

#[test]
#[should_panic(expected = "Range end 200 out of bounds")]
fn test_unset_range_end_out_of_bounds() {
    Bits200::new().unset_range(0, 200);
}

#[test]
fn test_set_first() {
    let mut bits = InlineBitArray::<70, { slot_count(70) }>::new();
    bits.set_range(0, 2);
    bits.set(4);
    assert_eq!(bits.set_first(), 3);
    assert_eq!(bits.set_first(), 5);

    bits.set_range(0, 68);
    assert_eq!(bits.set_first(), 69);
    assert_eq!(bits.set_first(), 70);
    assert_eq!(bits.count(), 70);
}

#[test]
fn test_set_any_fills_every_bit_once() {
    let mut bits = InlineBitArray::<130, { slot_count(130) }>::new();
    let mut seen = [false; 130];
    for _ in 0..130 {
        let bit = bits.set_any();
        assert!(bit < 130);
        assert!(!seen[bit as usize], "bit {bit} handed out twice");
        seen[bit as usize] = true;
    }
    assert_eq!(bits.set_any(), 130);
    assert_eq!(bits.count(), 130);
}

#[test]
fn test_set_any_skips_full_words() {
    let mut bits = InlineBitArray::<192, { slot_count(192) }>::new();
    bits.set_range(0, 63);
    assert_eq!(bits.set_any(), 64);
    bits.unset(3);
    assert_eq!(bits.set_any(), 65);
    assert_eq!(bits.set_first(), 3);
}

#[test]
fn test_set_any_wraps_around() {
    let mut bits = InlineBitArray::<128, { slot_count(128) }>::new();
    for _ in 0..128 {
        bits.set_any();
    }
    bits.unset(5);
    assert_eq!(bits.set_any(), 5);
    assert_eq!(bits.set_any(), 128);
}

#[test]
fn test_set_range_advances_cursor() {
    let mut bits = InlineBitArray::<192, { slot_count(192) }>::new();
    bits.set_range(0, 70);
    bits.unset(3);
    // the cursor sits on word 1 now, so word 0 is only reached after wrapping
    assert_eq!(bits.set_any(), 71);
    assert_eq!(bits.set_first(), 3);
}

#[test]
fn test_set_range_outside_cursor_keeps_it() {
    let mut bits = InlineBitArray::<192, { slot_count(192) }>::new();
    bits.set_range(128, 191);
    bits.set_range(64, 100);
    assert_eq!(bits.set_any(), 0);
}

#[test]
fn test_unset_range_within_one_word() {
    let mut bits = InlineBitArray::<64, { slot_count(64) }>::new();
    bits.set_range(0, 63);
    bits.unset_range(10, 20);
    assert_eq!(bits.count(), 53);
    assert!(bits.is_set(9) && bits.is_set(21));
    assert!((10..=20).all(|i| !bits.is_set(i)));
}

#[test]
fn test_unset_range_rewinds_cursor() {
    let mut bits = InlineBitArray::<192, { slot_count(192) }>::new();
    bits.set_range(0, 130);
    assert_eq!(bits.set_any(), 131);
    bits.unset_range(10, 12);
    assert_eq!(bits.set_any(), 10);
}

#[test]
fn test_scan_sentinels_empty() {
    let bits = InlineBitArray::<100, { slot_count(100) }>::new();
    assert_eq!(bits.first_set_bit(), 100);
    assert_eq!(bits.last_set_bit(), 0);
    assert_eq!(bits.first_unset_bit(), 0);
    assert_eq!(bits.last_unset_bit(), 99);
}

#[test]
fn test_scan_sentinels_full() {
    let mut bits = InlineBitArray::<100, { slot_count(100) }>::new();
    bits.set_range(0, 99);
    assert_eq!(bits.first_set_bit(), 0);
    assert_eq!(bits.last_set_bit(), 99);
    assert_eq!(bits.first_unset_bit(), 100);
    assert_eq!(bits.last_unset_bit(), 100);
}

#[test]
fn test_scans() {
    let mut bits = Bits200::new();
    bits.set(64);
    bits.set(129);
    assert_eq!(bits.first_set_bit(), 64);
    assert_eq!(bits.last_set_bit(), 129);

    bits.set_range(0, 199);
    bits.unset(7);
    bits.unset(140);
    assert_eq!(bits.first_unset_bit(), 7);
    assert_eq!(bits.last_unset_bit(), 140);
}

#[test]
fn test_reset() {
    let mut bits = Bits200::new();
    bits.set_range(0, 150);
    assert_eq!(bits.set_any(), 151);
    bits.reset();
    assert_eq!(bits.count(), 0);
    assert_eq!(bits.set_any(), 0);
}

#[test]
fn test_reset_words() {
    let mut bits = Bits200::new();
    bits.set_range(0, 199);
    bits.reset_words(1, 2);
    assert_eq!(bits.count(), 200 - 64);
    assert!(bits.is_set(63));
    assert!(!bits.is_set(64));
    assert!(!bits.is_set(127));
    assert!(bits.is_set(128));

    bits.reset_words(3, 3);
    assert_eq!(bits.count(), 200 - 64);
}

#[test]
#[should_panic(expected = "Word range 2..5 out of bounds")]
fn test_reset_words_out_of_bounds() {
    Bits200::new().reset_words(2, 5);
}

#[test]
fn test_iter_ones() {
    let mut bits = Bits200::new();
    assert_eq!(bits.iter_ones().next(), None);
    for i in [0, 1, 63, 64, 128, 199] {
        bits.set(i);
    }
    let ones: Vec<u32> = bits.iter_ones().collect();
    assert_eq!(ones, [0, 1, 63, 64, 128, 199]);
    assert!((&bits).into_iter().eq(ones));

    let mut iter = bits.iter_ones();
    iter.by_ref().for_each(drop);
    assert_eq!(iter.next(), None);
}

#[test]
fn test_eq_across_storages() {
    let mut inline = InlineBitArray::<100, { slot_count(100) }>::new();
    let mut heap = HeapBitArray::new(100).unwrap();
    inline.set_range(10, 70);
    heap.set_range(10, 70);
    assert_eq!(inline, heap);

    heap.set_any();
    assert_ne!(inline, heap);
}

#[test]
fn test_resize_fixed_storage() {
    let mut bits = Bits200::new();
    assert!(!bits.is_resizable());
    assert_eq!(bits.resize(300), Err(crate::AllocError::NotResizable));
    assert_eq!(bits.max(), 200);
}

#[test]
fn debug_format_is_correct() {
    let mut bits = InlineBitArray::<10, { slot_count(10) }>::new();
    bits.set(1);
    bits.set(9);
    assert_eq!(format!("{bits:?}"), "LSB -> 0: 01000000 8: 01 <- MSB");
}
