//! End-to-end behavior of the MEDIAN aggregate through the public traits.

use medley_core::types::Value;
use medley_functions::{Accumulator, FunctionRegistry, MedianAccumulator};

fn build(values: &[i64]) -> MedianAccumulator {
    let mut acc = MedianAccumulator::new();
    for v in values {
        acc.accumulate(&Value::int64(*v)).unwrap();
    }
    acc
}

#[test]
fn test_median_is_insertion_order_independent() {
    let orderings: &[&[i64]] = &[
        &[1, 2, 2, 2, 7, 9, -3],
        &[-3, 9, 7, 2, 2, 2, 1],
        &[2, 2, 2, 1, 7, -3, 9],
        &[9, -3, 2, 7, 1, 2, 2],
        &[7, 1, -3, 2, 9, 2, 2],
    ];
    for ordering in orderings {
        let acc = build(ordering);
        assert_eq!(
            acc.finalize().unwrap(),
            Value::int64(2),
            "ordering {:?} changed the median",
            ordering
        );
    }
}

#[test]
fn test_merge_equals_single_state_for_any_partition() {
    let all: &[i64] = &[1, 2, 2, 2, 7, 9, -3];
    let expected = build(all).finalize().unwrap();

    for split in 0..=all.len() {
        let (left, right) = all.split_at(split);
        let mut dst = build(left);
        let src = build(right);
        dst.merge(&src).unwrap();
        assert_eq!(
            dst.finalize().unwrap(),
            expected,
            "partition at {} diverged",
            split
        );
    }
}

#[test]
fn test_merge_is_commutative_in_outcome() {
    let a: &[i64] = &[1, 2, 2];
    let b: &[i64] = &[2, 7, 9, -3];

    let mut ab = build(a);
    ab.merge(&build(b)).unwrap();
    let mut ba = build(b);
    ba.merge(&build(a)).unwrap();

    assert_eq!(ab.finalize().unwrap(), ba.finalize().unwrap());
}

#[test]
fn test_reduction_tree_merge() {
    // Four workers combined pairwise, then the pair results combined.
    let partials: Vec<MedianAccumulator> =
        [&[9i64, 1][..], &[2, 2], &[7, -3], &[2]].iter().map(|p| build(p)).collect();

    let mut left = partials[0].clone();
    left.merge(&partials[1]).unwrap();
    let mut right = partials[2].clone();
    right.merge(&partials[3]).unwrap();
    left.merge(&right).unwrap();

    assert_eq!(left.finalize().unwrap(), Value::int64(2));
}

#[test]
fn test_merge_repeated_with_empty_is_safe() {
    let mut acc = build(&[5, 6, 7]);
    let empty = MedianAccumulator::new();
    acc.merge(&empty).unwrap();
    acc.merge(&empty).unwrap();
    assert_eq!(acc.finalize().unwrap(), Value::int64(6));
}

#[test]
fn test_moving_window_through_trait_object() {
    let registry = FunctionRegistry::new();
    let func = registry.get_aggregate("MEDIAN").unwrap();
    let mut acc = func.create_accumulator();

    // First window: {100, 200, 150}
    for v in [100i64, 200, 150] {
        acc.accumulate(&Value::int64(v)).unwrap();
    }
    assert_eq!(acc.finalize().unwrap(), Value::int64(150));

    // Slide: evict 100, admit 300 -> {200, 150, 300}
    acc.retract(&Value::int64(100)).unwrap();
    acc.accumulate(&Value::int64(300)).unwrap();
    assert_eq!(acc.finalize().unwrap(), Value::int64(200));
}

#[test]
fn test_window_eviction_of_already_evicted_duplicate() {
    let mut acc = build(&[4, 4, 8]);
    acc.retract(&Value::int64(4)).unwrap();
    // A second eviction of the same duplicate must be a silent no-op.
    acc.retract(&Value::int64(4)).unwrap();
    acc.retract(&Value::int64(4)).unwrap();
    assert_eq!(acc.finalize().unwrap(), Value::int64(8));
}

#[test]
fn test_finalize_is_repeatable() {
    let acc = build(&[3, 1, 2]);
    assert_eq!(acc.finalize().unwrap(), Value::int64(2));
    assert_eq!(acc.finalize().unwrap(), Value::int64(2));
}

#[test]
fn test_null_only_input_yields_null() {
    let mut acc = MedianAccumulator::new();
    acc.accumulate(&Value::null()).unwrap();
    acc.accumulate(&Value::null()).unwrap();
    assert_eq!(acc.finalize().unwrap(), Value::null());
}
