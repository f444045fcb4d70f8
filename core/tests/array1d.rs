extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use bumpalo::Bump;
use hostbuf_core::array1::Array1;
use hostbuf_core::error::BufferError;
use hostbuf_core::providers::{ArenaProvider, HeapProvider};
use hostbuf_core::tag::Scalar;
use hostbuf_core::traits::{BufferHandle, BufferProvider};
use pretty_assertions::assert_eq;

// =============================================================================
// Construction
// =============================================================================

#[test]
fn with_len_reports_length() {
    for n in [0usize, 1, 5, 100] {
        let a = Array1::<_, i64>::with_len(HeapProvider, n).unwrap();
        assert_eq!(a.len(), n);
        assert_eq!(a.is_empty(), n == 0);
    }
}

#[test]
fn with_len_zero_fills() {
    let a = Array1::<_, u32>::with_len(HeapProvider, 7).unwrap();
    assert!(a.iter().all(|&x| x == 0));
}

#[test]
fn filled_sets_every_element() {
    let a = Array1::<_, f64>::filled(HeapProvider, 6, 2.5).unwrap();
    for i in 0..6 {
        assert_eq!(a[i], 2.5);
    }
}

#[test]
fn from_elements_copies_in_order() {
    let a = Array1::<_, i32>::from_elements(HeapProvider, vec![3, 1, 4, 1, 5]).unwrap();
    assert_eq!(a.len(), 5);
    let got: Vec<i32> = a.iter().copied().collect();
    assert_eq!(got, vec![3, 1, 4, 1, 5]);
}

#[test]
fn empty_adaptor_has_no_handle() {
    let a = Array1::<HeapProvider, i8>::new(HeapProvider);
    assert_eq!(a.len(), 0);
    assert!(a.share_handle().is_none());
    assert_eq!(a.first(), None);
    assert_eq!(a.last(), None);
    assert_eq!(a.get(0), None);
}

// =============================================================================
// Element access
// =============================================================================

#[test]
fn get_is_bounds_checked() {
    let a = Array1::<_, i32>::filled(HeapProvider, 3, 9).unwrap();
    assert_eq!(a.get(2), Some(&9));
    assert_eq!(a.get(3), None);
    assert_eq!(a.get(usize::MAX), None);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn index_panics_out_of_range() {
    let a = Array1::<_, i32>::with_len(HeapProvider, 3).unwrap();
    let _ = a[3];
}

#[test]
fn first_and_last() {
    let mut a = Array1::<_, i32>::from_elements(HeapProvider, vec![10, 20, 30]).unwrap();
    assert_eq!(a.first(), Some(&10));
    assert_eq!(a.last(), Some(&30));
    *a.first_mut().unwrap() = 11;
    *a.last_mut().unwrap() = 31;
    assert_eq!(a.first(), Some(&11));
    assert_eq!(a.last(), Some(&31));
}

#[test]
fn unchecked_access_matches_checked() {
    let a = Array1::<_, u16>::from_elements(HeapProvider, vec![5, 6, 7]).unwrap();
    for i in 0..3 {
        // SAFETY: i < len.
        assert_eq!(unsafe { a.get_unchecked(i) }, a.get(i).unwrap());
    }
}

#[test]
fn writes_through_index_mut() {
    let mut a = Array1::<_, i64>::with_len(HeapProvider, 4).unwrap();
    for i in 0..4 {
        a[i] = (i as i64) * 10;
    }
    assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![0, 10, 20, 30]);
}

// =============================================================================
// Iteration
// =============================================================================

#[test]
fn iter_distance_equals_len() {
    let a = Array1::<_, u8>::with_len(HeapProvider, 9).unwrap();
    assert_eq!(a.iter().count(), a.len());
    assert_eq!(a.iter().len(), a.len());
}

#[test]
fn reverse_iteration_reverses_order() {
    let a = Array1::<_, i32>::from_elements(HeapProvider, vec![1, 2, 3, 4]).unwrap();
    let forward: Vec<i32> = a.iter().copied().collect();
    let mut backward: Vec<i32> = a.iter().rev().copied().collect();
    backward.reverse();
    assert_eq!(forward, backward);
}

#[test]
fn iter_mut_writes_every_element() {
    let mut a = Array1::<_, i32>::with_len(HeapProvider, 5).unwrap();
    for (i, slot) in a.iter_mut().enumerate() {
        *slot = i as i32;
    }
    assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
}

// =============================================================================
// Resize
// =============================================================================

#[test]
fn resize_keeps_prefix_when_shrinking() {
    let mut a = Array1::<_, i32>::from_elements(HeapProvider, vec![1, 2, 3, 4, 5]).unwrap();
    a.resize(3).unwrap();
    assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn resize_zero_fills_growth() {
    let mut a = Array1::<_, i32>::from_elements(HeapProvider, vec![7, 8]).unwrap();
    a.resize(4).unwrap();
    assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![7, 8, 0, 0]);
}

#[test]
fn resize_same_length_is_a_noop() {
    let mut a = Array1::<_, i32>::from_elements(HeapProvider, vec![1, 2, 3]).unwrap();
    let epoch_before = a.share_handle().unwrap().epoch();
    a.resize(3).unwrap();
    // Same allocation: no reallocation happened.
    assert_eq!(a.share_handle().unwrap().epoch(), epoch_before);
}

#[test]
fn resize_with_fills_every_element_on_change() {
    let mut a = Array1::<_, i32>::from_elements(HeapProvider, vec![1, 2, 3]).unwrap();
    a.resize_with(5, 9).unwrap();
    assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![9, 9, 9, 9, 9]);
}

#[test]
fn resize_with_same_length_ignores_value() {
    let mut a = Array1::<_, i32>::from_elements(HeapProvider, vec![1, 2, 3]).unwrap();
    a.resize_with(3, 42).unwrap();
    // Existing contents survive: same length only changes size, never data.
    assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn resize_overflow_leaves_adaptor_intact() {
    let mut a = Array1::<_, u64>::from_elements(HeapProvider, vec![1, 2]).unwrap();
    assert_eq!(a.resize(usize::MAX), Err(BufferError::CapacityOverflow));
    assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
}

// =============================================================================
// Value semantics
// =============================================================================

#[test]
fn clone_is_a_deep_copy() {
    let a = Array1::<_, i32>::from_elements(HeapProvider, vec![1, 2, 3]).unwrap();
    let mut b = a.clone();
    assert_eq!(a, b);
    b[0] = 99;
    assert_eq!(a[0], 1);
    assert_ne!(a, b);
}

#[test]
fn take_leaves_the_empty_state() {
    let mut a = Array1::<_, i32>::from_elements(HeapProvider, vec![4, 5, 6]).unwrap();
    let b = a.take();
    assert_eq!(b.iter().copied().collect::<Vec<_>>(), vec![4, 5, 6]);
    assert_eq!(a.len(), 0);
    assert!(a.share_handle().is_none());
}

#[test]
fn equality_is_by_content() {
    let a = Array1::<_, i32>::from_elements(HeapProvider, vec![1, 2]).unwrap();
    let b = Array1::<_, i32>::from_elements(HeapProvider, vec![1, 2]).unwrap();
    let c = Array1::<_, i32>::from_elements(HeapProvider, vec![1, 3]).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn debug_prints_elements() {
    let a = Array1::<_, i32>::from_elements(HeapProvider, vec![1, 2]).unwrap();
    assert_eq!(alloc::format!("{a:?}"), "[1, 2]");
}

// =============================================================================
// Handle boundary
// =============================================================================

#[test]
fn adopting_a_wrong_rank_handle_fails() {
    let handle = HeapProvider.create(i32::TAG, &[2, 3], &[12, 4]).unwrap();
    let err = Array1::<_, i32>::from_handle(HeapProvider, handle).unwrap_err();
    assert_eq!(
        err,
        BufferError::RankMismatch {
            expected: 1,
            actual: 2
        }
    );
}

#[test]
fn adopting_a_wrong_tag_handle_fails() {
    let handle = HeapProvider.create(u32::TAG, &[3], &[4]).unwrap();
    let err = Array1::<_, i32>::from_handle(HeapProvider, handle).unwrap_err();
    assert!(matches!(err, BufferError::TagMismatch { .. }));
}

#[test]
fn adopting_a_strided_handle_fails() {
    let handle = HeapProvider.create(i32::TAG, &[3], &[8]).unwrap();
    let err = Array1::<_, i32>::from_handle(HeapProvider, handle).unwrap_err();
    assert_eq!(
        err,
        BufferError::StrideMismatch {
            axis: 0,
            expected: 4,
            actual: 8
        }
    );
}

#[test]
fn failed_handle_assignment_keeps_the_old_buffer() {
    let mut a = Array1::<_, i32>::from_elements(HeapProvider, vec![1, 2, 3]).unwrap();
    let bad = HeapProvider.create(u8::TAG, &[4], &[1]).unwrap();
    assert!(a.assign_handle(bad).is_err());
    assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn shared_handle_aliases_storage() {
    let mut a = Array1::<_, i32>::from_elements(HeapProvider, vec![1, 2, 3]).unwrap();
    let alias = Array1::<_, i32>::from_handle(HeapProvider, a.share_handle().unwrap()).unwrap();
    a[1] = 42;
    // Both adaptors wrap the same allocation.
    assert_eq!(alias[1], 42);
}

// =============================================================================
// Arena provider
// =============================================================================

#[test]
fn arena_round_trip() {
    let arena = Bump::new();
    let p = ArenaProvider::new(&arena);
    let mut a = Array1::<_, i64>::from_elements(p, vec![10, 20, 30]).unwrap();
    assert_eq!(a.len(), 3);
    a[2] = 33;
    assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![10, 20, 33]);
}

#[test]
fn arena_clone_is_independent() {
    let arena = Bump::new();
    let p = ArenaProvider::new(&arena);
    let a = Array1::<_, i32>::filled(p, 3, 1).unwrap();
    let mut b = a.clone();
    b.fill(2);
    assert_eq!(a[0], 1);
    assert_eq!(b[0], 2);
}

#[test]
fn arena_resize_keeps_prefix() {
    let arena = Bump::new();
    let p = ArenaProvider::new(&arena);
    let mut a = Array1::<_, u8>::from_elements(p, vec![1, 2, 3, 4]).unwrap();
    a.resize(2).unwrap();
    assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
}

// =============================================================================
// Auto-trait expectations
// =============================================================================

static_assertions::assert_not_impl_any!(Array1<HeapProvider, i64>: Send, Sync);
