//! End-to-end walk through the public facade: allocate, mutate through
//! iteration, resize, and read back through both indexing and cursors.

use bumpalo::Bump;
use hostbuf::{Array1, Array2, ArenaProvider, BufferHandle, HeapProvider};
use pretty_assertions::assert_eq;

#[test]
fn fill_resize_and_iterate() {
    let mut a = Array1::<_, i32>::filled(HeapProvider, 5, 0).unwrap();
    assert_eq!(a.len(), 5);
    assert!(a.iter().all(|&x| x == 0));

    for (i, slot) in a.iter_mut().enumerate() {
        *slot = i as i32 + 1;
    }
    assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);

    a.resize(3).unwrap();
    assert_eq!(a.len(), 3);
    assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);

    // One step past the front lands on the second element.
    assert_eq!(a.iter().nth(1), Some(&2));
    assert_eq!(a.iter().rev().next(), Some(&3));
}

#[test]
fn matrix_round_trip_across_providers() {
    let arena = Bump::new();

    let mut heap = Array2::<_, i32>::with_shape(HeapProvider, 2, 3).unwrap();
    let mut bump = Array2::<_, i32>::with_shape(ArenaProvider::new(&arena), 2, 3).unwrap();

    for r in 0..2 {
        for c in 0..3 {
            let v = (10 * r + c) as i32;
            heap[(r, c)] = v;
            bump[(r, c)] = v;
        }
    }

    for r in 0..2 {
        for c in 0..3 {
            assert_eq!(heap[(r, c)], bump[(r, c)]);
        }
    }
}

#[test]
fn handles_cross_the_boundary_and_back() {
    let mut a = Array1::<_, u16>::from_elements(HeapProvider, [1u16, 2, 3]).unwrap();

    // Hand the buffer to "the host" and adopt it again.
    let handle = a.share_handle().unwrap();
    assert_eq!(handle.view().shape(), &[3]);

    let b = Array1::<_, u16>::from_handle(HeapProvider, handle).unwrap();
    a[0] = 100;
    assert_eq!(b[0], 100);

    // A duplicate is detached.
    let c = a.duplicate().unwrap();
    a[0] = 1;
    assert_eq!(c[0], 100);
}
