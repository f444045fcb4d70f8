//! Benchmarks for CursorIter vs slice iterators
//!
//! Run with: `cargo bench --bench cursor`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use hostbuf_cursor::{CursorIter, PtrCursor};

fn cursor_iter(slice: &[u64]) -> CursorIter<PtrCursor<'_, u64>> {
    let base = slice.as_ptr();
    // SAFETY: both cursors stay within `slice`, which outlives the iterator.
    unsafe {
        CursorIter::new(
            PtrCursor::from_ptr(base),
            PtrCursor::from_ptr(base.add(slice.len())),
        )
    }
}

fn bench_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("sum");

    for size in [16usize, 256, 4096, 65536] {
        let data: Vec<u64> = (0..size as u64).collect();

        group.bench_with_input(BenchmarkId::new("CursorIter", size), &data, |b, data| {
            b.iter(|| {
                let total: u64 = cursor_iter(black_box(data)).copied().sum();
                black_box(total);
            });
        });

        group.bench_with_input(BenchmarkId::new("slice::iter", size), &data, |b, data| {
            b.iter(|| {
                let total: u64 = black_box(data).iter().copied().sum();
                black_box(total);
            });
        });
    }

    group.finish();
}

fn bench_reverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("reverse_sum");

    for size in [256usize, 4096] {
        let data: Vec<u64> = (0..size as u64).collect();

        group.bench_with_input(BenchmarkId::new("CursorIter", size), &data, |b, data| {
            b.iter(|| {
                let total: u64 = cursor_iter(black_box(data)).rev().copied().sum();
                black_box(total);
            });
        });

        group.bench_with_input(BenchmarkId::new("slice::iter", size), &data, |b, data| {
            b.iter(|| {
                let total: u64 = black_box(data).iter().rev().copied().sum();
                black_box(total);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sum, bench_reverse);
criterion_main!(benches);
