use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tracenet::prelude::*;

/// A `n` x `n` grid of confirmed vias, each row chained by traces
fn grid_board(n: usize) -> FeatureStore {
    let store = FeatureStore::new();
    for row in 0..n {
        let y = row as f64 * 10.0;
        for col in 0..n {
            store.add_confirmed_via(ConfirmedVia::new(
                format!("cvia-{}", row * n + col + 1),
                Point::new(col as f64 * 10.0, y),
            ));
        }
        for col in 0..n.saturating_sub(1) {
            let id = store.next_trace_id();
            store.add_trace(ExtendedTrace::new(
                id,
                Side::Front,
                vec![
                    Point::new(col as f64 * 10.0, y),
                    Point::new((col + 1) as f64 * 10.0, y),
                ],
                0.5,
            ));
        }
    }
    store
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_nets");
    for n in [8, 16, 32] {
        let store = grid_board(n);
        group.bench_with_input(BenchmarkId::from_parameter(n * n), &store, |b, store| {
            b.iter(|| store.reconcile_nets(black_box(1.0)));
        });
    }
    group.finish();
}

fn bench_hit_test(c: &mut Criterion) {
    let store = grid_board(32);
    c.bench_function("hit_test", |b| {
        b.iter(|| store.hit_test(black_box(155.0), black_box(150.2)));
    });
}

criterion_group!(benches, bench_reconcile, bench_hit_test);
criterion_main!(benches);
