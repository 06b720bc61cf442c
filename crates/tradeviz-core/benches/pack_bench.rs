// File: crates/tradeviz-core/benches/pack_bench.rs
// Summary: Criterion benchmarks for circle packing.

use criterion::{criterion_group, criterion_main, Criterion, black_box};
use tradeviz_core::Pack;

fn values(n: usize) -> Vec<f64> {
    // Skewed like commodity export totals: a few large, many small.
    (0..n).map(|i| 1e5 / (1.0 + i as f64).powf(1.3) + (i * 7919 % 97) as f64).collect()
}

fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_layout");
    let pack = Pack::new(580.0, 580.0).padding(2.0);
    for &n in &[16usize, 256, 2_000] {
        let data = values(n);
        group.bench_function(format!("leaves_{n}"), |b| {
            b.iter(|| black_box(pack.layout(black_box(&data)).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pack);
criterion_main!(benches);
