//! Panel engine benchmarks
//!
//! Group layout construction, split/revert round trips and chunked rolling
//! aggregation on synthetic panels.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2, Axis};
use panelrs::{stats, EngineConfig, ParallelGroupBy, Rolling, RollingConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn synthetic_keys(n: usize, groups: i64) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n).map(|_| rng.random_range(0..groups)).collect()
}

fn synthetic_panel(rows: usize, time: usize) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(7);
    Array2::from_shape_fn((rows, time), |_| {
        if rng.random_bool(0.05) {
            f64::NAN
        } else {
            rng.random_range(1.0..100.0)
        }
    })
}

fn bench_group_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_layout");
    for &n in &[10_000usize, 100_000, 1_000_000] {
        let keys = synthetic_keys(n, 500);
        group.bench_with_input(BenchmarkId::from_parameter(n), &keys, |b, keys| {
            b.iter(|| ParallelGroupBy::new(keys))
        });
    }
    group.finish();
}

fn bench_split_reduce_revert(c: &mut Criterion) {
    let n = 200_000;
    let keys = synthetic_keys(n, 1_000);
    let values: Array1<f64> = (0..n).map(|i| i as f64 * 0.5).collect();
    let groupby = ParallelGroupBy::new(&keys);

    c.bench_function("split_demean_revert", |b| {
        b.iter(|| {
            groupby
                .transform(&values, "demean", |g| {
                    let mean = stats::nanmean(&g, Axis(1)).insert_axis(Axis(1));
                    &g - &mean
                })
                .unwrap()
        })
    });
}

fn bench_rolling(c: &mut Criterion) {
    let x = synthetic_panel(2_000, 250);
    let mut group = c.benchmark_group("rolling_nanmean");
    for &budget in &[50_000usize, 500_000, 5_000_000] {
        let config = EngineConfig {
            rolling: RollingConfig::new().with_max_chunk_elements(budget),
            ..EngineConfig::default()
        };
        let rolling = Rolling::with_config(&x, 20, None, &config).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(budget), &rolling, |b, r| {
            b.iter(|| r.nanmean().unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_group_layout,
    bench_split_reduce_revert,
    bench_rolling
);
criterion_main!(benches);
