/// Synthetic workload benchmarks
///
/// Tracks the cost of the CPU and memory shapes of the workload so a
/// strategy comparison is not skewed by a regression in the workload itself.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use greenci::hypothesis::{mann_whitney_u, wilcoxon_signed_rank, Alternative};
use greenci::workload::{cpu_intensive_task, memory_intensive_task};

fn bench_factorial(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_intensive_task");

    for n in [100i64, 1_000, 5_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(cpu_intensive_task(black_box(n))));
        });
    }

    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_intensive_task");

    for size in [1_000usize, 100_000, 1_000_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| black_box(memory_intensive_task(black_box(size))));
        });
    }

    group.finish();
}

/// Exact null distributions grow with n; keep an eye on the largest exact case
fn bench_rank_tests(c: &mut Criterion) {
    let x: Vec<f64> = (0..20).map(|i| 10.0 + i as f64 * 0.37).collect();
    let y: Vec<f64> = (0..20).map(|i| 2.0 + i as f64 * 0.41).collect();
    let paired: Vec<f64> = (0..50).map(|i| i as f64 * 1.13).collect();
    let shifted: Vec<f64> = paired.iter().map(|v| v * 0.7 - 0.01).collect();

    c.bench_function("mann_whitney_exact_20x20", |b| {
        b.iter(|| mann_whitney_u(black_box(&x), black_box(&y), Alternative::Greater))
    });
    c.bench_function("wilcoxon_exact_50", |b| {
        b.iter(|| {
            wilcoxon_signed_rank(
                black_box(&paired),
                black_box(&shifted),
                Alternative::TwoSided,
            )
        })
    });
}

criterion_group!(benches, bench_factorial, bench_sort, bench_rank_tests);
criterion_main!(benches);
