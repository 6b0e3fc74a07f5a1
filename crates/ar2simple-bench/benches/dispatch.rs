//! Criterion benchmarks for pool lifecycle and lane dispatch.

use std::hint::black_box;

use ar2simple_bench::spin_jobs;
use ar2simple_context::{dispatch_lanes, Context, ExecutionContext, FixedCpus};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

/// Benchmark: create and tear down a pool of N workers.
fn bench_pool_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_lifecycle");
    for workers in [1usize, 4, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &n| {
            let mut ctx = Context::default().with_cpus(FixedCpus(n.max(2)));
            b.iter(|| {
                let created = ctx.init_thread_pool(n).unwrap();
                black_box(created);
                ctx.destroy_thread_pool().unwrap();
            });
        });
    }
    group.finish();
}

/// Benchmark: one segment (dispatch every lane, then join) on a warm pool.
fn bench_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment");
    for lanes in [2usize, 4, 8] {
        group.bench_with_input(BenchmarkId::new("pooled", lanes), &lanes, |b, &n| {
            let mut ctx = Context::default().with_cpus(FixedCpus(n));
            ctx.init_thread_pool(n).unwrap();
            b.iter(|| dispatch_lanes(&mut ctx, spin_jobs(n, 256)).unwrap());
            ctx.destroy_thread_pool().unwrap();
        });
        group.bench_with_input(BenchmarkId::new("inline", lanes), &lanes, |b, &n| {
            let mut ctx = Context::default().with_cpus(FixedCpus(1));
            ctx.init_thread_pool(n).unwrap();
            b.iter(|| dispatch_lanes(&mut ctx, spin_jobs(n, 256)).unwrap());
        });
    }
    group.finish();
}

/// Benchmark: readiness query on an idle pool.
fn bench_ready_query(c: &mut Criterion) {
    let mut ctx = Context::default().with_cpus(FixedCpus(8));
    ctx.init_thread_pool(8).unwrap();
    c.bench_function("ready_query_8", |b| {
        b.iter(|| {
            let ready = ctx.get_ready_threads(8).unwrap();
            black_box(ready.len());
            // Nothing was dispatched, so the join only clears the claims.
            ctx.join_thread_pool().unwrap();
        });
    });
    ctx.destroy_thread_pool().unwrap();
}

criterion_group!(benches, bench_pool_lifecycle, bench_segment, bench_ready_query);
criterion_main!(benches);
