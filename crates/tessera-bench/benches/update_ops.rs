//! Criterion micro-benchmarks for the per-block and per-partition kernels.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tessera_bench::reference_profile;
use tessera_core::BlockId;
use tessera_data::BASE_STAGE;
use tessera_update::{average_containers, flux_divergence, pack, update_container};

/// Benchmark: flux divergence over one 16³ block with 5 components.
fn bench_flux_divergence_block(c: &mut Criterion) {
    let mesh = reference_profile().unwrap();
    let base = mesh.block(BlockId(0)).unwrap().stage(BASE_STAGE).unwrap();
    let dudt = base.derive(&["cons"], false).unwrap();

    c.bench_function("flux_divergence_block", |b| {
        b.iter(|| {
            flux_divergence(black_box(&base), &dudt).unwrap();
        });
    });
}

/// Benchmark: in-place stage update over one block.
fn bench_update_container_block(c: &mut Criterion) {
    let mesh = reference_profile().unwrap();
    let base = mesh.block(BlockId(0)).unwrap().stage(BASE_STAGE).unwrap();
    let rate = base.derive(&["cons"], false).unwrap();

    c.bench_function("update_container_block", |b| {
        b.iter(|| {
            update_container(&base, &rate, black_box(0.01), &base).unwrap();
        });
    });
}

/// Benchmark: convex combination of two stages over one block.
fn bench_average_containers_block(c: &mut Criterion) {
    let mesh = reference_profile().unwrap();
    let base = mesh.block(BlockId(0)).unwrap().stage(BASE_STAGE).unwrap();
    let other = base.derive(&["cons"], false).unwrap();

    c.bench_function("average_containers_block", |b| {
        b.iter(|| {
            average_containers(&base, &other, black_box(0.5)).unwrap();
        });
    });
}

/// Benchmark: stage update across a 4-block partition.
fn bench_update_partition(c: &mut Criterion) {
    let mut mesh = reference_profile().unwrap();
    mesh.mesh_data_mut()
        .add_deep_from_base("rate", &["cons"])
        .unwrap();
    let state = mesh.get_or_add_by_partition(BASE_STAGE, 0).unwrap();
    let rate = mesh.get_or_add_by_partition("rate", 0).unwrap();

    c.bench_function("update_partition_4_blocks", |b| {
        b.iter(|| {
            pack::update_mesh_data(&state, &rate, black_box(0.01), &state).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_flux_divergence_block,
    bench_update_container_block,
    bench_average_containers_block,
    bench_update_partition
);
criterion_main!(benches);
