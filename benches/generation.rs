//! Benchmarks for level generation and connectivity analysis.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sar_mission::{bfs_distances, connected_components, Difficulty, GameConfig, LevelGenerator};

fn bench_level_generation(c: &mut Criterion) {
    let config = GameConfig::default();
    let generator = LevelGenerator::new();
    let mut group = c.benchmark_group("level_generation");

    for difficulty in Difficulty::all() {
        let params = config.level_params(difficulty);
        group.bench_with_input(
            BenchmarkId::from_parameter(difficulty.key()),
            &params,
            |b, params| b.iter(|| generator.build(black_box(params))),
        );
    }
    group.finish();
}

fn bench_connectivity(c: &mut Criterion) {
    let level = LevelGenerator::new().build(&GameConfig::default().level_params(Difficulty::Hard));

    c.bench_function("bfs_distances", |b| {
        b.iter(|| bfs_distances(black_box(level.start), black_box(&level.passable)))
    });
    c.bench_function("connected_components", |b| {
        b.iter(|| connected_components(black_box(&level.passable)))
    });
}

criterion_group!(benches, bench_level_generation, bench_connectivity);
criterion_main!(benches);
