//! Benchmarks for the per-frame CPU work.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wishtree::config::WishtreeConfig;
use wishtree::morph::TreeState;
use wishtree::scene::Scene;

fn config_with(count: u32) -> WishtreeConfig {
    let mut config = WishtreeConfig::default();
    config.scene.box_count = count / 4;
    config.scene.ball_count = count / 2;
    config.scene.light_count = count / 4;
    config.photos.builtin = (0..24).map(|i| format!("photo-{i}")).collect();
    config
}

fn bench_scene_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_update");

    for count in [1_500u32, 10_000, 50_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut scene = Scene::new(&config_with(count));
            let mut state = TreeState::Chaos;
            let mut frame = 0u32;
            b.iter(|| {
                // Flip state once a second so particles keep moving
                frame += 1;
                if frame % 60 == 0 {
                    state = if state.is_formed() { TreeState::Chaos } else { TreeState::Formed };
                }
                scene.update(black_box(state), black_box(1.0 / 60.0));
            })
        });
    }

    group.finish();
}

fn bench_write_instances(c: &mut Criterion) {
    let scene = Scene::new(&config_with(10_000));
    let mut out = Vec::new();

    c.bench_function("write_structural_instances_10k", |b| {
        b.iter(|| {
            scene.write_structural_instances(&mut out);
            black_box(out.len())
        })
    });
}

fn bench_scene_build(c: &mut Criterion) {
    let config = config_with(10_000);
    c.bench_function("scene_build_10k", |b| b.iter(|| black_box(Scene::new(&config))));
}

criterion_group!(benches, bench_scene_update, bench_write_instances, bench_scene_build);
criterion_main!(benches);
