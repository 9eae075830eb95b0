//! Benchmarks for the CPU-side field update.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trifield::{FieldConfig, Frame, Pointer, Screen, Swarm, Tuning, Vec2};

const SCREEN: Screen = Screen {
    width: 1920.0,
    height: 1080.0,
};

fn swarm(count: u32) -> Swarm {
    let config = FieldConfig {
        particle_count: count,
        seed: Some(42),
        ..Default::default()
    };
    Swarm::new(config, SCREEN)
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("swarm_update");

    for count in [1_000u32, 5_000, 20_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("still_pointer", count), &count, |b, &count| {
            let mut swarm = swarm(count);
            let mut buffers = swarm.instance_buffers();
            let tuning = Tuning::default();
            let mut time = 0.0f32;
            b.iter(|| {
                time += 1.0 / 60.0;
                let frame = Frame {
                    time,
                    screen: SCREEN,
                    pointer: Pointer::at(Vec2::new(960.0, 540.0)),
                };
                black_box(swarm.update(&frame, &tuning, &mut buffers))
            })
        });
    }

    group.finish();
}

fn bench_fast_pointer(c: &mut Criterion) {
    c.bench_function("swarm_update/fast_pointer_5000", |b| {
        let mut swarm = swarm(5_000);
        let mut buffers = swarm.instance_buffers();
        let tuning = Tuning::default();
        let mut time = 0.0f32;
        b.iter(|| {
            time += 1.0 / 60.0;
            let x = (time * 400.0) % SCREEN.width;
            let frame = Frame {
                time,
                screen: SCREEN,
                pointer: Pointer {
                    position: Vec2::new(x, 540.0),
                    previous: Vec2::new(x - 20.0, 540.0),
                },
            };
            black_box(swarm.update(&frame, &tuning, &mut buffers))
        })
    });
}

fn bench_scatter(c: &mut Criterion) {
    c.bench_function("swarm_scatter_5000", |b| {
        let mut swarm = swarm(5_000);
        b.iter(|| swarm.scatter(black_box(SCREEN)))
    });
}

criterion_group!(benches, bench_update, bench_fast_pointer, bench_scatter);
criterion_main!(benches);
