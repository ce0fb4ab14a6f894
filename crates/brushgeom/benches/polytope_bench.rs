//! Criterion benchmarks for the brush kernel.
//! Focus sizes: random planes per brush in {4, 8, 16, 32}.
//! Results: by default under target/criterion; to store under data/bench, run:
//!   CARGO_TARGET_DIR=data/bench cargo bench -p brushgeom

use brushgeom::api::{
    clip, cuboid, draw_brush, BBox3, FaceCount, HalfSpace, Hs3, Polytope, RandomBrushCfg,
    ReplayToken,
};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nalgebra::Vector3;

fn cfg(faces: usize) -> RandomBrushCfg {
    RandomBrushCfg {
        face_count: FaceCount::Fixed(faces),
        ..RandomBrushCfg::default()
    }
}

fn bench_intersection(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_faces");
    for &m in &[4usize, 8, 16, 32] {
        group.bench_with_input(BenchmarkId::new("draw_brush", m), &m, |b, &m| {
            let cfg = cfg(m);
            let mut index = 0u64;
            b.iter(|| {
                index += 1;
                let _brush = draw_brush(&cfg, ReplayToken::new(17, index));
            })
        });
    }
    group.finish();
}

fn bench_clip(c: &mut Criterion) {
    let mut group = c.benchmark_group("clip");
    for &m in &[4usize, 8, 16, 32] {
        let Ok(brush) = draw_brush(&cfg(m), ReplayToken::new(5, m as u64)) else {
            continue;
        };
        let cut = HalfSpace::new(Hs3::axis(0, 1.0, 3.0), usize::MAX);
        group.bench_with_input(BenchmarkId::new("through_center", m), &brush, |b, brush| {
            b.iter(|| {
                let _parts = clip(brush, &cut);
            })
        });
    }
    group.finish();
}

fn bench_vertex_move(c: &mut Criterion) {
    let world = BBox3::cube(4096.0);
    let cube: Polytope<&str> = match cuboid(world, BBox3::cube(64.0), "wall") {
        Ok(p) => p,
        Err(_) => return,
    };
    let corner = Vector3::new(64.0, 64.0, 64.0);
    let mut group = c.benchmark_group("move_vertices");
    group.bench_function("can_move_corner", |b| {
        b.iter(|| cube.can_move_vertices(&world, &[corner], Vector3::new(8.0, 8.0, 8.0)))
    });
    group.bench_function("move_corner", |b| {
        b.iter_batched(
            || cube.clone(),
            |mut p| {
                let _res = p.move_vertices(&world, &[corner], Vector3::new(-16.0, 0.0, -16.0));
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_intersection, bench_clip, bench_vertex_move);
criterion_main!(benches);
