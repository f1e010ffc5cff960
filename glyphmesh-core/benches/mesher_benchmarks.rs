//! Mesher benchmarks: triangulation cost over growing outline densities.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glyphmesh::{Contour, Mesh2D, Mesh3D, MeshFeatures, Outline, OutlinePoint};

fn ring_outline(points_per_contour: usize) -> Outline {
    let circle = |radius: f32| -> Contour {
        let points = (0..points_per_contour)
            .map(|i| {
                let angle = std::f32::consts::TAU * i as f32 / points_per_contour as f32;
                OutlinePoint::new(radius * angle.cos(), radius * angle.sin(), true)
            })
            .collect();
        Contour {
            points,
            subglyph_id: 0,
            subglyph_order: 0,
        }
    };
    Outline::new(vec![circle(1.0), circle(0.55)])
}

fn bench_triangulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangulate_ring");
    for density in [16usize, 64, 128] {
        group.bench_with_input(
            BenchmarkId::from_parameter(density),
            &density,
            |b, &density| {
                b.iter(|| {
                    let outline = ring_outline(density);
                    Mesh2D::from_outline(black_box(outline), MeshFeatures::empty()).unwrap()
                });
            },
        );
    }
    group.finish();
}

fn bench_extrusion(c: &mut Criterion) {
    c.bench_function("extrude_ring_64", |b| {
        b.iter(|| {
            let outline = ring_outline(64);
            Mesh3D::from_outline(black_box(outline), MeshFeatures::empty(), 0.2).unwrap()
        });
    });
}

criterion_group!(benches, bench_triangulation, bench_extrusion);
criterion_main!(benches);
