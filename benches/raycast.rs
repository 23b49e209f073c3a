use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Vec2, Vec3};
use hover_scene::camera::PerspectiveCamera;
use hover_scene::math::Ray;
use hover_scene::raycast::Raycaster;
use hover_scene::scene::{primitives, Material, Mesh, Node, NodeId, NodeKind, SceneGraph};

/// Scene with one sphere under the root, tessellated `segments` x `segments / 2`
fn sphere_scene(segments: u32) -> (SceneGraph, NodeId) {
    let mut graph = SceneGraph::new();
    let material = graph.add_material(Material::standard([1.0; 4]));
    let mesh = graph.add_mesh(Mesh::single(
        primitives::sphere(1.0, segments, segments / 2),
        material,
    ));
    let root = graph.root();
    let node = graph.add(root, Node::new(NodeKind::Mesh(mesh)).at(Vec3::new(0.0, 0.0, -5.0)));
    graph.update_world_matrices();
    (graph, node)
}

/// Benchmark: early-exit hover test against a sphere (hit case)
fn bench_hits_object_hit(c: &mut Criterion) {
    let (graph, node) = sphere_scene(32);
    let raycaster = Raycaster::new(Ray::new(Vec3::ZERO, Vec3::NEG_Z));

    c.bench_function("hits_object_hit", |b| {
        b.iter(|| black_box(raycaster.hits_object(black_box(&graph), node)))
    });
}

/// Benchmark: early-exit hover test against a sphere (miss case)
fn bench_hits_object_miss(c: &mut Criterion) {
    let (graph, node) = sphere_scene(32);
    let raycaster = Raycaster::new(Ray::new(Vec3::new(5.0, 5.0, 0.0), Vec3::NEG_Z));

    c.bench_function("hits_object_miss", |b| {
        b.iter(|| black_box(raycaster.hits_object(black_box(&graph), node)))
    });
}

/// Benchmark: sorted intersection list by tessellation level
fn bench_intersect_object(c: &mut Criterion) {
    let mut group = c.benchmark_group("intersect_object");

    for segments in [16, 64, 256] {
        let (graph, node) = sphere_scene(segments);
        let raycaster = Raycaster::new(Ray::new(Vec3::ZERO, Vec3::NEG_Z));

        group.bench_with_input(BenchmarkId::from_parameter(segments), &segments, |b, _| {
            b.iter(|| black_box(raycaster.intersect_object(black_box(&graph), node)))
        });
    }

    group.finish();
}

/// Benchmark: pointer sweep across the viewport, one pick per frame
fn bench_pointer_sweep(c: &mut Criterion) {
    let (graph, node) = sphere_scene(64);
    let mut camera = PerspectiveCamera::new(75.0, 4.0 / 3.0, 0.1, 100.0);
    camera.position = Vec3::ZERO;
    camera.target = Vec3::new(0.0, 0.0, -5.0);

    let pointers: Vec<Vec2> = (0..256)
        .map(|i| {
            let t = i as f32 / 255.0;
            Vec2::new(t * 2.0 - 1.0, (t * 6.0).sin() * 0.5)
        })
        .collect();

    c.bench_function("pointer_sweep_256", |b| {
        let mut raycaster = Raycaster::default();
        b.iter(|| {
            let mut hits = 0;
            for pointer in &pointers {
                raycaster.set_from_camera(*pointer, &camera);
                if raycaster.hits_object(&graph, node) {
                    hits += 1;
                }
            }
            black_box(hits)
        })
    });
}

criterion_group!(
    benches,
    bench_hits_object_hit,
    bench_hits_object_miss,
    bench_intersect_object,
    bench_pointer_sweep,
);
criterion_main!(benches);
