//! Benchmarks for the per-cycle CPU stages on synthetic tabletop scenes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{Point3, Vector3};
use pnp_core::{PointCloud, ServiceResult};
use pnp_features::{FeatureVector, NormalEstimator};
use pnp_objdetect::Classifier;
use pnp_runtime::{PerceptionPipeline, PipelineConfig, TaskSetup};
use pnp_task::{DropBox, DropBoxTable, MemorySink, PickListItem};
use pnp_point_cloud::{
    ClusterConfig, ClusterExtractor, PlaneConfig, PlaneSegmenter, PreprocessConfig, Preprocessor,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;

struct UpNormals;

impl NormalEstimator for UpNormals {
    fn estimate_normals(&self, cloud: &PointCloud, _: Duration) -> ServiceResult<Vec<Vector3<f32>>> {
        Ok(vec![Vector3::z(); cloud.len()])
    }
}

struct Fixed;

impl Classifier for Fixed {
    fn classify(&self, _: &FeatureVector) -> pnp_objdetect::Result<String> {
        Ok("box".to_string())
    }
}

/// Dense table of `side x side` points with a few boxes on it.
fn create_scene(side: usize) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(42);
    let step = 0.9 / side as f32;
    let mut points = Vec::with_capacity(side * side + 800);
    let mut colors = Vec::with_capacity(side * side + 800);

    for i in 0..side {
        for j in 0..side {
            points.push(Point3::new(
                0.2 + i as f32 * step,
                -0.45 + j as f32 * step,
                0.7 + rng.gen_range(-0.002..0.002),
            ));
            colors.push(Point3::new(0.5, 0.4, 0.3));
        }
    }
    for b in 0..4 {
        let (cx, cy) = (0.3 + b as f32 * 0.15, -0.3 + b as f32 * 0.15);
        for _ in 0..200 {
            points.push(Point3::new(
                cx + rng.gen_range(0.0..0.05),
                cy + rng.gen_range(0.0..0.05),
                0.75 + rng.gen_range(0.0..0.08),
            ));
            colors.push(Point3::new(rng.gen(), rng.gen(), rng.gen()));
        }
    }

    PointCloud::new(points).with_colors(colors).unwrap()
}

fn benchmark_preprocess(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocess");
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(20);

    let pre = Preprocessor::new(PreprocessConfig::default());
    for side in [100usize, 200, 300] {
        let scene = create_scene(side);
        group.bench_with_input(BenchmarkId::new("run", scene.len()), &scene, |b, s| {
            b.iter(|| black_box(pre.run(black_box(s))))
        });
    }
    group.finish();
}

fn benchmark_segment_and_cluster(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_cluster");
    group.sample_size(20);

    let filtered = Preprocessor::new(PreprocessConfig {
        outlier_stddev_mul: 2.0,
        ..PreprocessConfig::default()
    })
    .run(&create_scene(200));

    let segmenter = PlaneSegmenter::new(PlaneConfig {
        seed: Some(1),
        ..PlaneConfig::default()
    });
    group.bench_function("ransac_plane", |b| {
        b.iter(|| black_box(segmenter.segment(black_box(&filtered))))
    });

    if let Ok(split) = segmenter.segment(&filtered) {
        if let Ok(objects) = split.objects(&filtered) {
            let extractor = ClusterExtractor::new(ClusterConfig::default());
            group.bench_function("euclidean_cluster", |b| {
                b.iter(|| black_box(extractor.extract(black_box(&objects))))
            });
        }
    }
    group.finish();
}

fn benchmark_full_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_cycle");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    let mut config = PipelineConfig::default();
    config.preprocess.outlier_stddev_mul = 2.0;
    config.plane.seed = Some(1);

    let task = TaskSetup {
        pick_list: vec![
            PickListItem::new("box", "red"),
            PickListItem::new("book", "red"),
            PickListItem::new("glue", "red"),
        ],
        dropboxes: DropBoxTable::from_entries(vec![DropBox::new("red", "left", [0.0, 0.71, 0.605])])
            .unwrap(),
    };
    let mut pipeline = PerceptionPipeline::new(
        &config,
        Arc::new(Fixed),
        Arc::new(UpNormals),
        task,
        Box::new(MemorySink::default()),
    );

    let scene = create_scene(200);
    group.bench_function("run_cycle", |b| {
        b.iter(|| black_box(pipeline.run_cycle(black_box(&scene)).is_ok()))
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_preprocess,
    benchmark_segment_and_cluster,
    benchmark_full_cycle
);
criterion_main!(benches);
