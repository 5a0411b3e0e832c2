use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use sensorstick_algorithms::{extract_features, ColorSpace, HistogramConfig, PcaNormalEstimator};
use sensorstick_core::{ColoredPoint3f, ColoredPointCloud3f, Point3f};

const CLOUD_SIZES: [usize; 3] = [500, 2_000, 8_000];

fn random_cloud(size: usize) -> ColoredPointCloud3f {
    let mut rng = StdRng::seed_from_u64(7);
    (0..size)
        .map(|_| {
            let position = Point3f::new(
                rng.gen_range(-0.1..0.1),
                rng.gen_range(-0.1..0.1),
                rng.gen_range(0.9..1.1),
            );
            ColoredPoint3f::new(position, [rng.gen(), rng.gen(), rng.gen()])
        })
        .collect()
}

fn feature_extraction(c: &mut Criterion) {
    let estimator = PcaNormalEstimator::default();

    let mut g = c.benchmark_group("feature extraction");
    g.sample_size(10);

    for color_space in [ColorSpace::Rgb, ColorSpace::Hsv] {
        let config = HistogramConfig::default().with_color_space(color_space);
        for size in CLOUD_SIZES {
            let cloud = random_cloud(size);
            g.bench_with_input(BenchmarkId::new(color_space.to_string(), size), &cloud, |b, cloud| {
                b.iter(|| extract_features(std::hint::black_box(cloud), &estimator, &config));
            });
        }
    }

    g.finish();
}

criterion_group!(benches, feature_extraction);
criterion_main!(benches);
