//! Benchmarks for training and transforming.
//!
//! Covers: train over growing sample sets, transform of a single volume.

use benchmarks::synthetic_volume;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use irs_model::{IntensityRangeStandardization, StandardizationConfig, TrainingSample};
use ndarray::Array3;

fn config() -> StandardizationConfig {
    StandardizationConfig::default().with_output_range(0.0, 4095.0)
}

fn volumes(count: usize, side: usize) -> Vec<Array3<u16>> {
    (0..count)
        .map(|i| synthetic_volume(side, 1500.0 + 400.0 * i as f64, i as u64 + 1))
        .collect()
}

fn bench_train(c: &mut Criterion) {
    let mut group = c.benchmark_group("train");

    for count in [2, 8, 32] {
        let images = volumes(count, 24);
        group.bench_with_input(BenchmarkId::from_parameter(count), &images, |b, images| {
            let samples: Vec<_> = images.iter().map(|i| TrainingSample::new(i.view())).collect();
            b.iter(|| {
                let mut model = IntensityRangeStandardization::new(config()).unwrap();
                model.train(black_box(&samples)).map(|_| ()).unwrap();
                model
            })
        });
    }

    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");

    let training = volumes(4, 24);
    let samples: Vec<_> = training.iter().map(|i| TrainingSample::new(i.view())).collect();
    let mut model = IntensityRangeStandardization::new(config()).unwrap();
    model.train(&samples).unwrap();

    for side in [16, 32, 64] {
        let volume = synthetic_volume(side, 2600.0, 99);
        group.bench_with_input(BenchmarkId::from_parameter(side), &volume, |b, v| {
            b.iter(|| model.transform(black_box(v.view()), None).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_train, bench_transform);
criterion_main!(benches);
