//! End-to-end behaviour of training and transforming through the model.

use approx::assert_relative_eq;
use irs_model::{
    Accumulation, IntensityRangeStandardization, ModelState, OutOfRangePolicy,
    StandardizationConfig, StandardizationError, TrainingSample,
};
use ndarray::{Array1, Array3};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("warn").try_init();
}

fn deciles_config() -> StandardizationConfig {
    StandardizationConfig::default()
        .with_landmark_points((1..10).map(|i| i as f64 * 10.0).collect())
        .with_cutoffs(1.0, 99.0)
        .with_output_range(0.0, 4095.0)
        .with_accumulation(Accumulation::Mean)
}

/// f(0..=1000) as a 7x11x13 volume: the voxel at percentile p has value f(10 p).
fn volume(f: fn(f64) -> f64) -> Array3<f64> {
    let values: Vec<f64> = (0..=1000).map(|i| f(i as f64)).collect();
    Array3::from_shape_vec((7, 11, 13), values).unwrap()
}

fn linear(x: f64) -> f64 {
    0.8 * x + 40.0
}
fn convex(x: f64) -> f64 {
    x * x / 500.0
}
fn concave(x: f64) -> f64 {
    (x + 1.0).ln() * 300.0
}

fn mapped(f: fn(f64) -> f64) -> Vec<f64> {
    let positions = deciles_config().percentile_positions();
    let low = f(10.0 * positions[0]);
    let high = f(10.0 * positions[positions.len() - 1]);
    positions
        .iter()
        .map(|p| (f(10.0 * p) - low) / (high - low) * 4095.0)
        .collect()
}

fn trained_model(images: &[Array3<f64>]) -> IntensityRangeStandardization {
    let samples: Vec<_> = images.iter().map(|i| TrainingSample::new(i.view())).collect();
    let mut model = IntensityRangeStandardization::new(deciles_config()).unwrap();
    model.train(&samples).unwrap();
    model
}

#[test]
fn mean_of_three_closed_form_images() {
    init_tracing();
    let images = [volume(linear), volume(convex), volume(concave)];
    let model = trained_model(&images);

    let standard = model.standard_landmarks().unwrap().values();
    assert_eq!(standard.len(), 11);
    assert_eq!(standard[0], 0.0);
    assert_eq!(standard[10], 4095.0);

    let (a, b, c) = (mapped(linear), mapped(convex), mapped(concave));
    for pos in 1..10 {
        assert_relative_eq!(standard[pos], (a[pos] + b[pos] + c[pos]) / 3.0, epsilon = 1e-6);
    }
}

#[test]
fn training_image_maps_cutoffs_and_median_onto_standard_scale() {
    init_tracing();
    let images = [volume(linear), volume(convex), volume(concave)];
    let model = trained_model(&images);
    let standard = model.standard_landmarks().unwrap().values().to_vec();

    let outcome = model.transform(images[1].view(), None).unwrap();
    let flat: Vec<f64> = outcome.image.iter().copied().collect();

    // Voxel i holds f(i); percentile p sits at voxel 10 p.
    assert_relative_eq!(flat[10], 0.0, epsilon = 1e-6);
    assert_relative_eq!(flat[990], 4095.0, epsilon = 1e-6);
    assert_relative_eq!(flat[500], standard[5], epsilon = 1e-6);
}

#[test]
fn landmark_sets_are_monotone() {
    init_tracing();
    let config = deciles_config();
    let model = trained_model(&[volume(linear), volume(convex)]);

    for f in [linear as fn(f64) -> f64, convex, concave] {
        let outcome = model.transform(volume(f).view(), None).unwrap();
        assert!(outcome.image_landmarks.is_non_decreasing());
        assert_eq!(outcome.image_landmarks.len(), config.landmark_count());
    }
    assert!(model.standard_landmarks().unwrap().is_non_decreasing());
}

#[test]
fn training_is_idempotent() {
    init_tracing();
    let images = [volume(linear), volume(convex), volume(concave)];
    let samples: Vec<_> = images.iter().map(|i| TrainingSample::new(i.view())).collect();

    let mut model = IntensityRangeStandardization::new(deciles_config()).unwrap();
    model.train(&samples).unwrap();
    let first = model.standard_landmarks().unwrap().clone();
    model.train(&samples).unwrap();
    let second = model.standard_landmarks().unwrap().clone();

    assert_eq!(first, second);
}

#[test]
fn transform_before_train_fails() {
    init_tracing();
    let model = IntensityRangeStandardization::new(deciles_config()).unwrap();
    let result = model.transform(volume(linear).view(), None);
    assert!(matches!(result, Err(StandardizationError::Untrained)));
}

#[test]
fn constant_masked_region_is_rejected_without_state_change() {
    init_tracing();
    let mut image = volume(linear);
    image.slice_mut(ndarray::s![0..2, 0..3, 0..4]).fill(123.0);
    let mask = image.mapv(|v| v == 123.0);

    let mut model = IntensityRangeStandardization::new(deciles_config()).unwrap();
    let err = model
        .train(&[TrainingSample::with_mask(image.view(), mask.view())])
        .unwrap_err();
    assert!(err.is_single_intensity_accumulation());
    assert!(err.to_string().contains("training sample 0"));
    assert_eq!(model.state(), &ModelState::Untrained);

    // A trained model also keeps its scale.
    let good = volume(linear);
    model.train(&[TrainingSample::new(good.view())]).unwrap();
    let before = model.clone();
    assert!(model
        .train(&[
            TrainingSample::new(good.view()),
            TrainingSample::with_mask(image.view(), mask.view()),
        ])
        .is_err());
    assert_eq!(model, before);
}

#[test]
fn strict_mode_rejects_while_default_mode_extrapolates() {
    init_tracing();
    let images = [volume(linear), volume(convex), volume(concave)];
    let samples: Vec<_> = images.iter().map(|i| TrainingSample::new(i.view())).collect();

    // An image reaching well below its low cutoff landmark.
    let mut values: Vec<f64> = (0..=1000).map(|i| linear(i as f64)).collect();
    values[0] = -500.0;
    let probe = Array1::from_vec(values);

    let mut lenient = IntensityRangeStandardization::new(deciles_config()).unwrap();
    lenient.train(&samples).unwrap();
    let outcome = lenient.transform(probe.view(), None).unwrap();
    assert!(outcome.image[0] < 0.0);
    assert!(outcome.information_loss);
    assert!(outcome.out_of_range.below > 0);

    let mut clamping = IntensityRangeStandardization::new(
        deciles_config().with_out_of_range(OutOfRangePolicy::Clamp),
    )
    .unwrap();
    clamping.train(&samples).unwrap();
    let outcome = clamping.transform(probe.view(), None).unwrap();
    assert_eq!(outcome.image[0], 0.0);
    assert!(outcome.information_loss);

    let mut strict = IntensityRangeStandardization::new(
        deciles_config().with_out_of_range(OutOfRangePolicy::Reject),
    )
    .unwrap();
    strict.train(&samples).unwrap();
    let err = strict.transform(probe.view(), None).unwrap_err();
    match err {
        StandardizationError::InformationLoss { below, .. } => assert!(below > 0),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn scanners_become_comparable() {
    init_tracing();
    // The same anatomy seen through two different monotone intensity responses.
    let anatomy: Vec<f64> = (0..=1000).map(|i| i as f64).collect();
    let scanner_a = Array1::from_iter(anatomy.iter().map(|&x| 2.0 * x + 100.0));
    let scanner_b = Array1::from_iter(anatomy.iter().map(|&x| 0.5 * x - 30.0));

    let model = {
        let mut model = IntensityRangeStandardization::new(deciles_config()).unwrap();
        model
            .train(&[TrainingSample::new(scanner_a.view())])
            .unwrap();
        model
    };

    let a = model.transform(scanner_a.view(), None).unwrap();
    let b = model.transform(scanner_b.view(), None).unwrap();
    for (x, y) in a.image.iter().zip(b.image.iter()) {
        assert_relative_eq!(*x, *y, epsilon = 1e-6);
    }
}
