use std::sync::Arc;

use irs_model::{
    Accumulation, IntensityRangeStandardization, LandmarkPreset, StandardizationConfig,
    StandardizationError, TrainingSample,
};
use ndarray::{Array1, Array2};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("warn").try_init();
}

fn slice(gain: f64, gamma: f64) -> Array2<f64> {
    Array2::from_shape_fn((32, 32), |(r, c)| {
        let x = (r * 32 + c) as f64 / 1023.0;
        gain * x.powf(gamma) + 10.0
    })
}

fn trained() -> IntensityRangeStandardization {
    let images = [slice(1000.0, 1.0), slice(400.0, 1.4), slice(2500.0, 0.8)];
    let samples: Vec<_> = images.iter().map(|i| TrainingSample::new(i.view())).collect();
    let config = StandardizationConfig::default()
        .with_preset(LandmarkPreset::L3)
        .with_accumulation(Accumulation::Median)
        .with_output_range(0.0, 100.0);
    let mut model = IntensityRangeStandardization::new(config).unwrap();
    model.train(&samples).unwrap();
    model
}

#[test]
fn save_and_load_reproduce_transform_bit_for_bit() {
    init_tracing();
    let model = trained();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");

    model.save(&path).unwrap();
    let restored = IntensityRangeStandardization::load(&path).unwrap();
    assert_eq!(restored, model);

    let probe = slice(730.0, 1.2);
    let before = model.transform(probe.view(), None).unwrap();
    let after = restored.transform(probe.view(), None).unwrap();
    for (x, y) in before.image.iter().zip(after.image.iter()) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
    assert_eq!(before.image_landmarks, after.image_landmarks);
}

#[test]
fn tied_upper_percentiles_survive_roundtrip() {
    init_tracing();
    let mut values = vec![0.0; 30];
    values.extend(std::iter::repeat(15.1).take(70));
    let image = Array1::from_vec(values);

    let config = StandardizationConfig::default().with_output_range(0.0, 4095.0);
    let mut model = IntensityRangeStandardization::new(config).unwrap();
    model.train(&[TrainingSample::new(image.view())]).unwrap();
    assert!(model.standard_landmarks().unwrap().is_non_decreasing());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tied.json");
    model.save(&path).unwrap();
    let restored = IntensityRangeStandardization::load(&path).unwrap();
    assert_eq!(restored, model);
}

#[test]
fn untrained_model_survives_roundtrip() {
    init_tracing();
    let model = IntensityRangeStandardization::new(StandardizationConfig::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("untrained.json");

    model.save(&path).unwrap();
    let restored = IntensityRangeStandardization::load(&path).unwrap();
    assert!(!restored.is_trained());

    let probe = slice(10.0, 1.0);
    assert!(matches!(
        restored.transform(probe.view(), None),
        Err(StandardizationError::Untrained)
    ));
}

#[test]
fn load_reports_missing_file_and_garbage() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    let missing = IntensityRangeStandardization::load(dir.path().join("absent.json"));
    assert!(matches!(missing, Err(StandardizationError::Io(_))));

    let path = dir.path().join("garbage.json");
    std::fs::write(&path, "{ not json").unwrap();
    let garbage = IntensityRangeStandardization::load(&path);
    assert!(matches!(garbage, Err(StandardizationError::Serde(_))));
}

#[test]
fn shared_model_transforms_concurrently() {
    init_tracing();
    let model = Arc::new(trained());
    let probes: Vec<Array2<f64>> = (0..8)
        .map(|k| slice(300.0 + 200.0 * k as f64, 0.7 + 0.1 * k as f64))
        .collect();

    let sequential: Vec<_> = probes
        .iter()
        .map(|p| model.transform(p.view(), None).unwrap().image)
        .collect();

    let concurrent: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = probes
            .iter()
            .map(|p| {
                let model = Arc::clone(&model);
                scope.spawn(move || model.transform(p.view(), None).unwrap().image)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, concurrent);
}
