use irs_model::{
    Accumulation, IntensityRangeStandardization, LandmarkPreset, StandardizationConfig,
    TrainingSample,
};
use tracing::{debug, warn};

use crate::data_generator::ScannerFixture;
use crate::metrics::{self, MetricSet};

/// Result of standardizing one fixture with one configuration.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub fixture_name: String,
    pub config_name: String,
    /// Spread of the held-out scans before standardization.
    pub before: MetricSet,
    /// Spread of the held-out scans after standardization.
    pub after: MetricSet,
    /// Average fraction of voxels outside the cutoff landmarks.
    pub out_of_range_fraction: f64,
    /// Held-out scans that could not be transformed.
    pub failed_scans: usize,
}

/// Named configurations evaluated on every fixture.
pub fn standard_configs() -> Vec<(&'static str, StandardizationConfig)> {
    let base = StandardizationConfig::default().with_output_range(0.0, 1000.0);
    vec![
        ("L2/mean", base.clone().with_preset(LandmarkPreset::L2)),
        ("L4/mean", base.clone().with_preset(LandmarkPreset::L4)),
        (
            "L4/median",
            base.clone()
                .with_preset(LandmarkPreset::L4)
                .with_accumulation(Accumulation::Median),
        ),
        (
            "deciles/auto",
            base.with_landmark_points((1..10).map(|i| i as f64 * 10.0).collect())
                .with_auto_output_range(),
        ),
    ]
}

/// Train on the fixture's training scans and measure the held-out ones.
/// Returns `None` if training fails or no held-out scan could be transformed.
pub fn run_evaluation(
    fixture: &ScannerFixture,
    config_name: &str,
    config: StandardizationConfig,
) -> Option<EvaluationResult> {
    let mut model = match IntensityRangeStandardization::new(config) {
        Ok(model) => model,
        Err(e) => {
            warn!(error = %e, config = config_name, "Invalid configuration");
            return None;
        }
    };

    let (training, held_out) = fixture.scans.split_at(fixture.training_scans);
    let samples: Vec<_> = training
        .iter()
        .map(|scan| TrainingSample::with_mask(scan.image.view(), scan.mask.view()))
        .collect();
    if let Err(e) = model.train(&samples) {
        warn!(error = %e, config = config_name, fixture = %fixture.name, "Training failed");
        return None;
    }

    let mut raw_means = Vec::new();
    let mut standardized_means = Vec::new();
    let mut out_of_range = 0.0;
    let mut failed_scans = 0;
    for scan in held_out {
        match model.transform(scan.image.view(), Some(scan.mask.view())) {
            Ok(outcome) => {
                debug!(
                    scanner = %scan.scanner,
                    landmarks = ?outcome.image_landmarks.values(),
                    "Scan standardized"
                );
                out_of_range += outcome.out_of_range.total() as f64 / scan.image.len() as f64;
                raw_means.push(metrics::tissue_means(scan.image.view(), scan.labels.view()));
                standardized_means
                    .push(metrics::tissue_means(outcome.image.view(), scan.labels.view()));
            }
            Err(e) => {
                warn!(error = %e, scanner = %scan.scanner, "Transform failed");
                failed_scans += 1;
            }
        }
    }

    if raw_means.is_empty() {
        return None;
    }

    Some(EvaluationResult {
        fixture_name: fixture.name.clone(),
        config_name: config_name.to_string(),
        before: metrics::compute_spread(&raw_means),
        after: metrics::compute_spread(&standardized_means),
        out_of_range_fraction: out_of_range / raw_means.len() as f64,
        failed_scans,
    })
}

/// Run every standard configuration on every fixture.
pub fn run_all_evaluations(fixtures: &[ScannerFixture]) -> Vec<EvaluationResult> {
    fixtures
        .iter()
        .flat_map(|fixture| {
            standard_configs()
                .into_iter()
                .filter_map(move |(name, config)| run_evaluation(fixture, name, config))
        })
        .collect()
}
