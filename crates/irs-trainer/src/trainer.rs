use std::time::Instant;

use irs_core::stats::{max_f64, mean, median, min_f64};
use irs_core::{
    Accumulation, LandmarkSet, OutputRange, Result, StandardizationConfig, StandardizationError,
    TrainedLandmarks,
};
use irs_landmarks::{auto_output_range, extract, map_to_scale};
use ndarray::Dimension;
use num_traits::AsPrimitive;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::TrainingSample;

/// Learns the standard landmark scale from a set of training images.
///
/// Extraction runs per sample in parallel; the output range is then resolved
/// and every sample mapped onto it before the position-wise aggregation.
/// Nothing is returned unless every sample succeeded.
pub struct LandmarkTrainer<'c> {
    config: &'c StandardizationConfig,
}

impl<'c> LandmarkTrainer<'c> {
    pub fn new(config: &'c StandardizationConfig) -> Self {
        Self { config }
    }

    pub fn train<T, D>(&self, samples: &[TrainingSample<'_, T, D>]) -> Result<TrainedLandmarks>
    where
        T: AsPrimitive<f64> + Sync,
        D: Dimension,
    {
        if samples.is_empty() {
            return Err(StandardizationError::InvalidInput(
                "cannot train on an empty sample set".into(),
            ));
        }

        let start = Instant::now();
        let config = self.config;
        info!(
            samples = samples.len(),
            landmarks = config.landmark_count(),
            accumulate = ?config.accumulate,
            "Starting landmark training"
        );

        let raw = self.extract_all(samples)?;

        let output_range = match config.output_range {
            OutputRange::Fixed(min, max) => (min, max),
            OutputRange::Auto => auto_output_range(&raw, config.cutoff_percentiles)?,
        };

        let mapped = raw
            .iter()
            .enumerate()
            .map(|(i, landmarks)| {
                map_to_scale(landmarks, config.cutoff_percentiles, output_range)
                    .map_err(|e| e.with_subject(format!("training sample {i}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let (s_min, s_max) = output_range;
        let mut standard: Vec<f64> = aggregate(&mapped, config.accumulate)
            .into_values()
            .into_iter()
            .map(|v| v.max(s_min).min(s_max))
            .collect();
        // Anchors stay exact whatever rounding the aggregation introduced.
        if let Some(first) = standard.first_mut() {
            *first = output_range.0;
        }
        if let Some(last) = standard.last_mut() {
            *last = output_range.1;
        }

        let trained = TrainedLandmarks {
            standard_landmarks: LandmarkSet::new(standard),
            landmark_min: positionwise(&mapped, min_f64),
            landmark_max: positionwise(&mapped, max_f64),
            output_range,
            sample_count: samples.len(),
        };

        info!(
            samples = samples.len(),
            output_range = ?output_range,
            standard_landmarks = ?trained.standard_landmarks.values(),
            elapsed = format!("{:.3}s", start.elapsed().as_secs_f64()),
            "Landmark training complete"
        );

        Ok(trained)
    }

    /// Extract the raw landmarks of every sample in parallel. On failure the
    /// error of the lowest failing sample index is returned.
    fn extract_all<T, D>(&self, samples: &[TrainingSample<'_, T, D>]) -> Result<Vec<LandmarkSet>>
    where
        T: AsPrimitive<f64> + Sync,
        D: Dimension,
    {
        let results: Vec<Result<LandmarkSet>> = samples
            .par_iter()
            .enumerate()
            .map(|(i, sample)| {
                extract(sample.image.view(), sample.mask.as_ref().map(|m| m.view()), self.config)
                    .map_err(|e| e.with_subject(format!("training sample {i}")))
            })
            .collect();

        let mut landmarks = Vec::with_capacity(results.len());
        for (i, result) in results.into_iter().enumerate() {
            let set = result?;
            debug!(sample = i, landmarks = ?set.values(), "Sample landmarks");
            landmarks.push(set);
        }
        Ok(landmarks)
    }
}

/// Aggregate equally long landmark sets position by position.
pub fn aggregate(sets: &[LandmarkSet], method: Accumulation) -> LandmarkSet {
    let reduce: fn(&[f64]) -> f64 = match method {
        Accumulation::Mean => mean,
        Accumulation::Median => median,
    };
    positionwise(sets, reduce)
}

fn positionwise(sets: &[LandmarkSet], reduce: fn(&[f64]) -> f64) -> LandmarkSet {
    let len = sets.first().map(LandmarkSet::len).unwrap_or(0);
    let mut column = Vec::with_capacity(sets.len());
    let values = (0..len)
        .map(|pos| {
            column.clear();
            column.extend(sets.iter().map(|s| s.values()[pos]));
            reduce(&column)
        })
        .collect();
    LandmarkSet::new(values)
}
