use irs_core::{
    LandmarkSet, OutOfRangePolicy, Result, StandardizationConfig, StandardizationError,
    TrainedLandmarks,
};
use irs_landmarks::extract;
use ndarray::{Array, ArrayView, Dimension};
use num_traits::AsPrimitive;
use tracing::{debug, warn};

use crate::PiecewiseLinearMap;

/// Voxels outside the image's own cutoff landmarks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutOfRangeCounts {
    pub below: usize,
    pub above: usize,
}

impl OutOfRangeCounts {
    pub fn total(&self) -> usize {
        self.below + self.above
    }
}

/// A standardized image and what happened while producing it.
#[derive(Debug, Clone)]
pub struct TransformOutcome<D: Dimension> {
    pub image: Array<f64, D>,
    /// At least one voxel fell outside the image's measured landmark range, so
    /// it was extrapolated or clamped.
    pub information_loss: bool,
    pub out_of_range: OutOfRangeCounts,
    /// Segments the trained scale offers too little room for; only filled
    /// when the mapping check is enabled.
    pub compressed_segments: Vec<usize>,
    pub image_landmarks: LandmarkSet,
}

/// Map `image` onto the trained standard scale.
///
/// Landmarks are computed over the masked voxels, the mapping is applied to
/// every voxel. Any non-finite voxel, masked or not, fails with
/// `InvalidInput`. The caller guarantees that `trained` was produced under
/// `config`; landmark sets of the wrong length fail with `InvalidConfig`.
pub fn standardize<T, D>(
    trained: &TrainedLandmarks,
    config: &StandardizationConfig,
    image: ArrayView<'_, T, D>,
    mask: Option<ArrayView<'_, bool, D>>,
) -> Result<TransformOutcome<D>>
where
    T: AsPrimitive<f64>,
    D: Dimension,
{
    let landmarks = extract(image.view(), mask, config)?;
    let standard = &trained.standard_landmarks;
    for (name, set) in [
        ("standard", standard),
        ("minimum", &trained.landmark_min),
        ("maximum", &trained.landmark_max),
    ] {
        if set.len() != landmarks.len() {
            return Err(StandardizationError::InvalidConfig(format!(
                "image has {} landmarks but the trained {name} landmarks have {}",
                landmarks.len(),
                set.len()
            )));
        }
    }

    if let Some(i) = landmarks.first_collapsed_segment() {
        let positions = config.percentile_positions();
        return Err(StandardizationError::SingleIntensityAccumulation {
            subject: "image".into(),
            lower_percentile: positions[i],
            upper_percentile: positions[i + 1],
            value: landmarks.values()[i],
        });
    }

    let map = PiecewiseLinearMap::new(&landmarks, standard)?;
    let (lower, upper) = map.domain();

    let mut counts = OutOfRangeCounts::default();
    for (i, &v) in image.iter().enumerate() {
        let v: f64 = v.as_();
        if !v.is_finite() {
            return Err(StandardizationError::InvalidInput(format!(
                "non-finite intensity {v} at voxel {i}"
            )));
        }
        if v < lower {
            counts.below += 1;
        } else if v > upper {
            counts.above += 1;
        }
    }

    if counts.total() > 0 {
        match config.out_of_range {
            OutOfRangePolicy::Reject => {
                return Err(StandardizationError::InformationLoss {
                    below: counts.below,
                    above: counts.above,
                    lower,
                    upper,
                });
            }
            OutOfRangePolicy::Clamp => {
                warn!(
                    below = counts.below,
                    above = counts.above,
                    lower,
                    upper,
                    "Clamping voxels outside the image landmark range"
                );
            }
            OutOfRangePolicy::Extrapolate => {
                debug!(
                    below = counts.below,
                    above = counts.above,
                    "Extrapolating voxels outside the image landmark range"
                );
            }
        }
    }

    let compressed_segments = if config.check_mapping {
        compressed_segments(trained, &landmarks)
    } else {
        Vec::new()
    };
    if !compressed_segments.is_empty() {
        warn!(
            segments = ?compressed_segments,
            "Trained scale compresses image segments; distinct intensities may merge"
        );
    }

    let mut output: Array<f64, D> = image.mapv(|v| v.as_());
    match config.out_of_range {
        OutOfRangePolicy::Clamp => output.par_mapv_inplace(|v| map.apply_clamped(v)),
        OutOfRangePolicy::Extrapolate | OutOfRangePolicy::Reject => {
            output.par_mapv_inplace(|v| map.apply(v))
        }
    }

    debug!(
        voxels = output.len(),
        landmarks = ?landmarks.values(),
        "Image standardized"
    );

    Ok(TransformOutcome {
        image: output,
        information_loss: counts.total() > 0,
        out_of_range: counts,
        compressed_segments,
        image_landmarks: landmarks,
    })
}

/// Segments whose raw width reaches the room the trained scale offers them,
/// `landmark_max[i + 1] - landmark_min[i]`.
fn compressed_segments(trained: &TrainedLandmarks, landmarks: &LandmarkSet) -> Vec<usize> {
    let mins = trained.landmark_min.values();
    let maxs = trained.landmark_max.values();
    landmarks
        .segment_widths()
        .iter()
        .enumerate()
        .filter(|(i, width)| {
            let room = maxs[i + 1] - mins[*i];
            room <= **width
        })
        .map(|(i, _)| i)
        .collect()
}
