use irs_core::stats::percentiles;
use irs_core::{LandmarkSet, Result, StandardizationConfig, StandardizationError};
use ndarray::{ArrayView, Dimension};
use num_traits::AsPrimitive;
use tracing::debug;

/// Compute the landmark set of one image.
///
/// Only voxels where `mask` is true take part; without a mask every voxel
/// does. Percentiles are taken at `config.percentile_positions()` with linear
/// interpolation between order statistics. The configuration is assumed to be
/// validated.
///
/// Fails with `SingleIntensityAccumulation` when the two cutoff percentiles
/// fall on the same intensity.
pub fn extract<T, D>(
    image: ArrayView<'_, T, D>,
    mask: Option<ArrayView<'_, bool, D>>,
    config: &StandardizationConfig,
) -> Result<LandmarkSet>
where
    T: AsPrimitive<f64>,
    D: Dimension,
{
    let mut values = foreground_values(image, mask)?;
    let voxel_count = values.len();

    let positions = config.percentile_positions();
    let landmarks = percentiles(&mut values, &positions).ok_or_else(|| {
        StandardizationError::InvalidInput("foreground selection is empty".into())
    })?;
    let landmarks = LandmarkSet::new(landmarks);

    let (pc_low, pc_high) = config.cutoff_percentiles;
    if let (Some(low), Some(high)) = (landmarks.low(), landmarks.high()) {
        if low == high {
            return Err(StandardizationError::SingleIntensityAccumulation {
                subject: "image".into(),
                lower_percentile: pc_low,
                upper_percentile: pc_high,
                value: low,
            });
        }
    }

    debug!(
        voxels = voxel_count,
        landmarks = ?landmarks.values(),
        "Extracted landmarks"
    );

    Ok(landmarks)
}

/// Collect the selected voxel values as `f64`, in logical (row-major) order.
///
/// Errors on a mask of a different shape, an empty selection, or a
/// non-finite selected value.
pub fn foreground_values<T, D>(
    image: ArrayView<'_, T, D>,
    mask: Option<ArrayView<'_, bool, D>>,
) -> Result<Vec<f64>>
where
    T: AsPrimitive<f64>,
    D: Dimension,
{
    let values: Vec<f64> = match mask {
        Some(mask) => {
            if mask.shape() != image.shape() {
                return Err(StandardizationError::InvalidInput(format!(
                    "mask shape {:?} does not match image shape {:?}",
                    mask.shape(),
                    image.shape()
                )));
            }
            image
                .iter()
                .zip(mask.iter())
                .filter(|(_, selected)| **selected)
                .map(|(&v, _)| v.as_())
                .collect()
        }
        None => image.iter().map(|&v| v.as_()).collect(),
    };

    if values.is_empty() {
        return Err(StandardizationError::InvalidInput(format!(
            "foreground selection of image with shape {:?} is empty",
            image.shape()
        )));
    }

    if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(StandardizationError::InvalidInput(format!(
            "non-finite intensity {v} at foreground voxel {i}"
        )));
    }

    Ok(values)
}
