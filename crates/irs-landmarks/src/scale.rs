use irs_core::{LandmarkSet, Result, StandardizationError};
use tracing::debug;

/// Map a raw landmark set onto `output_range` using its first and last entries
/// (the cutoff landmarks) as anchors.
///
/// `s = s_min + (v - m_low) / (m_high - m_low) * (s_max - s_min)`, kept within
/// `[s_min, s_max]`. The anchors themselves map exactly to `s_min` and
/// `s_max`. `cutoffs` only serves the error report.
pub fn map_to_scale(
    landmarks: &LandmarkSet,
    cutoffs: (f64, f64),
    output_range: (f64, f64),
) -> Result<LandmarkSet> {
    let values = landmarks.values();
    if values.len() < 2 {
        return Err(StandardizationError::InvalidInput(format!(
            "a landmark set needs both cutoff landmarks, got {} values",
            values.len()
        )));
    }

    let (s_min, s_max) = output_range;
    let m_low = values[0];
    let m_high = values[values.len() - 1];
    if m_high == m_low {
        return Err(StandardizationError::SingleIntensityAccumulation {
            subject: "image".into(),
            lower_percentile: cutoffs.0,
            upper_percentile: cutoffs.1,
            value: m_low,
        });
    }

    let scale = (s_max - s_min) / (m_high - m_low);
    // Landmarks tied with an anchor may land an ulp outside the range.
    let mut mapped: Vec<f64> = values
        .iter()
        .map(|v| (s_min + (v - m_low) * scale).max(s_min).min(s_max))
        .collect();

    let last = mapped.len() - 1;
    mapped[0] = s_min;
    mapped[last] = s_max;

    Ok(LandmarkSet::new(mapped))
}

/// Derive the standard range `(0, W)` from the raw training landmarks.
///
/// `W` is the sum, over consecutive landmark segments, of the widest instance
/// of that segment among all sets. Every segment of every training image then
/// has at least its own width available on the standard scale.
pub fn auto_output_range(landmark_sets: &[LandmarkSet], cutoffs: (f64, f64)) -> Result<(f64, f64)> {
    let first = landmark_sets.first().ok_or_else(|| {
        StandardizationError::InvalidInput(
            "cannot derive an output range from zero landmark sets".into(),
        )
    })?;

    let segment_count = first.len().saturating_sub(1);
    let mut widest = vec![0.0_f64; segment_count];
    for (i, set) in landmark_sets.iter().enumerate() {
        if set.len() != first.len() {
            return Err(StandardizationError::InvalidInput(format!(
                "landmark set {i} has {} values, expected {}",
                set.len(),
                first.len()
            )));
        }
        for (w, width) in widest.iter_mut().zip(set.segment_widths()) {
            *w = w.max(width);
        }
    }

    let total: f64 = widest.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(StandardizationError::SingleIntensityAccumulation {
            subject: "training set".into(),
            lower_percentile: cutoffs.0,
            upper_percentile: cutoffs.1,
            value: first.low().unwrap_or(0.0),
        });
    }

    debug!(
        segments = ?widest,
        width = total,
        "Derived automatic output range"
    );

    Ok((0.0, total))
}
