use serde::{Deserialize, Serialize};

/// Intensities at the configured percentile positions, in position order:
/// low cutoff, interior landmarks, high cutoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet(Vec<f64>);

impl LandmarkSet {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn into_values(self) -> Vec<f64> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Landmark at the low cutoff percentile.
    pub fn low(&self) -> Option<f64> {
        self.0.first().copied()
    }

    /// Landmark at the high cutoff percentile.
    pub fn high(&self) -> Option<f64> {
        self.0.last().copied()
    }

    pub fn is_non_decreasing(&self) -> bool {
        self.0.windows(2).all(|w| w[0] <= w[1])
    }

    /// Widths of the consecutive landmark segments.
    pub fn segment_widths(&self) -> Vec<f64> {
        self.0.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Index of the first segment whose ends coincide, if any.
    pub fn first_collapsed_segment(&self) -> Option<usize> {
        self.0.windows(2).position(|w| w[0] == w[1])
    }
}

impl From<Vec<f64>> for LandmarkSet {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl AsRef<[f64]> for LandmarkSet {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Result of a successful training run: the learned standard scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedLandmarks {
    /// Aggregated mapped landmarks; the first and last entries equal the ends
    /// of `output_range`.
    pub standard_landmarks: LandmarkSet,
    /// Position-wise minimum of the per-sample mapped landmarks.
    pub landmark_min: LandmarkSet,
    /// Position-wise maximum of the per-sample mapped landmarks.
    pub landmark_max: LandmarkSet,
    /// Resolved `(s_min, s_max)` scale.
    pub output_range: (f64, f64),
    pub sample_count: usize,
}
