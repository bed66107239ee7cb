use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, StandardizationError};

/// Standardization configuration, immutable once handed to a model.
///
/// Percentages are in `[0, 100]`. The landmark sequence an image produces is
/// `[cutoff low, landmark_points..., cutoff high]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizationConfig {
    #[serde(default = "default_landmark_points")]
    pub landmark_points: Vec<f64>,

    #[serde(default = "default_cutoff_percentiles")]
    pub cutoff_percentiles: (f64, f64),

    #[serde(default)]
    pub output_range: OutputRange,

    #[serde(default)]
    pub accumulate: Accumulation,

    #[serde(default)]
    pub out_of_range: OutOfRangePolicy,

    #[serde(default = "default_check_mapping")]
    pub check_mapping: bool,
}

impl Default for StandardizationConfig {
    fn default() -> Self {
        Self {
            landmark_points: default_landmark_points(),
            cutoff_percentiles: default_cutoff_percentiles(),
            output_range: OutputRange::default(),
            accumulate: Accumulation::default(),
            out_of_range: OutOfRangePolicy::default(),
            check_mapping: default_check_mapping(),
        }
    }
}

impl StandardizationConfig {
    pub fn with_landmark_points(mut self, points: Vec<f64>) -> Self {
        self.landmark_points = points;
        self
    }

    pub fn with_preset(mut self, preset: LandmarkPreset) -> Self {
        self.landmark_points = preset.points();
        self
    }

    pub fn with_cutoffs(mut self, low: f64, high: f64) -> Self {
        self.cutoff_percentiles = (low, high);
        self
    }

    pub fn with_output_range(mut self, min: f64, max: f64) -> Self {
        self.output_range = OutputRange::Fixed(min, max);
        self
    }

    pub fn with_auto_output_range(mut self) -> Self {
        self.output_range = OutputRange::Auto;
        self
    }

    pub fn with_accumulation(mut self, accumulate: Accumulation) -> Self {
        self.accumulate = accumulate;
        self
    }

    pub fn with_out_of_range(mut self, policy: OutOfRangePolicy) -> Self {
        self.out_of_range = policy;
        self
    }

    pub fn with_mapping_check(mut self, enabled: bool) -> Self {
        self.check_mapping = enabled;
        self
    }

    /// All percentile positions in landmark order: low cutoff, interior
    /// points, high cutoff.
    pub fn percentile_positions(&self) -> Vec<f64> {
        let (low, high) = self.cutoff_percentiles;
        let mut positions = Vec::with_capacity(self.landmark_count());
        positions.push(low);
        positions.extend_from_slice(&self.landmark_points);
        positions.push(high);
        positions
    }

    /// Length of every landmark set produced under this configuration.
    pub fn landmark_count(&self) -> usize {
        self.landmark_points.len() + 2
    }

    pub fn validate(&self) -> Result<()> {
        let (low, high) = self.cutoff_percentiles;
        if !low.is_finite() || !high.is_finite() || low < 0.0 || high > 100.0 || low >= high {
            return Err(StandardizationError::InvalidConfig(format!(
                "cutoff percentiles must satisfy 0 <= low < high <= 100, got ({low}, {high})"
            )));
        }

        for (i, p) in self.landmark_points.iter().enumerate() {
            if !p.is_finite() || *p <= low || *p >= high {
                return Err(StandardizationError::InvalidConfig(format!(
                    "landmark point {p} at index {i} must lie strictly between the cutoffs \
                     ({low}, {high})"
                )));
            }
        }

        if let Some(i) = self
            .landmark_points
            .windows(2)
            .position(|w| w[1] <= w[0])
        {
            return Err(StandardizationError::InvalidConfig(format!(
                "landmark points must be strictly increasing, got {} followed by {} at index {}",
                self.landmark_points[i],
                self.landmark_points[i + 1],
                i + 1
            )));
        }

        if let OutputRange::Fixed(min, max) = self.output_range {
            if !min.is_finite() || !max.is_finite() || min >= max {
                return Err(StandardizationError::InvalidConfig(format!(
                    "output range must satisfy min < max, got ({min}, {max})"
                )));
            }
        }

        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Target intensity scale of the standardized images.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputRange {
    /// Derived from the training set so that no training segment is compressed.
    #[default]
    Auto,
    /// Fixed `(min, max)` scale.
    Fixed(f64, f64),
}

/// Position-wise aggregation of the per-sample mapped landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accumulation {
    #[default]
    Mean,
    Median,
}

/// Treatment of voxels outside the image's own cutoff landmarks.
///
/// * `Extrapolate` continues the boundary segments linearly.
/// * `Clamp` clamps to the outer standard landmarks and returns the result
///   with its information-loss flag set.
/// * `Reject` clamps conceptually but fails the transform with
///   `StandardizationError::InformationLoss` instead of returning an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePolicy {
    #[default]
    Extrapolate,
    Clamp,
    Reject,
}

/// Common landmark layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkPreset {
    /// Median only.
    L2,
    /// Tertiles.
    L3,
    /// Quartiles.
    L4,
}

impl LandmarkPreset {
    pub fn points(&self) -> Vec<f64> {
        match self {
            Self::L2 => vec![50.0],
            Self::L3 => vec![100.0 / 3.0, 200.0 / 3.0],
            Self::L4 => vec![25.0, 50.0, 75.0],
        }
    }
}

impl FromStr for LandmarkPreset {
    type Err = StandardizationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "L2" => Ok(Self::L2),
            "L3" => Ok(Self::L3),
            "L4" => Ok(Self::L4),
            other => Err(StandardizationError::InvalidConfig(format!(
                "unknown landmark preset '{other}', expected L2, L3 or L4"
            ))),
        }
    }
}

fn default_landmark_points() -> Vec<f64> {
    LandmarkPreset::L4.points()
}
fn default_cutoff_percentiles() -> (f64, f64) {
    (1.0, 99.0)
}
fn default_check_mapping() -> bool {
    true
}
