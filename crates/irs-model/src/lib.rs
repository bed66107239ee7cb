//! Intensity range standardization.
//!
//! Learns a standard intensity scale from training images and maps new images
//! onto it with a piecewise-linear transform through percentile landmarks.
//!
//! ```no_run
//! use irs_model::{IntensityRangeStandardization, StandardizationConfig, TrainingSample};
//! use ndarray::Array3;
//!
//! # fn main() -> irs_model::Result<()> {
//! let scans: Vec<Array3<u16>> = vec![/* ... */];
//! let samples: Vec<_> = scans.iter().map(|s| TrainingSample::new(s.view())).collect();
//!
//! let config = StandardizationConfig::default().with_output_range(0.0, 4095.0);
//! let mut model = IntensityRangeStandardization::new(config)?;
//! model.train(&samples)?;
//!
//! let outcome = model.transform(scans[0].view(), None)?;
//! println!("loss: {}", outcome.information_loss);
//! # Ok(())
//! # }
//! ```

mod model;
mod persistence;

pub use irs_core::{
    Accumulation, LandmarkPreset, LandmarkSet, OutOfRangePolicy, OutputRange, Result,
    StandardizationConfig, StandardizationError, TrainedLandmarks,
};
pub use irs_trainer::TrainingSample;
pub use irs_transform::{OutOfRangeCounts, TransformOutcome};
pub use model::{IntensityRangeStandardization, ModelState};
