//! Landmark extraction and scale mapping.
//!
//! A landmark is the intensity at a configured percentile of an image's
//! (masked) voxel distribution. Extraction turns an image into a
//! [`LandmarkSet`](irs_core::LandmarkSet); the scale mapper anchors a set onto
//! the fixed output range through its two cutoff landmarks.

mod extract;
mod scale;

pub use extract::{extract, foreground_values};
pub use scale::{auto_output_range, map_to_scale};
