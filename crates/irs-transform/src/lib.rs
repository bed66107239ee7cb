mod mapping;
mod transform;

pub use mapping::PiecewiseLinearMap;
pub use transform::{standardize, OutOfRangeCounts, TransformOutcome};
