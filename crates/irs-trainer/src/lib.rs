mod sample;
mod trainer;

pub use sample::TrainingSample;
pub use trainer::{aggregate, LandmarkTrainer};
