//! Synthetic multi-scanner fixtures and an evaluation harness measuring how
//! well standardization aligns tissue intensities across scanners.

pub mod data_generator;
pub mod evaluation;
pub mod metrics;
pub mod reporter;
