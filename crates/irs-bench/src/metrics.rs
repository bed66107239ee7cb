use ndarray::{ArrayView3, Zip};

use crate::data_generator::Tissue;

/// Cross-scanner agreement of tissue intensities.
#[derive(Debug, Clone)]
pub struct MetricSet {
    /// Per tissue (in `Tissue::ALL` order): standard deviation of the tissue
    /// mean across scans, divided by the mean CSF to WM contrast. Scale-free.
    pub tissue_spread: Vec<f64>,
    /// Average of `tissue_spread`.
    pub mean_spread: f64,
}

/// Mean intensity of every tissue class, in `Tissue::ALL` order. A class with
/// no voxels yields NaN.
pub fn tissue_means(image: ArrayView3<'_, f64>, labels: ArrayView3<'_, u8>) -> Vec<f64> {
    let mut sums = vec![0.0; Tissue::ALL.len()];
    let mut counts = vec![0usize; Tissue::ALL.len()];
    Zip::from(image).and(labels).for_each(|&v, &label| {
        if let Some(i) = Tissue::ALL.iter().position(|t| t.label() == label) {
            sums[i] += v;
            counts[i] += 1;
        }
    });
    sums.iter()
        .zip(&counts)
        .map(|(s, &c)| if c > 0 { s / c as f64 } else { f64::NAN })
        .collect()
}

/// Spread of tissue means over a group of scans.
///
/// # Panics
/// Panics if `means` is empty.
pub fn compute_spread(means: &[Vec<f64>]) -> MetricSet {
    assert!(!means.is_empty(), "need at least one scan");
    let n = means.len() as f64;
    let last = Tissue::ALL.len() - 1;

    let contrast = means.iter().map(|m| (m[last] - m[0]).abs()).sum::<f64>() / n;

    let tissue_spread: Vec<f64> = (0..Tissue::ALL.len())
        .map(|t| {
            let mean = means.iter().map(|m| m[t]).sum::<f64>() / n;
            let var = means.iter().map(|m| (m[t] - mean).powi(2)).sum::<f64>() / n;
            if contrast > 1e-15 {
                var.sqrt() / contrast
            } else {
                f64::INFINITY
            }
        })
        .collect();

    let mean_spread = tissue_spread.iter().sum::<f64>() / tissue_spread.len() as f64;
    MetricSet {
        tissue_spread,
        mean_spread,
    }
}
