//! Shared inputs for the criterion benches.

use ndarray::Array3;

/// A cubic 12-bit volume with a smooth radial profile and LCG noise.
pub fn synthetic_volume(side: usize, gain: f64, seed: u64) -> Array3<u16> {
    let center = (side as f64 - 1.0) / 2.0;
    let mut state = seed;
    Array3::from_shape_fn((side, side, side), |(x, y, z)| {
        let r = ((x as f64 - center).powi(2)
            + (y as f64 - center).powi(2)
            + (z as f64 - center).powi(2))
        .sqrt()
            / side as f64;
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let frac = ((state >> 33) as f64) / (u32::MAX as f64);
        ((1.0 - r) * gain + frac * 40.0).clamp(0.0, 4095.0) as u16
    })
}

/// Foreground mask: voxels above `threshold`.
pub fn threshold_mask(volume: &Array3<u16>, threshold: u16) -> Array3<bool> {
    volume.mapv(|v| v > threshold)
}
