//! Small numeric helpers shared by extraction and aggregation.

/// Percentile of already sorted values, interpolating linearly between the
/// two closest order statistics (rank `p / 100 * (n - 1)`).
///
/// `sorted` must be non-empty and ascending; `p` is clamped to `[0, 100]`.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(n - 1);
    let frac = rank - lower as f64;

    let lo = sorted[lower];
    let hi = sorted[upper];
    if frac == 0.0 || lo == hi {
        lo
    } else {
        lo + (hi - lo) * frac
    }
}

/// Sort `values` in place and return the requested percentiles.
///
/// Returns `None` for an empty input.
pub fn percentiles(values: &mut [f64], positions: &[f64]) -> Option<Vec<f64>> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(f64::total_cmp);
    Some(
        positions
            .iter()
            .map(|&p| percentile_sorted(values, p))
            .collect(),
    )
}

pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Median, averaging the two middle values for even lengths.
pub fn median(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn min_f64(data: &[f64]) -> f64 {
    data.iter().cloned().fold(f64::INFINITY, f64::min)
}

pub fn max_f64(data: &[f64]) -> f64 {
    data.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
}
