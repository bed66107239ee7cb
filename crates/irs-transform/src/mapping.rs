use irs_core::{LandmarkSet, Result, StandardizationError};

/// Piecewise-linear function through `(source[i], target[i])` control points.
///
/// Sources must be strictly increasing so every segment has a finite slope.
/// Values outside the source range either continue the boundary segment
/// (`apply`) or are clamped to the outer targets (`apply_clamped`).
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinearMap {
    sources: Vec<f64>,
    targets: Vec<f64>,
}

impl PiecewiseLinearMap {
    pub fn new(sources: &LandmarkSet, targets: &LandmarkSet) -> Result<Self> {
        if sources.len() != targets.len() {
            return Err(StandardizationError::InvalidInput(format!(
                "{} source landmarks but {} target landmarks",
                sources.len(),
                targets.len()
            )));
        }
        if sources.len() < 2 {
            return Err(StandardizationError::InvalidInput(
                "a piecewise-linear map needs at least two control points".into(),
            ));
        }
        if let Some(i) = sources.values().windows(2).position(|w| w[1] <= w[0]) {
            return Err(StandardizationError::InvalidInput(format!(
                "source landmarks must be strictly increasing, segment {i} spans [{}, {}]",
                sources.values()[i],
                sources.values()[i + 1]
            )));
        }

        Ok(Self {
            sources: sources.values().to_vec(),
            targets: targets.values().to_vec(),
        })
    }

    /// `(first, last)` source control point.
    pub fn domain(&self) -> (f64, f64) {
        (self.sources[0], self.sources[self.sources.len() - 1])
    }

    /// `(first, last)` target control point.
    pub fn codomain(&self) -> (f64, f64) {
        (self.targets[0], self.targets[self.targets.len() - 1])
    }

    /// Map `v`, extrapolating linearly outside the domain.
    pub fn apply(&self, v: f64) -> f64 {
        let i = self.segment(v);
        let (x0, x1) = (self.sources[i], self.sources[i + 1]);
        let (y0, y1) = (self.targets[i], self.targets[i + 1]);
        y0 + (v - x0) / (x1 - x0) * (y1 - y0)
    }

    /// Map `v`, clamping to the outer targets outside the domain.
    pub fn apply_clamped(&self, v: f64) -> f64 {
        let (lo, hi) = self.domain();
        if v < lo {
            self.targets[0]
        } else if v > hi {
            self.targets[self.targets.len() - 1]
        } else {
            self.apply(v)
        }
    }

    /// Index of the segment used for `v`; the outer segments also cover
    /// everything beyond the domain.
    fn segment(&self, v: f64) -> usize {
        let upper = self.sources.partition_point(|&s| s <= v);
        upper.saturating_sub(1).min(self.sources.len() - 2)
    }
}
