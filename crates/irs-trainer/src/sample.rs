use ndarray::{ArrayView, Dimension};

/// One training image with an optional same-shape foreground mask.
#[derive(Debug, Clone)]
pub struct TrainingSample<'a, T, D: Dimension> {
    pub image: ArrayView<'a, T, D>,
    pub mask: Option<ArrayView<'a, bool, D>>,
}

impl<'a, T, D: Dimension> TrainingSample<'a, T, D> {
    pub fn new(image: ArrayView<'a, T, D>) -> Self {
        Self { image, mask: None }
    }

    pub fn with_mask(image: ArrayView<'a, T, D>, mask: ArrayView<'a, bool, D>) -> Self {
        Self {
            image,
            mask: Some(mask),
        }
    }
}
