use irs_core::{
    LandmarkSet, Result, StandardizationConfig, StandardizationError, TrainedLandmarks,
};
use irs_trainer::{LandmarkTrainer, TrainingSample};
use irs_transform::{standardize, TransformOutcome};
use ndarray::{ArrayView, Dimension};
use num_traits::AsPrimitive;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::persistence::ModelDocument;

/// Lifecycle of a model: created untrained, trained by a successful
/// `train`, re-trainable at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ModelState {
    Untrained,
    Trained(TrainedLandmarks),
}

/// Intensity range standardization model.
///
/// `train` needs exclusive access; a trained model is read-only for
/// `transform` and can be shared across threads. Deserialized models are
/// validated before they are handed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelDocument")]
pub struct IntensityRangeStandardization {
    pub(crate) config: StandardizationConfig,
    pub(crate) state: ModelState,
}

impl IntensityRangeStandardization {
    /// Create an untrained model. Fails if the configuration is invalid.
    pub fn new(config: StandardizationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: ModelState::Untrained,
        })
    }

    pub fn config(&self) -> &StandardizationConfig {
        &self.config
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.state, ModelState::Trained(_))
    }

    /// The learned scale, or `Untrained`.
    pub fn trained(&self) -> Result<&TrainedLandmarks> {
        match &self.state {
            ModelState::Trained(trained) => Ok(trained),
            ModelState::Untrained => Err(StandardizationError::Untrained),
        }
    }

    pub fn standard_landmarks(&self) -> Option<&LandmarkSet> {
        self.trained().ok().map(|t| &t.standard_landmarks)
    }

    /// Learn the standard scale from `samples`, replacing any previous one.
    ///
    /// On error the model keeps its previous state.
    pub fn train<T, D>(&mut self, samples: &[TrainingSample<'_, T, D>]) -> Result<&mut Self>
    where
        T: AsPrimitive<f64> + Sync,
        D: Dimension,
    {
        let retraining = self.is_trained();
        let trained = LandmarkTrainer::new(&self.config).train(samples)?;
        self.state = ModelState::Trained(trained);
        info!(retraining, samples = samples.len(), "Model trained");
        Ok(self)
    }

    /// Standardize one image. The optional mask restricts the landmark
    /// computation; every voxel is mapped.
    pub fn transform<T, D>(
        &self,
        image: ArrayView<'_, T, D>,
        mask: Option<ArrayView<'_, bool, D>>,
    ) -> Result<TransformOutcome<D>>
    where
        T: AsPrimitive<f64>,
        D: Dimension,
    {
        let trained = self.trained()?;
        standardize(trained, &self.config, image, mask)
    }

    /// Train on `samples`, then standardize each of them.
    ///
    /// Outcomes are returned in sample order. A transform failure is reported
    /// with the sample index; training has been committed by then.
    pub fn train_transform<T, D>(
        &mut self,
        samples: &[TrainingSample<'_, T, D>],
    ) -> Result<Vec<TransformOutcome<D>>>
    where
        T: AsPrimitive<f64> + Sync,
        D: Dimension,
    {
        self.train(samples)?;

        let model = &*self;
        let results: Vec<Result<TransformOutcome<D>>> = samples
            .par_iter()
            .enumerate()
            .map(|(i, sample)| {
                model
                    .transform(sample.image.view(), sample.mask.as_ref().map(|m| m.view()))
                    .map_err(|e| e.with_subject(format!("training sample {i}")))
            })
            .collect();

        results.into_iter().collect()
    }
}
