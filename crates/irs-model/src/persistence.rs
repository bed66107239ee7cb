use std::fs;
use std::path::Path;

use irs_core::{
    OutputRange, Result, StandardizationConfig, StandardizationError, TrainedLandmarks,
};
use serde::Deserialize;
use tracing::info;

use crate::model::{IntensityRangeStandardization, ModelState};

/// Unchecked wire form of a model.
#[derive(Deserialize)]
pub(crate) struct ModelDocument {
    config: StandardizationConfig,
    state: ModelState,
}

impl TryFrom<ModelDocument> for IntensityRangeStandardization {
    type Error = StandardizationError;

    fn try_from(doc: ModelDocument) -> Result<Self> {
        let model = Self {
            config: doc.config,
            state: doc.state,
        };
        model.validate()?;
        Ok(model)
    }
}

impl IntensityRangeStandardization {
    /// Serialize the configuration and state as JSON. Floats are written in
    /// shortest round-trip form, so `from_json` restores them bit for bit.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a model written by `to_json`, rejecting inconsistent documents.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: ModelDocument = serde_json::from_str(json)?;
        Self::try_from(doc)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), trained = self.is_trained(), "Model saved");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let model = Self::from_json(&content)?;
        info!(path = %path.display(), trained = model.is_trained(), "Model loaded");
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()?;
        match &self.state {
            ModelState::Untrained => Ok(()),
            ModelState::Trained(trained) => self.validate_trained(trained),
        }
    }

    fn validate_trained(&self, trained: &TrainedLandmarks) -> Result<()> {
        let expected = self.config.landmark_count();
        for (name, set) in [
            ("standard_landmarks", &trained.standard_landmarks),
            ("landmark_min", &trained.landmark_min),
            ("landmark_max", &trained.landmark_max),
        ] {
            if set.len() != expected {
                return Err(invalid(format!(
                    "{name} has {} values, the configuration needs {expected}",
                    set.len()
                )));
            }
            if set.values().iter().any(|v| !v.is_finite()) {
                return Err(invalid(format!("{name} contains non-finite values")));
            }
        }

        if !trained.standard_landmarks.is_non_decreasing() {
            return Err(invalid("standard_landmarks must be non-decreasing".into()));
        }

        let (min, max) = trained.output_range;
        if min >= max {
            return Err(invalid(format!("trained output range ({min}, {max}) is empty")));
        }
        if trained.standard_landmarks.low() != Some(min)
            || trained.standard_landmarks.high() != Some(max)
        {
            return Err(invalid(
                "standard_landmarks must start and end at the output range".into(),
            ));
        }
        if let OutputRange::Fixed(cmin, cmax) = self.config.output_range {
            if (cmin, cmax) != (min, max) {
                return Err(invalid(format!(
                    "trained output range ({min}, {max}) differs from the configured \
                     ({cmin}, {cmax})"
                )));
            }
        }

        if trained.sample_count == 0 {
            return Err(invalid("trained state records zero samples".into()));
        }

        Ok(())
    }
}

fn invalid(msg: String) -> StandardizationError {
    StandardizationError::InvalidConfig(format!("inconsistent model document: {msg}"))
}
