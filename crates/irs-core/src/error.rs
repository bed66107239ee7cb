use thiserror::Error;

#[derive(Error, Debug)]
pub enum StandardizationError {
    #[error("model is untrained: train() must succeed before transform()")]
    Untrained,

    /// A percentile interval that must have positive width collapsed to a
    /// single intensity.
    #[error(
        "single intensity accumulation in {subject}: percentiles {lower_percentile} and \
         {upper_percentile} both fall on intensity {value}"
    )]
    SingleIntensityAccumulation {
        subject: String,
        lower_percentile: f64,
        upper_percentile: f64,
        value: f64,
    },

    /// Strict mode only: voxels outside the image's own cutoff landmarks
    /// would have to be clamped.
    #[error(
        "information loss: {below} voxels below {lower} and {above} voxels above {upper} \
         would be clamped"
    )]
    InformationLoss {
        below: usize,
        above: usize,
        lower: f64,
        upper: f64,
    },

    #[error("configuration error: {0}")]
    InvalidConfig(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StandardizationError {
    /// Attach the name of the offending image (e.g. `"training sample 3"`)
    /// to input-dependent errors.
    pub fn with_subject(self, subject: impl Into<String>) -> Self {
        let subject = subject.into();
        match self {
            Self::SingleIntensityAccumulation {
                lower_percentile,
                upper_percentile,
                value,
                ..
            } => Self::SingleIntensityAccumulation {
                subject,
                lower_percentile,
                upper_percentile,
                value,
            },
            Self::InvalidInput(msg) => Self::InvalidInput(format!("{subject}: {msg}")),
            other => other,
        }
    }

    pub fn is_single_intensity_accumulation(&self) -> bool {
        matches!(self, Self::SingleIntensityAccumulation { .. })
    }
}

pub type Result<T> = std::result::Result<T, StandardizationError>;
