use thiserror::Error;

/// Failures raised while turning a sales table into a forecast.
///
/// Every variant is rendered as a single user-facing message by the shells;
/// [`PipelineError::code`] gives a stable machine-readable tag for each.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Source file missing, unreadable, or malformed.
    #[error("sales data unavailable: {0}")]
    DataUnavailable(String),

    #[error("no data found for store {store} and department {dept}")]
    PartitionNotFound { store: u32, dept: u32 },

    /// Request parameters out of range or incompatible with the dataset.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("model fit failed: {0}")]
    ModelFitFailure(String),

    /// The earlier comparison window averages to zero.
    #[error("trend undefined: comparison window mean is zero")]
    TrendUndefined,

    #[error("trend needs at least {needed} points, series has {available}")]
    InsufficientHistory { needed: usize, available: usize },
}

impl PipelineError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DataUnavailable(_) => "data_unavailable",
            Self::PartitionNotFound { .. } => "partition_not_found",
            Self::InvalidRequest(_) => "validation_error",
            Self::ModelFitFailure(_) => "model_fit_failure",
            Self::TrendUndefined => "trend_undefined",
            Self::InsufficientHistory { .. } => "insufficient_history",
        }
    }

    /// `true` when different request parameters could succeed.
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::PartitionNotFound { .. } | Self::InvalidRequest(_) | Self::ModelFitFailure(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read datasets file {path}: {source}")]
    DatasetsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse datasets file: {0}")]
    DatasetsFileParse(#[from] serde_yaml::Error),

    #[error("dataset validation failed: {0}")]
    Validation(String),

    #[error("unknown dataset profile '{0}'")]
    UnknownDataset(String),
}
