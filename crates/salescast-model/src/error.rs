use chrono::NaiveDate;
use thiserror::Error;

/// Minimum history length any backend accepts.
pub const MIN_POINTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("need at least {MIN_POINTS} points to fit, got {0}")]
    InsufficientData(usize),

    #[error("series value at {0} is not finite")]
    NonFinite(NaiveDate),

    #[error("series dates must be strictly ascending (violated at {0})")]
    Unordered(NaiveDate),

    #[error("model fit failed: {0}")]
    Fit(String),

    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),

    #[error("forecast horizon runs past the supported date range")]
    HorizonOverflow,
}
