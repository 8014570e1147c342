//! Forecasting backends for salescast.
//!
//! The pipeline talks to a model only through [`ForecastModel`]. The bundled
//! [`SeasonalEtsModel`] runs `augurs` MSTL decomposition with an AutoETS trend
//! (plain AutoETS when no seasonal period fits the history) and falls back to
//! [`DriftModel`] for series too short or too flat for ETS. Every backend
//! returns predictions with uncertainty bounds for the whole history plus the
//! requested horizon.

pub mod drift;
pub mod error;
pub mod seasonal;

use salescast_core::{EventTable, Granularity, PredictedPoint, SeriesPoint};

pub use drift::DriftModel;
pub use error::ModelError;
pub use seasonal::SeasonalEtsModel;

use crate::error::MIN_POINTS;

/// Fixed fitting configuration shared by every forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub yearly_seasonality: bool,
    /// Only meaningful for daily series.
    pub weekly_seasonality: bool,
    /// Intra-day seasonality; must stay off for daily and weekly data.
    pub daily_seasonality: bool,
    /// Coverage of the `lower`/`upper` band, e.g. `0.8` for 80%.
    pub interval_width: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            yearly_seasonality: true,
            weekly_seasonality: true,
            daily_seasonality: false,
            interval_width: 0.8,
        }
    }
}

impl ModelConfig {
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.daily_seasonality {
            return Err(ModelError::InvalidConfig(
                "daily_seasonality needs sub-daily observations".to_string(),
            ));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ModelError::InvalidConfig(format!(
                "interval_width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        Ok(())
    }
}

/// Everything a backend needs for one fit.
#[derive(Debug, Clone, Copy)]
pub struct ForecastRequest<'a> {
    /// Ascending, unique-date history.
    pub series: &'a [SeriesPoint],
    pub events: &'a EventTable,
    /// Number of future periods to predict.
    pub horizon: usize,
    pub granularity: Granularity,
    pub config: &'a ModelConfig,
}

impl ForecastRequest<'_> {
    /// The `horizon` dates following the last observation.
    fn future_dates(&self) -> Result<Vec<chrono::NaiveDate>, ModelError> {
        let last = self
            .series
            .last()
            .ok_or(ModelError::InsufficientData(0))?
            .date;
        (1..=self.horizon)
            .map(|step| {
                self.granularity
                    .advance(last, step)
                    .ok_or(ModelError::HorizonOverflow)
            })
            .collect()
    }
}

/// A forecasting backend.
///
/// Implementations return one [`PredictedPoint`] per history date followed by
/// exactly `horizon` future points spaced one granularity step apart, all in
/// ascending date order. Callers take the last `horizon` entries as the
/// forecast.
pub trait ForecastModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fit on the request's history and predict history plus horizon.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when the series is too short, malformed, or the
    /// backend cannot fit it.
    fn fit_predict(&self, request: &ForecastRequest<'_>) -> Result<Vec<PredictedPoint>, ModelError>;
}

fn validate_series(series: &[SeriesPoint]) -> Result<(), ModelError> {
    if series.len() < MIN_POINTS {
        return Err(ModelError::InsufficientData(series.len()));
    }
    for point in series {
        if !point.value.is_finite() {
            return Err(ModelError::NonFinite(point.date));
        }
    }
    for pair in series.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(ModelError::Unordered(pair[1].date));
        }
    }
    Ok(())
}
