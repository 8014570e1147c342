//! Random walk with drift, for histories too short or too flat for ETS.

use salescast_core::PredictedPoint;
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;

use crate::{validate_series, ForecastModel, ForecastRequest, ModelError};

/// Each period is the previous one plus the average step across history.
///
/// The band is the one-step residual spread, scaled by
/// `sqrt(h * (1 + h / (n - 1)))` at `h` steps past the last observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriftModel;

impl DriftModel {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ForecastModel for DriftModel {
    fn name(&self) -> &'static str {
        "drift"
    }

    #[allow(clippy::cast_precision_loss)]
    fn fit_predict(&self, request: &ForecastRequest<'_>) -> Result<Vec<PredictedPoint>, ModelError> {
        request.config.validate()?;
        let series = request.series;
        validate_series(series)?;

        let n = series.len();
        let steps = (n - 1) as f64;
        let first = series[0].value;
        let last = series[n - 1].value;
        let drift = (last - first) / steps;

        let residuals: Vec<f64> = series
            .windows(2)
            .map(|pair| pair[1].value - pair[0].value - drift)
            .collect();
        let sigma = if residuals.len() < 2 {
            0.0
        } else {
            residuals.iter().std_dev()
        };
        let z = normal_quantile(request.config.interval_width)?;

        let mut predictions = Vec::with_capacity(n + request.horizon);
        predictions.push(band(series[0].date, first, 0.0));
        for pair in series.windows(2) {
            predictions.push(band(pair[1].date, pair[0].value + drift, z * sigma));
        }
        for (h, date) in (1..=request.horizon).zip(request.future_dates()?) {
            let h = h as f64;
            let spread = z * sigma * (h * (1.0 + h / steps)).sqrt();
            predictions.push(band(date, last + h * drift, spread));
        }
        Ok(predictions)
    }
}

pub(crate) fn normal_quantile(interval_width: f64) -> Result<f64, ModelError> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| ModelError::InvalidConfig(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + interval_width / 2.0))
}

fn band(date: chrono::NaiveDate, yhat: f64, half_width: f64) -> PredictedPoint {
    PredictedPoint {
        date,
        yhat,
        lower: yhat - half_width,
        upper: yhat + half_width,
    }
}
