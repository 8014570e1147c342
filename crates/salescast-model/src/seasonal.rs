//! `augurs` MSTL + AutoETS backend.
//!
//! Seasonal periods follow the granularity: 7 and 365 for daily series, 52
//! for weekly series. A period is used only when the history holds at least
//! two full cycles of it; with none left the series goes straight to AutoETS.

use augurs::{
    ets::AutoETS,
    forecaster::{transforms::LinearInterpolator, Forecaster, Transformer},
    mstl::MSTLModel,
    Forecast,
};
use salescast_core::{EventTable, Granularity, PredictedPoint, SeriesPoint};

use crate::drift::DriftModel;
use crate::{validate_series, ForecastModel, ForecastRequest, ModelConfig, ModelError};

/// Below this many points ETS has too little to choose a model from.
const MIN_ETS_POINTS: usize = 7;
const DAYS_PER_WEEK: usize = 7;
const DAYS_PER_YEAR: usize = 365;
const WEEKS_PER_YEAR: usize = 52;

/// MSTL decomposition with an AutoETS trend, via `augurs`.
///
/// Event periods strictly inside the history are blanked before fitting and
/// refilled by linear interpolation, so one-off spikes do not leak into the
/// level or the seasonal profile. Short or constant series are handed to
/// [`DriftModel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SeasonalEtsModel;

impl SeasonalEtsModel {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ForecastModel for SeasonalEtsModel {
    fn name(&self) -> &'static str {
        "mstl-ets"
    }

    fn fit_predict(&self, request: &ForecastRequest<'_>) -> Result<Vec<PredictedPoint>, ModelError> {
        let config = request.config;
        config.validate()?;
        let series = request.series;
        validate_series(series)?;

        if series.len() < MIN_ETS_POINTS || is_constant(series) {
            tracing::debug!(
                points = series.len(),
                "series too short or flat for ETS, using drift"
            );
            return DriftModel::new().fit_predict(request);
        }

        let values = fit_values(series, request.events);
        let periods = seasonal_periods(request.granularity, config, series.len());
        let level = config.interval_width;
        let (in_sample, future) = if periods.is_empty() {
            fit_ets(&values, request.horizon, level)?
        } else {
            fit_mstl(&values, periods.clone(), request.horizon, level)?
        };
        tracing::debug!(
            points = series.len(),
            ?periods,
            horizon = request.horizon,
            "seasonal ETS model fitted"
        );

        let history = bands(&in_sample);
        let ahead = bands(&future);
        if history.len() != series.len() || ahead.len() != request.horizon {
            return Err(ModelError::Fit(format!(
                "expected {} fitted and {} future values, got {} and {}",
                series.len(),
                request.horizon,
                history.len(),
                ahead.len()
            )));
        }

        let dates = series
            .iter()
            .map(|p| p.date)
            .chain(request.future_dates()?);
        Ok(dates
            .zip(history.into_iter().chain(ahead))
            .map(|(date, (yhat, lower, upper))| PredictedPoint {
                date,
                yhat,
                lower,
                upper,
            })
            .collect())
    }
}

fn is_constant(series: &[SeriesPoint]) -> bool {
    series
        .iter()
        .all(|p| (p.value - series[0].value).abs() <= f64::EPSILON * series[0].value.abs())
}

/// History values with interior event periods replaced by NaN.
fn fit_values(series: &[SeriesPoint], events: &EventTable) -> Vec<f64> {
    let last = series.len() - 1;
    series
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i > 0 && i < last && events.contains(p.date) {
                f64::NAN
            } else {
                p.value
            }
        })
        .collect()
}

fn seasonal_periods(granularity: Granularity, config: &ModelConfig, len: usize) -> Vec<usize> {
    let mut periods = Vec::new();
    if granularity == Granularity::Daily && config.weekly_seasonality {
        periods.push(DAYS_PER_WEEK);
    }
    if config.yearly_seasonality {
        periods.push(match granularity {
            Granularity::Daily => DAYS_PER_YEAR,
            Granularity::Weekly => WEEKS_PER_YEAR,
        });
    }
    periods.retain(|&period| len >= 2 * period);
    periods
}

fn interpolator() -> Vec<Box<dyn Transformer>> {
    vec![Box::new(LinearInterpolator::default())]
}

fn fit_mstl(
    values: &[f64],
    periods: Vec<usize>,
    horizon: usize,
    level: f64,
) -> Result<(Forecast, Forecast), ModelError> {
    let trend = AutoETS::non_seasonal().into_trend_model();
    let mstl = MSTLModel::new(periods, trend);
    let mut forecaster = Forecaster::new(mstl).with_transformers(interpolator());
    forecaster
        .fit(values)
        .map_err(|e| ModelError::Fit(format!("MSTL fit: {e}")))?;

    let in_sample = forecaster
        .predict_in_sample(level)
        .map_err(|e| ModelError::Fit(format!("MSTL in-sample: {e}")))?;
    let future = forecaster
        .predict(horizon, level)
        .map_err(|e| ModelError::Fit(format!("MSTL predict: {e}")))?;
    Ok((in_sample, future))
}

fn fit_ets(values: &[f64], horizon: usize, level: f64) -> Result<(Forecast, Forecast), ModelError> {
    let mut forecaster = Forecaster::new(AutoETS::non_seasonal()).with_transformers(interpolator());
    forecaster
        .fit(values)
        .map_err(|e| ModelError::Fit(format!("ETS fit: {e}")))?;

    let in_sample = forecaster
        .predict_in_sample(level)
        .map_err(|e| ModelError::Fit(format!("ETS in-sample: {e}")))?;
    let future = forecaster
        .predict(horizon, level)
        .map_err(|e| ModelError::Fit(format!("ETS predict: {e}")))?;
    Ok((in_sample, future))
}

/// `(yhat, lower, upper)` per step; a missing interval collapses onto the
/// point estimate.
fn bands(forecast: &Forecast) -> Vec<(f64, f64, f64)> {
    match &forecast.intervals {
        Some(intervals) => forecast
            .point
            .iter()
            .zip(intervals.lower.iter().zip(&intervals.upper))
            .map(|(&yhat, (&lower, &upper))| (yhat, lower.min(yhat), upper.max(yhat)))
            .collect(),
        None => forecast.point.iter().map(|&yhat| (yhat, yhat, yhat)).collect(),
    }
}
