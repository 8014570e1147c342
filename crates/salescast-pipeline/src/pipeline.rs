//! End-to-end forecast orchestration.

use std::sync::Arc;
use std::time::Duration;

use salescast_core::{
    DatasetProfile, EventTable, Granularity, PipelineError, PredictedPoint, SalesTable,
    SeriesPoint, SummaryStats,
};
use salescast_model::{ForecastModel, ModelConfig};
use serde::Serialize;

use crate::adapter::forecast_series;
use crate::cache::TableCache;
use crate::filter::{select_series, SeriesSelection};
use crate::params::ForecastParams;
use crate::prepare::prepare_series;
use crate::summary::summarize;

/// Everything a presenter needs to render one forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub dataset: String,
    pub title: String,
    pub selection: SeriesSelection,
    pub granularity: Granularity,
    pub horizon: usize,
    pub history: Vec<SeriesPoint>,
    pub events: EventTable,
    /// Exactly `horizon` future points.
    pub forecast: Vec<PredictedPoint>,
    pub summary: SummaryStats,
    pub model: &'static str,
    /// Whether the dataset carries an event column at all.
    pub has_events: bool,
}

impl ForecastReport {
    /// Observed value on an event date, used to place its marker.
    #[must_use]
    pub fn history_value_on(&self, date: chrono::NaiveDate) -> Option<f64> {
        self.history
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.history[idx].value)
    }
}

/// Chart and page title for a selection.
#[must_use]
pub fn report_title(profile: &DatasetProfile, selection: SeriesSelection) -> String {
    match selection {
        SeriesSelection::Partition { store, dept } => format!(
            "Store {store} - Department {dept} {} Sales Forecast",
            profile.granularity.label()
        ),
        SeriesSelection::Aggregate => profile.title.clone(),
    }
}

/// Filter, prepare, summarise and forecast one request against `table`.
///
/// # Errors
///
/// Any [`PipelineError`] raised by parameter validation, filtering,
/// preparation or the model adapter.
pub fn run_forecast(
    table: &SalesTable,
    profile: &DatasetProfile,
    params: &ForecastParams,
    model: &dyn ForecastModel,
    config: &ModelConfig,
) -> Result<ForecastReport, PipelineError> {
    let resolved = params.resolve(profile)?;
    let filtered = select_series(table, resolved.selection)?;
    let prepared = prepare_series(filtered, profile.granularity)?;
    let summary = summarize(&prepared, profile.trend_window());
    let forecast = forecast_series(model, &prepared, resolved.horizon, config)?;

    tracing::info!(
        dataset = %profile.name,
        selection = ?resolved.selection,
        horizon = resolved.horizon,
        points = summary.points,
        model = model.name(),
        "forecast complete"
    );

    let events = prepared.events().clone();
    Ok(ForecastReport {
        dataset: profile.name.clone(),
        title: report_title(profile, resolved.selection),
        selection: resolved.selection,
        granularity: profile.granularity,
        horizon: resolved.horizon,
        history: prepared.into_points(),
        events,
        forecast,
        summary,
        model: model.name(),
        has_events: table.has_events(),
    })
}

/// Summary statistics for one selection, without fitting a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub title: String,
    pub selection: SeriesSelection,
    pub granularity: Granularity,
    pub summary: SummaryStats,
    pub has_events: bool,
}

/// Filter, prepare and summarise one request; the horizon is validated but
/// otherwise unused.
///
/// # Errors
///
/// Any [`PipelineError`] raised by parameter validation, filtering or
/// preparation.
pub fn run_summary(
    table: &SalesTable,
    profile: &DatasetProfile,
    params: &ForecastParams,
) -> Result<SummaryReport, PipelineError> {
    let resolved = params.resolve(profile)?;
    let filtered = select_series(table, resolved.selection)?;
    let prepared = prepare_series(filtered, profile.granularity)?;
    Ok(SummaryReport {
        title: report_title(profile, resolved.selection),
        selection: resolved.selection,
        granularity: profile.granularity,
        summary: summarize(&prepared, profile.trend_window()),
        has_events: table.has_events(),
    })
}

/// Run [`run_forecast`] on a blocking worker against the cached table,
/// bounded by `timeout`.
///
/// An expired forecast keeps running on its worker until the fit returns;
/// only the result is discarded.
///
/// # Errors
///
/// Returns [`PipelineError::ModelFitFailure`] on timeout or worker panic, and
/// otherwise whatever loading or [`run_forecast`] returns.
pub async fn forecast_from_cache(
    cache: Arc<TableCache>,
    profile: Arc<DatasetProfile>,
    params: ForecastParams,
    model: Arc<dyn ForecastModel>,
    config: Arc<ModelConfig>,
    timeout: Duration,
) -> Result<ForecastReport, PipelineError> {
    let task = tokio::task::spawn_blocking(move || {
        let table = cache.get()?;
        run_forecast(&table, &profile, &params, model.as_ref(), &config)
    });

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(PipelineError::ModelFitFailure(format!(
            "forecast task failed: {join_error}"
        ))),
        Err(_) => {
            tracing::warn!(?timeout, "forecast timed out");
            Err(PipelineError::ModelFitFailure(format!(
                "forecast timed out after {timeout:?}"
            )))
        }
    }
}
