//! Summary statistics over the historical window.

use salescast_core::{PipelineError, SummaryStats, Trend};

use crate::prepare::PreparedSeries;

/// Percentage change between the mean of the last `window` values and the
/// mean of the `window` values before them.
///
/// # Errors
///
/// - [`PipelineError::InsufficientHistory`] with fewer than `2 * window` values.
/// - [`PipelineError::TrendUndefined`] when the earlier window averages zero.
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
pub fn trend_percentage(values: &[f64], window: usize) -> Result<f64, PipelineError> {
    let needed = window.saturating_mul(2);
    if window == 0 || values.len() < needed {
        return Err(PipelineError::InsufficientHistory {
            needed,
            available: values.len(),
        });
    }

    let recent = &values[values.len() - window..];
    let prior = &values[values.len() - needed..values.len() - window];
    let recent_mean = recent.iter().sum::<f64>() / window as f64;
    let prior_mean = prior.iter().sum::<f64>() / window as f64;

    if prior_mean == 0.0 {
        return Err(PipelineError::TrendUndefined);
    }
    let pct = (recent_mean - prior_mean) / prior_mean * 100.0;
    if pct.is_finite() {
        Ok(pct)
    } else {
        Err(PipelineError::TrendUndefined)
    }
}

/// Total, mean, trend and event count of a prepared series.
///
/// A trend that cannot be computed is recorded in [`Trend`] rather than
/// failing the summary.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(series: &PreparedSeries, window: usize) -> SummaryStats {
    let window = window.max(1);
    let values = series.values();
    let total: f64 = values.iter().sum();
    let mean = if values.is_empty() {
        0.0
    } else {
        total / values.len() as f64
    };

    let trend = match trend_percentage(&values, window) {
        Ok(value) => Trend::Percent { value },
        Err(PipelineError::InsufficientHistory { needed, available }) => {
            Trend::InsufficientHistory { needed, available }
        }
        Err(_) => Trend::Undefined,
    };

    let event_count = match (series.points().first(), series.points().last()) {
        (Some(first), Some(last)) => series.events().count_within(first.date, last.date),
        _ => 0,
    };

    SummaryStats {
        total,
        mean,
        trend,
        trend_window: window,
        event_count,
        points: values.len(),
    }
}
