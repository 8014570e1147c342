//! Canonical series preparation.

use salescast_core::{EventTable, Granularity, PipelineError, SeriesPoint};

use crate::filter::FilteredSeries;

/// A series ready for a model: non-empty, ascending, unique dates, finite
/// values, and events restricted to series dates.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSeries {
    points: Vec<SeriesPoint>,
    events: EventTable,
    granularity: Granularity,
}

impl PreparedSeries {
    #[must_use]
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    #[must_use]
    pub fn events(&self) -> &EventTable {
        &self.events
    }

    #[must_use]
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Value observed on `date`, if any.
    #[must_use]
    pub fn value_on(&self, date: chrono::NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.points[idx].value)
    }

    #[must_use]
    pub fn into_points(self) -> Vec<SeriesPoint> {
        self.points
    }
}

/// Validate and normalise a filtered series.
///
/// # Errors
///
/// Returns [`PipelineError::DataUnavailable`] for an empty series, a
/// non-finite value, or a duplicated date.
pub fn prepare_series(
    filtered: FilteredSeries,
    granularity: Granularity,
) -> Result<PreparedSeries, PipelineError> {
    let FilteredSeries { mut points, events } = filtered;

    if points.is_empty() {
        return Err(PipelineError::DataUnavailable(
            "series has no observations".to_string(),
        ));
    }

    points.sort_by_key(|p| p.date);

    if let Some(bad) = points.iter().find(|p| !p.value.is_finite()) {
        return Err(PipelineError::DataUnavailable(format!(
            "series value on {} is not finite",
            bad.date
        )));
    }

    if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(PipelineError::DataUnavailable(format!(
            "series has duplicate date {}",
            pair[0].date
        )));
    }

    let irregular = irregular_steps(&points, granularity);
    if irregular > 0 {
        tracing::debug!(
            irregular,
            granularity = %granularity,
            "series spacing differs from granularity"
        );
    }

    let events = events.retain(|d| {
        points
            .binary_search_by_key(&d, |p| p.date)
            .is_ok()
    });

    Ok(PreparedSeries {
        points,
        events,
        granularity,
    })
}

/// Count of consecutive pairs not exactly one step apart.
fn irregular_steps(points: &[SeriesPoint], granularity: Granularity) -> usize {
    points
        .windows(2)
        .filter(|w| (w[1].date - w[0].date).num_days() != granularity.step_days())
        .count()
}
