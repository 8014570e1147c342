//! Bridge between a prepared series and a [`ForecastModel`].

use salescast_core::{PipelineError, PredictedPoint};
use salescast_model::{ForecastModel, ForecastRequest, ModelConfig};

use crate::prepare::PreparedSeries;

/// Fit `model` on `series` and return exactly the `horizon` future points.
///
/// # Errors
///
/// Returns [`PipelineError::ModelFitFailure`] when the backend fails or
/// returns fewer points than requested, or when the future dates are not
/// spaced one granularity step past the last observation.
pub fn forecast_series(
    model: &dyn ForecastModel,
    series: &PreparedSeries,
    horizon: usize,
    config: &ModelConfig,
) -> Result<Vec<PredictedPoint>, PipelineError> {
    let request = ForecastRequest {
        series: series.points(),
        events: series.events(),
        horizon,
        granularity: series.granularity(),
        config,
    };
    let predictions = model
        .fit_predict(&request)
        .map_err(|e| PipelineError::ModelFitFailure(format!("{}: {e}", model.name())))?;

    if predictions.len() < horizon {
        return Err(PipelineError::ModelFitFailure(format!(
            "{} returned {} points for a horizon of {horizon}",
            model.name(),
            predictions.len()
        )));
    }
    let tail = predictions[predictions.len() - horizon..].to_vec();
    check_contiguous(series, &tail, model.name())?;
    Ok(tail)
}

fn check_contiguous(
    series: &PreparedSeries,
    tail: &[PredictedPoint],
    model: &str,
) -> Result<(), PipelineError> {
    let Some(last) = series.points().last() else {
        return Ok(());
    };
    let granularity = series.granularity();
    let mut expected = last.date;
    for point in tail {
        let next = granularity.advance(expected, 1).ok_or_else(|| {
            PipelineError::ModelFitFailure(format!("{model}: forecast runs past supported dates"))
        })?;
        if point.date != next {
            return Err(PipelineError::ModelFitFailure(format!(
                "{model}: expected forecast date {next}, got {}",
                point.date
            )));
        }
        expected = next;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use salescast_core::{EventTable, Granularity, SeriesPoint};
    use salescast_model::ModelError;

    use super::*;
    use crate::filter::FilteredSeries;
    use crate::prepare::prepare_series;

    /// Echoes history and extends it with the last value at a fixed spacing.
    struct StubModel {
        step_days: i64,
        fail: bool,
    }

    impl ForecastModel for StubModel {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn fit_predict(
            &self,
            request: &ForecastRequest<'_>,
        ) -> Result<Vec<PredictedPoint>, ModelError> {
            if self.fail {
                return Err(ModelError::Fit("no convergence".to_string()));
            }
            let mut out: Vec<PredictedPoint> = request
                .series
                .iter()
                .map(|p| PredictedPoint {
                    date: p.date,
                    yhat: p.value,
                    lower: p.value,
                    upper: p.value,
                })
                .collect();
            let last = request.series[request.series.len() - 1];
            for step in 1..=request.horizon {
                let offset = self.step_days * i64::try_from(step).unwrap();
                out.push(PredictedPoint {
                    date: last.date + chrono::Duration::days(offset),
                    yhat: last.value,
                    lower: last.value - 1.0,
                    upper: last.value + 1.0,
                });
            }
            Ok(out)
        }
    }

    fn weekly_series() -> PreparedSeries {
        let start = NaiveDate::from_ymd_opt(2012, 1, 6).unwrap();
        let points = (0..5)
            .map(|i| SeriesPoint::new(Granularity::Weekly.advance(start, i).unwrap(), 10.0))
            .collect();
        prepare_series(
            FilteredSeries {
                points,
                events: EventTable::default(),
            },
            Granularity::Weekly,
        )
        .unwrap()
    }

    #[test]
    fn returns_only_future_tail() {
        let series = weekly_series();
        let model = StubModel {
            step_days: 7,
            fail: false,
        };
        let tail = forecast_series(&model, &series, 3, &ModelConfig::default()).unwrap();
        assert_eq!(tail.len(), 3);
        assert_eq!(
            tail[0].date,
            NaiveDate::from_ymd_opt(2012, 2, 10).unwrap()
        );
    }

    #[test]
    fn backend_error_becomes_model_fit_failure() {
        let model = StubModel {
            step_days: 7,
            fail: true,
        };
        let err =
            forecast_series(&model, &weekly_series(), 2, &ModelConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::ModelFitFailure(ref m) if m.starts_with("stub")));
    }

    #[test]
    fn misaligned_future_dates_are_rejected() {
        let model = StubModel {
            step_days: 1,
            fail: false,
        };
        let err =
            forecast_series(&model, &weekly_series(), 2, &ModelConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::ModelFitFailure(ref m) if m.contains("expected")));
    }
}
