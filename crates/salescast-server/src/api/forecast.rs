use axum::{
    extract::{Query, State},
    Extension, Json,
};
use salescast_core::PipelineError;
use salescast_pipeline::{present, ForecastParams, ForecastReport, Presentation};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Raw form or query input. Every field arrives as text so a bad value can be
/// reported on the same page instead of rejected by the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ForecastForm {
    pub store: Option<String>,
    pub dept: Option<String>,
    pub horizon: Option<String>,
}

impl ForecastForm {
    pub(crate) fn to_params(&self) -> Result<ForecastParams, PipelineError> {
        Ok(ForecastParams {
            store: parse_field(self.store.as_deref(), "store")?,
            dept: parse_field(self.dept.as_deref(), "department")?,
            horizon: parse_field(self.horizon.as_deref(), "forecast horizon")?,
        })
    }
}

fn parse_field<T: std::str::FromStr>(
    raw: Option<&str>,
    label: &str,
) -> Result<Option<T>, PipelineError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            PipelineError::InvalidRequest(format!(
                "{label} must be a whole number, got '{value}'"
            ))
        }),
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ForecastData {
    pub report: ForecastReport,
    pub presentation: Presentation,
}

pub(super) async fn get_forecast(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(form): Query<ForecastForm>,
) -> Result<Json<ApiResponse<ForecastData>>, ApiError> {
    let params = form
        .to_params()
        .map_err(|e| ApiError::from_pipeline(req_id.0.clone(), &e))?;
    let report = state
        .forecast(params)
        .await
        .map_err(|e| ApiError::from_pipeline(req_id.0.clone(), &e))?;
    let presentation = present(&report);

    Ok(Json(ApiResponse {
        data: ForecastData {
            report,
            presentation,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_fall_back_to_defaults() {
        let form = ForecastForm {
            store: Some(String::new()),
            dept: None,
            horizon: Some("  ".to_string()),
        };
        assert_eq!(form.to_params().unwrap(), ForecastParams::default());
    }

    #[test]
    fn numeric_fields_are_parsed() {
        let form = ForecastForm {
            store: Some("4".to_string()),
            dept: Some(" 12 ".to_string()),
            horizon: Some("8".to_string()),
        };
        assert_eq!(
            form.to_params().unwrap(),
            ForecastParams {
                store: Some(4),
                dept: Some(12),
                horizon: Some(8),
            }
        );
    }

    #[test]
    fn non_numeric_field_is_invalid_request() {
        let form = ForecastForm {
            horizon: Some("soon".to_string()),
            ..ForecastForm::default()
        };
        let err = form.to_params().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRequest(ref m) if m.contains("soon")));
    }
}
