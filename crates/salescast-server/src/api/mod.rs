mod forecast;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use salescast_core::{DatasetProfile, PartitionKey, PipelineError};
use salescast_model::{ForecastModel, ModelConfig};
use salescast_pipeline::{forecast_from_cache, ForecastParams, ForecastReport, TableCache};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};
use crate::pages;

pub(crate) use forecast::ForecastForm;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<TableCache>,
    pub profile: Arc<DatasetProfile>,
    pub model: Arc<dyn ForecastModel>,
    pub model_config: Arc<ModelConfig>,
    pub forecast_timeout: Duration,
}

impl AppState {
    /// Run one forecast against the cached table, logging failures at a level
    /// matching who can fix them.
    pub(crate) async fn forecast(
        &self,
        params: ForecastParams,
    ) -> Result<ForecastReport, PipelineError> {
        let result = forecast_from_cache(
            Arc::clone(&self.cache),
            Arc::clone(&self.profile),
            params,
            Arc::clone(&self.model),
            Arc::clone(&self.model_config),
            self.forecast_timeout,
        )
        .await;

        if let Err(e) = &result {
            if e.is_user_correctable() {
                tracing::warn!(code = e.code(), error = %e, "forecast rejected");
            } else {
                tracing::error!(code = e.code(), error = %e, "forecast failed");
            }
        }
        result
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    dataset: String,
    table_loaded: bool,
}

#[derive(Debug, Serialize)]
struct RefreshData {
    rows: usize,
    partitions: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub(super) fn from_pipeline(request_id: String, error: &PipelineError) -> Self {
        Self::new(request_id, error.code(), error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "partition_not_found" | "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "model_fit_failure" => StatusCode::UNPROCESSABLE_ENTITY,
            "data_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    let pages = Router::new()
        .route("/", get(pages::index))
        .route("/forecast", post(pages::submit));

    let api = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/forecast", get(forecast::get_forecast))
        .route("/api/v1/partitions", get(list_partitions))
        .route("/api/v1/cache/refresh", post(refresh_cache));

    Router::new()
        .merge(pages)
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(build_cors()),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            dataset: state.profile.name.clone(),
            table_loaded: state.cache.is_loaded(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

async fn list_partitions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<PartitionKey>>>, ApiError> {
    let cache = Arc::clone(&state.cache);
    let partitions = tokio::task::spawn_blocking(move || cache.get().map(|t| t.partitions()))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "partition listing task failed");
            ApiError::new(req_id.0.clone(), "internal_error", "partition listing failed")
        })?
        .map_err(|e| ApiError::from_pipeline(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: partitions,
        meta: ResponseMeta::new(req_id.0),
    }))
}

async fn refresh_cache(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<RefreshData>>, ApiError> {
    state.cache.invalidate();
    let cache = Arc::clone(&state.cache);
    let table = tokio::task::spawn_blocking(move || cache.get())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "cache refresh task failed");
            ApiError::new(req_id.0.clone(), "internal_error", "cache refresh failed")
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "cache refresh failed");
            ApiError::from_pipeline(req_id.0.clone(), &e)
        })?;

    Ok(Json(ApiResponse {
        data: RefreshData {
            rows: table.len(),
            partitions: table.partitions().len(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests;
