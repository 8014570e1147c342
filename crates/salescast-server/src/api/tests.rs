use std::fmt::Write as _;
use std::io::Write as _;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use chrono::{Duration as ChronoDuration, NaiveDate};
use salescast_model::SeasonalEtsModel;
use salescast_pipeline::CachePolicy;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use super::*;

/// Sixty weeks for store 1 / dept 1 with a holiday every thirteenth week.
fn walmart_csv() -> NamedTempFile {
    let start = NaiveDate::from_ymd_opt(2010, 2, 5).expect("date");
    let mut csv = String::from("Store,Dept,Date,Weekly_Sales,IsHoliday\n");
    for week in 0..60_i64 {
        let date = start + ChronoDuration::weeks(week);
        let sales = 20_000 + (week % 5) * 750;
        let holiday = if week % 13 == 1 { "TRUE" } else { "FALSE" };
        writeln!(csv, "1,1,{date},{sales}.00,{holiday}").expect("write row");
    }
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(csv.as_bytes()).expect("write csv");
    file
}

fn app_for(file: &NamedTempFile) -> Router {
    let profile = DatasetProfile::walmart();
    let cache = TableCache::for_file(file.path().to_path_buf(), profile.clone(), CachePolicy::Never);
    build_app(AppState {
        cache: Arc::new(cache),
        profile: Arc::new(profile),
        model: Arc::new(SeasonalEtsModel::new()),
        model_config: Arc::new(ModelConfig::default()),
        forecast_timeout: Duration::from_secs(30),
    })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

async fn body_text(response: axum::response::Response) -> String {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    String::from_utf8(body.to_vec()).expect("utf8 body")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("partition_not_found", StatusCode::NOT_FOUND),
        ("validation_error", StatusCode::BAD_REQUEST),
        ("model_fit_failure", StatusCode::UNPROCESSABLE_ENTITY),
        ("data_unavailable", StatusCode::SERVICE_UNAVAILABLE),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "message").into_response();
        assert_eq!(response.status(), status, "{code}");
    }
}

#[tokio::test]
async fn health_reports_dataset() {
    let file = walmart_csv();
    let response = app_for(&file)
        .oneshot(get("/api/v1/health"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["dataset"], "walmart");
    assert_eq!(json["data"]["table_loaded"], false);
}

#[tokio::test]
async fn forecast_endpoint_returns_horizon_points() {
    let file = walmart_csv();
    let response = app_for(&file)
        .oneshot(get("/api/v1/forecast?store=1&dept=1&horizon=6"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let forecast = json["data"]["report"]["forecast"]
        .as_array()
        .expect("forecast array");
    assert_eq!(forecast.len(), 6);
    assert_eq!(forecast[0]["date"], "2011-04-01");
    assert_eq!(
        json["data"]["report"]["title"],
        "Store 1 - Department 1 Weekly Sales Forecast"
    );
    assert_eq!(json["data"]["report"]["summary"]["points"], 60);
    assert_eq!(json["data"]["report"]["summary"]["event_count"], 5);
    assert_eq!(
        json["data"]["presentation"]["chart"]["data"]
            .as_array()
            .map(Vec::len),
        Some(5)
    );
}

#[tokio::test]
async fn unknown_partition_is_not_found() {
    let file = walmart_csv();
    let response = app_for(&file)
        .oneshot(get("/api/v1/forecast?store=999&dept=999"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "partition_not_found");
}

#[tokio::test]
async fn out_of_range_horizon_is_bad_request() {
    let file = walmart_csv();
    let response = app_for(&file)
        .oneshot(get("/api/v1/forecast?store=1&dept=1&horizon=53"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_data_file_is_service_unavailable() {
    let file = walmart_csv();
    let app = app_for(&file);
    drop(file);
    let response = app
        .oneshot(get("/api/v1/forecast?store=1&dept=1"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn partitions_are_listed() {
    let file = walmart_csv();
    let response = app_for(&file)
        .oneshot(get("/api/v1/partitions"))
        .await
        .expect("response");
    let json = body_json(response).await;
    assert_eq!(json["data"], serde_json::json!([{ "store": 1, "dept": 1 }]));
}

#[tokio::test]
async fn refresh_reloads_table() {
    let file = walmart_csv();
    let response = app_for(&file)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/cache/refresh")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["rows"], 60);
    assert_eq!(json["data"]["partitions"], 1);
}

#[tokio::test]
async fn index_renders_form() {
    let file = walmart_csv();
    let response = app_for(&file).oneshot(get("/")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"<form method="post" action="/forecast""#));
    assert!(html.contains("Weekly Sales Forecast"));
}

#[tokio::test]
async fn form_submission_renders_chart_and_stats() {
    let file = walmart_csv();
    let response = app_for(&file)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/forecast")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("store=1&dept=1&horizon=4"))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Plotly.newPlot"));
    assert!(html.contains("Total Sales"));
    assert!(html.contains("4-Week Trend"));
    assert!(!html.contains(r#"class="error""#));
}

#[tokio::test]
async fn form_submission_shows_error_on_same_page() {
    let file = walmart_csv();
    let response = app_for(&file)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/forecast")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("store=999&dept=999&horizon=12"))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("no data found for store 999 and department 999"));
    assert!(!html.contains("Plotly.newPlot"));
}
