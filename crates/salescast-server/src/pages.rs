//! Server-rendered forecast form.
//!
//! Every outcome, success or failure, renders the same page so the user can
//! adjust the inputs in place.

use std::fmt::Write as _;

use axum::{extract::State, response::Html, Form};
use salescast_core::DatasetProfile;
use salescast_pipeline::{present, Presentation};

use crate::api::{AppState, ForecastForm};

const PLOTLY_SRC: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// What to show under the form.
enum Outcome {
    Blank,
    Error(String),
    Forecast(Box<Presentation>),
}

pub(crate) async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state.profile, &ForecastForm::default(), &Outcome::Blank))
}

pub(crate) async fn submit(
    State(state): State<AppState>,
    Form(form): Form<ForecastForm>,
) -> Html<String> {
    let outcome = match form.to_params() {
        Ok(params) => match state.forecast(params).await {
            Ok(report) => Outcome::Forecast(Box::new(present(&report))),
            Err(e) => Outcome::Error(e.to_string()),
        },
        Err(e) => Outcome::Error(e.to_string()),
    };
    Html(render_page(&state.profile, &form, &outcome))
}

fn render_page(profile: &DatasetProfile, form: &ForecastForm, outcome: &Outcome) -> String {
    let heading = escape_html(&profile.title);
    let mut body = String::new();

    body.push_str(r#"<form method="post" action="/forecast" class="forecast-form">"#);
    if profile.is_partitioned() {
        push_number_input(&mut body, "store", "Store", form.store.as_deref(), None);
        push_number_input(&mut body, "dept", "Department", form.dept.as_deref(), None);
    }
    let default_horizon = profile.default_horizon().to_string();
    let horizon = form
        .horizon
        .as_deref()
        .filter(|h| !h.trim().is_empty())
        .unwrap_or(&default_horizon);
    push_number_input(
        &mut body,
        "horizon",
        &format!("{} periods to forecast", profile.granularity.label()),
        Some(horizon),
        Some(profile.max_horizon()),
    );
    body.push_str(r#"<button type="submit">Generate Forecast</button></form>"#);

    match outcome {
        Outcome::Blank => {}
        Outcome::Error(message) => {
            let _ = write!(
                body,
                r#"<div class="error" role="alert">{}</div>"#,
                escape_html(message)
            );
        }
        Outcome::Forecast(presentation) => push_forecast(&mut body, presentation),
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{heading}</title>
<script src="{PLOTLY_SRC}"></script>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
.forecast-form label {{ margin-right: 1rem; }}
.error {{ color: #b00020; margin: 1rem 0; }}
.metrics {{ display: flex; gap: 2rem; margin: 1rem 0; }}
.metric .value {{ font-size: 1.5rem; font-weight: bold; }}
table {{ border-collapse: collapse; }}
td, th {{ padding: 0.25rem 0.75rem; border-bottom: 1px solid #ddd; text-align: right; }}
</style>
</head>
<body>
<h1>{heading}</h1>
{body}
</body>
</html>
"#
    )
}

fn push_number_input(
    body: &mut String,
    name: &str,
    label: &str,
    value: Option<&str>,
    max: Option<usize>,
) {
    let max_attr = max.map(|m| format!(r#" max="{m}""#)).unwrap_or_default();
    let _ = write!(
        body,
        r#"<label>{label} <input type="number" name="{name}" min="1"{max_attr} value="{}"></label>"#,
        escape_html(value.unwrap_or_default())
    );
}

fn push_forecast(body: &mut String, presentation: &Presentation) {
    let _ = write!(body, "<h2>{}</h2>", escape_html(&presentation.title));

    body.push_str(r#"<div class="metrics">"#);
    for metric in &presentation.metrics {
        let note = metric
            .note
            .as_deref()
            .map(|n| format!(r#"<div class="note">{}</div>"#, escape_html(n)))
            .unwrap_or_default();
        let _ = write!(
            body,
            r#"<div class="metric"><div class="label">{}</div><div class="value">{}</div>{note}</div>"#,
            escape_html(&metric.label),
            escape_html(&metric.value)
        );
    }
    body.push_str("</div>");

    match serde_json::to_string(&presentation.chart) {
        Ok(figure) => {
            let _ = write!(
                body,
                r#"<div id="chart"></div><script>const figure = {}; Plotly.newPlot("chart", figure.data, figure.layout);</script>"#,
                script_safe(&figure)
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "chart serialization failed");
            body.push_str(r#"<div class="error">Chart unavailable.</div>"#);
        }
    }

    body.push_str(
        "<table><thead><tr><th>Date</th><th>Predicted</th><th>Lower</th><th>Upper</th></tr></thead><tbody>",
    );
    for row in &presentation.rows {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.date,
            escape_html(&row.predicted),
            escape_html(&row.lower),
            escape_html(&row.upper)
        );
    }
    body.push_str("</tbody></table>");
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// JSON embedded in a `<script>` block must not close the element early.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
