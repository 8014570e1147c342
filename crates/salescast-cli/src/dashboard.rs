//! Plain-text rendering of dashboard output.
//!
//! Every renderer returns a `String` so `main` decides where it goes and tests
//! can assert on the exact layout.

use std::fmt::Write as _;

use salescast_core::{DatasetProfile, PartitionKey, SummaryStats};
use salescast_pipeline::{
    summary_metrics, ForecastReport, ForecastRow, Metric, Presentation, SummaryReport,
};
use serde::Serialize;

/// Machine-readable forecast output for `--format json`.
#[derive(Debug, Serialize)]
pub(crate) struct JsonOutput<'a> {
    title: &'a str,
    dataset: &'a str,
    model: &'a str,
    horizon: usize,
    summary: &'a SummaryStats,
    metrics: &'a [Metric],
    forecast: &'a [ForecastRow],
}

impl<'a> JsonOutput<'a> {
    pub(crate) fn new(report: &'a ForecastReport, presentation: &'a Presentation) -> Self {
        Self {
            title: &report.title,
            dataset: &report.dataset,
            model: report.model,
            horizon: report.horizon,
            summary: &report.summary,
            metrics: &presentation.metrics,
            forecast: &presentation.rows,
        }
    }
}

pub(crate) fn render_metrics(metrics: &[Metric]) -> String {
    let width = metrics.iter().map(|m| m.label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for metric in metrics {
        let _ = write!(out, "{:<width$}  {}", metric.label, metric.value);
        if let Some(note) = &metric.note {
            let _ = write!(out, "  ({note})");
        }
        out.push('\n');
    }
    out
}

pub(crate) fn render_forecast_table(rows: &[ForecastRow]) -> String {
    let mut out = format!(
        "{:<12}{:>16}{:>16}{:>16}\n",
        "DATE", "PREDICTED", "LOWER", "UPPER"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<12}{:>16}{:>16}{:>16}",
            row.date.format("%Y-%m-%d"),
            row.predicted,
            row.lower,
            row.upper
        );
    }
    out
}

pub(crate) fn render_forecast(presentation: &Presentation) -> String {
    format!(
        "{}\n\n{}\n{}",
        presentation.title,
        render_metrics(&presentation.metrics),
        render_forecast_table(&presentation.rows)
    )
}

pub(crate) fn render_summary(report: &SummaryReport) -> String {
    let metrics = summary_metrics(&report.summary, report.granularity, report.has_events);
    format!(
        "{}\n{} periods of history\n\n{}",
        report.title,
        report.summary.points,
        render_metrics(&metrics)
    )
}

pub(crate) fn render_partitions(partitions: &[PartitionKey], limit: usize) -> String {
    if partitions.is_empty() {
        return "dataset has no store/department partitions\n".to_string();
    }
    let mut out = format!("{:<8}DEPT\n", "STORE");
    for key in partitions.iter().take(limit) {
        let _ = writeln!(out, "{:<8}{}", key.store, key.dept);
    }
    if partitions.len() > limit {
        let _ = writeln!(out, "... {} more", partitions.len() - limit);
    }
    out
}

pub(crate) fn render_profiles(profiles: &[DatasetProfile], active: &str) -> String {
    let mut out = format!(
        "  {:<14}{:<9}{:<13}{:<8}TITLE\n",
        "NAME", "STEP", "PARTITIONED", "WINDOW"
    );
    for profile in profiles {
        let marker = if profile.name.eq_ignore_ascii_case(active) {
            '*'
        } else {
            ' '
        };
        let partitioned = if profile.is_partitioned() { "yes" } else { "no" };
        let _ = writeln!(
            out,
            "{marker} {:<14}{:<9}{:<13}{:<8}{}",
            profile.name,
            profile.granularity.to_string(),
            partitioned,
            profile.trend_window(),
            profile.title
        );
    }
    out
}
