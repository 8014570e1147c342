//! Chart description and statistics panel for a [`ForecastReport`].
//!
//! The chart serialises to a Plotly figure (`{"data": [...], "layout": {...}}`)
//! that a browser can hand straight to `Plotly.newPlot`.

use chrono::NaiveDate;
use salescast_core::{Granularity, SummaryStats, Trend};
use serde::Serialize;

use crate::pipeline::ForecastReport;

const HISTORY_COLOR: &str = "blue";
const FORECAST_COLOR: &str = "red";
const TRANSPARENT: &str = "rgba(255,0,0,0)";
const BAND_FILL: &str = "rgba(255,0,0,0.2)";
const GRID_COLOR: &str = "#ebf0f8";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub x: Vec<NaiveDate>,
    pub y: Vec<f64>,
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fillcolor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

impl Trace {
    fn scatter(x: Vec<NaiveDate>, y: Vec<f64>, mode: &'static str) -> Self {
        Self {
            kind: "scatter",
            x,
            y,
            mode,
            name: None,
            line: None,
            marker: None,
            fill: None,
            fillcolor: None,
            showlegend: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub size: u32,
    pub symbol: &'static str,
    pub color: &'static str,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub hovermode: &'static str,
    pub plot_bgcolor: &'static str,
    pub paper_bgcolor: &'static str,
    pub legend: Legend,
    pub margin: Margin,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub xanchor: &'static str,
    pub yanchor: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: AxisTitle,
    pub gridcolor: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
    pub xanchor: &'static str,
    pub yanchor: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margin {
    pub t: u32,
    pub l: u32,
    pub r: u32,
    pub b: u32,
}

/// One labelled figure in the statistics panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
    /// Why a value is shown as `n/a`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One future period in the forecast table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub predicted: String,
    pub lower: String,
    pub upper: String,
}

/// Display-ready view of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presentation {
    pub title: String,
    pub chart: ChartSpec,
    pub metrics: Vec<Metric>,
    pub rows: Vec<ForecastRow>,
}

#[must_use]
pub fn present(report: &ForecastReport) -> Presentation {
    Presentation {
        title: report.title.clone(),
        chart: build_chart(report),
        metrics: summary_metrics(&report.summary, report.granularity, report.has_events),
        rows: report
            .forecast
            .iter()
            .map(|p| ForecastRow {
                date: p.date,
                predicted: format_currency(p.yhat),
                lower: format_currency(p.lower),
                upper: format_currency(p.upper),
            })
            .collect(),
    }
}

/// Historical line, forecast line, the upper/lower band pair and, when the
/// series has events, star markers at the observed value on each event date.
#[must_use]
pub fn build_chart(report: &ForecastReport) -> ChartSpec {
    let mode = match report.granularity {
        Granularity::Weekly => "lines+markers",
        Granularity::Daily => "lines",
    };
    let future_dates: Vec<NaiveDate> = report.forecast.iter().map(|p| p.date).collect();

    let mut history = Trace::scatter(
        report.history.iter().map(|p| p.date).collect(),
        report.history.iter().map(|p| p.value).collect(),
        mode,
    );
    history.name = Some(format!("Historical {} Sales", report.granularity.label()));
    history.line = Some(Line {
        color: HISTORY_COLOR,
        width: Some(1.0),
    });

    let mut forecast = Trace::scatter(
        future_dates.clone(),
        report.forecast.iter().map(|p| p.yhat).collect(),
        mode,
    );
    forecast.name = Some("Forecast".to_string());
    forecast.line = Some(Line {
        color: FORECAST_COLOR,
        width: Some(2.0),
    });

    let mut upper = Trace::scatter(
        future_dates.clone(),
        report.forecast.iter().map(|p| p.upper).collect(),
        "lines",
    );
    upper.line = Some(Line {
        color: TRANSPARENT,
        width: None,
    });
    upper.showlegend = Some(false);

    // Must directly follow `upper` so "tonexty" shades the band between them.
    let mut lower = Trace::scatter(
        future_dates,
        report.forecast.iter().map(|p| p.lower).collect(),
        "lines",
    );
    lower.name = Some("Confidence Interval".to_string());
    lower.line = Some(Line {
        color: TRANSPARENT,
        width: None,
    });
    lower.fill = Some("tonexty");
    lower.fillcolor = Some(BAND_FILL);

    let mut data = vec![history, forecast, upper, lower];

    if !report.events.is_empty() {
        let (x, y): (Vec<NaiveDate>, Vec<f64>) = report
            .events
            .dates()
            .iter()
            .filter_map(|&d| report.history_value_on(d).map(|v| (d, v)))
            .unzip();
        let mut events = Trace::scatter(x, y, "markers");
        events.name = Some("Holidays".to_string());
        events.marker = Some(Marker {
            size: 10,
            symbol: "star",
            color: "yellow",
            line: Line {
                color: "black",
                width: Some(1.0),
            },
        });
        data.push(events);
    }

    ChartSpec {
        data,
        layout: Layout {
            title: Title {
                text: report.title.clone(),
                x: 0.5,
                y: 0.95,
                xanchor: "center",
                yanchor: "top",
            },
            xaxis: Axis {
                title: AxisTitle {
                    text: "Date".to_string(),
                },
                gridcolor: GRID_COLOR,
                rangeslider: Some(RangeSlider { visible: true }),
            },
            yaxis: Axis {
                title: AxisTitle {
                    text: format!("{} Sales ($)", report.granularity.label()),
                },
                gridcolor: GRID_COLOR,
                rangeslider: None,
            },
            hovermode: "x unified",
            plot_bgcolor: "white",
            paper_bgcolor: "white",
            legend: Legend {
                x: 0.01,
                y: 0.99,
                xanchor: "left",
                yanchor: "top",
            },
            margin: Margin {
                t: 100,
                l: 50,
                r: 50,
                b: 50,
            },
        },
    }
}

fn period_unit(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Daily => "Day",
        Granularity::Weekly => "Week",
    }
}

/// Statistics panel: total, mean, trend and, for datasets with an event
/// column, the event count.
#[must_use]
pub fn summary_metrics(
    stats: &SummaryStats,
    granularity: Granularity,
    has_events: bool,
) -> Vec<Metric> {
    let (trend_value, note) = match stats.trend {
        Trend::Percent { value } => (format_percent(value), None),
        Trend::Undefined => (
            "n/a".to_string(),
            Some("earlier window averages zero".to_string()),
        ),
        Trend::InsufficientHistory { needed, available } => (
            "n/a".to_string(),
            Some(format!("needs {needed} periods of history, has {available}")),
        ),
    };

    let mut metrics = vec![
        Metric {
            label: "Total Sales".to_string(),
            value: format_currency(stats.total),
            note: None,
        },
        Metric {
            label: format!("Average {} Sales", granularity.label()),
            value: format_currency(stats.mean),
            note: None,
        },
        Metric {
            label: format!("{}-{} Trend", stats.trend_window, period_unit(granularity)),
            value: trend_value,
            note,
        },
    ];
    if has_events {
        metrics.push(Metric {
            label: "Holidays".to_string(),
            value: stats.event_count.to_string(),
            note: None,
        });
    }
    metrics
}

/// `$1,234.56`, with a leading `-` for negatives.
#[must_use]
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${}", group_thousands(&fixed))
}

/// `1,234.5%`, one decimal place.
#[must_use]
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let fixed = format!("{:.1}", value.abs());
    let sign = if value < 0.0 && fixed != "0.0" { "-" } else { "" };
    format!("{sign}{}%", group_thousands(&fixed))
}

/// Insert `,` every three digits of the integer part of an unsigned number.
fn group_thousands(fixed: &str) -> String {
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed, ""));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 1);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if !frac_part.is_empty() {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}

#[cfg(test)]
#[path = "presenter_test.rs"]
mod tests;
