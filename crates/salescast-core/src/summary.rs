use serde::Serialize;

/// Outcome of the trailing-window trend comparison.
///
/// A missing trend never aborts a forecast; the panel shows "n/a" instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Trend {
    Percent { value: f64 },
    /// Earlier window averages zero.
    Undefined,
    InsufficientHistory { needed: usize, available: usize },
}

impl Trend {
    #[must_use]
    pub fn percent(&self) -> Option<f64> {
        match self {
            Trend::Percent { value } => Some(*value),
            Trend::Undefined | Trend::InsufficientHistory { .. } => None,
        }
    }
}

/// Aggregate statistics over the historical window of one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total: f64,
    pub mean: f64,
    pub trend: Trend,
    /// Window size `W` the trend compared.
    pub trend_window: usize,
    pub event_count: usize,
    pub points: usize,
}
