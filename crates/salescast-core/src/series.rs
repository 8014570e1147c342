use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Fixed time step of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
}

impl Granularity {
    #[must_use]
    pub fn step_days(self) -> i64 {
        match self {
            Granularity::Daily => 1,
            Granularity::Weekly => 7,
        }
    }

    /// Date `steps` periods after `date`, or `None` past chrono's range.
    #[must_use]
    pub fn advance(self, date: NaiveDate, steps: usize) -> Option<NaiveDate> {
        let steps = i64::try_from(steps).ok()?;
        date.checked_add_signed(Duration::days(self.step_days().checked_mul(steps)?))
    }

    /// Trend comparison window used when a dataset does not set its own.
    #[must_use]
    pub fn default_trend_window(self) -> usize {
        match self {
            Granularity::Daily => 30,
            Granularity::Weekly => 12,
        }
    }

    /// Roughly one year of periods.
    #[must_use]
    pub fn default_max_horizon(self) -> usize {
        match self {
            Granularity::Daily => 365,
            Granularity::Weekly => 52,
        }
    }

    #[must_use]
    pub fn default_horizon(self) -> usize {
        match self {
            Granularity::Daily => 30,
            Granularity::Weekly => 12,
        }
    }

    /// Capitalised label used in chart axes and panel headings.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Daily => write!(f, "daily"),
            Granularity::Weekly => write!(f, "weekly"),
        }
    }
}

/// One observation of the canonical `(date, value)` series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl SeriesPoint {
    #[must_use]
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Sorted, de-duplicated special-event dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTable {
    dates: Vec<NaiveDate>,
}

impl EventTable {
    #[must_use]
    pub fn from_dates(mut dates: Vec<NaiveDate>) -> Self {
        dates.sort_unstable();
        dates.dedup();
        Self { dates }
    }

    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.binary_search(&date).is_ok()
    }

    /// Number of events falling inside `[first, last]`.
    #[must_use]
    pub fn count_within(&self, first: NaiveDate, last: NaiveDate) -> usize {
        self.dates
            .iter()
            .filter(|d| **d >= first && **d <= last)
            .count()
    }

    /// Keeps only the dates for which `keep` returns `true`.
    #[must_use]
    pub fn retain(mut self, keep: impl Fn(NaiveDate) -> bool) -> Self {
        self.dates.retain(|d| keep(*d));
        self
    }
}

/// Model output for one date: point estimate and uncertainty bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedPoint {
    pub date: NaiveDate,
    pub yhat: f64,
    pub lower: f64,
    pub upper: f64,
}
