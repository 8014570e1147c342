//! Data preparation, summary and presentation pipeline shared by the web
//! server and the dashboard CLI.
//!
//! A request flows loader -> filter -> prepare -> summary -> model adapter ->
//! presenter. [`run_forecast`] drives the whole chain against an in-memory
//! [`SalesTable`](salescast_core::SalesTable); [`forecast_from_cache`] does the
//! same on a blocking worker against a shared [`TableCache`].

pub mod adapter;
pub mod cache;
pub mod filter;
pub mod loader;
pub mod params;
pub mod pipeline;
pub mod prepare;
pub mod presenter;
pub mod summary;

pub use adapter::forecast_series;
pub use cache::{CachePolicy, TableCache};
pub use filter::{select_series, FilteredSeries, SeriesSelection};
pub use loader::{load_sales_table, read_sales_table};
pub use params::{ForecastParams, ResolvedParams};
pub use pipeline::{
    forecast_from_cache, report_title, run_forecast, run_summary, ForecastReport, SummaryReport,
};
pub use prepare::{prepare_series, PreparedSeries};
pub use presenter::{
    format_currency, format_percent, present, summary_metrics, ChartSpec, ForecastRow, Metric,
    Presentation,
};
pub use summary::{summarize, trend_percentage};
