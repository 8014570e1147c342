//! Shared domain types, error taxonomy and configuration for salescast.

pub mod app_config;
pub mod config;
pub mod datasets;
pub mod error;
pub mod records;
pub mod series;
pub mod summary;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use datasets::{load_datasets, load_datasets_or_builtin, DatasetProfile, DatasetsFile};
pub use error::{ConfigError, PipelineError};
pub use records::{HistoricalRecord, PartitionKey, SalesTable};
pub use series::{EventTable, Granularity, PredictedPoint, SeriesPoint};
pub use summary::{SummaryStats, Trend};
