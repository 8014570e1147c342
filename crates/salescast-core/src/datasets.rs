use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::series::Granularity;
use crate::ConfigError;

/// Column mapping and period rules for one CSV layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub name: String,
    /// Chart title used when the whole dataset is aggregated.
    pub title: String,
    pub granularity: Granularity,
    pub date_column: String,
    pub value_column: String,
    pub store_column: Option<String>,
    pub dept_column: Option<String>,
    /// Boolean special-event column (e.g. `IsHoliday`).
    pub event_column: Option<String>,
    /// `chrono` format strings tried in order.
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
    /// Overrides the granularity-derived trend window.
    pub trend_window: Option<usize>,
    /// Overrides the granularity-derived horizon cap.
    pub max_horizon: Option<usize>,
}

fn default_date_formats() -> Vec<String> {
    vec!["%Y-%m-%d".to_string(), "%m/%d/%Y".to_string()]
}

impl DatasetProfile {
    /// Weekly per-store, per-department sales with a holiday flag.
    #[must_use]
    pub fn walmart() -> Self {
        Self {
            name: "walmart".to_string(),
            title: "Weekly Sales Forecast".to_string(),
            granularity: Granularity::Weekly,
            date_column: "Date".to_string(),
            value_column: "Weekly_Sales".to_string(),
            store_column: Some("Store".to_string()),
            dept_column: Some("Dept".to_string()),
            event_column: Some("IsHoliday".to_string()),
            date_formats: default_date_formats(),
            trend_window: Some(4),
            max_horizon: None,
        }
    }

    /// Order-level retail sales, forecast as one daily aggregate.
    #[must_use]
    pub fn superstore() -> Self {
        Self {
            name: "superstore".to_string(),
            title: "Superstore Sales Forecast".to_string(),
            granularity: Granularity::Daily,
            date_column: "Order_Date".to_string(),
            value_column: "Sales".to_string(),
            store_column: None,
            dept_column: None,
            event_column: None,
            date_formats: vec!["%d/%m/%Y".to_string(), "%Y-%m-%d".to_string()],
            trend_window: None,
            max_horizon: None,
        }
    }

    /// `true` when rows carry store/department keys.
    #[must_use]
    pub fn is_partitioned(&self) -> bool {
        self.store_column.is_some() && self.dept_column.is_some()
    }

    #[must_use]
    pub fn trend_window(&self) -> usize {
        self.trend_window
            .unwrap_or_else(|| self.granularity.default_trend_window())
    }

    #[must_use]
    pub fn max_horizon(&self) -> usize {
        self.max_horizon
            .unwrap_or_else(|| self.granularity.default_max_horizon())
    }

    #[must_use]
    pub fn default_horizon(&self) -> usize {
        self.granularity.default_horizon().min(self.max_horizon())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetsFile {
    pub datasets: Vec<DatasetProfile>,
}

impl DatasetsFile {
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            datasets: vec![DatasetProfile::walmart(), DatasetProfile::superstore()],
        }
    }

    /// Look up a profile by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownDataset`] when no profile matches.
    pub fn find(&self, name: &str) -> Result<&DatasetProfile, ConfigError> {
        self.datasets
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownDataset(name.to_string()))
    }
}

/// Load and validate dataset profiles from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_datasets(path: &Path) -> Result<DatasetsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::DatasetsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let datasets_file: DatasetsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::DatasetsFileParse)?;

    validate_datasets(&datasets_file)?;

    Ok(datasets_file)
}

/// Like [`load_datasets`], falling back to [`DatasetsFile::builtin`] when the
/// file does not exist.
///
/// # Errors
///
/// Returns `ConfigError` if an existing file cannot be read, parsed, or validated.
pub fn load_datasets_or_builtin(path: &Path) -> Result<DatasetsFile, ConfigError> {
    if path.exists() {
        load_datasets(path)
    } else {
        Ok(DatasetsFile::builtin())
    }
}

fn validate_datasets(datasets_file: &DatasetsFile) -> Result<(), ConfigError> {
    if datasets_file.datasets.is_empty() {
        return Err(ConfigError::Validation(
            "datasets file must define at least one dataset".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();

    for dataset in &datasets_file.datasets {
        if dataset.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "dataset name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(dataset.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate dataset name: '{}'",
                dataset.name
            )));
        }

        if dataset.date_column.trim().is_empty() || dataset.value_column.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "dataset '{}' must name both a date and a value column",
                dataset.name
            )));
        }

        if dataset.store_column.is_some() != dataset.dept_column.is_some() {
            return Err(ConfigError::Validation(format!(
                "dataset '{}' must set store_column and dept_column together",
                dataset.name
            )));
        }

        if dataset.date_formats.is_empty() {
            return Err(ConfigError::Validation(format!(
                "dataset '{}' must list at least one date format",
                dataset.name
            )));
        }

        if dataset.trend_window == Some(0) {
            return Err(ConfigError::Validation(format!(
                "dataset '{}' has trend_window 0; must be at least 1",
                dataset.name
            )));
        }

        if dataset.max_horizon == Some(0) {
            return Err(ConfigError::Validation(format!(
                "dataset '{}' has max_horizon 0; must be at least 1",
                dataset.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "datasets_test.rs"]
mod tests;
