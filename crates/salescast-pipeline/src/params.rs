//! Request parameter validation shared by the web and dashboard shells.

use salescast_core::{DatasetProfile, PartitionKey, PipelineError};
use serde::Deserialize;

use crate::filter::SeriesSelection;

/// Raw user input for one forecast. Absent fields fall back to the
/// dataset's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ForecastParams {
    pub store: Option<u32>,
    pub dept: Option<u32>,
    pub horizon: Option<usize>,
}

/// Validated parameters ready for [`crate::run_forecast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedParams {
    pub selection: SeriesSelection,
    pub horizon: usize,
}

impl ForecastParams {
    /// Validate against `profile`.
    ///
    /// A partitioned dataset with neither key given selects the whole-dataset
    /// aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidRequest`] when only one key is given,
    /// a key is zero, keys are given for a dataset without partitions, or the
    /// horizon falls outside `1..=profile.max_horizon()`.
    pub fn resolve(&self, profile: &DatasetProfile) -> Result<ResolvedParams, PipelineError> {
        let selection = match (self.store, self.dept) {
            (None, None) => SeriesSelection::Aggregate,
            (Some(store), Some(dept)) => {
                if !profile.is_partitioned() {
                    return Err(PipelineError::InvalidRequest(format!(
                        "dataset '{}' has no store/department columns",
                        profile.name
                    )));
                }
                if store == 0 || dept == 0 {
                    return Err(PipelineError::InvalidRequest(
                        "store and department must be at least 1".to_string(),
                    ));
                }
                SeriesSelection::partition(PartitionKey::new(store, dept))
            }
            _ => {
                return Err(PipelineError::InvalidRequest(
                    "store and department must be given together".to_string(),
                ))
            }
        };

        let max = profile.max_horizon();
        let horizon = self.horizon.unwrap_or_else(|| profile.default_horizon());
        if horizon == 0 || horizon > max {
            return Err(PipelineError::InvalidRequest(format!(
                "forecast horizon must be between 1 and {max}, got {horizon}"
            )));
        }

        Ok(ResolvedParams { selection, horizon })
    }
}
