//! Dataset, cache and model wiring shared by every dashboard command.

use std::sync::Arc;
use std::time::Duration;

use salescast_core::{AppConfig, DatasetProfile, PartitionKey, PipelineError};
use salescast_model::{ForecastModel, ModelConfig, SeasonalEtsModel};
use salescast_pipeline::{
    forecast_from_cache, run_summary, CachePolicy, ForecastParams, ForecastReport, SummaryReport,
    TableCache,
};

pub(crate) struct Session {
    profile: Arc<DatasetProfile>,
    cache: Arc<TableCache>,
    model: Arc<dyn ForecastModel>,
    model_config: Arc<ModelConfig>,
    timeout: Duration,
}

impl Session {
    /// Resolve the configured dataset profile and point a cache at the data
    /// file. The file itself is read on first use.
    pub(crate) fn open(config: &AppConfig) -> anyhow::Result<Self> {
        let datasets = salescast_core::load_datasets_or_builtin(&config.datasets_path)?;
        let profile = datasets.find(&config.dataset)?.clone();
        tracing::debug!(
            dataset = %profile.name,
            data_path = %config.data_path.display(),
            "dashboard session opened"
        );
        let cache = TableCache::for_file(
            config.data_path.clone(),
            profile.clone(),
            CachePolicy::from_secs(config.cache_max_age_secs),
        );
        Ok(Self::new(
            profile,
            cache,
            Duration::from_secs(config.forecast_timeout_secs),
        ))
    }

    pub(crate) fn new(profile: DatasetProfile, cache: TableCache, timeout: Duration) -> Self {
        Self {
            profile: Arc::new(profile),
            cache: Arc::new(cache),
            model: Arc::new(SeasonalEtsModel::new()),
            model_config: Arc::new(ModelConfig::default()),
            timeout,
        }
    }

    pub(crate) fn profile(&self) -> &DatasetProfile {
        &self.profile
    }

    pub(crate) async fn forecast(
        &self,
        params: ForecastParams,
    ) -> Result<ForecastReport, PipelineError> {
        forecast_from_cache(
            Arc::clone(&self.cache),
            Arc::clone(&self.profile),
            params,
            Arc::clone(&self.model),
            Arc::clone(&self.model_config),
            self.timeout,
        )
        .await
    }

    pub(crate) async fn summary(
        &self,
        params: ForecastParams,
    ) -> Result<SummaryReport, PipelineError> {
        let profile = Arc::clone(&self.profile);
        self.with_table(move |cache| run_summary(&*cache.get()?, &profile, &params))
            .await
    }

    pub(crate) async fn partitions(&self) -> Result<Vec<PartitionKey>, PipelineError> {
        self.with_table(|cache| Ok(cache.get()?.partitions())).await
    }

    /// Drop and reload the cached table, returning its row count.
    pub(crate) async fn refresh(&self) -> Result<usize, PipelineError> {
        self.with_table(|cache| {
            cache.invalidate();
            Ok(cache.get()?.len())
        })
        .await
    }

    /// Run `f` on a blocking worker, since any cache access may read the CSV.
    async fn with_table<T, F>(&self, f: F) -> Result<T, PipelineError>
    where
        T: Send + 'static,
        F: FnOnce(&TableCache) -> Result<T, PipelineError> + Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || f(&cache))
            .await
            .map_err(|e| PipelineError::DataUnavailable(format!("table task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SUPERSTORE_CSV: &str = "\
Row ID,Order Date,Sales
1,01/01/2024,100
2,02/01/2024,120
3,02/01/2024,80
4,03/01/2024,150
5,04/01/2024,300
";

    fn session_for(csv: &str) -> (Session, tempfile::NamedTempFile) {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(csv.as_bytes()).expect("write csv");
        let profile = DatasetProfile::superstore();
        let cache = TableCache::for_file(
            file.path().to_path_buf(),
            profile.clone(),
            CachePolicy::Never,
        );
        (Session::new(profile, cache, Duration::from_secs(30)), file)
    }

    #[tokio::test]
    async fn summary_aggregates_daily_rows() {
        let (session, _file) = session_for(SUPERSTORE_CSV);
        let report = session
            .summary(ForecastParams::default())
            .await
            .expect("summary");
        assert!((report.summary.total - 750.0).abs() < 1e-9);
        assert!((report.summary.mean - 187.5).abs() < 1e-9);
        assert_eq!(report.title, "Superstore Sales Forecast");
    }

    #[tokio::test]
    async fn refresh_reports_row_count() {
        let (session, _file) = session_for(SUPERSTORE_CSV);
        assert_eq!(session.refresh().await.expect("refresh"), 5);
        assert!(session.partitions().await.expect("partitions").is_empty());
    }

    #[tokio::test]
    async fn refresh_picks_up_appended_rows() {
        let (session, mut file) = session_for(SUPERSTORE_CSV);
        assert_eq!(session.refresh().await.expect("first load"), 5);

        file.write_all(b"6,05/01/2024,90\n").expect("append row");
        file.flush().expect("flush");
        assert_eq!(session.refresh().await.expect("reload"), 6);
    }

    #[tokio::test]
    async fn forecast_returns_requested_horizon() {
        let (session, _file) = session_for(SUPERSTORE_CSV);
        let report = session
            .forecast(ForecastParams {
                horizon: Some(1),
                ..ForecastParams::default()
            })
            .await
            .expect("forecast");
        assert_eq!(report.forecast.len(), 1);
        assert_eq!(
            report.forecast[0].date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 5).expect("date")
        );
    }
}
