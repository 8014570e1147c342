mod api;
mod middleware;
mod pages;

use std::sync::Arc;
use std::time::Duration;

use salescast_model::{ModelConfig, SeasonalEtsModel};
use salescast_pipeline::{CachePolicy, TableCache};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = salescast_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let datasets = salescast_core::load_datasets_or_builtin(&config.datasets_path)?;
    let profile = datasets.find(&config.dataset)?.clone();
    tracing::info!(
        env = %config.env,
        dataset = %profile.name,
        data_path = %config.data_path.display(),
        "starting salescast server"
    );

    let cache = TableCache::for_file(
        config.data_path.clone(),
        profile.clone(),
        CachePolicy::from_secs(config.cache_max_age_secs),
    );
    // A failed warm-up is retried and reported per request.
    if let Err(e) = cache.get() {
        tracing::error!(error = %e, "initial sales table load failed");
    }

    let state = AppState {
        cache: Arc::new(cache),
        profile: Arc::new(profile),
        model: Arc::new(SeasonalEtsModel::new()),
        model_config: Arc::new(ModelConfig::default()),
        forecast_timeout: Duration::from_secs(config.forecast_timeout_secs),
    };
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
