use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("SALESCAST_ENV", "development"));

    let bind_addr = parse_addr("SALESCAST_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SALESCAST_LOG_LEVEL", "info");
    let data_path = PathBuf::from(or_default("SALESCAST_DATA_PATH", "./data/train.csv"));
    let datasets_path = PathBuf::from(or_default(
        "SALESCAST_DATASETS_PATH",
        "./config/datasets.yaml",
    ));

    let dataset = or_default("SALESCAST_DATASET", "walmart");
    if dataset.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "SALESCAST_DATASET".to_string(),
            reason: "must be non-empty".to_string(),
        });
    }

    let cache_max_age_secs = parse_u64("SALESCAST_CACHE_MAX_AGE_SECS", "0")?;
    let forecast_timeout_secs = parse_u64("SALESCAST_FORECAST_TIMEOUT_SECS", "30")?;
    if forecast_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SALESCAST_FORECAST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_path,
        datasets_path,
        dataset,
        cache_max_age_secs,
        forecast_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
