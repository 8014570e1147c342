use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// CSV file holding the historical sales table.
    pub data_path: PathBuf,
    /// YAML file with dataset profiles; built-in profiles are used when absent.
    pub datasets_path: PathBuf,
    /// Name of the active dataset profile.
    pub dataset: String,
    /// `0` keeps the loaded table until a manual refresh.
    pub cache_max_age_secs: u64,
    pub forecast_timeout_secs: u64,
}
