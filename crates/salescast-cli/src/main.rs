mod dashboard;
mod interactive;
mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use salescast_pipeline::ForecastParams;
use tracing_subscriber::EnvFilter;

use crate::session::Session;

#[derive(Debug, Parser)]
#[command(name = "salescast")]
#[command(about = "Sales forecasting dashboard")]
struct Cli {
    /// Sales CSV file (overrides `SALESCAST_DATA_PATH`)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Dataset profile name (overrides `SALESCAST_DATASET`)
    #[arg(long, global = true)]
    dataset: Option<String>,
    /// Dataset profiles YAML (overrides `SALESCAST_DATASETS_PATH`)
    #[arg(long, global = true)]
    datasets_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fit the model and print the statistics panel and forecast table
    Forecast {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Periods to forecast (defaults to the dataset's default horizon)
        #[arg(long)]
        horizon: Option<usize>,
        /// Also write the Plotly chart figure to this file
        #[arg(long)]
        chart_json: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Print the statistics panel without fitting a model
    Summary {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// List store/department pairs present in the data
    Partitions {
        /// Maximum number of pairs to print
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// List configured dataset profiles
    Profiles,
    /// Prompt for forecasts in a loop
    Interactive,
}

/// Store/department pair; omit both for the whole-dataset aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::Args)]
struct SelectionArgs {
    #[arg(long, requires = "dept")]
    store: Option<u32>,
    #[arg(long, requires = "store")]
    dept: Option<u32>,
}

impl SelectionArgs {
    fn to_params(self, horizon: Option<usize>) -> ForecastParams {
        ForecastParams {
            store: self.store,
            dept: self.dept,
            horizon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut config = salescast_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Some(data) = cli.data {
        config.data_path = data;
    }
    if let Some(dataset) = cli.dataset {
        config.dataset = dataset;
    }
    if let Some(path) = cli.datasets_file {
        config.datasets_path = path;
    }

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Profiles => {
            let datasets = salescast_core::load_datasets_or_builtin(&config.datasets_path)?;
            print!("{}", dashboard::render_profiles(&datasets.datasets, &config.dataset));
        }
        Commands::Forecast {
            selection,
            horizon,
            chart_json,
            format,
        } => {
            let session = Session::open(&config)?;
            let params = selection.to_params(horizon);
            let report = session.forecast(params).await?;
            let presentation = salescast_pipeline::present(&report);
            if let Some(path) = chart_json {
                std::fs::write(&path, serde_json::to_string_pretty(&presentation.chart)?)?;
                tracing::info!(path = %path.display(), "chart figure written");
            }
            match format {
                OutputFormat::Table => print!("{}", dashboard::render_forecast(&presentation)),
                OutputFormat::Json => {
                    let output = dashboard::JsonOutput::new(&report, &presentation);
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
            }
        }
        Commands::Summary { selection } => {
            let session = Session::open(&config)?;
            let report = session.summary(selection.to_params(None)).await?;
            print!("{}", dashboard::render_summary(&report));
        }
        Commands::Partitions { limit } => {
            let session = Session::open(&config)?;
            let partitions = session.partitions().await?;
            print!("{}", dashboard::render_partitions(&partitions, limit));
        }
        Commands::Interactive => {
            let session = Session::open(&config)?;
            interactive::run(&session).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
