//! Line-oriented dashboard loop.
//!
//! Each line is one request. A failed request prints its message and the loop
//! keeps going, the same way the web form re-renders with an error.

use salescast_pipeline::ForecastParams;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::dashboard;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DashboardInput {
    Forecast(ForecastParams),
    Refresh,
    Help,
    Quit,
    Empty,
}

const HELP: &str = "\
Enter one of:
  <horizon>                    forecast the whole dataset
  <store> <dept>               forecast one partition with the default horizon
  <store> <dept> <horizon>     forecast one partition
  (blank line)                 forecast the whole dataset with the default horizon
  refresh                      reload the data file
  help                         show this message
  quit                         leave
";

pub(crate) fn parse_line(line: &str) -> Result<DashboardInput, String> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => return Ok(DashboardInput::Empty),
        "q" | "quit" | "exit" => return Ok(DashboardInput::Quit),
        "refresh" | "r" => return Ok(DashboardInput::Refresh),
        "help" | "?" | "h" => return Ok(DashboardInput::Help),
        _ => {}
    }

    let numbers = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|_| format!("'{s}' is not a whole number; type 'help' for usage"))
        })
        .collect::<Result<Vec<u32>, String>>()?;

    let params = match numbers.as_slice() {
        [horizon] => ForecastParams {
            horizon: Some(*horizon as usize),
            ..ForecastParams::default()
        },
        [store, dept] => ForecastParams {
            store: Some(*store),
            dept: Some(*dept),
            horizon: None,
        },
        [store, dept, horizon] => ForecastParams {
            store: Some(*store),
            dept: Some(*dept),
            horizon: Some(*horizon as usize),
        },
        _ => return Err("expected 1 to 3 numbers; type 'help' for usage".to_string()),
    };
    Ok(DashboardInput::Forecast(params))
}

pub(crate) async fn run(session: &Session) -> anyhow::Result<()> {
    let profile = session.profile();
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(
            format!(
                "{} ({} data, default horizon {}, max {})\n{HELP}",
                profile.title,
                profile.granularity,
                profile.default_horizon(),
                profile.max_horizon()
            )
            .as_bytes(),
        )
        .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let output = match parse_line(&line) {
            Ok(DashboardInput::Quit) => break,
            Ok(DashboardInput::Help) => HELP.to_string(),
            Ok(DashboardInput::Refresh) => match session.refresh().await {
                Ok(rows) => format!("reloaded {rows} rows\n"),
                Err(e) => format!("error: {e}\n"),
            },
            Ok(DashboardInput::Empty) => forecast_output(session, ForecastParams::default()).await,
            Ok(DashboardInput::Forecast(params)) => forecast_output(session, params).await,
            Err(message) => format!("error: {message}\n"),
        };
        stdout.write_all(output.as_bytes()).await?;
    }
    Ok(())
}

async fn forecast_output(session: &Session, params: ForecastParams) -> String {
    match session.forecast(params).await {
        Ok(report) => {
            let presentation = salescast_pipeline::present(&report);
            dashboard::render_forecast(&presentation)
        }
        Err(e) => {
            tracing::debug!(error = %e, code = e.code(), "dashboard request failed");
            format!("error: {e}\n")
        }
    }
}
