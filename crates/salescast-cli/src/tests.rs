use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["salescast"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
    assert!(cli.data.is_none());
}

#[test]
fn parses_forecast_with_partition_and_options() {
    let cli = Cli::try_parse_from([
        "salescast",
        "forecast",
        "--store",
        "1",
        "--dept",
        "3",
        "--horizon",
        "26",
        "--format",
        "json",
        "--chart-json",
        "chart.json",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Forecast {
            selection,
            horizon,
            chart_json,
            format,
        }) => {
            assert_eq!(
                selection.to_params(horizon),
                ForecastParams {
                    store: Some(1),
                    dept: Some(3),
                    horizon: Some(26),
                }
            );
            assert_eq!(chart_json, Some(PathBuf::from("chart.json")));
            assert_eq!(format, OutputFormat::Json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn forecast_defaults_to_aggregate_table() {
    let cli = Cli::try_parse_from(["salescast", "forecast"]).expect("expected valid cli args");
    match cli.command {
        Some(Commands::Forecast {
            selection, format, ..
        }) => {
            assert_eq!(selection.to_params(None), ForecastParams::default());
            assert_eq!(format, OutputFormat::Table);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn store_without_dept_is_rejected() {
    let result = Cli::try_parse_from(["salescast", "forecast", "--store", "1"]);
    assert!(result.is_err());
}

#[test]
fn non_numeric_horizon_is_rejected() {
    let result = Cli::try_parse_from(["salescast", "forecast", "--horizon", "soon"]);
    assert!(result.is_err());
}

#[test]
fn global_data_options_follow_subcommand() {
    let cli = Cli::try_parse_from([
        "salescast",
        "summary",
        "--data",
        "data/superstore.csv",
        "--dataset",
        "superstore",
    ])
    .expect("expected valid cli args");
    assert_eq!(cli.data, Some(PathBuf::from("data/superstore.csv")));
    assert_eq!(cli.dataset.as_deref(), Some("superstore"));
    assert!(matches!(cli.command, Some(Commands::Summary { .. })));
}

#[test]
fn partitions_limit_defaults_to_fifty() {
    let cli = Cli::try_parse_from(["salescast", "partitions"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Partitions { limit: 50 })
    ));
}

#[test]
fn parses_profiles_and_interactive() {
    let cli = Cli::try_parse_from(["salescast", "profiles"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Profiles)));

    let cli = Cli::try_parse_from(["salescast", "interactive"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Interactive)));
}
