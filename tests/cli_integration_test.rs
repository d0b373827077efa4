//! CLI integration tests.
//!
//! Tests cover:
//! - Argument parsing for each subcommand
//! - Config loading from real INI files on disk, with CLI overrides
//! - Indicator and simulation pipelines over MockDataPort
//! - CSV rendering of tables and predictions

mod common;

use clap::Parser;
use common::*;
use stocksim::cli::{self, Cli, Command};
use stocksim::domain::error::StocksimError;
use stocksim::domain::prediction::ModelRegistry;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[data]
path = ./prices
news_path = ./news
cache_ttl_secs = 600

[simulation]
ticker = nvda
start_date = 2024-01-01
end_date = 2024-01-31
horizon_date = 2024-02-29
model = Linear Regression
confidence = 0.9

[wallet]
initial_capital = 1000
contribution_amount = 100
contribution_frequency = Monthly
skipped_capital = deferred
"#;

mod argument_parsing {
    use super::*;

    #[test]
    fn indicators_arguments() {
        let cli = Cli::try_parse_from([
            "stocksim",
            "indicators",
            "--data",
            "/tmp/prices",
            "--symbols",
            "AAPL,MSFT",
            "--start",
            "2024-01-01",
            "--end",
            "2024-06-01",
            "--ma",
            "20,50",
            "--high-low",
        ])
        .unwrap();

        match cli.command {
            Command::Indicators {
                symbols,
                start,
                ma,
                high_low,
                rsi,
                ..
            } => {
                assert_eq!(symbols, "AAPL,MSFT");
                assert_eq!(start, date(2024, 1, 1));
                assert_eq!(ma, vec![20, 50]);
                assert!(high_low);
                assert!(!rsi);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn simulate_with_overrides_and_verbose() {
        let cli = Cli::try_parse_from([
            "stocksim",
            "simulate",
            "-c",
            "sim.ini",
            "--ticker",
            "aapl",
            "--horizon",
            "2024-12-31",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Command::Simulate {
                ticker, horizon, ..
            } => {
                assert_eq!(ticker.as_deref(), Some("aapl"));
                assert_eq!(horizon, Some(date(2024, 12, 31)));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn news_needs_a_directory_or_config() {
        assert!(Cli::try_parse_from(["stocksim", "news", "--symbol", "AAPL"]).is_err());

        let cli =
            Cli::try_parse_from(["stocksim", "news", "-c", "sim.ini", "--symbol", "AAPL"]).unwrap();
        match cli.command {
            Command::News { news, config, .. } => {
                assert_eq!(news, None);
                assert_eq!(config.as_deref(), Some(Path::new("sim.ini")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(
            Cli::try_parse_from([
                "stocksim", "indicators", "-d", "x", "-s", "A", "--start", "01/01/2024", "--end",
                "2024-02-01",
            ])
            .is_err()
        );
    }
}

mod config_loading {
    use super::*;

    #[test]
    fn loads_ini_from_disk() {
        let file = write_temp_ini(VALID_INI);
        let config = cli::load_config(file.path()).unwrap();
        let cfg = cli::build_simulation_config(&config, None, None).unwrap();

        assert_eq!(cfg.ticker, "NVDA");
        assert_eq!(cfg.data_path, "./prices");
        assert_eq!(cfg.news_path.as_deref(), Some("./news"));
        assert_eq!(cfg.cache_ttl_secs, 600);
        assert_eq!(cfg.request.horizon, date(2024, 2, 29));
        assert_eq!(cfg.request.confidence, 0.9);
        assert_eq!(cfg.wallet.contribution_amount(), 100.0);
    }

    #[test]
    fn cli_overrides_win() {
        let file = write_temp_ini(VALID_INI);
        let config = cli::load_config(file.path()).unwrap();
        let cfg =
            cli::build_simulation_config(&config, Some(" msft "), Some(date(2024, 3, 15))).unwrap();

        assert_eq!(cfg.ticker, "MSFT");
        assert_eq!(cfg.request.horizon, date(2024, 3, 15));
    }

    #[test]
    fn horizon_override_is_validated() {
        let file = write_temp_ini(VALID_INI);
        let config = cli::load_config(file.path()).unwrap();
        let err = cli::build_simulation_config(&config, None, Some(date(2024, 1, 15))).unwrap_err();
        assert!(matches!(err, StocksimError::InvalidHorizon { .. }));
    }

    #[test]
    fn missing_file_is_config_parse_error() {
        let Err(err) = cli::load_config(Path::new("/nonexistent/stocksim.ini")) else {
            panic!("expected a config parse error");
        };
        assert!(matches!(err, StocksimError::ConfigParse { .. }));
        assert_eq!(ExitCode::from(&err), ExitCode::from(2));
    }

    #[test]
    fn news_dir_comes_from_config_unless_given() {
        let file = write_temp_ini(VALID_INI);

        let dir = cli::resolve_news_dir(None, Some(file.path())).unwrap();
        assert_eq!(dir, Path::new("./news"));

        let dir = cli::resolve_news_dir(Some(Path::new("/srv/news")), Some(file.path())).unwrap();
        assert_eq!(dir, Path::new("/srv/news"));

        let err = cli::resolve_news_dir(None, None).unwrap_err();
        assert!(matches!(err, StocksimError::ConfigMissing { ref key, .. } if key == "news_path"));
        assert_eq!(ExitCode::from(&err), ExitCode::from(2));
    }

    #[test]
    fn incomplete_config_is_missing_key() {
        let file = write_temp_ini("[data]\npath = x\n");
        let config = cli::load_config(file.path()).unwrap();
        let err = cli::build_simulation_config(&config, None, None).unwrap_err();
        assert!(matches!(err, StocksimError::ConfigMissing { key, .. } if key == "ticker"));
    }
}

mod indicators_pipeline {
    use super::*;

    #[test]
    fn table_with_indicator_columns_renders_as_csv() {
        let port = MockDataPort::new()
            .with_bars("AAA", generate_bars("AAA", "2024-01-01", 3, 10.0, 2.0))
            .with_bars("BBB", generate_bars("BBB", "2024-01-02", 2, 5.0, 0.0));

        let table = cli::run_indicators_pipeline(
            &port,
            &["AAA".to_string(), "BBB".to_string()],
            date(2024, 1, 1),
            date(2024, 2, 1),
            &[2],
            false,
            false,
        )
        .unwrap();

        let mut out = Vec::new();
        cli::write_table(&table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "date,AAA,BBB,AAA_MA2,BBB_MA2");
        assert_eq!(lines[1], "2024-01-01,10,,10,");
        assert_eq!(lines[2], "2024-01-02,12,5,11,5");
        assert_eq!(lines[3], "2024-01-03,14,5,13,5");
    }

    #[test]
    fn rsi_flag_returns_rsi_only() {
        let port = MockDataPort::new()
            .with_bars("AAA", generate_bars("AAA", "2024-01-01", 20, 10.0, 1.0));
        let table = cli::run_indicators_pipeline(
            &port,
            &["AAA".to_string()],
            date(2024, 1, 1),
            date(2024, 2, 1),
            &[5],
            true,
            true,
        )
        .unwrap();

        let names: Vec<String> = table.columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["AAA_RSI14"]);
    }

    #[test]
    fn nothing_fetched_is_no_data() {
        let port = MockDataPort::new().with_error("BAD", "boom");
        let err = cli::run_indicators_pipeline(
            &port,
            &["BAD".to_string(), "GONE".to_string()],
            date(2024, 1, 1),
            date(2024, 2, 1),
            &[],
            false,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, StocksimError::NoData { .. }));
        assert_eq!(ExitCode::from(&err), ExitCode::from(5));
    }
}

mod simulate_pipeline {
    use super::*;

    fn config(ticker: &str) -> stocksim::domain::config_validation::SimulationConfig {
        let file = write_temp_ini(&VALID_INI.replace("nvda", ticker));
        let config = cli::load_config(file.path()).unwrap();
        cli::build_simulation_config(&config, None, None).unwrap()
    }

    #[test]
    fn runs_and_writes_prediction_csv() {
        let port = MockDataPort::new()
            .with_bars("NVDA", generate_bars("NVDA", "2024-01-01", 45, 100.0, 1.0));
        let cfg = config("nvda");

        let outcome = cli::run_simulate_pipeline(&port, &cfg, &ModelRegistry::default()).unwrap();

        let mut out = Vec::new();
        cli::write_prediction(&outcome, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "date,predicted,lower,upper,actual");
        // 2024-02-01 is the first business day after the cutoff
        assert!(lines[1].starts_with("2024-02-01,131,131,131,"));
        assert!(lines[1].ends_with(",131"));
        // actuals stop at 2024-02-14; later rows have an empty actual
        assert!(lines.last().unwrap().starts_with("2024-02-29,"));
        assert!(lines.last().unwrap().ends_with(','));
    }

    #[test]
    fn unknown_ticker_is_no_data() {
        let port = MockDataPort::new();
        let err = cli::run_simulate_pipeline(&port, &config("zzz"), &ModelRegistry::default())
            .unwrap_err();
        assert!(matches!(err, StocksimError::NoData { symbol } if symbol == "ZZZ"));
    }

    #[test]
    fn unregistered_model_is_rejected() {
        let port = MockDataPort::new();
        let err = cli::run_simulate_pipeline(&port, &config("nvda"), &ModelRegistry::new())
            .unwrap_err();
        assert!(matches!(err, StocksimError::UnknownModel { .. }));
        assert_eq!(ExitCode::from(&err), ExitCode::from(4));
    }
}
