//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::cache_adapter::CachedDataPort;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_news_adapter::JsonNewsAdapter;
use crate::domain::config_validation::{
    SimulationConfig, configured_news_path, load_simulation_config,
};
use crate::domain::error::StocksimError;
use crate::domain::indicator::{add_52w_high_low, add_moving_average, calculate_rsi};
use crate::domain::metrics::{PerformanceSummary, format_compact, format_percent};
use crate::domain::prediction::ModelRegistry;
use crate::domain::price::PriceSeries;
use crate::domain::price_table::PriceTable;
use crate::domain::simulation::{SimulationOutcome, simulate_symbol};
use crate::domain::universe::{SkipReason, fetch_price_table, parse_symbols};
use crate::domain::wallet::ScenarioSummary;
use crate::ports::data_port::PriceDataPort;
use crate::ports::news_port::NewsPort;

#[derive(Parser, Debug)]
#[command(name = "stocksim", about = "Stock indicators and investment simulation")]
pub struct Cli {
    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a price table with indicator columns as CSV
    Indicators {
        /// Directory of <SYMBOL>.csv files
        #[arg(short, long)]
        data: PathBuf,
        /// Comma-separated symbols
        #[arg(short, long)]
        symbols: String,
        #[arg(long)]
        start: NaiveDate,
        /// Exclusive
        #[arg(long)]
        end: NaiveDate,
        /// Moving average periods, e.g. 20,50
        #[arg(long, value_delimiter = ',')]
        ma: Vec<usize>,
        #[arg(long)]
        high_low: bool,
        /// Print the RSI table instead of prices
        #[arg(long)]
        rsi: bool,
    },
    /// Train a model, project prices and compare wallet outcomes
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        horizon: Option<NaiveDate>,
    },
    /// Performance summary for one symbol
    Stats {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(long)]
        symbol: String,
    },
    /// Latest headlines for one symbol
    News {
        /// Directory of <SYMBOL>.json files
        #[arg(short, long, required_unless_present = "config")]
        news: Option<PathBuf>,
        /// Config whose [data] news_path is used when --news is absent
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List symbols available in a data directory
    ListSymbols {
        #[arg(short, long)]
        data: PathBuf,
    },
    /// Validate a simulation configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Indicators {
            data,
            symbols,
            start,
            end,
            ma,
            high_low,
            rsi,
        } => run_indicators(&data, &symbols, start, end, &ma, high_low, rsi),
        Command::Simulate {
            config,
            ticker,
            horizon,
        } => run_simulate(&config, ticker.as_deref(), horizon),
        Command::Stats { data, symbol } => run_stats(&data, &symbol),
        Command::News {
            news,
            config,
            symbol,
            limit,
        } => resolve_news_dir(news.as_deref(), config.as_deref())
            .and_then(|dir| run_news(&dir, &symbol, limit)),
        Command::ListSymbols { data } => run_list_symbols(&data),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StocksimError> {
    FileConfigAdapter::from_file(path).map_err(|e| StocksimError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Loads and validates a simulation config, then applies CLI overrides.
pub fn build_simulation_config(
    config: &FileConfigAdapter,
    ticker: Option<&str>,
    horizon: Option<NaiveDate>,
) -> Result<SimulationConfig, StocksimError> {
    let mut cfg = load_simulation_config(config, &ModelRegistry::default())?;
    if let Some(t) = ticker {
        cfg.ticker = t.trim().to_uppercase();
    }
    if let Some(h) = horizon {
        cfg.request.horizon = h;
        cfg.request.validate()?;
    }
    Ok(cfg)
}

/// `--news` wins; otherwise `[data] news_path` from the config.
pub fn resolve_news_dir(
    news: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<PathBuf, StocksimError> {
    if let Some(dir) = news {
        return Ok(dir.to_path_buf());
    }
    match config_path {
        Some(path) => Ok(PathBuf::from(configured_news_path(&load_config(path)?)?)),
        None => Err(StocksimError::ConfigMissing {
            section: "data".into(),
            key: "news_path".into(),
        }),
    }
}

/// Fetch, then extend with the requested indicator columns.
pub fn run_indicators_pipeline(
    port: &dyn PriceDataPort,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
    ma: &[usize],
    high_low: bool,
    rsi: bool,
) -> Result<PriceTable, StocksimError> {
    let fetched = fetch_price_table(port, symbols, start, end);
    for skipped in &fetched.skipped {
        match &skipped.reason {
            SkipReason::NoData => eprintln!("warning: skipping {} (no data)", skipped.symbol),
            SkipReason::FetchFailed(reason) => {
                eprintln!("warning: skipping {} ({})", skipped.symbol, reason)
            }
        }
    }
    if fetched.table.is_empty() {
        return Err(StocksimError::NoData {
            symbol: symbols.join(","),
        });
    }

    let mut table = fetched.table;
    if !ma.is_empty() {
        table = add_moving_average(&table, ma.to_vec())?;
    }
    if high_low {
        table = add_52w_high_low(&table);
    }
    if rsi {
        table = calculate_rsi(&table);
    }
    Ok(table)
}

pub fn write_table<W: Write>(table: &PriceTable, out: W) -> Result<(), StocksimError> {
    let mut wtr = csv::Writer::from_writer(out);
    let header: Vec<String> = std::iter::once("date".to_string())
        .chain(table.columns().iter().map(|c| c.name()))
        .collect();
    wtr.write_record(&header).map_err(csv_error)?;

    for (i, date) in table.dates().iter().enumerate() {
        let row: Vec<String> = std::iter::once(date.to_string())
            .chain(
                table
                    .columns()
                    .iter()
                    .map(|c| c.values[i].map(|v| v.to_string()).unwrap_or_default()),
            )
            .collect();
        wtr.write_record(&row).map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Prediction rows with the realized price where one exists.
pub fn write_prediction<W: Write>(
    outcome: &SimulationOutcome,
    out: W,
) -> Result<(), StocksimError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["date", "predicted", "lower", "upper", "actual"])
        .map_err(csv_error)?;
    for p in &outcome.prediction.points {
        let actual = outcome
            .split
            .test
            .price_on(p.date)
            .map(|v| v.to_string())
            .unwrap_or_default();
        wtr.write_record([
            p.date.to_string(),
            p.estimate.to_string(),
            p.lower.to_string(),
            p.upper.to_string(),
            actual,
        ])
        .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

fn csv_error(e: csv::Error) -> StocksimError {
    StocksimError::Io(io::Error::other(e))
}

pub fn run_simulate_pipeline(
    port: &dyn PriceDataPort,
    cfg: &SimulationConfig,
    registry: &ModelRegistry,
) -> Result<SimulationOutcome, StocksimError> {
    let mut model = registry.create(&cfg.model)?;
    simulate_symbol(port, &cfg.ticker, &cfg.request, model.as_mut(), &cfg.wallet)?.ok_or_else(
        || StocksimError::NoData {
            symbol: cfg.ticker.clone(),
        },
    )
}

fn print_outcome(cfg: &SimulationConfig, outcome: &SimulationOutcome) {
    eprintln!("\n=== {} ({}) ===", cfg.ticker, outcome.model);
    eprintln!(
        "Training:   {} to {} ({} prices)",
        cfg.request.start,
        cfg.request.cutoff,
        outcome.split.train.len()
    );
    eprintln!(
        "Projection: {} business days to {} ({:.0}% band)",
        outcome.prediction.points.len(),
        cfg.request.horizon,
        cfg.request.confidence * 100.0
    );
    eprintln!("Actual prices after cutoff: {}", outcome.split.test.len());
    eprintln!(
        "Wallet:     {:.2} initial, {:.2} {}, skipped capital {:?}",
        cfg.wallet.initial_capital(),
        cfg.wallet.contribution_amount(),
        cfg.wallet.frequency(),
        cfg.wallet.skipped_capital()
    );

    if let Some(cmp) = &outcome.comparison {
        eprintln!("\n--- Comparison at {} ---", cmp.anchor);
        eprintln!("            {:>12} {:>12}", "actual", "predicted");
        eprintln!(
            "Invested:   {:>12.2} {:>12.2}",
            cmp.actual.invested, cmp.predicted.invested
        );
        eprintln!("Value:      {:>12.2} {:>12.2}", cmp.actual.value, cmp.predicted.value);
        eprintln!("Profit:     {:>12.2} {:>12.2}", cmp.actual.profit, cmp.predicted.profit);
        eprintln!(
            "ROI:        {:>11.2}% {:>11.2}%",
            cmp.actual.roi_pct, cmp.predicted.roi_pct
        );
    }

    if let Some(end) = outcome.actual_final() {
        print_scenario("Actual", &end);
    }
    if let Some(end) = outcome.predicted_final() {
        print_scenario("Predicted", &end);
    }
}

fn print_scenario(label: &str, end: &ScenarioSummary) {
    eprintln!("\n--- {} at {} ---", label, end.date);
    eprintln!("Invested:   {:.2}", end.invested);
    eprintln!("Value:      {:.2}", end.value);
    eprintln!("Profit:     {:.2}", end.profit);
    eprintln!("ROI:        {:.2}%", end.roi_pct);
}

fn run_indicators(
    data: &Path,
    symbols: &str,
    start: NaiveDate,
    end: NaiveDate,
    ma: &[usize],
    high_low: bool,
    rsi: bool,
) -> Result<(), StocksimError> {
    let symbols = parse_symbols(symbols);
    if symbols.is_empty() {
        return Err(StocksimError::ConfigMissing {
            section: "cli".into(),
            key: "symbols".into(),
        });
    }
    eprintln!("Fetching {} symbols from {}", symbols.len(), data.display());

    let port = CsvAdapter::new(data);
    let table = run_indicators_pipeline(&port, &symbols, start, end, ma, high_low, rsi)?;
    write_table(&table, io::stdout().lock())?;
    eprintln!("{} rows, {} columns", table.dates().len(), table.columns().len());
    Ok(())
}

fn run_simulate(
    config_path: &Path,
    ticker: Option<&str>,
    horizon: Option<NaiveDate>,
) -> Result<(), StocksimError> {
    eprintln!("Loading config from {}", config_path.display());
    let config = load_config(config_path)?;
    let cfg = build_simulation_config(&config, ticker, horizon)?;

    let port = CachedDataPort::new(
        CsvAdapter::new(&cfg.data_path),
        Duration::from_secs(cfg.cache_ttl_secs),
    );
    let outcome = run_simulate_pipeline(&port, &cfg, &ModelRegistry::default())?;

    write_prediction(&outcome, io::stdout().lock())?;
    print_outcome(&cfg, &outcome);
    Ok(())
}

fn run_stats(data: &Path, symbol: &str) -> Result<(), StocksimError> {
    let symbol = symbol.trim().to_uppercase();
    let port = CsvAdapter::new(data);
    let bars = port.fetch_bars(&symbol, NaiveDate::MIN, NaiveDate::MAX)?;
    let series = PriceSeries::from_bars(&bars);

    let summary = PerformanceSummary::compute(&series).ok_or_else(|| StocksimError::NoData {
        symbol: symbol.clone(),
    })?;

    println!("{} as of {}", symbol, summary.last_date);
    println!("{:<14} {}", "Price", format_compact(Some(summary.last_price)));
    println!(
        "{:<14} {}",
        "Growth",
        summary
            .growth_pct
            .map(|g| format!("{:.2}%", g))
            .unwrap_or_else(|| "-".to_string())
    );
    for (label, change) in &summary.lookbacks {
        println!("{:<14} {}", label, format_percent(*change));
    }
    println!("{:<14} {}", "Perf YTD", format_percent(summary.ytd));
    for (period, distance) in &summary.sma_distances {
        println!("{:<14} {}", format!("SMA{}", period), format_percent(*distance));
    }
    println!("{:<14} {}", "52W High", format_compact(Some(summary.high_52w)));
    println!("{:<14} {}", "52W Low", format_compact(Some(summary.low_52w)));
    println!("{:<14} {}", "RSI (14)", format_compact(summary.rsi));
    Ok(())
}

fn run_news(dir: &Path, symbol: &str, limit: Option<usize>) -> Result<(), StocksimError> {
    let symbol = symbol.trim().to_uppercase();
    let news = JsonNewsAdapter::new(dir).fetch_news(&symbol)?;
    if news.is_empty() {
        eprintln!("No news found for {}", symbol);
        return Ok(());
    }

    for item in news.iter().take(limit.unwrap_or(usize::MAX)) {
        println!("{}", item.headline);
        println!("  {} | {}", item.publisher, item.link);
    }
    Ok(())
}

fn run_list_symbols(data: &Path) -> Result<(), StocksimError> {
    let symbols = CsvAdapter::new(data).list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found in {}", data.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), StocksimError> {
    eprintln!("Validating config: {}", config_path.display());
    let config = load_config(config_path)?;
    let cfg = build_simulation_config(&config, None, None)?;

    eprintln!("\nSimulation:");
    eprintln!("  ticker:     {}", cfg.ticker);
    eprintln!("  training:   {} to {}", cfg.request.start, cfg.request.cutoff);
    eprintln!("  horizon:    {}", cfg.request.horizon);
    eprintln!("  model:      {}", cfg.model);
    eprintln!("  confidence: {}", cfg.request.confidence);
    eprintln!("\nWallet:");
    eprintln!("  initial:    {:.2}", cfg.wallet.initial_capital());
    eprintln!(
        "  contribute: {:.2} {}",
        cfg.wallet.contribution_amount(), cfg.wallet.frequency()
    );
    eprintln!("\nData:");
    eprintln!("  path:       {}", cfg.data_path);
    if let Some(news) = &cfg.news_path {
        eprintln!("  news:       {}", news);
    }

    eprintln!("\nConfiguration is valid.");
    Ok(())
}
