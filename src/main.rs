//! BinanceWatch
//!
//! Queries Binance every second for the latest candle of a trading pair and
//! shows the average close price of the current interval, restarting the
//! average whenever a new interval begins. Runs until Ctrl-C.
//!
//! Common trading pairs: BTCUSDT, ETHUSDT, ETHBTC. Use `--decimals 7` or `8`
//! for non-USDT or low-priced pairs.

use anyhow::{Context, Result};
use binancewatch::config::{AppConfig, CliOverrides};
use binancewatch::exchange::ExchangeClient;
use binancewatch::watcher::{ConsoleReporter, Termination, Watcher};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Running average price of the open Binance candle
#[derive(Parser, Debug)]
#[clap(name = "binancewatch", version)]
#[clap(about = "Running average price of the open Binance candle")]
struct Cli {
    /// Trading pair [default: BTCUSDT]
    #[clap(short = 'p', long)]
    pair: Option<String>,

    /// Decimal places of the reported average [default: 2]
    #[clap(short = 'd', long)]
    decimals: Option<u32>,

    /// Candle interval, e.g. 1m, 5m, 1h [default: 1m]
    #[clap(short = 'i', long)]
    interval: Option<String>,
}

impl From<Cli> for CliOverrides {
    fn from(cli: Cli) -> Self {
        CliOverrides {
            pair: cli.pair,
            decimals: cli.decimals,
            interval: cli.interval,
        }
    }
}

fn main() -> ExitCode {
    // Logs go to stderr so they never break the in-place status line
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(Termination::Cancelled) => ExitCode::SUCCESS,
        Ok(Termination::FetchFailed(_)) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "BinanceWatch failed to start");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Termination> {
    let config = AppConfig::load(&cli.into()).context("Failed to load configuration")?;
    info!(config = %config, "Starting BinanceWatch");

    // One thread is enough: fetch, ingest, render and sleep run strictly in turn
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async move {
        let client =
            ExchangeClient::new(&config.exchange).context("Failed to create exchange client")?;
        let mut watcher = Watcher::new(client, ConsoleReporter::stdout(), config.watch);
        Ok(watcher.run().await)
    })
}
