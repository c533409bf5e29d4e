use analytics::{AnalyticsEngine, EngineParams, ReportEnvelope};
use clap::{Parser, Subcommand};
use configuration::Config;
use core_types::{Exchange, Period, PriceSeries};
use market_data::error::MarketDataError;
use market_data::{QuoteProvider, YahooClient, resolve_history};
use scanner::BatchRunner;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod render;

/// The main entry point for the finscope command-line tool.
///
/// Handled failures (unknown symbol, empty series, timeouts) are printed as
/// JSON with `"success": false` and still exit 0. Only usage and startup
/// errors produce a non-zero exit code.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments; clap exits non-zero on usage errors.
    let cli = Cli::parse();

    // Load FINSCOPE__* overrides from a .env file, if present.
    dotenvy::dotenv().ok();

    let config = match &cli.config {
        Some(path) => configuration::load_config_from(path)?,
        None => configuration::load_config()?,
    };
    let _log_guard = configuration::init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Historical(args) => handle_historical(args, &config).await,
        Commands::Sectors(args) => handle_sectors(args, &config).await,
        Commands::Movers(args) => handle_movers(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Historical return, risk and technical analytics for stocks, indices,
/// commodities, currencies and crypto.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (defaults to ./config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse one symbol's historical prices and print the JSON result.
    Historical(HistoricalArgs),
    /// Average performance of the configured sector baskets.
    Sectors(SectorsArgs),
    /// Top gainers and losers among the given symbols.
    Movers(MoversArgs),
}

#[derive(Parser)]
struct HistoricalArgs {
    /// Ticker, index (^NSEI), future (GC=F), currency pair (USDINR=X) or crypto pair (BTC-USD).
    symbol: String,

    /// NSE, BSE or US.
    exchange: Option<Exchange>,

    /// Lookback: 30y, 20y, 10y, 5y, 3y, 1y, 6mo, 3mo or 1mo.
    period: Option<Period>,

    /// Compute beta against this benchmark symbol instead of reporting 1.0.
    #[arg(long)]
    benchmark: Option<String>,

    /// Print tables instead of JSON.
    #[arg(long)]
    table: bool,
}

#[derive(Parser)]
struct SectorsArgs {
    exchange: Option<Exchange>,
    period: Option<Period>,
}

#[derive(Parser)]
struct MoversArgs {
    /// The universe to rank.
    #[arg(required = true)]
    symbols: Vec<String>,

    #[arg(long)]
    exchange: Option<Exchange>,

    #[arg(long)]
    period: Option<Period>,

    /// How many gainers and losers to list.
    #[arg(long, default_value_t = 5)]
    top: usize,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn engine_from(config: &Config) -> AnalyticsEngine {
    AnalyticsEngine::new(EngineParams {
        risk_free_rate: config.analytics.risk_free_rate,
        rsi_period: config.analytics.rsi_period,
        ..EngineParams::default()
    })
}

fn batch_runner(config: &Config) -> anyhow::Result<BatchRunner> {
    let provider: Arc<dyn QuoteProvider> = Arc::new(YahooClient::new(&config.market_data)?);
    Ok(BatchRunner::new(
        provider,
        engine_from(config),
        config.batch.clone(),
    ))
}

/// Resolves a symbol's history under the configured per-symbol deadline.
async fn fetch_with_deadline(
    provider: &dyn QuoteProvider,
    symbol: &str,
    exchange: Exchange,
    period: Period,
    config: &Config,
) -> Result<PriceSeries, MarketDataError> {
    let deadline = Duration::from_secs(config.batch.per_symbol_timeout_secs);
    tokio::time::timeout(deadline, resolve_history(provider, symbol, exchange, period))
        .await
        .unwrap_or_else(|_| {
            Err(MarketDataError::Provider(format!(
                "timed out after {}s fetching {symbol}",
                deadline.as_secs()
            )))
        })
}

async fn handle_historical(args: HistoricalArgs, config: &Config) -> anyhow::Result<()> {
    let exchange = args.exchange.unwrap_or(config.market_data.default_exchange);
    let period = args.period.unwrap_or(config.market_data.default_period);
    tracing::info!(symbol = %args.symbol, %exchange, %period, "Running historical analysis");

    let client = YahooClient::new(&config.market_data)?;
    let engine = engine_from(config);

    let history = fetch_with_deadline(&client, &args.symbol, exchange, period, config).await;
    let envelope = match history {
        Err(error) => {
            tracing::warn!(symbol = %args.symbol, %error, "Could not obtain price history");
            ReportEnvelope::failure(&args.symbol, error)
        }
        Ok(series) => {
            let benchmark = match &args.benchmark {
                Some(symbol) => {
                    match fetch_with_deadline(&client, symbol, exchange, period, config).await {
                        Ok(series) => Some(series),
                        Err(error) => {
                            tracing::warn!(
                                benchmark = %symbol,
                                %error,
                                "Benchmark unavailable, beta stays 1.0"
                            );
                            None
                        }
                    }
                }
                None => None,
            };

            match engine.calculate(&series, benchmark.as_ref()) {
                Ok(report) => ReportEnvelope::success(&series.symbol, period.as_str(), report),
                Err(error) => ReportEnvelope::failure(&series.symbol, error),
            }
        }
    };

    if args.table {
        println!(
            "{}",
            render::envelope_tables(&envelope, engine.params().rsi_period)
        );
    } else {
        println!("{}", envelope.to_json_pretty()?);
    }
    Ok(())
}

async fn handle_sectors(args: SectorsArgs, config: &Config) -> anyhow::Result<()> {
    let exchange = args.exchange.unwrap_or(config.market_data.default_exchange);
    let period = args.period.unwrap_or(config.market_data.default_period);

    let output = match batch_runner(config)?
        .sector_performance(&config.sectors, exchange, period)
        .await
    {
        Ok(sectors) => json!({
            "success": true,
            "exchange": exchange,
            "period": period,
            "sectors": sectors,
        }),
        Err(error) => json!({ "success": false, "error": error.to_string() }),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn handle_movers(args: MoversArgs, config: &Config) -> anyhow::Result<()> {
    let exchange = args.exchange.unwrap_or(config.market_data.default_exchange);
    let period = args.period.unwrap_or(config.market_data.default_period);

    let output = match batch_runner(config)?
        .market_movers(&args.symbols, exchange, period, args.top)
        .await
    {
        Ok(movers) => json!({
            "success": true,
            "exchange": exchange,
            "period": period,
            "gainers": movers.gainers,
            "losers": movers.losers,
            "failed": movers.failed,
        }),
        Err(error) => json!({ "success": false, "error": error.to_string() }),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
