use core_types::{Exchange, Period};
use serde::Deserialize;
use std::collections::BTreeMap;

/// The root configuration structure for the entire application.
///
/// Every section falls back to its defaults, so an absent `config.toml` still
/// yields a usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub market_data: MarketDataSettings,
    pub analytics: AnalyticsSettings,
    pub batch: BatchSettings,
    pub logging: LoggingSettings,
    /// Sector name to member tickers, used by the sector performance scan.
    pub sectors: BTreeMap<String, Vec<String>>,
}

/// Contains parameters for the quote provider client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketDataSettings {
    /// Base URL of the chart endpoint host.
    pub base_url: String,
    /// Some providers reject requests without a browser-like user agent.
    pub user_agent: String,
    /// Timeout applied to every HTTP request.
    pub request_timeout_secs: u64,
    /// Exchange used when the CLI is given a bare ticker and no exchange.
    pub default_exchange: Exchange,
    /// Lookback used when the CLI is given no period.
    pub default_period: Period,
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) finscope/0.1".to_string(),
            request_timeout_secs: 15,
            default_exchange: Exchange::Nse,
            default_period: Period::FiveYears,
        }
    }
}

/// Contains parameters for the analytics engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Annual risk-free rate used for the Sharpe ratio (0.05 = 5%).
    pub risk_free_rate: f64,
    /// Lookback of the Relative Strength Index.
    pub rsi_period: usize,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
            rsi_period: 14,
        }
    }
}

/// Contains parameters for multi-symbol scans.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Maximum number of symbols fetched and analysed at the same time.
    pub max_concurrency: usize,
    /// A symbol that takes longer than this is reported as failed.
    pub per_symbol_timeout_secs: u64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            per_symbol_timeout_secs: 20,
        }
    }
}

/// Controls the tracing subscriber installed by the binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

/// Built-in NSE sector baskets used when `[sectors]` is absent from the config.
pub fn default_sectors() -> BTreeMap<String, Vec<String>> {
    let baskets: [(&str, &[&str]); 5] = [
        ("Auto", &["MARUTI", "TATAMOTORS", "EICHERMOT", "HEROMOTOCO"]),
        ("Banking", &["HDFCBANK", "ICICIBANK", "SBIN", "KOTAKBANK", "AXISBANK"]),
        ("FMCG", &["HINDUNILVR", "ITC", "NESTLEIND", "BRITANNIA"]),
        ("IT", &["TCS", "INFY", "WIPRO", "HCLTECH", "TECHM"]),
        ("Pharma", &["SUNPHARMA", "DRREDDY", "CIPLA", "DIVISLAB"]),
    ];

    baskets
        .into_iter()
        .map(|(sector, symbols)| {
            (
                sector.to_string(),
                symbols.iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect()
}
