use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported lookback window for a historical request.
///
/// The analytics engine only treats this as a hint; filtering happens upstream
/// in the quote provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "30y")]
    ThirtyYears,
    #[serde(rename = "20y")]
    TwentyYears,
    #[serde(rename = "10y")]
    TenYears,
    #[default]
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "3y")]
    ThreeYears,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "1mo")]
    OneMonth,
}

impl Period {
    pub const ALL: [Period; 9] = [
        Period::ThirtyYears,
        Period::TwentyYears,
        Period::TenYears,
        Period::FiveYears,
        Period::ThreeYears,
        Period::OneYear,
        Period::SixMonths,
        Period::ThreeMonths,
        Period::OneMonth,
    ];

    /// The canonical token, e.g. `"5y"` or `"6mo"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::ThirtyYears => "30y",
            Period::TwentyYears => "20y",
            Period::TenYears => "10y",
            Period::FiveYears => "5y",
            Period::ThreeYears => "3y",
            Period::OneYear => "1y",
            Period::SixMonths => "6mo",
            Period::ThreeMonths => "3mo",
            Period::OneMonth => "1mo",
        }
    }

    /// Approximate number of daily bars this window covers (252 per trading year).
    pub fn approx_trading_days(&self) -> usize {
        match self {
            Period::ThirtyYears => 30 * 252,
            Period::TwentyYears => 20 * 252,
            Period::TenYears => 10 * 252,
            Period::FiveYears => 5 * 252,
            Period::ThreeYears => 3 * 252,
            Period::OneYear => 252,
            Period::SixMonths => 126,
            Period::ThreeMonths => 63,
            Period::OneMonth => 21,
        }
    }

    /// The range token understood by the quote provider's chart endpoint.
    pub fn provider_range(&self) -> &'static str {
        // The provider has no 20y/30y ranges; "max" is trimmed downstream.
        match self {
            Period::ThirtyYears | Period::TwentyYears => "max",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == token)
            .ok_or_else(|| CoreError::UnknownPeriod(s.to_string()))
    }
}

/// The listing venue used to qualify a bare ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    #[default]
    Nse,
    Bse,
    Us,
}

impl Exchange {
    /// The ticker suffix the quote provider expects for this venue.
    pub fn ticker_suffix(&self) -> &'static str {
        match self {
            Exchange::Nse => ".NS",
            Exchange::Bse => ".BO",
            Exchange::Us => "",
        }
    }

    /// Venues to try, in order, when a symbol does not resolve on this one.
    pub fn fallbacks(&self) -> &'static [Exchange] {
        match self {
            Exchange::Nse => &[Exchange::Bse],
            Exchange::Bse => &[Exchange::Nse],
            Exchange::Us => &[],
        }
    }

    /// Builds the provider ticker for `symbol` on this venue.
    ///
    /// Indices (`^NSEI`), futures and currency pairs (`GC=F`, `USDINR=X`),
    /// crypto pairs (`BTC-USD`) and already-qualified tickers are passed through.
    pub fn qualify(&self, symbol: &str) -> String {
        let symbol = symbol.trim().to_ascii_uppercase();
        if is_verbatim_ticker(&symbol) {
            symbol
        } else {
            format!("{}{}", symbol, self.ticker_suffix())
        }
    }
}

/// True when the ticker must not be combined with an exchange suffix.
pub fn is_verbatim_ticker(symbol: &str) -> bool {
    const CRYPTO_QUOTES: [&str; 5] = ["-USD", "-USDT", "-INR", "-EUR", "-GBP"];

    symbol.starts_with('^')
        || symbol.contains('=')
        || CRYPTO_QUOTES.iter().any(|quote| symbol.ends_with(quote))
        || symbol.ends_with(".NS")
        || symbol.ends_with(".BO")
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Exchange::Nse => "NSE",
            Exchange::Bse => "BSE",
            Exchange::Us => "US",
        };
        f.write_str(name)
    }
}

impl FromStr for Exchange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NSE" | "NS" => Ok(Exchange::Nse),
            "BSE" | "BO" => Ok(Exchange::Bse),
            "US" | "NASDAQ" | "NYSE" => Ok(Exchange::Us),
            _ => Err(CoreError::UnknownExchange(s.to_string())),
        }
    }
}
