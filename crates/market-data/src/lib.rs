use crate::error::MarketDataError;
use async_trait::async_trait;
use core_types::enums::is_verbatim_ticker;
use core_types::{Exchange, Period, PriceSeries};

pub mod error;
pub mod responses;
pub mod yahoo;

// --- Public API ---
pub use yahoo::YahooClient;

/// The abstract interface for a historical quote source.
/// Callers depend on this trait so that the live client can be swapped for a
/// fixture-backed one in tests.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetches daily bars for `symbol` on `exchange` covering `period`.
    ///
    /// An unknown symbol may surface either as `SymbolNotFound` or as an empty
    /// series, depending on the provider.
    async fn fetch_history(
        &self,
        symbol: &str,
        exchange: Exchange,
        period: Period,
    ) -> Result<PriceSeries, MarketDataError>;
}

/// Fetches history on `exchange`, falling back to its alternative venues
/// until one returns a non-empty series.
///
/// Tickers that are already venue-independent (indices, futures, currency
/// and crypto pairs, suffixed tickers) are only tried once.
pub async fn resolve_history(
    provider: &dyn QuoteProvider,
    symbol: &str,
    exchange: Exchange,
    period: Period,
) -> Result<PriceSeries, MarketDataError> {
    let candidates: Vec<Exchange> = if is_verbatim_ticker(&symbol.trim().to_ascii_uppercase()) {
        vec![exchange]
    } else {
        std::iter::once(exchange)
            .chain(exchange.fallbacks().iter().copied())
            .collect()
    };

    let mut last_error = None;
    for candidate in candidates {
        match provider.fetch_history(symbol, candidate, period).await {
            Ok(series) if !series.is_empty() => {
                if candidate != exchange {
                    tracing::info!(
                        symbol,
                        from = %exchange,
                        to = %candidate,
                        "Resolved symbol on fallback exchange"
                    );
                }
                return Ok(series);
            }
            Ok(_) => {
                tracing::debug!(symbol, exchange = %candidate, "Provider returned no bars");
            }
            Err(error) => {
                tracing::debug!(symbol, exchange = %candidate, %error, "Provider request failed");
                last_error = Some(error);
            }
        }
    }

    Err(match last_error {
        Some(MarketDataError::SymbolNotFound(_)) | None => {
            MarketDataError::SymbolNotFound(symbol.to_string())
        }
        Some(other) => other,
    })
}
