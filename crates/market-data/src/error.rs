use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("HTTP request to the quote provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("The quote provider returned an error: {0}")]
    Provider(String),

    #[error("Failed to deserialize the provider response: {0}")]
    Deserialization(String),

    #[error("No price data found for symbol '{0}'")]
    SymbolNotFound(String),

    #[error("Invalid data format from provider: {0}")]
    InvalidData(String),
}
