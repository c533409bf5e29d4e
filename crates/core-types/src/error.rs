use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown lookback period '{0}' (expected one of 30y, 20y, 10y, 5y, 3y, 1y, 6mo, 3mo, 1mo)")]
    UnknownPeriod(String),

    #[error("Unknown exchange '{0}' (expected NSE, BSE or US)")]
    UnknownExchange(String),
}
