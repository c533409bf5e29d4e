use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// The input series had no bars; nothing can be derived from it.
    #[error("Not enough data to perform calculation: {0}")]
    InsufficientData(String),

    /// A single metric could not be computed (zero denominator, NaN/inf).
    /// The engine recovers from this with a neutral value.
    #[error("Degenerate calculation for metric '{metric}': {reason}")]
    DegenerateCalculation { metric: &'static str, reason: String },
}

impl AnalyticsError {
    pub(crate) fn degenerate(metric: &'static str, reason: impl Into<String>) -> Self {
        AnalyticsError::DegenerateCalculation {
            metric,
            reason: reason.into(),
        }
    }
}
