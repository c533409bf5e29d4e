use crate::error::ScannerError;
use analytics::{AnalyticsEngine, AnalyticsReport, ReportEnvelope};
use configuration::BatchSettings;
use core_types::{Exchange, Period};
use futures::StreamExt;
use futures::stream;
use indicatif::{ProgressBar, ProgressStyle};
use market_data::{QuoteProvider, resolve_history};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

/// The result slot of one symbol in a batch. Failures are data, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SymbolOutcome {
    Analysed {
        /// The provider ticker the symbol resolved to, e.g. `TCS.NS`.
        ticker: String,
        report: Box<AnalyticsReport>,
    },
    Failed {
        error: String,
    },
}

impl SymbolOutcome {
    pub fn report(&self) -> Option<&AnalyticsReport> {
        match self {
            SymbolOutcome::Analysed { report, .. } => Some(report),
            SymbolOutcome::Failed { .. } => None,
        }
    }

    pub fn into_envelope(self, symbol: &str, period: Period) -> ReportEnvelope {
        match self {
            SymbolOutcome::Analysed { ticker, report } => {
                ReportEnvelope::success(ticker, period.as_str(), *report)
            }
            SymbolOutcome::Failed { error } => ReportEnvelope::failure(symbol, error),
        }
    }
}

/// Fetches and analyses many symbols concurrently.
///
/// At most `max_concurrency` symbols are in flight. Each symbol runs in its
/// own task under `per_symbol_timeout_secs`, so a slow or failing symbol only
/// affects its own slot.
pub struct BatchRunner {
    provider: Arc<dyn QuoteProvider>,
    engine: AnalyticsEngine,
    settings: BatchSettings,
    show_progress: bool,
}

impl BatchRunner {
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        engine: AnalyticsEngine,
        settings: BatchSettings,
    ) -> Self {
        Self {
            provider,
            engine,
            settings,
            show_progress: true,
        }
    }

    /// Disables the stderr progress bar.
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Runs every distinct symbol and returns a symbol → outcome map once all
    /// have completed.
    pub async fn run(
        &self,
        symbols: &[String],
        exchange: Exchange,
        period: Period,
    ) -> Result<BTreeMap<String, SymbolOutcome>, ScannerError> {
        let unique: BTreeSet<String> = symbols
            .iter()
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        if unique.is_empty() {
            return Err(ScannerError::NoSymbols);
        }

        let progress_bar = self.progress_bar(unique.len())?;
        let timeout = Duration::from_secs(self.settings.per_symbol_timeout_secs);
        tracing::info!(
            symbols = unique.len(),
            concurrency = self.settings.max_concurrency,
            %exchange,
            %period,
            "Starting batch scan"
        );

        let outcomes: BTreeMap<String, SymbolOutcome> = stream::iter(unique)
            .map(|symbol| {
                let provider = Arc::clone(&self.provider);
                let engine = self.engine.clone();
                let task_symbol = symbol.clone();
                let handle = tokio::spawn(async move {
                    analyse_symbol(
                        provider.as_ref(),
                        &engine,
                        &task_symbol,
                        exchange,
                        period,
                        timeout,
                    )
                    .await
                });
                let pb = progress_bar.clone();
                async move {
                    let outcome = handle.await.unwrap_or_else(|e| SymbolOutcome::Failed {
                        error: format!("analysis task failed: {e}"),
                    });
                    if let SymbolOutcome::Failed { error } = &outcome {
                        tracing::warn!(%symbol, %error, "Symbol failed");
                    }
                    pb.inc(1);
                    pb.set_message(symbol.clone());
                    (symbol, outcome)
                }
            })
            .buffer_unordered(self.settings.max_concurrency.max(1))
            .collect()
            .await;

        progress_bar.finish_with_message("Scan complete");
        Ok(outcomes)
    }

    fn progress_bar(&self, len: usize) -> Result<ProgressBar, ScannerError> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let progress_bar = ProgressBar::new(len as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        Ok(progress_bar)
    }
}

/// Fetches one symbol (with exchange fallback) under a deadline and analyses it.
async fn analyse_symbol(
    provider: &dyn QuoteProvider,
    engine: &AnalyticsEngine,
    symbol: &str,
    exchange: Exchange,
    period: Period,
    timeout: Duration,
) -> SymbolOutcome {
    let series = match tokio::time::timeout(
        timeout,
        resolve_history(provider, symbol, exchange, period),
    )
    .await
    {
        Ok(Ok(series)) => series,
        Ok(Err(error)) => {
            return SymbolOutcome::Failed {
                error: error.to_string(),
            };
        }
        Err(_) => {
            return SymbolOutcome::Failed {
                error: format!("timed out after {}s", timeout.as_secs()),
            };
        }
    };

    match engine.calculate(&series, None) {
        Ok(report) => SymbolOutcome::Analysed {
            ticker: series.symbol.clone(),
            report: Box::new(report),
        },
        Err(error) => SymbolOutcome::Failed {
            error: error.to_string(),
        },
    }
}
