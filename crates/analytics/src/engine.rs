use crate::error::AnalyticsError;
use crate::report::{
    AnalysisPeriod, AnalyticsReport, PriceMetrics, ReturnsAnalysis, RiskMetrics,
    TechnicalIndicators, YearlyReturn,
};
use crate::stats::{self, round_dp};
use chrono::{Datelike, NaiveDate};
use core_types::{PriceBar, PriceSeries};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// Approximate length of a trading year in bars.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

/// Approximate length of a trading month in bars.
pub const TRADING_DAYS_PER_MONTH: usize = 21;

/// Tunable inputs of the engine. The defaults are the conventional ones.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineParams {
    /// Annual risk-free rate for the Sharpe ratio (0.05 = 5%).
    pub risk_free_rate: f64,
    pub rsi_period: usize,
    /// Windows of the short, medium and long simple moving averages.
    pub ma_periods: [usize; 3],
    /// Bars that make up the trailing "52 week" window.
    pub high_low_window: usize,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
            rsi_period: 14,
            ma_periods: [20, 50, 200],
            high_low_window: TRADING_DAYS_PER_YEAR,
        }
    }
}

/// Computes the analytics bundle for a series with the default parameters.
///
/// Fails only for an empty series. Every other fault is absorbed into a
/// neutral value and flagged through the `degraded` markers.
pub fn compute_analytics(series: &PriceSeries) -> Result<AnalyticsReport, AnalyticsError> {
    AnalyticsEngine::default().calculate(series, None)
}

/// A stateless calculator for deriving return, risk and technical metrics from
/// a daily price series. Safe to share across threads.
#[derive(Debug, Default, Clone)]
pub struct AnalyticsEngine {
    params: EngineParams,
}

/// Collects substitutions made while filling one metric group.
#[derive(Debug, Default)]
struct Recovery {
    degraded: bool,
}

impl Recovery {
    fn take(&mut self, result: Result<f64, AnalyticsError>, neutral: f64) -> f64 {
        match result {
            Ok(value) => value,
            Err(error) => {
                tracing::debug!(%error, neutral, "Substituting neutral value");
                self.degraded = true;
                neutral
            }
        }
    }
}

/// Turns an undefined or non-finite value into a `DegenerateCalculation`.
fn defined(metric: &'static str, value: Option<f64>) -> Result<f64, AnalyticsError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(AnalyticsError::degenerate(metric, format!("non-finite result {v}"))),
        None => Err(AnalyticsError::degenerate(metric, "undefined for this input")),
    }
}

fn as_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Rounds an `f64` price to cents, `None` when it is not representable.
fn to_money(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| d.round_dp(2))
}

fn pct_change(start: f64, end: f64) -> Option<f64> {
    Some((end - start) / start * 100.0)
}

impl AnalyticsEngine {
    pub fn new(params: EngineParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// The main entry point for calculating analytics.
    ///
    /// # Arguments
    ///
    /// * `series` - The instrument's daily bars, oldest first.
    /// * `benchmark` - An optional market series; when present, `beta` is
    ///   computed against it instead of reported as 1.0.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AnalyticsReport`, or
    /// `AnalyticsError::InsufficientData` when the series is empty.
    pub fn calculate(
        &self,
        series: &PriceSeries,
        benchmark: Option<&PriceSeries>,
    ) -> Result<AnalyticsReport, AnalyticsError> {
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            return Err(AnalyticsError::InsufficientData(format!(
                "no price bars available for {}",
                series.symbol
            )));
        };

        tracing::debug!(symbol = %series.symbol, bars = series.len(), "Calculating analytics");

        let closes = series.closes();
        let returns = stats::daily_returns(&closes);

        let price_metrics = self.calculate_price_metrics(series.bars());
        let returns_analysis = self.calculate_returns(&closes, &returns);
        let risk_metrics = self.calculate_risk(series, &closes, &returns, benchmark);
        let technical_indicators =
            self.calculate_technicals(&closes, price_metrics.current_price);
        let yearly_performance = self.calculate_yearly(series.bars());

        Ok(AnalyticsReport {
            price_metrics,
            returns_analysis,
            risk_metrics,
            technical_indicators,
            yearly_performance,
            analysis_period: AnalysisPeriod {
                years: round_dp(series.len() as f64 / TRADING_DAYS_PER_YEAR as f64, 2),
                total_trading_days: series.len(),
                data_start: first.date,
                data_end: last.date,
            },
        })
    }

    /// Current/start price, total return and the trailing 52-week range.
    fn calculate_price_metrics(&self, bars: &[PriceBar]) -> PriceMetrics {
        let mut recovery = Recovery::default();
        let first = &bars[0];
        let last = &bars[bars.len() - 1];

        let total_return = recovery.take(
            defined(
                "total_return_pct",
                pct_change(first.close_f64(), last.close_f64()),
            ),
            0.0,
        );

        let window = &bars[bars.len().saturating_sub(self.params.high_low_window)..];
        let high = window.iter().map(|b| b.high).max().unwrap_or(last.high);
        let low = window.iter().map(|b| b.low).min().unwrap_or(last.low);

        let range = recovery.take(
            defined(
                "price_range_pct",
                Some((as_f64(high) - as_f64(low)) / as_f64(low) * 100.0),
            ),
            0.0,
        );

        PriceMetrics {
            current_price: last.close.round_dp(2),
            start_price: first.close.round_dp(2),
            total_return_pct: round_dp(total_return, 2),
            high_52w: high.round_dp(2),
            low_52w: low.round_dp(2),
            price_range_pct: round_dp(range, 2),
            degraded: recovery.degraded,
        }
    }

    /// CAGR (and its XRR alias), simple-scaled average returns and the
    /// return-per-unit-of-volatility ratio.
    fn calculate_returns(&self, closes: &[f64], returns: &[f64]) -> ReturnsAnalysis {
        let mut recovery = Recovery::default();
        let years = closes.len() as f64 / TRADING_DAYS_PER_YEAR as f64;
        let start = closes[0];
        let end = closes[closes.len() - 1];

        let cagr_pct = recovery.take(
            defined("cagr_pct", stats::cagr(start, end, years).map(|g| g * 100.0)),
            0.0,
        );

        let avg_daily_pct = recovery.take(
            defined(
                "avg_daily_return_pct",
                stats::mean(returns).map(|m| m * 100.0),
            ),
            0.0,
        );

        let risk_adjusted = recovery.take(
            self.annual_volatility_pct(returns).and_then(|vol| {
                if vol == 0.0 {
                    Err(AnalyticsError::degenerate(
                        "risk_adjusted_return",
                        "zero volatility",
                    ))
                } else {
                    defined("risk_adjusted_return", Some(cagr_pct / vol))
                }
            }),
            0.0,
        );

        ReturnsAnalysis {
            cagr_pct: round_dp(cagr_pct, 2),
            xrr_pct: round_dp(cagr_pct, 2),
            avg_daily_return_pct: round_dp(avg_daily_pct, 4),
            avg_monthly_return_pct: round_dp(avg_daily_pct * TRADING_DAYS_PER_MONTH as f64, 2),
            avg_annual_return_pct: round_dp(avg_daily_pct * TRADING_DAYS_PER_YEAR as f64, 2),
            risk_adjusted_return: round_dp(risk_adjusted, 2),
            degraded: recovery.degraded,
        }
    }

    /// Dispersion below `ZERO_STD` is floating-point residue and reads as 0.
    fn daily_volatility_pct(&self, returns: &[f64]) -> Result<f64, AnalyticsError> {
        let std = stats::sample_std(returns).map(|s| if s < stats::ZERO_STD { 0.0 } else { s });
        defined("volatility_daily_pct", std.map(|s| s * 100.0))
    }

    fn annual_volatility_pct(&self, returns: &[f64]) -> Result<f64, AnalyticsError> {
        self.daily_volatility_pct(returns)
            .map(|daily| daily * (TRADING_DAYS_PER_YEAR as f64).sqrt())
    }

    /// Volatility, running-peak drawdown, Sharpe ratio and beta.
    fn calculate_risk(
        &self,
        series: &PriceSeries,
        closes: &[f64],
        returns: &[f64],
        benchmark: Option<&PriceSeries>,
    ) -> RiskMetrics {
        let mut recovery = Recovery::default();

        let vol_daily = recovery.take(self.daily_volatility_pct(returns), 0.0);
        let vol_annual = recovery.take(self.annual_volatility_pct(returns), 0.0);

        let max_drawdown = recovery.take(
            defined(
                "max_drawdown_pct",
                stats::max_drawdown(closes).map(|dd| dd * 100.0),
            ),
            0.0,
        );

        let periods = TRADING_DAYS_PER_YEAR as f64;
        let sharpe = recovery.take(
            defined(
                "sharpe_ratio",
                stats::sharpe_ratio(returns, self.params.risk_free_rate / periods, periods),
            ),
            0.0,
        );

        let beta = match benchmark {
            Some(benchmark) => recovery.take(self.benchmark_beta(series, benchmark), 1.0),
            None => 1.0,
        };

        RiskMetrics {
            volatility_daily_pct: round_dp(vol_daily, 4),
            volatility_annual_pct: round_dp(vol_annual, 2),
            max_drawdown_pct: round_dp(max_drawdown, 2),
            sharpe_ratio: round_dp(sharpe, 2),
            beta: round_dp(beta, 2),
            degraded: recovery.degraded,
        }
    }

    /// `cov(asset, benchmark) / var(benchmark)` over daily returns on the
    /// dates both series share.
    fn benchmark_beta(
        &self,
        series: &PriceSeries,
        benchmark: &PriceSeries,
    ) -> Result<f64, AnalyticsError> {
        let benchmark_closes: HashMap<NaiveDate, f64> = benchmark
            .bars()
            .iter()
            .map(|b| (b.date, b.close_f64()))
            .collect();

        let (asset, market): (Vec<f64>, Vec<f64>) = series
            .bars()
            .iter()
            .filter_map(|b| benchmark_closes.get(&b.date).map(|m| (b.close_f64(), *m)))
            .unzip();

        let asset_returns = stats::daily_returns(&asset);
        let market_returns = stats::daily_returns(&market);

        let variance = defined(
            "beta",
            stats::sample_std(&market_returns).map(|s| s * s),
        )?;
        if variance == 0.0 {
            return Err(AnalyticsError::degenerate("beta", "benchmark has zero variance"));
        }
        let covariance = defined(
            "beta",
            stats::sample_covariance(&asset_returns, &market_returns),
        )?;
        defined("beta", Some(covariance / variance))
    }

    /// Moving averages fall back to the current price for short series; RSI
    /// falls back to 50.
    fn calculate_technicals(&self, closes: &[f64], current_price: Decimal) -> TechnicalIndicators {
        let mut recovery = Recovery::default();

        let [ma_short, ma_medium, ma_long] = self.params.ma_periods.map(|period| {
            match stats::trailing_sma(closes, period).and_then(to_money) {
                Some(ma) => ma,
                None => {
                    tracing::debug!(
                        period,
                        bars = closes.len(),
                        "Moving average falls back to current price"
                    );
                    recovery.degraded = true;
                    current_price
                }
            }
        });

        let rsi = recovery.take(
            defined("rsi", stats::rsi(closes, self.params.rsi_period)),
            50.0,
        );

        TechnicalIndicators {
            ma_20: ma_short,
            ma_50: ma_medium,
            ma_200: ma_long,
            rsi: round_dp(rsi, 2),
            degraded: recovery.degraded,
        }
    }

    /// One entry per calendar year present in the series, ascending.
    fn calculate_yearly(&self, bars: &[PriceBar]) -> Vec<YearlyReturn> {
        let mut by_year: BTreeMap<i32, Vec<&PriceBar>> = BTreeMap::new();
        for bar in bars {
            by_year.entry(bar.date.year()).or_default().push(bar);
        }

        by_year
            .into_iter()
            .map(|(year, year_bars)| {
                let mut recovery = Recovery::default();
                let first = year_bars[0];
                let last = year_bars[year_bars.len() - 1];

                let return_pct = recovery.take(
                    defined(
                        "yearly_return_pct",
                        pct_change(first.close_f64(), last.close_f64()),
                    ),
                    0.0,
                );

                YearlyReturn {
                    year,
                    return_pct: round_dp(return_pct, 2),
                    start_price: first.close.round_dp(2),
                    end_price: last.close.round_dp(2),
                    high: year_bars.iter().map(|b| b.high).max().unwrap_or(first.high).round_dp(2),
                    low: year_bars.iter().map(|b| b.low).min().unwrap_or(first.low).round_dp(2),
                    trading_days: year_bars.len(),
                    degraded: recovery.degraded,
                }
            })
            .collect()
    }
}
