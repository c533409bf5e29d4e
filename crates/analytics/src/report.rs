use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The full analytics bundle for one instrument over one lookback window.
///
/// This struct is the sole output of the `AnalyticsEngine` and the record the
/// presentation layer charts from. It is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub price_metrics: PriceMetrics,
    pub returns_analysis: ReturnsAnalysis,
    pub risk_metrics: RiskMetrics,
    pub technical_indicators: TechnicalIndicators,
    pub yearly_performance: Vec<YearlyReturn>,
    pub analysis_period: AnalysisPeriod,
}

impl AnalyticsReport {
    /// True when any group carries a substituted value.
    pub fn is_degraded(&self) -> bool {
        self.price_metrics.degraded
            || self.returns_analysis.degraded
            || self.risk_metrics.degraded
            || self.technical_indicators.degraded
            || self.yearly_performance.iter().any(|y| y.degraded)
    }
}

// `degraded` on every group marks values that were replaced by a neutral
// default because the underlying arithmetic was undefined.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceMetrics {
    #[serde(with = "rust_decimal::serde::float")]
    pub current_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub start_price: Decimal,
    pub total_return_pct: f64,
    #[serde(rename = "52w_high", with = "rust_decimal::serde::float")]
    pub high_52w: Decimal,
    #[serde(rename = "52w_low", with = "rust_decimal::serde::float")]
    pub low_52w: Decimal,
    pub price_range_pct: f64,
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsAnalysis {
    pub cagr_pct: f64,
    /// Reported identically to CAGR.
    pub xrr_pct: f64,
    pub avg_daily_return_pct: f64,
    pub avg_monthly_return_pct: f64,
    pub avg_annual_return_pct: f64,
    pub risk_adjusted_return: f64,
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub volatility_daily_pct: f64,
    pub volatility_annual_pct: f64,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
    /// 1.0 unless a benchmark series was supplied.
    pub beta: f64,
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    #[serde(with = "rust_decimal::serde::float")]
    pub ma_20: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ma_50: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ma_200: Decimal,
    pub rsi: f64,
    pub degraded: bool,
}

/// Performance of the instrument within one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyReturn {
    pub year: i32,
    pub return_pct: f64,
    #[serde(with = "rust_decimal::serde::float")]
    pub start_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub end_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub high: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub low: Decimal,
    pub trading_days: usize,
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    /// Bar count divided by 252, not calendar years.
    pub years: f64,
    pub total_trading_days: usize,
    pub data_start: NaiveDate,
    pub data_end: NaiveDate,
}

/// The output-boundary record: either a flattened report or an error message.
///
/// Errors are data here; a failed symbol still produces a well-formed object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEnvelope {
    pub success: bool,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(flatten)]
    pub report: Option<AnalyticsReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReportEnvelope {
    pub fn success(
        symbol: impl Into<String>,
        period: impl Into<String>,
        report: AnalyticsReport,
    ) -> Self {
        Self {
            success: true,
            symbol: symbol.into(),
            period: Some(period.into()),
            report: Some(report),
            error: None,
        }
    }

    pub fn failure(symbol: impl Into<String>, error: impl ToString) -> Self {
        Self {
            success: false,
            symbol: symbol.into(),
            period: None,
            report: None,
            error: Some(error.to_string()),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
