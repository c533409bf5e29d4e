//! Behavioural checks of the analytics engine against hand-built series.

use analytics::{AnalyticsError, ReportEnvelope, compute_analytics};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use core_types::{PriceBar, PriceSeries, Period};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Weekday dates starting at `start`, one per bar.
fn weekdays(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut day = start;
    while dates.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(day);
        }
        day += Duration::days(1);
    }
    dates
}

fn bar(date: NaiveDate, open: Decimal, close: Decimal) -> PriceBar {
    PriceBar {
        date,
        open,
        high: open.max(close),
        low: open.min(close),
        close,
        volume: 1_000,
    }
}

fn series(closes: &[Decimal]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
    let bars = weekdays(start, closes.len())
        .into_iter()
        .zip(closes)
        .map(|(date, close)| bar(date, *close, *close))
        .collect();
    PriceSeries::new("TEST", Period::FiveYears, bars)
}

#[test]
fn empty_series_reports_insufficient_data() {
    let empty = PriceSeries::new("NONE", Period::OneYear, vec![]);
    assert!(matches!(
        compute_analytics(&empty),
        Err(AnalyticsError::InsufficientData(_))
    ));
}

#[test]
fn any_non_empty_series_produces_a_report() {
    let shapes: Vec<Vec<Decimal>> = vec![
        vec![dec!(1)],
        vec![dec!(0), dec!(0)],
        vec![dec!(3), dec!(0), dec!(3)],
        vec![dec!(0.0001), dec!(100000)],
        (1..400).map(|i| Decimal::from(i % 17 + 1)).collect(),
    ];

    for closes in shapes {
        let report = compute_analytics(&series(&closes)).unwrap();
        assert_eq!(report.analysis_period.total_trading_days, closes.len());
        assert!((0.0..=100.0).contains(&report.technical_indicators.rsi));
        assert!(report.risk_metrics.max_drawdown_pct <= 0.0);
    }
}

#[test]
fn flat_series_is_all_neutral() {
    let report = compute_analytics(&series(&[dec!(250); 300])).unwrap();

    assert_eq!(report.price_metrics.total_return_pct, 0.0);
    assert_eq!(report.returns_analysis.cagr_pct, 0.0);
    assert_eq!(report.risk_metrics.volatility_annual_pct, 0.0);
    assert_eq!(report.risk_metrics.max_drawdown_pct, 0.0);
    assert_eq!(report.risk_metrics.sharpe_ratio, 0.0);
    assert_eq!(report.technical_indicators.rsi, 50.0);
    assert_eq!(report.technical_indicators.ma_200, dec!(250));
}

#[test]
fn rising_series_has_no_drawdown_and_high_rsi() {
    let closes: Vec<Decimal> = (0..60).map(|i| dec!(100) + Decimal::from(i)).collect();
    let report = compute_analytics(&series(&closes)).unwrap();

    assert_eq!(report.risk_metrics.max_drawdown_pct, 0.0);
    assert!(report.risk_metrics.max_drawdown_pct.is_sign_positive());
    assert_eq!(report.technical_indicators.rsi, 100.0);
    assert!(report.price_metrics.total_return_pct > 0.0);
}

#[test]
fn yearly_breakdown_partitions_the_series() {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    let count = weekdays(start, 2000)
        .into_iter()
        .take_while(|d| *d <= end)
        .count();
    let bars: Vec<PriceBar> = weekdays(start, count)
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let close = dec!(100) + Decimal::from(i % 50);
            bar(date, close, close)
        })
        .collect();
    let series = PriceSeries::new("YEARS", Period::FiveYears, bars);

    let report = compute_analytics(&series).unwrap();
    let years: Vec<i32> = report.yearly_performance.iter().map(|y| y.year).collect();

    assert_eq!(years, vec![2020, 2021, 2022, 2023]);
    let total: usize = report
        .yearly_performance
        .iter()
        .map(|y| y.trading_days)
        .sum();
    assert_eq!(total, report.analysis_period.total_trading_days);
    assert_eq!(report.analysis_period.data_start, start);
}

#[test]
fn single_trading_day_year_has_zero_return() {
    let bars = vec![
        bar(NaiveDate::from_ymd_opt(2022, 12, 29).unwrap(), dec!(90), dec!(100)),
        bar(NaiveDate::from_ymd_opt(2022, 12, 30).unwrap(), dec!(100), dec!(120)),
        bar(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(), dec!(120), dec!(130)),
    ];
    let report = compute_analytics(&PriceSeries::new("X", Period::OneMonth, bars)).unwrap();

    let last_year = &report.yearly_performance[1];
    assert_eq!(last_year.year, 2023);
    assert_eq!(last_year.return_pct, 0.0);
    assert_eq!(last_year.trading_days, 1);
    assert_eq!(report.yearly_performance[0].return_pct, 20.0);
    assert_eq!(report.yearly_performance[0].high, dec!(120));
    assert_eq!(report.yearly_performance[0].low, dec!(90));
}

#[test]
fn two_bar_example_uses_simple_scaling() {
    let dates = weekdays(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), 2);
    let bars = vec![
        bar(dates[0], dec!(100), dec!(100)),
        bar(dates[1], dec!(105), dec!(110)),
    ];
    let report = compute_analytics(&PriceSeries::new("TWO", Period::OneMonth, bars)).unwrap();

    assert_eq!(report.price_metrics.total_return_pct, 10.0);
    assert_eq!(report.returns_analysis.avg_daily_return_pct, 10.0);
    assert_eq!(report.returns_analysis.avg_monthly_return_pct, 210.0);
    assert_eq!(report.returns_analysis.avg_annual_return_pct, 2520.0);
    assert_eq!(
        report.returns_analysis.xrr_pct,
        report.returns_analysis.cagr_pct
    );
}

#[test]
fn headline_metrics_match_hand_computed_values() {
    // Daily returns +10%, -5%, +2%, +3%: mean 2.5%, sample std 6.1373%.
    let closes = [
        dec!(100),
        dec!(110),
        dec!(104.5),
        dec!(106.59),
        dec!(109.7877),
    ];
    let report = compute_analytics(&series(&closes)).unwrap();

    assert_eq!(report.price_metrics.total_return_pct, 9.79);
    assert_eq!(report.analysis_period.years, 0.02);

    // (109.7877 / 100) ^ (252 / 5) - 1
    assert_eq!(report.returns_analysis.cagr_pct, 10963.84);
    assert_eq!(report.returns_analysis.avg_daily_return_pct, 2.5);
    assert_eq!(report.returns_analysis.avg_monthly_return_pct, 52.5);
    assert_eq!(report.returns_analysis.avg_annual_return_pct, 630.0);
    // CAGR over annual volatility, both in percent.
    assert_eq!(report.returns_analysis.risk_adjusted_return, 112.53);
    assert!(!report.returns_analysis.degraded);

    assert_eq!(report.risk_metrics.volatility_daily_pct, 6.1373);
    assert_eq!(report.risk_metrics.volatility_annual_pct, 97.43);
    assert_eq!(report.risk_metrics.max_drawdown_pct, -5.0);
    // Excess over 5% / 252 per day, annualised by sqrt(252).
    assert_eq!(report.risk_metrics.sharpe_ratio, 6.42);
    assert_eq!(report.risk_metrics.beta, 1.0);
    assert!(!report.risk_metrics.degraded);
}

#[test]
fn constant_growth_has_zero_volatility_and_neutral_ratios() {
    let mut closes = vec![dec!(100)];
    for _ in 1..60 {
        let next = closes[closes.len() - 1] * dec!(1.01);
        closes.push(next);
    }
    let report = compute_analytics(&series(&closes)).unwrap();

    assert!(report.returns_analysis.cagr_pct > 0.0);
    assert_eq!(report.risk_metrics.volatility_daily_pct, 0.0);
    assert_eq!(report.risk_metrics.volatility_annual_pct, 0.0);
    assert_eq!(report.risk_metrics.sharpe_ratio, 0.0);
    assert_eq!(report.returns_analysis.risk_adjusted_return, 0.0);
    assert!(report.returns_analysis.degraded);
}

#[test]
fn drawdown_follows_the_running_peak() {
    let mut closes: Vec<Decimal> = (0..300)
        .map(|i| dec!(100) + Decimal::from(100 * i) / dec!(299))
        .collect();
    closes[150] = closes[149] * dec!(0.8);

    let report = compute_analytics(&series(&closes)).unwrap();

    assert_eq!(report.risk_metrics.max_drawdown_pct, -20.0);
    assert_eq!(report.price_metrics.total_return_pct, 100.0);
}

#[test]
fn short_series_moving_averages_fall_back_to_current_price() {
    let closes: Vec<Decimal> = (0..30).map(|i| dec!(10) + Decimal::from(i)).collect();
    let report = compute_analytics(&series(&closes)).unwrap();
    let current = report.price_metrics.current_price;

    assert_eq!(report.technical_indicators.ma_20, dec!(29.5));
    assert_eq!(report.technical_indicators.ma_50, current);
    assert_eq!(report.technical_indicators.ma_200, current);
    assert!(report.technical_indicators.degraded);
}

#[test]
fn high_low_window_is_trailing_year() {
    let mut closes = vec![dec!(500)];
    closes.extend((0..300).map(|i| dec!(100) + Decimal::from(i % 10)));
    let report = compute_analytics(&series(&closes)).unwrap();

    assert_eq!(report.price_metrics.high_52w, dec!(109));
    assert_eq!(report.price_metrics.low_52w, dec!(100));
    assert_eq!(report.price_metrics.price_range_pct, 9.0);
    assert_eq!(report.price_metrics.start_price, dec!(500));
}

#[test]
fn envelope_serializes_flat_json_numbers() {
    let report = compute_analytics(&series(&[dec!(100), dec!(110), dec!(99)])).unwrap();
    let json = serde_json::to_value(ReportEnvelope::success("TEST.NS", "1y", report)).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["period"], "1y");
    assert_eq!(json["price_metrics"]["52w_high"], 110.0);
    assert_eq!(json["price_metrics"]["current_price"], 99.0);
    assert!(json["risk_metrics"]["beta"].is_number());
    assert!(json["yearly_performance"].is_array());
    assert!(json.get("error").is_none());

    let failure = serde_json::to_value(ReportEnvelope::failure("NOPE", "no data")).unwrap();
    assert_eq!(failure["success"], false);
    assert_eq!(failure["error"], "no data");
    assert!(failure.get("price_metrics").is_none());
}
