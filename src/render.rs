use analytics::{AnalyticsReport, ReportEnvelope};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

/// Renders an envelope as terminal tables: headline metrics, then one row per
/// calendar year. `rsi_period` only labels the RSI row.
pub fn envelope_tables(envelope: &ReportEnvelope, rsi_period: usize) -> String {
    let Some(report) = &envelope.report else {
        return format!(
            "{}: {}",
            envelope.symbol,
            envelope.error.as_deref().unwrap_or("no data")
        );
    };

    let period = envelope.period.as_deref().unwrap_or("-");
    let mut out = format!(
        "{} ({}, {} to {})\n{}\n{}",
        envelope.symbol,
        period,
        report.analysis_period.data_start,
        report.analysis_period.data_end,
        headline_table(report, rsi_period),
        yearly_table(report)
    );
    if report.is_degraded() {
        out.push_str("\n* includes values substituted for undefined calculations");
    }
    out
}

fn flag(degraded: bool) -> &'static str {
    if degraded { " *" } else { "" }
}

fn headline_table(report: &AnalyticsReport, rsi_period: usize) -> Table {
    let p = &report.price_metrics;
    let r = &report.returns_analysis;
    let k = &report.risk_metrics;
    let t = &report.technical_indicators;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Metric", "Value"]);

    let rows: Vec<(String, String)> = vec![
        ("Current price".into(), p.current_price.to_string()),
        ("Total return %".into(), format!("{}{}", p.total_return_pct, flag(p.degraded))),
        ("52w high / low".into(), format!("{} / {}", p.high_52w, p.low_52w)),
        ("CAGR %".into(), format!("{}{}", r.cagr_pct, flag(r.degraded))),
        ("Avg annual return %".into(), r.avg_annual_return_pct.to_string()),
        (
            "Volatility (annual) %".into(),
            format!("{}{}", k.volatility_annual_pct, flag(k.degraded)),
        ),
        ("Max drawdown %".into(), k.max_drawdown_pct.to_string()),
        ("Sharpe ratio".into(), k.sharpe_ratio.to_string()),
        ("Beta".into(), k.beta.to_string()),
        (
            "MA 20 / 50 / 200".into(),
            format!("{} / {} / {}{}", t.ma_20, t.ma_50, t.ma_200, flag(t.degraded)),
        ),
        (format!("RSI ({rsi_period})"), t.rsi.to_string()),
        ("Trading days".into(), report.analysis_period.total_trading_days.to_string()),
    ];
    for (label, value) in rows {
        table.add_row(vec![label, value]);
    }
    table
}

fn yearly_table(report: &AnalyticsReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Year", "Return %", "Start", "End", "High", "Low", "Days"]);

    for year in &report.yearly_performance {
        table.add_row(vec![
            year.year.to_string(),
            format!("{}{}", year.return_pct, flag(year.degraded)),
            year.start_price.to_string(),
            year.end_price.to_string(),
            year.high.to_string(),
            year.low.to_string(),
            year.trading_days.to_string(),
        ]);
    }
    table
}
