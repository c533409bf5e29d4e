use crate::batch::SymbolOutcome;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Mean performance of a basket of symbols.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorPerformance {
    pub sector: String,
    /// `None` when no member could be analysed.
    pub avg_return_pct: Option<f64>,
    pub avg_cagr_pct: Option<f64>,
    pub analysed: usize,
    pub best: Option<String>,
    pub worst: Option<String>,
    pub failed: Vec<String>,
}

/// One row of a gainers or losers list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mover {
    pub symbol: String,
    pub ticker: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_price: Decimal,
    pub total_return_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketMovers {
    pub gainers: Vec<Mover>,
    pub losers: Vec<Mover>,
    /// Symbol → error message for every symbol that could not be ranked.
    pub failed: BTreeMap<String, String>,
}

fn normalise(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    Some((avg * 100.0).round() / 100.0)
}

/// Groups batch outcomes into per-sector averages, best sector first.
/// Sectors without a single analysed member sort last.
pub fn summarize_sectors(
    sectors: &BTreeMap<String, Vec<String>>,
    outcomes: &BTreeMap<String, SymbolOutcome>,
) -> Vec<SectorPerformance> {
    let mut summaries: Vec<SectorPerformance> = sectors
        .iter()
        .map(|(sector, members)| {
            let mut returns = Vec::new();
            let mut cagrs = Vec::new();
            let mut ranked: Vec<(String, f64)> = Vec::new();
            let mut failed = Vec::new();

            for member in members {
                let key = normalise(member);
                match outcomes.get(&key).and_then(SymbolOutcome::report) {
                    Some(report) => {
                        returns.push(report.price_metrics.total_return_pct);
                        cagrs.push(report.returns_analysis.cagr_pct);
                        ranked.push((key, report.price_metrics.total_return_pct));
                    }
                    None => failed.push(key),
                }
            }

            ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

            SectorPerformance {
                sector: sector.clone(),
                avg_return_pct: mean(&returns),
                avg_cagr_pct: mean(&cagrs),
                analysed: returns.len(),
                best: ranked.first().map(|(s, _)| s.clone()),
                worst: ranked.last().map(|(s, _)| s.clone()),
                failed,
            }
        })
        .collect();

    summaries.sort_by(|a, b| match (a.avg_return_pct, b.avg_return_pct) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.sector.cmp(&b.sector),
    });
    summaries
}

/// Ranks analysed symbols by total return over the window.
///
/// Gainers are the `top_n` best performers with a positive return, losers the
/// `top_n` worst with a negative return.
pub fn rank_movers(outcomes: &BTreeMap<String, SymbolOutcome>, top_n: usize) -> MarketMovers {
    let mut movers = Vec::new();
    let mut failed = BTreeMap::new();

    for (symbol, outcome) in outcomes {
        match outcome {
            SymbolOutcome::Analysed { ticker, report } => movers.push(Mover {
                symbol: symbol.clone(),
                ticker: ticker.clone(),
                current_price: report.price_metrics.current_price,
                total_return_pct: report.price_metrics.total_return_pct,
            }),
            SymbolOutcome::Failed { error } => {
                failed.insert(symbol.clone(), error.clone());
            }
        }
    }

    movers.sort_by(|a, b| {
        b.total_return_pct
            .partial_cmp(&a.total_return_pct)
            .unwrap_or(Ordering::Equal)
    });

    let gainers = movers
        .iter()
        .filter(|m| m.total_return_pct > 0.0)
        .take(top_n)
        .cloned()
        .collect();
    let losers = movers
        .iter()
        .rev()
        .filter(|m| m.total_return_pct < 0.0)
        .take(top_n)
        .cloned()
        .collect();

    MarketMovers {
        gainers,
        losers,
        failed,
    }
}
