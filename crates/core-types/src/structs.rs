use crate::enums::Period;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// One trading day for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

impl PriceBar {
    /// Closing price as `f64` for the statistics layer.
    pub fn close_f64(&self) -> f64 {
        self.close.to_f64().unwrap_or(f64::NAN)
    }
}

/// An ordered daily series for a single instrument over a lookback window.
///
/// Bars are kept sorted by strictly increasing date. The series is immutable
/// once built and owned by the request that created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub period: Period,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Builds a series, sorting bars by date. When two bars share a date the
    /// later one in the input wins.
    pub fn new(symbol: impl Into<String>, period: Period, mut bars: Vec<PriceBar>) -> Self {
        // Stable sort keeps input order among equal dates, so the last duplicate
        // is the one retained below.
        bars.sort_by_key(|bar| bar.date);
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(prev) if prev.date == bar.date => *prev = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            symbol: symbol.into(),
            period,
            bars: deduped,
        }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// All closing prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(PriceBar::close_f64).collect()
    }

    /// Keeps only the most recent `n` bars.
    pub fn trailing(mut self, n: usize) -> Self {
        if self.bars.len() > n {
            self.bars.drain(..self.bars.len() - n);
        }
        self
    }
}
