//! Multi-symbol scans over the analytics engine: plain batches, sector
//! performance and market movers.
//!
//! Every symbol is independent. The caller gets a symbol → outcome map after
//! all symbols finish, with failures recorded in their own slots.

pub mod aggregate;
pub mod batch;
pub mod error;

pub use aggregate::{MarketMovers, Mover, SectorPerformance, rank_movers, summarize_sectors};
pub use batch::{BatchRunner, SymbolOutcome};
pub use error::ScannerError;

use core_types::{Exchange, Period};
use std::collections::BTreeMap;

impl BatchRunner {
    /// Scans every member of every sector once and averages per sector.
    pub async fn sector_performance(
        &self,
        sectors: &BTreeMap<String, Vec<String>>,
        exchange: Exchange,
        period: Period,
    ) -> Result<Vec<SectorPerformance>, ScannerError> {
        let symbols: Vec<String> = sectors.values().flatten().cloned().collect();
        let outcomes = self.run(&symbols, exchange, period).await?;
        Ok(summarize_sectors(sectors, &outcomes))
    }

    /// Scans the universe and returns the top gainers and losers.
    pub async fn market_movers(
        &self,
        symbols: &[String],
        exchange: Exchange,
        period: Period,
        top_n: usize,
    ) -> Result<MarketMovers, ScannerError> {
        let outcomes = self.run(symbols, exchange, period).await?;
        Ok(rank_movers(&outcomes, top_n))
    }
}
