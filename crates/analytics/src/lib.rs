//! # Finscope Analytics Engine
//!
//! This crate turns a daily OHLCV series into the return, risk and technical
//! metrics shown on the historical dashboards.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `AnalyticsEngine` takes a `PriceSeries` and produces an
//!   `AnalyticsReport`. It holds no mutable state and may be called concurrently.
//! - **Never fail the whole chart:** Only an empty series is an error. Any metric whose
//!   arithmetic is undefined is replaced by a neutral value and its group is marked
//!   `degraded`.
//!
//! ## Public API
//!
//! - `compute_analytics`: one-shot calculation with default parameters.
//! - `AnalyticsEngine` / `EngineParams`: configurable calculator, including an optional
//!   benchmark series for beta.
//! - `AnalyticsReport` and its groups, plus `ReportEnvelope` for the JSON boundary.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{AnalyticsEngine, EngineParams, compute_analytics};
pub use error::AnalyticsError;
pub use report::{
    AnalysisPeriod, AnalyticsReport, PriceMetrics, ReportEnvelope, ReturnsAnalysis, RiskMetrics,
    TechnicalIndicators, YearlyReturn,
};
