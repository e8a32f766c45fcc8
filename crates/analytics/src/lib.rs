//! # Shoplens Metrics Engine
//!
//! This crate computes the business KPIs of the dashboard from the joined sales
//! table: revenue, order volume, average order value, category and state rankings,
//! revenue trends, customer satisfaction and delivery performance.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of files, HTTP or configuration.
//!   It depends only on `core-types`.
//! - **Stateless Calculation:** The `MetricsEngine` takes a slice of `SalesRecord`s and
//!   returns plain report structs. Nothing is cached between calls.
//! - **Exact Money:** Every amount is a `Decimal`. Values that are undefined for the
//!   given rows, such as a change against a zero baseline, are `None`, never `NaN`.
//!
//! ## Public API
//!
//! - `MetricsEngine`: The main struct that contains the calculation logic.
//! - `BusinessReport`: Everything known about one period, optionally against another.
//! - `KpiSummary` / `KpiComparison`: The headline numbers and their period-over-period change.
//! - `percent_change`: The single definition of a percentage change used everywhere.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{MetricsEngine, UNCATEGORIZED, UNKNOWN_STATE, month_abbreviation, percent_change};
pub use report::{
    BusinessReport, CategoryPerformance, DeliveryPerformance, KpiComparison, KpiSummary,
    MonthlyTrend, PeriodComparison, SatisfactionSummary, ScoreCount, SpeedBreakdown,
    StatePerformance, TrendGranularity, TrendPoint,
};
