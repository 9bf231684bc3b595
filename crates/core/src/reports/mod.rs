//! Read-side spending aggregates.
//!
//! Everything here is a pure function of an expense snapshot list and a
//! reference date; no storage access and no clock reads, so the aggregates
//! are deterministic under test.

pub mod aggregate;
pub mod types;

pub use aggregate::{
    daily_trend, filter_by_period, monthly_breakdown, summary_stats, totals_by_category,
};
pub use types::{
    CategoryTotal, ExpenseSnapshot, MonthlyTotals, ReportPeriod, SummaryStats, TrendPoint,
};
