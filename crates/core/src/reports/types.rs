//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::expense::{Category, ExpenseStatus};

/// The expense facts the aggregates need, decoupled from storage models.
#[derive(Debug, Clone, Copy)]
pub struct ExpenseSnapshot {
    /// Expense date.
    pub date: NaiveDate,
    /// Claimed amount.
    pub amount: Decimal,
    /// Current status.
    pub status: ExpenseStatus,
    /// Spending category.
    pub category: Category,
}

/// Reporting window, anchored at a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    /// The current calendar month.
    Month,
    /// The current and two preceding months.
    Quarter,
    /// The current and five preceding months.
    Semester,
    /// The current calendar year.
    Year,
}

impl ReportPeriod {
    /// Parses a period from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "month" => Some(Self::Month),
            "quarter" => Some(Self::Quarter),
            "semester" => Some(Self::Semester),
            "year" => Some(Self::Year),
            _ => None,
        }
    }
}

/// Approved spend for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category.
    pub category: Category,
    /// Sum of approved amounts.
    pub total: Decimal,
    /// Number of approved expenses.
    pub count: usize,
}

/// One month of spend, broken down by status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Amount still pending.
    pub pending: Decimal,
    /// Approved amount.
    pub approved: Decimal,
    /// Rejected amount.
    pub rejected: Decimal,
    /// Sum across all statuses.
    pub total: Decimal,
}

/// One day in the spending trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// The day.
    pub date: NaiveDate,
    /// Approved spend on that day.
    pub amount: Decimal,
    /// Trailing 7-day moving average (including this day).
    pub moving_average: Decimal,
}

/// Month-over-month summary statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Approved spend in the current month.
    pub current_month_total: Decimal,
    /// Approved spend in the previous month.
    pub previous_month_total: Decimal,
    /// Percent change vs. the previous month (zero when there is no
    /// previous-month spend to compare against).
    pub change_percent: Decimal,
    /// Number of approved expenses in the current month.
    pub expense_count: usize,
    /// Average approved expense in the current month.
    pub average_expense: Decimal,
    /// Category with the highest approved spend this month, with its total.
    pub top_category: Option<(Category, Decimal)>,
}
