//! Aggregation functions over expense snapshots.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::expense::{Category, ExpenseStatus};
use crate::reports::types::{
    CategoryTotal, ExpenseSnapshot, MonthlyTotals, ReportPeriod, SummaryStats, TrendPoint,
};

/// Walks `back` months before the given date, returning (year, month).
fn months_back(today: NaiveDate, back: u32) -> (i32, u32) {
    let mut year = today.year();
    let mut month = today.month();
    for _ in 0..back {
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }
    (year, month)
}

fn first_of_month(year: i32, month: u32, fallback: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(fallback)
}

/// Keeps the expenses dated inside the period ending at `today`.
#[must_use]
pub fn filter_by_period(
    expenses: &[ExpenseSnapshot],
    period: ReportPeriod,
    today: NaiveDate,
) -> Vec<ExpenseSnapshot> {
    let start = match period {
        ReportPeriod::Month => {
            let (y, m) = months_back(today, 0);
            first_of_month(y, m, today)
        }
        ReportPeriod::Quarter => {
            let (y, m) = months_back(today, 2);
            first_of_month(y, m, today)
        }
        ReportPeriod::Semester => {
            let (y, m) = months_back(today, 5);
            first_of_month(y, m, today)
        }
        ReportPeriod::Year => first_of_month(today.year(), 1, today),
    };

    expenses
        .iter()
        .copied()
        .filter(|e| e.date >= start && e.date <= today)
        .collect()
}

/// Approved spend grouped by category, highest total first.
#[must_use]
pub fn totals_by_category(expenses: &[ExpenseSnapshot]) -> Vec<CategoryTotal> {
    let mut by_category: HashMap<Category, (Decimal, usize)> = HashMap::new();

    for expense in expenses
        .iter()
        .filter(|e| e.status == ExpenseStatus::Approved)
    {
        let entry = by_category
            .entry(expense.category)
            .or_insert((Decimal::ZERO, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    let mut totals: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category,
            total,
            count,
        })
        .collect();

    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals
}

/// The last six calendar months (oldest first), broken down by status.
///
/// Every month in the window appears in the output, including months with
/// no expenses at all.
#[must_use]
pub fn monthly_breakdown(expenses: &[ExpenseSnapshot], today: NaiveDate) -> Vec<MonthlyTotals> {
    let mut months: Vec<MonthlyTotals> = (0..6)
        .rev()
        .map(|back| {
            let (year, month) = months_back(today, back);
            MonthlyTotals {
                year,
                month,
                pending: Decimal::ZERO,
                approved: Decimal::ZERO,
                rejected: Decimal::ZERO,
                total: Decimal::ZERO,
            }
        })
        .collect();

    for expense in expenses {
        let Some(slot) = months
            .iter_mut()
            .find(|m| m.year == expense.date.year() && m.month == expense.date.month())
        else {
            continue;
        };

        match expense.status {
            ExpenseStatus::Pending => slot.pending += expense.amount,
            ExpenseStatus::Approved => slot.approved += expense.amount,
            ExpenseStatus::Rejected => slot.rejected += expense.amount,
        }
        slot.total += expense.amount;
    }

    months
}

/// Daily approved spend over the trailing `days` window, with a 7-day
/// moving average.
#[must_use]
pub fn daily_trend(expenses: &[ExpenseSnapshot], days: u32, today: NaiveDate) -> Vec<TrendPoint> {
    let days = days.max(1);
    let start = today - Duration::days(i64::from(days) - 1);

    let mut per_day: HashMap<NaiveDate, Decimal> = HashMap::new();
    for expense in expenses.iter().filter(|e| {
        e.status == ExpenseStatus::Approved && e.date >= start && e.date <= today
    }) {
        *per_day.entry(expense.date).or_insert(Decimal::ZERO) += expense.amount;
    }

    let mut points = Vec::with_capacity(days as usize);
    for offset in 0..i64::from(days) {
        let day = start + Duration::days(offset);
        let amount = per_day.get(&day).copied().unwrap_or(Decimal::ZERO);
        points.push(TrendPoint {
            date: day,
            amount,
            moving_average: Decimal::ZERO,
        });
    }

    // Trailing 7-day average, shorter at the head of the window.
    for index in 0..points.len() {
        let from = index.saturating_sub(6);
        let window = &points[from..=index];
        let sum: Decimal = window.iter().map(|p| p.amount).sum();
        points[index].moving_average = sum / Decimal::from(window.len() as u64);
    }

    points
}

/// Month-over-month summary of approved spend.
#[must_use]
pub fn summary_stats(expenses: &[ExpenseSnapshot], today: NaiveDate) -> SummaryStats {
    let (cur_year, cur_month) = months_back(today, 0);
    let (prev_year, prev_month) = months_back(today, 1);

    let approved = |year: i32, month: u32| -> Vec<&ExpenseSnapshot> {
        expenses
            .iter()
            .filter(|e| {
                e.status == ExpenseStatus::Approved
                    && e.date.year() == year
                    && e.date.month() == month
            })
            .collect()
    };

    let current: Vec<&ExpenseSnapshot> = approved(cur_year, cur_month);
    let previous: Vec<&ExpenseSnapshot> = approved(prev_year, prev_month);

    let current_month_total: Decimal = current.iter().map(|e| e.amount).sum();
    let previous_month_total: Decimal = previous.iter().map(|e| e.amount).sum();

    let change_percent = if previous_month_total > Decimal::ZERO {
        (current_month_total - previous_month_total) / previous_month_total
            * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    let average_expense = if current.is_empty() {
        Decimal::ZERO
    } else {
        current_month_total / Decimal::from(current.len() as u64)
    };

    let mut by_category: HashMap<Category, Decimal> = HashMap::new();
    for expense in &current {
        *by_category.entry(expense.category).or_insert(Decimal::ZERO) += expense.amount;
    }
    let top_category = by_category.into_iter().max_by_key(|&(_, total)| total);

    SummaryStats {
        current_month_total,
        previous_month_total,
        change_percent,
        expense_count: current.len(),
        average_expense,
        top_category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn expense(
        date: (i32, u32, u32),
        amount: Decimal,
        status: ExpenseStatus,
        category: Category,
    ) -> ExpenseSnapshot {
        ExpenseSnapshot {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            amount,
            status,
            category,
        }
    }

    #[test]
    fn test_months_back_wraps_year() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        assert_eq!(months_back(today, 0), (2025, 2));
        assert_eq!(months_back(today, 1), (2025, 1));
        assert_eq!(months_back(today, 2), (2024, 12));
        assert_eq!(months_back(today, 5), (2024, 9));
    }

    #[test]
    fn test_filter_by_period_month() {
        let expenses = [
            expense((2025, 6, 2), dec!(100), ExpenseStatus::Approved, Category::Food),
            expense((2025, 5, 30), dec!(200), ExpenseStatus::Approved, Category::Food),
        ];
        let filtered = filter_by_period(&expenses, ReportPeriod::Month, today());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].amount, dec!(100));
    }

    #[test]
    fn test_filter_by_period_quarter_spans_three_months() {
        let expenses = [
            expense((2025, 4, 1), dec!(1), ExpenseStatus::Pending, Category::Food),
            expense((2025, 3, 31), dec!(2), ExpenseStatus::Pending, Category::Food),
        ];
        let filtered = filter_by_period(&expenses, ReportPeriod::Quarter, today());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].amount, dec!(1));
    }

    #[test]
    fn test_filter_by_period_year() {
        let expenses = [
            expense((2025, 1, 1), dec!(1), ExpenseStatus::Approved, Category::Food),
            expense((2024, 12, 31), dec!(2), ExpenseStatus::Approved, Category::Food),
        ];
        let filtered = filter_by_period(&expenses, ReportPeriod::Year, today());
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_totals_by_category_only_counts_approved() {
        let expenses = [
            expense((2025, 6, 1), dec!(100), ExpenseStatus::Approved, Category::Transport),
            expense((2025, 6, 2), dec!(50), ExpenseStatus::Pending, Category::Transport),
            expense((2025, 6, 3), dec!(25), ExpenseStatus::Rejected, Category::Transport),
        ];
        let totals = totals_by_category(&expenses);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].total, dec!(100));
        assert_eq!(totals[0].count, 1);
    }

    #[test]
    fn test_totals_by_category_sorted_descending() {
        let expenses = [
            expense((2025, 6, 1), dec!(100), ExpenseStatus::Approved, Category::Transport),
            expense((2025, 6, 2), dec!(300), ExpenseStatus::Approved, Category::Suppliers),
            expense((2025, 6, 3), dec!(200), ExpenseStatus::Approved, Category::Food),
        ];
        let totals = totals_by_category(&expenses);
        assert_eq!(totals[0].category, Category::Suppliers);
        assert_eq!(totals[1].category, Category::Food);
        assert_eq!(totals[2].category, Category::Transport);
    }

    #[test]
    fn test_monthly_breakdown_covers_six_months() {
        let breakdown = monthly_breakdown(&[], today());
        assert_eq!(breakdown.len(), 6);
        assert_eq!((breakdown[0].year, breakdown[0].month), (2025, 1));
        assert_eq!((breakdown[5].year, breakdown[5].month), (2025, 6));
        assert!(breakdown.iter().all(|m| m.total == Decimal::ZERO));
    }

    #[test]
    fn test_monthly_breakdown_buckets_by_status() {
        let expenses = [
            expense((2025, 6, 1), dec!(100), ExpenseStatus::Approved, Category::Food),
            expense((2025, 6, 5), dec!(40), ExpenseStatus::Pending, Category::Food),
            expense((2025, 6, 9), dec!(10), ExpenseStatus::Rejected, Category::Food),
            expense((2025, 5, 9), dec!(70), ExpenseStatus::Approved, Category::Food),
            // Outside the window entirely.
            expense((2024, 11, 9), dec!(999), ExpenseStatus::Approved, Category::Food),
        ];
        let breakdown = monthly_breakdown(&expenses, today());

        let june = breakdown.last().unwrap();
        assert_eq!(june.approved, dec!(100));
        assert_eq!(june.pending, dec!(40));
        assert_eq!(june.rejected, dec!(10));
        assert_eq!(june.total, dec!(150));

        let may = &breakdown[4];
        assert_eq!(may.approved, dec!(70));
        assert_eq!(may.total, dec!(70));
    }

    #[test]
    fn test_daily_trend_window_and_average() {
        let expenses = [
            expense((2025, 6, 15), dec!(70), ExpenseStatus::Approved, Category::Food),
            expense((2025, 6, 14), dec!(0), ExpenseStatus::Approved, Category::Food),
            // Pending spend never shows up in the trend.
            expense((2025, 6, 15), dec!(999), ExpenseStatus::Pending, Category::Food),
        ];
        let points = daily_trend(&expenses, 7, today());
        assert_eq!(points.len(), 7);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2025, 6, 9).unwrap());
        assert_eq!(points[6].amount, dec!(70));
        // Seven days in the window, one day of spend.
        assert_eq!(points[6].moving_average, dec!(10));
    }

    #[test]
    fn test_daily_trend_average_shorter_at_head() {
        let expenses = [expense(
            (2025, 6, 9),
            dec!(30),
            ExpenseStatus::Approved,
            Category::Food,
        )];
        let points = daily_trend(&expenses, 7, today());
        // First point averages over itself only.
        assert_eq!(points[0].moving_average, dec!(30));
        // Second point averages over two days.
        assert_eq!(points[1].moving_average, dec!(15));
    }

    #[test]
    fn test_summary_stats_change_percent() {
        let expenses = [
            expense((2025, 6, 1), dec!(150), ExpenseStatus::Approved, Category::Food),
            expense((2025, 5, 1), dec!(100), ExpenseStatus::Approved, Category::Food),
        ];
        let stats = summary_stats(&expenses, today());
        assert_eq!(stats.current_month_total, dec!(150));
        assert_eq!(stats.previous_month_total, dec!(100));
        assert_eq!(stats.change_percent, dec!(50));
        assert_eq!(stats.expense_count, 1);
        assert_eq!(stats.average_expense, dec!(150));
    }

    #[test]
    fn test_summary_stats_no_previous_month() {
        let expenses = [expense(
            (2025, 6, 1),
            dec!(150),
            ExpenseStatus::Approved,
            Category::Food,
        )];
        let stats = summary_stats(&expenses, today());
        assert_eq!(stats.change_percent, Decimal::ZERO);
    }

    #[test]
    fn test_summary_stats_top_category() {
        let expenses = [
            expense((2025, 6, 1), dec!(100), ExpenseStatus::Approved, Category::Transport),
            expense((2025, 6, 2), dec!(250), ExpenseStatus::Approved, Category::Suppliers),
            expense((2025, 6, 3), dec!(999), ExpenseStatus::Pending, Category::Cleaning),
        ];
        let stats = summary_stats(&expenses, today());
        assert_eq!(stats.top_category, Some((Category::Suppliers, dec!(250))));
    }

    #[test]
    fn test_summary_stats_empty() {
        let stats = summary_stats(&[], today());
        assert_eq!(stats.current_month_total, Decimal::ZERO);
        assert_eq!(stats.average_expense, Decimal::ZERO);
        assert_eq!(stats.expense_count, 0);
        assert!(stats.top_category.is_none());
    }
}
