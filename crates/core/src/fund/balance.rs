//! Fund balance recomputation.
//!
//! The available balance is always derived from approved expenses at read
//! time. There is no stored running counter anywhere in the system: a
//! counter updated on approve/reject can drift from the expense records
//! under concurrent writes, while a recomputation cannot.
//!
//! A fund is consumed only by approved expenses dated on or after its
//! injection date; older approved expenses were drawn from earlier funds.

use rust_decimal::Decimal;

use crate::fund::error::FundError;
use crate::fund::types::{ApprovedDebit, FundInjection, FundStatus, FundSummary};

/// Sums the approved expense amounts dated on/after the fund's date.
#[must_use]
pub fn consumed_since(fund: &FundInjection, approved: &[ApprovedDebit]) -> Decimal {
    approved
        .iter()
        .filter(|debit| debit.date >= fund.fund_date)
        .map(|debit| debit.amount)
        .sum()
}

/// Remaining balance of a fund, clamped at zero.
#[must_use]
pub fn available_balance(fund: &FundInjection, approved: &[ApprovedDebit]) -> Decimal {
    (fund.amount - consumed_since(fund, approved)).max(Decimal::ZERO)
}

/// Derived status of a fund.
#[must_use]
pub fn fund_status(fund: &FundInjection, approved: &[ApprovedDebit]) -> FundStatus {
    if available_balance(fund, approved) > Decimal::ZERO {
        FundStatus::Active
    } else {
        FundStatus::Exhausted
    }
}

/// Confirms the fund can cover a debit, returning the available balance.
///
/// # Errors
///
/// Returns `FundError::InsufficientFunds` with the observed balance if the
/// required amount exceeds it.
pub fn ensure_covers(
    fund: &FundInjection,
    approved: &[ApprovedDebit],
    required: Decimal,
) -> Result<Decimal, FundError> {
    let available = available_balance(fund, approved);
    if required > available {
        return Err(FundError::InsufficientFunds {
            available,
            required,
        });
    }
    Ok(available)
}

/// Aggregate totals across all funds and all approved expenses.
#[must_use]
pub fn summary(funds: &[FundInjection], approved: &[ApprovedDebit]) -> FundSummary {
    let total_injected: Decimal = funds.iter().map(|f| f.amount).sum();
    let total_spent: Decimal = approved.iter().map(|d| d.amount).sum();

    FundSummary {
        total_injected,
        total_spent,
        total_available: (total_injected - total_spent).max(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fund(amount: Decimal, fund_date: NaiveDate) -> FundInjection {
        FundInjection { amount, fund_date }
    }

    fn debit(amount: Decimal, on: NaiveDate) -> ApprovedDebit {
        ApprovedDebit { amount, date: on }
    }

    // ========================================================================
    // Concrete scenarios
    // ========================================================================

    #[test]
    fn test_pending_expenses_never_debit() {
        // An injection of 100,000 with a 30,000 expense still pending: the
        // balance computation only ever sees approved debits, so it stays
        // at the full amount until approval lands.
        let f = fund(dec!(100_000), date(2025, 6, 1));
        assert_eq!(available_balance(&f, &[]), dec!(100_000));

        // Approval turns the claim into a debit.
        let approved = [debit(dec!(30_000), date(2025, 6, 10))];
        assert_eq!(available_balance(&f, &approved), dec!(70_000));
        assert_eq!(fund_status(&f, &approved), FundStatus::Active);
    }

    #[test]
    fn test_insufficient_balance_refuses_debit() {
        let f = fund(dec!(100_000), date(2025, 6, 1));
        let approved = [debit(dec!(30_000), date(2025, 6, 10))];

        // 80,000 against a remaining 70,000 must fail with the observed
        // balance, and the recomputed balance is untouched by the attempt.
        let err = ensure_covers(&f, &approved, dec!(80_000)).unwrap_err();
        match err {
            FundError::InsufficientFunds {
                available,
                required,
            } => {
                assert_eq!(available, dec!(70_000));
                assert_eq!(required, dec!(80_000));
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
        assert_eq!(available_balance(&f, &approved), dec!(70_000));
    }

    #[test]
    fn test_exact_balance_is_sufficient() {
        let f = fund(dec!(100_000), date(2025, 6, 1));
        let approved = [debit(dec!(30_000), date(2025, 6, 10))];
        assert_eq!(
            ensure_covers(&f, &approved, dec!(70_000)).unwrap(),
            dec!(70_000)
        );
    }

    #[test]
    fn test_two_sequential_funds_summary() {
        let funds = [
            fund(dec!(50_000), date(2025, 5, 1)),
            fund(dec!(20_000), date(2025, 6, 1)),
        ];
        let s = summary(&funds, &[]);
        assert_eq!(s.total_injected, dec!(70_000));
        assert_eq!(s.total_spent, dec!(0));
        assert_eq!(s.total_available, dec!(70_000));
    }

    #[test]
    fn test_exhausted_status() {
        let f = fund(dec!(10_000), date(2025, 6, 1));
        let approved = [debit(dec!(10_000), date(2025, 6, 2))];
        assert_eq!(fund_status(&f, &approved), FundStatus::Exhausted);
        assert_eq!(available_balance(&f, &approved), dec!(0));
    }

    #[test]
    fn test_older_debits_do_not_consume_newer_fund() {
        // Expenses approved before the injection date were drawn from an
        // earlier fund and must not count against this one.
        let f = fund(dec!(20_000), date(2025, 6, 1));
        let approved = [
            debit(dec!(15_000), date(2025, 5, 20)),
            debit(dec!(5_000), date(2025, 6, 3)),
        ];
        assert_eq!(consumed_since(&f, &approved), dec!(5_000));
        assert_eq!(available_balance(&f, &approved), dec!(15_000));
    }

    #[test]
    fn test_same_day_debit_counts() {
        let f = fund(dec!(20_000), date(2025, 6, 1));
        let approved = [debit(dec!(8_000), date(2025, 6, 1))];
        assert_eq!(consumed_since(&f, &approved), dec!(8_000));
    }

    #[test]
    fn test_repeated_reads_are_identical() {
        let f = fund(dec!(100_000), date(2025, 6, 1));
        let approved = [
            debit(dec!(12_345.67), date(2025, 6, 2)),
            debit(dec!(890.12), date(2025, 6, 3)),
        ];
        let first = available_balance(&f, &approved);
        let second = available_balance(&f, &approved);
        assert_eq!(first, second);
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Strategy for positive decimal amounts with two decimal places.
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (0u32..730).prop_map(|offset| {
            date(2024, 1, 1) + chrono::Duration::days(i64::from(offset))
        })
    }

    fn debits_strategy(max_len: usize) -> impl Strategy<Value = Vec<ApprovedDebit>> {
        prop::collection::vec(
            (amount_strategy(), date_strategy())
                .prop_map(|(amount, on)| ApprovedDebit { amount, date: on }),
            0..=max_len,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The available balance is never negative, no matter how much was
        /// approved against the fund.
        #[test]
        fn prop_balance_never_negative(
            amount in amount_strategy(),
            fund_date in date_strategy(),
            approved in debits_strategy(20),
        ) {
            let f = FundInjection { amount, fund_date };
            prop_assert!(available_balance(&f, &approved) >= Decimal::ZERO);
        }

        /// Recomputation is a pure function of its inputs.
        #[test]
        fn prop_balance_idempotent(
            amount in amount_strategy(),
            fund_date in date_strategy(),
            approved in debits_strategy(20),
        ) {
            let f = FundInjection { amount, fund_date };
            prop_assert_eq!(
                available_balance(&f, &approved),
                available_balance(&f, &approved)
            );
        }

        /// Gating every debit through `ensure_covers` keeps the ledger
        /// invariant: the sum of admitted debits never exceeds the injection.
        #[test]
        fn prop_gated_debits_never_overspend(
            amount in amount_strategy(),
            fund_date in date_strategy(),
            candidates in debits_strategy(20),
        ) {
            let f = FundInjection { amount, fund_date };
            let mut approved: Vec<ApprovedDebit> = Vec::new();

            for candidate in candidates {
                let admitted = ApprovedDebit {
                    // Debits dated before the fund would bypass the per-fund
                    // gate; pin every candidate to the fund's window so each
                    // one is actually gated.
                    date: candidate.date.max(fund_date),
                    ..candidate
                };
                if ensure_covers(&f, &approved, admitted.amount).is_ok() {
                    approved.push(admitted);
                }
            }

            let spent: Decimal = approved.iter().map(|d| d.amount).sum();
            prop_assert!(spent <= f.amount);
            prop_assert!(available_balance(&f, &approved) >= Decimal::ZERO);
        }

        /// `ensure_covers` mutates nothing: a refused debit leaves the
        /// recomputed balance exactly where it was.
        #[test]
        fn prop_refused_debit_changes_nothing(
            amount in amount_strategy(),
            fund_date in date_strategy(),
            approved in debits_strategy(10),
            required in amount_strategy(),
        ) {
            let f = FundInjection { amount, fund_date };
            let before = available_balance(&f, &approved);
            let _ = ensure_covers(&f, &approved, required);
            prop_assert_eq!(available_balance(&f, &approved), before);
        }

        /// Summary arithmetic: available is the clamped difference.
        #[test]
        fn prop_summary_arithmetic(
            amounts in prop::collection::vec(amount_strategy(), 1..5),
            approved in debits_strategy(10),
        ) {
            let funds: Vec<FundInjection> = amounts
                .iter()
                .map(|&amount| FundInjection { amount, fund_date: date(2024, 1, 1) })
                .collect();

            let s = summary(&funds, &approved);
            let injected: Decimal = amounts.iter().copied().sum();
            let spent: Decimal = approved.iter().map(|d| d.amount).sum();

            prop_assert_eq!(s.total_injected, injected);
            prop_assert_eq!(s.total_spent, spent);
            prop_assert_eq!(s.total_available, (injected - spent).max(Decimal::ZERO));
        }
    }
}
