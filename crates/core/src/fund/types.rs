//! Fund domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use caja_shared::types::UserId;

use crate::fund::error::FundError;

/// Derived fund status.
///
/// Never stored; computed from the remaining balance at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundStatus {
    /// Remaining balance is positive.
    Active,
    /// Fully consumed by approved expenses.
    Exhausted,
}

impl FundStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for FundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated fund injection request.
#[derive(Debug, Clone)]
pub struct NewFund {
    /// Injected amount (strictly positive).
    pub amount: Decimal,
    /// The day the cash was physically received.
    pub fund_date: NaiveDate,
    /// Who handed the cash over.
    pub contributor: String,
    /// The user who received it.
    pub received_by: UserId,
    /// Optional free-text note.
    pub note: Option<String>,
}

impl NewFund {
    /// Validates the injection request.
    ///
    /// # Errors
    ///
    /// Returns `FundError::InvalidAmount` if the amount is not strictly
    /// positive, `FundError::ContributorRequired` if the contributor is
    /// blank.
    pub fn validate(&self) -> Result<(), FundError> {
        if self.amount <= Decimal::ZERO {
            return Err(FundError::InvalidAmount {
                amount: self.amount,
            });
        }
        if self.contributor.trim().is_empty() {
            return Err(FundError::ContributorRequired);
        }
        Ok(())
    }
}

/// The injection facts a balance computation needs from a fund record.
#[derive(Debug, Clone, Copy)]
pub struct FundInjection {
    /// Injected amount.
    pub amount: Decimal,
    /// Injection date; only approved expenses on/after this date consume it.
    pub fund_date: NaiveDate,
}

/// An approved expense as seen by the balance computation.
#[derive(Debug, Clone, Copy)]
pub struct ApprovedDebit {
    /// Approved amount.
    pub amount: Decimal,
    /// Expense date.
    pub date: NaiveDate,
}

/// Aggregate totals across the whole ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundSummary {
    /// Sum of all fund injections.
    pub total_injected: Decimal,
    /// Sum of all approved expense amounts.
    pub total_spent: Decimal,
    /// `max(0, total_injected - total_spent)`.
    pub total_available: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_fund(amount: Decimal, contributor: &str) -> NewFund {
        NewFund {
            amount,
            fund_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            contributor: contributor.to_string(),
            received_by: UserId::new(),
            note: None,
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(sample_fund(dec!(100_000), "Noelia").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_amount() {
        let result = sample_fund(dec!(0), "Noelia").validate();
        assert!(matches!(result, Err(FundError::InvalidAmount { .. })));
    }

    #[test]
    fn test_validate_rejects_negative_amount() {
        let result = sample_fund(dec!(-5_000), "Noelia").validate();
        assert!(matches!(result, Err(FundError::InvalidAmount { .. })));
    }

    #[test]
    fn test_validate_rejects_blank_contributor() {
        let result = sample_fund(dec!(100_000), "   ").validate();
        assert!(matches!(result, Err(FundError::ContributorRequired)));
    }
}
