//! Expense domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use caja_shared::types::UserId;

use crate::expense::error::ExpenseError;

/// Expense status in the approval lifecycle.
///
/// The valid transitions are:
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject)
///
/// Both `Approved` and `Rejected` are terminal; an expense never re-opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    /// Submitted and awaiting an approver's decision.
    Pending,
    /// Approved; the active fund has been debited.
    Approved,
    /// Rejected with a reason; the fund ledger was never touched.
    Rejected,
}

impl ExpenseStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if no further transition is permitted.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the money physically left the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash from the drawer.
    Cash,
    /// Bank transfer.
    Transfer,
    /// Digital wallet.
    Wallet,
    /// Debit or credit card.
    Card,
}

impl PaymentMethod {
    /// Returns the string representation of the payment method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Transfer => "transfer",
            Self::Wallet => "wallet",
            Self::Card => "card",
        }
    }

    /// Parses a payment method from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "transfer" => Some(Self::Transfer),
            "wallet" => Some(Self::Wallet),
            "card" => Some(Self::Card),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Travel and transport.
    Transport,
    /// Repairs and upkeep.
    Maintenance,
    /// Cleaning supplies and services.
    Cleaning,
    /// Office and stationery.
    Office,
    /// Food and refreshments.
    Food,
    /// Utilities and recurring services.
    Services,
    /// Supplier payments.
    Suppliers,
    /// Anything that fits nowhere else.
    Other,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Self; 8] = [
        Self::Transport,
        Self::Maintenance,
        Self::Cleaning,
        Self::Office,
        Self::Food,
        Self::Services,
        Self::Suppliers,
        Self::Other,
    ];

    /// Returns the string representation of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Maintenance => "maintenance",
            Self::Cleaning => "cleaning",
            Self::Office => "office",
            Self::Food => "food",
            Self::Services => "services",
            Self::Suppliers => "suppliers",
            Self::Other => "other",
        }
    }

    /// Parses a category from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "transport" => Some(Self::Transport),
            "maintenance" => Some(Self::Maintenance),
            "cleaning" => Some(Self::Cleaning),
            "office" => Some(Self::Office),
            "food" => Some(Self::Food),
            "services" => Some(Self::Services),
            "suppliers" => Some(Self::Suppliers),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated expense submission.
///
/// The amount is immutable after creation; there is no update path for it
/// anywhere in the system.
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// The submitting user.
    pub user_id: UserId,
    /// Claimed amount (strictly positive).
    pub amount: Decimal,
    /// The day the money was spent.
    pub expense_date: NaiveDate,
    /// How it was paid.
    pub payment_method: PaymentMethod,
    /// Spending category.
    pub category: Category,
    /// Free-text description.
    pub description: String,
}

impl NewExpense {
    /// Validates the submission.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseError::InvalidAmount` if the amount is not strictly
    /// positive.
    pub fn validate(&self) -> Result<(), ExpenseError> {
        if self.amount <= Decimal::ZERO {
            return Err(ExpenseError::InvalidAmount {
                amount: self.amount,
            });
        }
        Ok(())
    }
}

/// A state transition with its audit trail, produced by the workflow.
///
/// The repository applies the action verbatim; the workflow never touches
/// storage itself.
#[derive(Debug, Clone)]
pub enum ExpenseAction {
    /// Approve a pending expense.
    Approve {
        /// The new status after approval.
        new_status: ExpenseStatus,
        /// The user who approved the expense.
        approved_by: Uuid,
        /// When the expense was approved.
        approved_at: DateTime<Utc>,
        /// Optional comment from the approver.
        comment: Option<String>,
    },
    /// Reject a pending expense.
    Reject {
        /// The new status after rejection.
        new_status: ExpenseStatus,
        /// The user who rejected the expense.
        rejected_by: Uuid,
        /// When the expense was rejected.
        rejected_at: DateTime<Utc>,
        /// The reason for rejection.
        reason: String,
    },
}

impl ExpenseAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub const fn new_status(&self) -> ExpenseStatus {
        match self {
            Self::Approve { new_status, .. } | Self::Reject { new_status, .. } => *new_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_as_str() {
        assert_eq!(ExpenseStatus::Pending.as_str(), "pending");
        assert_eq!(ExpenseStatus::Approved.as_str(), "approved");
        assert_eq!(ExpenseStatus::Rejected.as_str(), "rejected");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            ExpenseStatus::parse("pending"),
            Some(ExpenseStatus::Pending)
        );
        assert_eq!(
            ExpenseStatus::parse("APPROVED"),
            Some(ExpenseStatus::Approved)
        );
        assert_eq!(
            ExpenseStatus::parse("Rejected"),
            Some(ExpenseStatus::Rejected)
        );
        assert_eq!(ExpenseStatus::parse("draft"), None);
    }

    #[test]
    fn test_status_terminal() {
        assert!(!ExpenseStatus::Pending.is_terminal());
        assert!(ExpenseStatus::Approved.is_terminal());
        assert!(ExpenseStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_payment_method_roundtrip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::Transfer,
            PaymentMethod::Wallet,
            PaymentMethod::Card,
        ] {
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(method));
        }
        assert_eq!(PaymentMethod::parse("cheque"), None);
    }

    #[test]
    fn test_category_roundtrip() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
        assert_eq!(Category::parse("travel"), None);
    }

    fn sample_expense(amount: Decimal) -> NewExpense {
        NewExpense {
            user_id: UserId::new(),
            amount,
            expense_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            payment_method: PaymentMethod::Cash,
            category: Category::Transport,
            description: "Taxi to the depot".to_string(),
        }
    }

    #[test]
    fn test_validate_positive_amount() {
        assert!(sample_expense(dec!(30_000)).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_amount() {
        let result = sample_expense(dec!(0)).validate();
        assert!(matches!(result, Err(ExpenseError::InvalidAmount { .. })));
    }

    #[test]
    fn test_validate_rejects_negative_amount() {
        let result = sample_expense(dec!(-50)).validate();
        assert!(matches!(result, Err(ExpenseError::InvalidAmount { .. })));
    }
}
