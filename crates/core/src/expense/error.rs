//! Expense error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::expense::types::ExpenseStatus;

/// Errors that can occur while validating or transitioning expenses.
#[derive(Debug, Error)]
pub enum ExpenseError {
    /// Attempted a transition out of a non-pending state.
    ///
    /// Surfaced to the caller as a signal to refresh a stale view.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: ExpenseStatus,
        /// The attempted target status.
        to: ExpenseStatus,
    },

    /// Rejection reason is required but not provided.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    /// Amount must be strictly positive.
    #[error("Expense amount must be positive, got {amount}")]
    InvalidAmount {
        /// The offending amount.
        amount: Decimal,
    },

    /// Category string is not in the fixed enumeration.
    #[error("Unknown expense category: {0}")]
    UnknownCategory(String),

    /// Payment method string is not in the fixed enumeration.
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    /// Expense not found.
    #[error("Expense {0} not found")]
    NotFound(Uuid),
}

impl ExpenseError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } => 409,
            Self::RejectionReasonRequired
            | Self::InvalidAmount { .. }
            | Self::UnknownCategory(_)
            | Self::UnknownPaymentMethod(_) => 400,
            Self::NotFound(_) => 404,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_STATE",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::UnknownCategory(_) => "UNKNOWN_CATEGORY",
            Self::UnknownPaymentMethod(_) => "UNKNOWN_PAYMENT_METHOD",
            Self::NotFound(_) => "EXPENSE_NOT_FOUND",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_invalid_transition_error() {
        let err = ExpenseError::InvalidTransition {
            from: ExpenseStatus::Approved,
            to: ExpenseStatus::Rejected,
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "INVALID_STATE");
        assert!(err.to_string().contains("approved"));
        assert!(err.to_string().contains("rejected"));
    }

    #[test]
    fn test_rejection_reason_required_error() {
        let err = ExpenseError::RejectionReasonRequired;
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "REJECTION_REASON_REQUIRED");
    }

    #[test]
    fn test_invalid_amount_error() {
        let err = ExpenseError::InvalidAmount { amount: dec!(-10) };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_AMOUNT");
        assert!(err.to_string().contains("-10"));
    }

    #[test]
    fn test_unknown_enum_errors() {
        assert_eq!(
            ExpenseError::UnknownCategory("travel".into()).status_code(),
            400
        );
        assert_eq!(
            ExpenseError::UnknownPaymentMethod("cheque".into()).error_code(),
            "UNKNOWN_PAYMENT_METHOD"
        );
    }

    #[test]
    fn test_not_found_error() {
        let err = ExpenseError::NotFound(Uuid::nil());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "EXPENSE_NOT_FOUND");
    }
}
