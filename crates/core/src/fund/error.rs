//! Fund error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during fund ledger operations.
#[derive(Debug, Error)]
pub enum FundError {
    /// Injection amount must be strictly positive.
    #[error("Fund amount must be positive, got {amount}")]
    InvalidAmount {
        /// The offending amount.
        amount: Decimal,
    },

    /// Contributor name is required.
    #[error("Contributor name is required")]
    ContributorRequired,

    /// The active fund cannot cover the requested debit.
    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds {
        /// The available balance at decision time.
        available: Decimal,
        /// The amount the approval required.
        required: Decimal,
    },

    /// No fund is currently active.
    #[error("No active fund; register a fund injection first")]
    NoActiveFund,

    /// Fund not found.
    #[error("Fund {0} not found")]
    NotFound(Uuid),
}

impl FundError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount { .. } | Self::ContributorRequired => 400,
            Self::InsufficientFunds { .. } | Self::NoActiveFund => 422,
            Self::NotFound(_) => 404,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::ContributorRequired => "CONTRIBUTOR_REQUIRED",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::NoActiveFund => "NO_ACTIVE_FUND",
            Self::NotFound(_) => "FUND_NOT_FOUND",
        }
    }
}
