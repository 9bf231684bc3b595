//! Petty-cash fund ledger.
//!
//! A fund is a discrete cash injection into the pool. At most one fund is
//! active at any time; approving an expense debits the active fund. Balances
//! are recomputed from approved expenses on every read, never stored.

pub mod balance;
pub mod error;
pub mod types;

pub use balance::{available_balance, consumed_since, ensure_covers, fund_status, summary};
pub use error::FundError;
pub use types::{ApprovedDebit, FundInjection, FundStatus, FundSummary, NewFund};
