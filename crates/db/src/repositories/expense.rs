//! Expense repository for claim database operations.
//!
//! `approve` is the only operation in the system that needs cross-row
//! atomicity (expense status + fund sufficiency). It runs inside a
//! SERIALIZABLE transaction so that two concurrent approvals against the
//! same fund cannot both observe a sufficient balance: the second to commit
//! either sees the first's debit or aborts with a serialization failure,
//! which surfaces as a retryable error.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use caja_core::expense::{ExpenseAction, ExpenseError, ExpenseWorkflow, NewExpense};
use caja_core::fund::{self, ApprovedDebit, FundError, FundInjection};
use caja_shared::types::PageRequest;

use crate::entities::{
    expenses, funds,
    sea_orm_active_enums::{ExpenseCategory, ExpenseStatus},
};

/// Error types for expense operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpenseRepoError {
    /// Expense not found.
    #[error("Expense not found: {0}")]
    NotFound(Uuid),

    /// State machine or validation failure.
    #[error(transparent)]
    Workflow(#[from] ExpenseError),

    /// Fund-side business rule failure (insufficient balance, no active fund).
    #[error(transparent)]
    Fund(#[from] FundError),

    /// The serializable approval transaction lost a race; safe to retry.
    #[error("Concurrent update detected, please retry")]
    Serialization,

    /// Database error.
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl ExpenseRepoError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Workflow(err) => err.status_code(),
            Self::Fund(err) => err.status_code(),
            Self::Serialization => 503,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "EXPENSE_NOT_FOUND",
            Self::Workflow(err) => err.error_code(),
            Self::Fund(err) => err.error_code(),
            Self::Serialization => "STORAGE_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<DbErr> for ExpenseRepoError {
    fn from(err: DbErr) -> Self {
        if is_serialization_failure(&err) {
            Self::Serialization
        } else {
            Self::Database(err)
        }
    }
}

/// Postgres aborts one of two conflicting serializable transactions with
/// SQLSTATE 40001 (serialization_failure) or 40P01 (deadlock_detected).
fn is_serialization_failure(err: &DbErr) -> bool {
    let text = err.to_string();
    text.contains("40001") || text.contains("40P01") || text.contains("could not serialize")
}

/// Filter options for listing expenses.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Filter by status.
    pub status: Option<ExpenseStatus>,
    /// Filter by category.
    pub category: Option<ExpenseCategory>,
    /// Filter by submitting user.
    pub user_id: Option<Uuid>,
    /// Filter by date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end.
    pub date_to: Option<NaiveDate>,
}

/// Outcome of a successful approval.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    /// The updated expense row.
    pub expense: expenses::Model,
    /// The fund that was debited.
    pub fund_id: Uuid,
    /// The fund's remaining balance after the debit.
    pub remaining_balance: rust_decimal::Decimal,
}

/// Expense repository for CRUD and transition operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new expense in `pending` state.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the database insert fails.
    pub async fn create(&self, input: NewExpense) -> Result<expenses::Model, ExpenseRepoError> {
        input.validate()?;

        let now = chrono::Utc::now().into();
        let expense = expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(input.user_id.into_inner()),
            amount: Set(input.amount),
            expense_date: Set(input.expense_date),
            payment_method: Set(input.payment_method.into()),
            category: Set(input.category.into()),
            description: Set(input.description),
            status: Set(ExpenseStatus::Pending),
            admin_comment: Set(None),
            fund_id: Set(None),
            approved_by: Set(None),
            resolved_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(expense.insert(&self.db).await?)
    }

    /// Lists a page of expenses with optional filters, newest first.
    ///
    /// Returns the page rows and the total row count across all pages. The
    /// (status, date) and (user, date) orderings are backed by declared
    /// indexes; no application-side re-sorting happens here.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: ExpenseFilter,
        page: &PageRequest,
    ) -> Result<(Vec<expenses::Model>, u64), DbErr> {
        let mut query = expenses::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(expenses::Column::Status.eq(status));
        }
        if let Some(category) = filter.category {
            query = query.filter(expenses::Column::Category.eq(category));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(expenses::Column::UserId.eq(user_id));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(expenses::Column::ExpenseDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(expenses::Column::ExpenseDate.lte(date_to));
        }

        let total = query.clone().count(&self.db).await?;

        let rows = query
            .order_by_desc(expenses::Column::ExpenseDate)
            .order_by_desc(expenses::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Gets an expense by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the expense is not found or the query fails.
    pub async fn get(&self, expense_id: Uuid) -> Result<expenses::Model, ExpenseRepoError> {
        expenses::Entity::find_by_id(expense_id)
            .one(&self.db)
            .await?
            .ok_or(ExpenseRepoError::NotFound(expense_id))
    }

    /// Approves a pending expense, debiting the active fund.
    ///
    /// Runs as a single serializable transaction that:
    /// 1. re-reads the expense and confirms it is still `pending`,
    /// 2. reads the active fund,
    /// 3. recomputes the fund's available balance from approved expenses
    ///    inside the transaction and confirms it covers the amount,
    /// 4. writes the approval (status, comment, timestamp, fund link).
    ///
    /// Either all of it commits or none of it does.
    ///
    /// # Errors
    ///
    /// * `ExpenseRepoError::NotFound` - no such expense
    /// * `ExpenseRepoError::Workflow` - the expense is no longer pending
    /// * `ExpenseRepoError::Fund` - no active fund, or insufficient balance
    /// * `ExpenseRepoError::Serialization` - lost a race; safe to retry
    pub async fn approve(
        &self,
        expense_id: Uuid,
        approved_by: Uuid,
        comment: Option<String>,
    ) -> Result<ApprovalOutcome, ExpenseRepoError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;

        let expense = expenses::Entity::find_by_id(expense_id)
            .one(&txn)
            .await?
            .ok_or(ExpenseRepoError::NotFound(expense_id))?;

        let action = ExpenseWorkflow::approve(
            (&expense.status).into(),
            approved_by,
            comment,
        )?;

        let active_fund = funds::Entity::find()
            .filter(funds::Column::IsActive.eq(true))
            .order_by_desc(funds::Column::CreatedAt)
            .limit(1)
            .one(&txn)
            .await?
            .ok_or(FundError::NoActiveFund)?;

        let injection = FundInjection {
            amount: active_fund.amount,
            fund_date: active_fund.fund_date,
        };
        let debits = approved_debits_in_txn(&txn).await?;

        // The whole ledger must cover the debit, not just the active fund:
        // an expense dated before the active fund's injection never counts
        // against it, and must not push total approved spend past total
        // injections.
        let all_funds = funds::Entity::find().all(&txn).await?;
        let injections: Vec<FundInjection> = all_funds
            .iter()
            .map(|row| FundInjection {
                amount: row.amount,
                fund_date: row.fund_date,
            })
            .collect();
        let ledger = fund::summary(&injections, &debits);
        if expense.amount > ledger.total_available {
            return Err(FundError::InsufficientFunds {
                available: ledger.total_available,
                required: expense.amount,
            }
            .into());
        }

        let available = fund::ensure_covers(&injection, &debits, expense.amount)?;

        debug!(
            expense_id = %expense_id,
            fund_id = %active_fund.id,
            available = %available,
            amount = %expense.amount,
            "Approval balance check passed"
        );

        let mut active: expenses::ActiveModel = expense.into();
        apply_action(&mut active, &action, Some(active_fund.id));
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        Ok(ApprovalOutcome {
            remaining_balance: available - updated.amount,
            expense: updated,
            fund_id: active_fund.id,
        })
    }

    /// Rejects a pending expense with a reason.
    ///
    /// Never touches the fund ledger: rejection is a single-row write.
    ///
    /// # Errors
    ///
    /// * `ExpenseRepoError::NotFound` - no such expense
    /// * `ExpenseRepoError::Workflow` - empty reason, or no longer pending
    pub async fn reject(
        &self,
        expense_id: Uuid,
        rejected_by: Uuid,
        reason: String,
    ) -> Result<expenses::Model, ExpenseRepoError> {
        let expense = self.get(expense_id).await?;

        let action = ExpenseWorkflow::reject((&expense.status).into(), rejected_by, reason)?;

        let mut active: expenses::ActiveModel = expense.into();
        apply_action(&mut active, &action, None);

        Ok(active.update(&self.db).await?)
    }

    /// Snapshot of every expense for the read-side reports:
    /// `(date, amount, status, category)` rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn report_snapshots(
        &self,
    ) -> Result<Vec<caja_core::reports::ExpenseSnapshot>, DbErr> {
        let rows = expenses::Entity::find().all(&self.db).await?;

        Ok(rows
            .into_iter()
            .map(|row| caja_core::reports::ExpenseSnapshot {
                date: row.expense_date,
                amount: row.amount,
                status: (&row.status).into(),
                category: (&row.category).into(),
            })
            .collect())
    }
}

/// Fetches approved `(date, amount)` debit rows within the transaction, so
/// the sufficiency check observes exactly the state this transaction will
/// commit against.
async fn approved_debits_in_txn(
    txn: &DatabaseTransaction,
) -> Result<Vec<ApprovedDebit>, DbErr> {
    let rows = expenses::Entity::find()
        .filter(expenses::Column::Status.eq(ExpenseStatus::Approved))
        .all(txn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| ApprovedDebit {
            amount: row.amount,
            date: row.expense_date,
        })
        .collect())
}

/// Writes the columns a workflow action dictates onto the active model.
fn apply_action(
    active: &mut expenses::ActiveModel,
    action: &ExpenseAction,
    fund_id: Option<Uuid>,
) {
    match action {
        ExpenseAction::Approve {
            approved_by,
            approved_at,
            comment,
            ..
        } => {
            active.status = Set(ExpenseStatus::Approved);
            active.admin_comment = Set(comment.clone());
            active.approved_by = Set(Some(*approved_by));
            active.fund_id = Set(fund_id);
            active.resolved_at = Set(Some((*approved_at).into()));
        }
        ExpenseAction::Reject {
            rejected_at,
            reason,
            ..
        } => {
            active.status = Set(ExpenseStatus::Rejected);
            active.admin_comment = Set(Some(reason.clone()));
            active.resolved_at = Set(Some((*rejected_at).into()));
        }
    }
    active.updated_at = Set(chrono::Utc::now().into());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_failure_detection() {
        let err = DbErr::Custom(
            "Execution Error: error returned from database: \
             could not serialize access due to concurrent update (SQLSTATE 40001)"
                .to_string(),
        );
        assert!(is_serialization_failure(&err));

        let err = DbErr::Custom("duplicate key value violates unique constraint".to_string());
        assert!(!is_serialization_failure(&err));
    }

    #[test]
    fn test_serialization_error_is_retryable_taxon() {
        let err = ExpenseRepoError::Serialization;
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.error_code(), "STORAGE_UNAVAILABLE");
    }

    #[test]
    fn test_error_codes_delegate_to_domain() {
        let err = ExpenseRepoError::Fund(FundError::NoActiveFund);
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "NO_ACTIVE_FUND");

        let err = ExpenseRepoError::Workflow(ExpenseError::RejectionReasonRequired);
        assert_eq!(err.status_code(), 400);
    }
}
