//! Fund repository for ledger database operations.
//!
//! Balances are always recomputed from approved expenses; no running
//! counter is stored anywhere (a stored counter can drift from the expense
//! records under concurrent approvals).

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use caja_core::fund::{
    self, ApprovedDebit, FundInjection, FundStatus, FundSummary, NewFund,
};

use crate::entities::{expenses, funds, sea_orm_active_enums::ExpenseStatus};

/// Error types for fund operations.
#[derive(Debug, thiserror::Error)]
pub enum FundRepoError {
    /// Business-rule or validation failure from the core fund logic.
    #[error(transparent)]
    Fund(#[from] caja_core::fund::FundError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl FundRepoError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Fund(err) => err.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Fund(err) => err.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// A fund together with its recomputed balance facts.
#[derive(Debug, Clone)]
pub struct FundOverview {
    /// The fund row.
    pub fund: funds::Model,
    /// Approved spend dated on/after the fund's date.
    pub consumed: Decimal,
    /// Remaining balance, clamped at zero.
    pub available: Decimal,
    /// Derived status.
    pub status: FundStatus,
}

/// Fund repository for ledger operations.
#[derive(Debug, Clone)]
pub struct FundRepository {
    db: DatabaseConnection,
}

impl FundRepository {
    /// Creates a new fund repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a cash injection.
    ///
    /// Deactivates every previously active fund and inserts the new entry
    /// as the single active one, inside one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or a database operation fails.
    pub async fn record_injection(&self, input: NewFund) -> Result<funds::Model, FundRepoError> {
        input.validate()?;

        let txn = self.db.begin().await?;

        // Only one fund may be active at a time.
        funds::Entity::update_many()
            .col_expr(funds::Column::IsActive, Expr::value(false))
            .col_expr(funds::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(funds::Column::IsActive.eq(true))
            .exec(&txn)
            .await?;

        let now = chrono::Utc::now().into();
        let entry = funds::ActiveModel {
            id: Set(Uuid::new_v4()),
            amount: Set(input.amount),
            fund_date: Set(input.fund_date),
            contributor: Set(input.contributor.trim().to_string()),
            received_by: Set(input.received_by.into_inner()),
            note: Set(input.note),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = entry.insert(&txn).await?;
        txn.commit().await?;

        Ok(created)
    }

    /// Returns the currently active fund, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_active(&self) -> Result<Option<funds::Model>, DbErr> {
        funds::Entity::find()
            .filter(funds::Column::IsActive.eq(true))
            .order_by_desc(funds::Column::CreatedAt)
            .limit(1)
            .one(&self.db)
            .await
    }

    /// Lists all funds (newest first) with their recomputed balances.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn list_with_balances(&self) -> Result<Vec<FundOverview>, DbErr> {
        let fund_rows = funds::Entity::find()
            .order_by_desc(funds::Column::FundDate)
            .order_by_desc(funds::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let debits = self.approved_debits().await?;

        Ok(fund_rows
            .into_iter()
            .map(|row| {
                let injection = FundInjection {
                    amount: row.amount,
                    fund_date: row.fund_date,
                };
                let consumed = fund::consumed_since(&injection, &debits);
                let available = fund::available_balance(&injection, &debits);
                let status = fund::fund_status(&injection, &debits);
                FundOverview {
                    fund: row,
                    consumed,
                    available,
                    status,
                }
            })
            .collect())
    }

    /// Global available balance: total injected minus total approved spend,
    /// clamped at zero.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn available_balance(&self) -> Result<Decimal, DbErr> {
        Ok(self.summary().await?.total_available)
    }

    /// Aggregate totals for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn summary(&self) -> Result<FundSummary, DbErr> {
        let fund_rows = funds::Entity::find().all(&self.db).await?;
        let debits = self.approved_debits().await?;

        let injections: Vec<FundInjection> = fund_rows
            .iter()
            .map(|row| FundInjection {
                amount: row.amount,
                fund_date: row.fund_date,
            })
            .collect();

        Ok(fund::summary(&injections, &debits))
    }

    /// Fetches every approved expense as a `(date, amount)` debit record.
    async fn approved_debits(&self) -> Result<Vec<ApprovedDebit>, DbErr> {
        let rows = expenses::Entity::find()
            .filter(expenses::Column::Status.eq(ExpenseStatus::Approved))
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ApprovedDebit {
                amount: row.amount,
                date: row.expense_date,
            })
            .collect())
    }
}
