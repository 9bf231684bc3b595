//! Initial database migration.
//!
//! Creates all enums, tables, and indexes. Every query the repositories
//! filter or sort by has a declared index here; the application never
//! re-sorts defensively.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(FUNDS_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;
        db.execute_unprepared(ATTACHMENTS_SQL).await?;
        db.execute_unprepared(NOTIFICATIONS_SQL).await?;
        db.execute_unprepared(INDEXES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM (
    'superadmin',
    'admin',
    'partner',
    'employee'
);

CREATE TYPE expense_status AS ENUM (
    'pending',
    'approved',
    'rejected'
);

CREATE TYPE payment_method AS ENUM (
    'cash',
    'transfer',
    'wallet',
    'card'
);

CREATE TYPE expense_category AS ENUM (
    'transport',
    'maintenance',
    'cleaning',
    'office',
    'food',
    'services',
    'suppliers',
    'other'
);

CREATE TYPE notification_kind AS ENUM (
    'expense_pending',
    'expense_approved',
    'expense_rejected'
);

CREATE TYPE notification_priority AS ENUM (
    'normal',
    'high'
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    role user_role NOT NULL DEFAULT 'employee',
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const FUNDS_SQL: &str = r"
CREATE TABLE funds (
    id UUID PRIMARY KEY,
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    fund_date DATE NOT NULL,
    contributor VARCHAR(255) NOT NULL,
    received_by UUID NOT NULL REFERENCES users(id),
    note TEXT,
    is_active BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- At most one active fund at any time.
CREATE UNIQUE INDEX idx_funds_single_active ON funds (is_active) WHERE is_active;
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id),
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    expense_date DATE NOT NULL,
    payment_method payment_method NOT NULL,
    category expense_category NOT NULL,
    description TEXT NOT NULL,
    status expense_status NOT NULL DEFAULT 'pending',
    admin_comment TEXT,
    fund_id UUID REFERENCES funds(id),
    approved_by UUID REFERENCES users(id),
    resolved_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    -- Terminal rows carry their resolution facts.
    CONSTRAINT chk_approved_has_fund CHECK (
        status <> 'approved' OR (fund_id IS NOT NULL AND approved_by IS NOT NULL)
    )
);
";

const ATTACHMENTS_SQL: &str = r"
CREATE TABLE attachments (
    id UUID PRIMARY KEY,
    expense_id UUID NOT NULL REFERENCES expenses(id) ON DELETE CASCADE,
    uploaded_by UUID NOT NULL REFERENCES users(id),
    filename VARCHAR(255) NOT NULL,
    storage_key VARCHAR(1024) NOT NULL UNIQUE,
    content_type VARCHAR(255),
    file_size BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const NOTIFICATIONS_SQL: &str = r"
CREATE TABLE notifications (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    expense_id UUID REFERENCES expenses(id) ON DELETE SET NULL,
    kind notification_kind NOT NULL,
    title VARCHAR(255) NOT NULL,
    message TEXT NOT NULL,
    priority notification_priority NOT NULL DEFAULT 'normal',
    is_read BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const INDEXES_SQL: &str = r"
-- Expense listings: by date, by status+date, by user+date.
CREATE INDEX idx_expenses_date ON expenses (expense_date DESC, created_at DESC);
CREATE INDEX idx_expenses_status_date ON expenses (status, expense_date DESC);
CREATE INDEX idx_expenses_user_date ON expenses (user_id, expense_date DESC);

-- Fund listings.
CREATE INDEX idx_funds_date ON funds (fund_date DESC, created_at DESC);

-- Notification bell: per-user listing and unread count.
CREATE INDEX idx_notifications_user_created ON notifications (user_id, created_at DESC);
CREATE INDEX idx_notifications_user_unread ON notifications (user_id) WHERE NOT is_read;

-- Receipts per expense.
CREATE INDEX idx_attachments_expense ON attachments (expense_id, created_at);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS notifications CASCADE;
DROP TABLE IF EXISTS attachments CASCADE;
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS funds CASCADE;
DROP TABLE IF EXISTS users CASCADE;

DROP TYPE IF EXISTS notification_priority;
DROP TYPE IF EXISTS notification_kind;
DROP TYPE IF EXISTS expense_category;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS expense_status;
DROP TYPE IF EXISTS user_role;
";
