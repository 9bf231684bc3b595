//! String-backed database enums.
//!
//! Each enum mirrors a `caja-core` domain enum; the `From` impls keep the
//! two in lockstep so repositories never match on raw strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use caja_core::auth::Role;
use caja_core::expense::{Category, ExpenseStatus as CoreExpenseStatus, PaymentMethod as CorePaymentMethod};
use caja_core::notification::{NotificationKind as CoreNotificationKind, Priority};

/// User role column values.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access plus development tooling.
    #[sea_orm(string_value = "superadmin")]
    Superadmin,
    /// Full operational control.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Read-everything partner.
    #[sea_orm(string_value = "partner")]
    Partner,
    /// Basic operation.
    #[sea_orm(string_value = "employee")]
    Employee,
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Superadmin => Self::Superadmin,
            Role::Admin => Self::Admin,
            Role::Partner => Self::Partner,
            Role::Employee => Self::Employee,
        }
    }
}

impl From<&UserRole> for Role {
    fn from(role: &UserRole) -> Self {
        match role {
            UserRole::Superadmin => Self::Superadmin,
            UserRole::Admin => Self::Admin,
            UserRole::Partner => Self::Partner,
            UserRole::Employee => Self::Employee,
        }
    }
}

/// Expense status column values.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_status")]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    /// Awaiting an approver's decision.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved; debits the fund.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected with a reason.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl From<CoreExpenseStatus> for ExpenseStatus {
    fn from(status: CoreExpenseStatus) -> Self {
        match status {
            CoreExpenseStatus::Pending => Self::Pending,
            CoreExpenseStatus::Approved => Self::Approved,
            CoreExpenseStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<&ExpenseStatus> for CoreExpenseStatus {
    fn from(status: &ExpenseStatus) -> Self {
        match status {
            ExpenseStatus::Pending => Self::Pending,
            ExpenseStatus::Approved => Self::Approved,
            ExpenseStatus::Rejected => Self::Rejected,
        }
    }
}

/// Payment method column values.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash from the drawer.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Bank transfer.
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Digital wallet.
    #[sea_orm(string_value = "wallet")]
    Wallet,
    /// Debit or credit card.
    #[sea_orm(string_value = "card")]
    Card,
}

impl From<CorePaymentMethod> for PaymentMethod {
    fn from(method: CorePaymentMethod) -> Self {
        match method {
            CorePaymentMethod::Cash => Self::Cash,
            CorePaymentMethod::Transfer => Self::Transfer,
            CorePaymentMethod::Wallet => Self::Wallet,
            CorePaymentMethod::Card => Self::Card,
        }
    }
}

impl From<&PaymentMethod> for CorePaymentMethod {
    fn from(method: &PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::Transfer => Self::Transfer,
            PaymentMethod::Wallet => Self::Wallet,
            PaymentMethod::Card => Self::Card,
        }
    }
}

/// Expense category column values.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_category")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// Travel and transport.
    #[sea_orm(string_value = "transport")]
    Transport,
    /// Repairs and upkeep.
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    /// Cleaning supplies and services.
    #[sea_orm(string_value = "cleaning")]
    Cleaning,
    /// Office and stationery.
    #[sea_orm(string_value = "office")]
    Office,
    /// Food and refreshments.
    #[sea_orm(string_value = "food")]
    Food,
    /// Utilities and recurring services.
    #[sea_orm(string_value = "services")]
    Services,
    /// Supplier payments.
    #[sea_orm(string_value = "suppliers")]
    Suppliers,
    /// Everything else.
    #[sea_orm(string_value = "other")]
    Other,
}

impl From<Category> for ExpenseCategory {
    fn from(category: Category) -> Self {
        match category {
            Category::Transport => Self::Transport,
            Category::Maintenance => Self::Maintenance,
            Category::Cleaning => Self::Cleaning,
            Category::Office => Self::Office,
            Category::Food => Self::Food,
            Category::Services => Self::Services,
            Category::Suppliers => Self::Suppliers,
            Category::Other => Self::Other,
        }
    }
}

impl From<&ExpenseCategory> for Category {
    fn from(category: &ExpenseCategory) -> Self {
        match category {
            ExpenseCategory::Transport => Self::Transport,
            ExpenseCategory::Maintenance => Self::Maintenance,
            ExpenseCategory::Cleaning => Self::Cleaning,
            ExpenseCategory::Office => Self::Office,
            ExpenseCategory::Food => Self::Food,
            ExpenseCategory::Services => Self::Services,
            ExpenseCategory::Suppliers => Self::Suppliers,
            ExpenseCategory::Other => Self::Other,
        }
    }
}

/// Notification kind column values.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "notification_kind")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// New expense awaiting approval.
    #[sea_orm(string_value = "expense_pending")]
    ExpensePending,
    /// Expense approved.
    #[sea_orm(string_value = "expense_approved")]
    ExpenseApproved,
    /// Expense rejected.
    #[sea_orm(string_value = "expense_rejected")]
    ExpenseRejected,
}

impl From<CoreNotificationKind> for NotificationKind {
    fn from(kind: CoreNotificationKind) -> Self {
        match kind {
            CoreNotificationKind::ExpensePending => Self::ExpensePending,
            CoreNotificationKind::ExpenseApproved => Self::ExpenseApproved,
            CoreNotificationKind::ExpenseRejected => Self::ExpenseRejected,
        }
    }
}

impl From<&NotificationKind> for CoreNotificationKind {
    fn from(kind: &NotificationKind) -> Self {
        match kind {
            NotificationKind::ExpensePending => Self::ExpensePending,
            NotificationKind::ExpenseApproved => Self::ExpenseApproved,
            NotificationKind::ExpenseRejected => Self::ExpenseRejected,
        }
    }
}

/// Notification priority column values.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "notification_priority")]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    /// Routine information.
    #[sea_orm(string_value = "normal")]
    Normal,
    /// Needs attention.
    #[sea_orm(string_value = "high")]
    High,
}

impl From<Priority> for NotificationPriority {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Normal => Self::Normal,
            Priority::High => Self::High,
        }
    }
}

impl From<&NotificationPriority> for Priority {
    fn from(priority: &NotificationPriority) -> Self {
        match priority {
            NotificationPriority::Normal => Self::Normal,
            NotificationPriority::High => Self::High,
        }
    }
}
