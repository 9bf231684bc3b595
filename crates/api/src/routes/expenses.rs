//! Expense routes: submission, listing, approval, rejection.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use std::str::FromStr;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::{error_json, internal_error};
use caja_core::auth::{Capability, Role};
use caja_core::expense::{Category, ExpenseError, NewExpense, PaymentMethod};
use caja_core::notification::NotificationMessage;
use caja_db::repositories::expense::{ExpenseFilter, ExpenseRepoError, ExpenseRepository};
use caja_db::{NotificationRepository, UserRepository};
use caja_db::entities::expenses;
use caja_shared::types::{PageRequest, PageResponse, UserId};

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses))
        .route("/expenses", post(submit_expense))
        .route("/expenses/{expense_id}", get(get_expense))
        .route("/expenses/{expense_id}/approve", post(approve_expense))
        .route("/expenses/{expense_id}/reject", post(reject_expense))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting an expense.
#[derive(Debug, Deserialize)]
pub struct SubmitExpenseRequest {
    /// Claimed amount as a decimal string.
    pub amount: String,
    /// The day the money was spent (YYYY-MM-DD).
    pub expense_date: NaiveDate,
    /// Payment method (cash, transfer, wallet, card).
    pub payment_method: String,
    /// Category from the fixed list.
    pub category: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
}

/// Query parameters for listing expenses.
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    /// Filter by status.
    pub status: Option<String>,
    /// Filter by category.
    pub category: Option<String>,
    /// Filter by submitting user (needs the view-all capability).
    pub user: Option<Uuid>,
    /// Filter by date range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Filter by date range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default 20, max 100).
    pub per_page: Option<u32>,
}

/// Request body for approving an expense.
#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    /// Optional comment from the approver.
    pub comment: Option<String>,
}

/// Request body for rejecting an expense.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Reason for rejection (required, non-empty).
    pub reason: String,
}

fn expense_to_json(expense: &expenses::Model) -> Value {
    json!({
        "id": expense.id,
        "user_id": expense.user_id,
        "amount": expense.amount,
        "expense_date": expense.expense_date,
        "payment_method": caja_core::expense::PaymentMethod::from(&expense.payment_method).as_str(),
        "category": Category::from(&expense.category).as_str(),
        "description": expense.description,
        "status": caja_core::expense::ExpenseStatus::from(&expense.status).as_str(),
        "admin_comment": expense.admin_comment,
        "fund_id": expense.fund_id,
        "approved_by": expense.approved_by,
        "resolved_at": expense.resolved_at.map(|t| t.to_rfc3339()),
        "created_at": expense.created_at.to_rfc3339(),
    })
}

fn repo_error_response(err: &ExpenseRepoError) -> Response {
    match err {
        ExpenseRepoError::Database(e) => {
            error!(error = %e, "Expense operation failed");
            internal_error()
        }
        other => error_json(other.status_code(), other.error_code(), &other.to_string()),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /expenses - Submit a new expense claim.
async fn submit_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SubmitExpenseRequest>,
) -> impl IntoResponse {
    if let Err(response) = auth.require(Capability::SubmitExpenses) {
        return response;
    }

    let Ok(amount) = Decimal::from_str(&payload.amount) else {
        return error_json(400, "VALIDATION_ERROR", "Amount must be a decimal number");
    };
    let Some(payment_method) = PaymentMethod::parse(&payload.payment_method) else {
        let err = ExpenseError::UnknownPaymentMethod(payload.payment_method);
        return error_json(err.status_code(), err.error_code(), &err.to_string());
    };
    let Some(category) = Category::parse(&payload.category) else {
        let err = ExpenseError::UnknownCategory(payload.category);
        return error_json(err.status_code(), err.error_code(), &err.to_string());
    };

    let input = NewExpense {
        user_id: UserId::from_uuid(auth.user_id()),
        amount,
        expense_date: payload.expense_date,
        payment_method,
        category,
        description: payload.description,
    };

    let expense_repo = ExpenseRepository::new((*state.db).clone());
    let expense = match expense_repo.create(input).await {
        Ok(e) => e,
        Err(err) => return repo_error_response(&err),
    };

    info!(expense_id = %expense.id, amount = %expense.amount, "Expense submitted");

    notify_approvers(&state, &expense, auth.user_id()).await;

    (StatusCode::CREATED, Json(expense_to_json(&expense))).into_response()
}

/// GET /expenses - List expenses.
///
/// Callers without the view-all capability only ever see their own claims.
async fn list_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListExpensesQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        None => None,
        Some(s) => match caja_core::expense::ExpenseStatus::parse(s) {
            Some(parsed) => Some(parsed.into()),
            None => return error_json(400, "VALIDATION_ERROR", "Unknown status filter"),
        },
    };
    let category = match query.category.as_deref() {
        None => None,
        Some(c) => match Category::parse(c) {
            Some(parsed) => Some(parsed.into()),
            None => return error_json(400, "VALIDATION_ERROR", "Unknown category filter"),
        },
    };

    let user_id = if auth.can(Capability::ViewAllExpenses) {
        query.user
    } else {
        Some(auth.user_id())
    };

    let filter = ExpenseFilter {
        status,
        category,
        user_id,
        date_from: query.from,
        date_to: query.to,
    };

    let page = PageRequest {
        page: query.page.unwrap_or(1).max(1),
        per_page: query.per_page.unwrap_or(20).clamp(1, 100),
    };

    let expense_repo = ExpenseRepository::new((*state.db).clone());
    match expense_repo.list(filter, &page).await {
        Ok((rows, total)) => {
            let items: Vec<Value> = rows.iter().map(expense_to_json).collect();
            let response = PageResponse::new(items, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list expenses");
            internal_error()
        }
    }
}

/// GET /expenses/{expense_id} - Fetch one expense.
async fn get_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
) -> impl IntoResponse {
    let expense_repo = ExpenseRepository::new((*state.db).clone());
    let expense = match expense_repo.get(expense_id).await {
        Ok(e) => e,
        Err(err) => return repo_error_response(&err),
    };

    if expense.user_id != auth.user_id() && !auth.can(Capability::ViewAllExpenses) {
        return error_json(403, "forbidden", "Your role does not allow this operation");
    }

    (StatusCode::OK, Json(expense_to_json(&expense))).into_response()
}

/// POST /expenses/{expense_id}/approve - Approve a pending expense.
///
/// Runs the serializable approve transaction; on success the active fund
/// has been debited atomically with the status change.
async fn approve_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ApproveRequest>,
) -> impl IntoResponse {
    if let Err(response) = auth.require(Capability::ApproveExpenses) {
        return response;
    }

    let expense_repo = ExpenseRepository::new((*state.db).clone());
    let outcome = match expense_repo
        .approve(expense_id, auth.user_id(), payload.comment)
        .await
    {
        Ok(o) => o,
        Err(err) => return repo_error_response(&err),
    };

    info!(
        expense_id = %expense_id,
        fund_id = %outcome.fund_id,
        remaining = %outcome.remaining_balance,
        "Expense approved"
    );

    let message = NotificationMessage::expense_approved(
        outcome.expense.amount,
        &outcome.expense.description,
        outcome.expense.admin_comment.as_deref(),
    );
    notify_user(&state, outcome.expense.user_id, Some(expense_id), &message).await;

    (
        StatusCode::OK,
        Json(json!({
            "fund_debited": true,
            "remaining_balance": outcome.remaining_balance,
            "expense": expense_to_json(&outcome.expense),
        })),
    )
        .into_response()
}

/// POST /expenses/{expense_id}/reject - Reject a pending expense.
///
/// Never touches the fund ledger.
async fn reject_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> impl IntoResponse {
    if let Err(response) = auth.require(Capability::RejectExpenses) {
        return response;
    }

    let expense_repo = ExpenseRepository::new((*state.db).clone());
    let expense = match expense_repo
        .reject(expense_id, auth.user_id(), payload.reason.clone())
        .await
    {
        Ok(e) => e,
        Err(err) => return repo_error_response(&err),
    };

    info!(expense_id = %expense_id, "Expense rejected");

    let message =
        NotificationMessage::expense_rejected(expense.amount, &expense.description, &payload.reason);
    notify_user(&state, expense.user_id, Some(expense_id), &message).await;

    (StatusCode::OK, Json(expense_to_json(&expense))).into_response()
}

// ============================================================================
// Notification fan-out (best-effort)
// ============================================================================

/// Notifies all approval-capable users about a new pending expense.
///
/// Failures are logged and swallowed; the submission has already committed
/// and must not be affected.
async fn notify_approvers(state: &AppState, expense: &expenses::Model, submitter: Uuid) {
    let user_repo = UserRepository::new((*state.db).clone());

    let submitter_name = match user_repo.find_by_id(submitter).await {
        Ok(Some(user)) => user.full_name,
        _ => "A user".to_string(),
    };

    let approvers = match user_repo.list_by_roles(Role::approval_roles()).await {
        Ok(users) => users,
        Err(e) => {
            warn!(error = %e, "Failed to list approvers for notification fan-out");
            return;
        }
    };

    let message = NotificationMessage::expense_pending(
        &submitter_name,
        expense.amount,
        &expense.description,
    );
    let recipients: Vec<Uuid> = approvers.iter().map(|u| u.id).collect();

    let notification_repo = NotificationRepository::new((*state.db).clone());
    if let Err(e) = notification_repo
        .notify_all(&recipients, Some(expense.id), &message)
        .await
    {
        warn!(error = %e, expense_id = %expense.id, "Notification fan-out failed");
    }
}

/// Notifies one user; failures are logged and swallowed.
async fn notify_user(
    state: &AppState,
    recipient: Uuid,
    expense_id: Option<Uuid>,
    message: &NotificationMessage,
) {
    let notification_repo = NotificationRepository::new((*state.db).clone());
    if let Err(e) = notification_repo.create(recipient, expense_id, message).await {
        warn!(error = %e, recipient = %recipient, "Failed to store notification");
    }
}
