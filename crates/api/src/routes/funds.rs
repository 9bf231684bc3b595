//! Fund ledger routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::{error_json, internal_error};
use caja_core::auth::Capability;
use caja_core::fund::NewFund;
use caja_db::repositories::fund::{FundRepoError, FundRepository};
use caja_shared::types::{Money, UserId};
use caja_shared::types::money::Currency;

/// Creates the fund routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/funds", get(list_funds))
        .route("/funds", post(record_injection))
        .route("/funds/balance", get(available_balance))
        .route("/funds/summary", get(fund_summary))
}

/// Request body for recording a cash injection.
#[derive(Debug, Deserialize)]
pub struct RecordInjectionRequest {
    /// Injected amount as a decimal string.
    pub amount: String,
    /// The day the cash was received (YYYY-MM-DD).
    pub fund_date: NaiveDate,
    /// Who handed the cash over.
    pub contributor: String,
    /// Optional note.
    pub note: Option<String>,
}

/// POST /funds - Record a cash injection; deactivates the previous fund.
async fn record_injection(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<RecordInjectionRequest>,
) -> impl IntoResponse {
    if let Err(response) = auth.require(Capability::ManageFunds) {
        return response;
    }

    let Ok(amount) = Decimal::from_str(&payload.amount) else {
        return error_json(400, "VALIDATION_ERROR", "Amount must be a decimal number");
    };

    let input = NewFund {
        amount,
        fund_date: payload.fund_date,
        contributor: payload.contributor,
        received_by: UserId::from_uuid(auth.user_id()),
        note: payload.note,
    };

    let fund_repo = FundRepository::new((*state.db).clone());
    match fund_repo.record_injection(input).await {
        Ok(fund) => {
            info!(fund_id = %fund.id, amount = %fund.amount, "Fund injection recorded");
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": fund.id,
                    "amount": fund.amount,
                    "fund_date": fund.fund_date,
                    "contributor": fund.contributor,
                    "note": fund.note,
                    "is_active": fund.is_active,
                    "created_at": fund.created_at.to_rfc3339(),
                })),
            )
                .into_response()
        }
        Err(FundRepoError::Fund(e)) => error_json(e.status_code(), e.error_code(), &e.to_string()),
        Err(FundRepoError::Database(e)) => {
            error!(error = %e, "Failed to record fund injection");
            internal_error()
        }
    }
}

/// GET /funds - All funds with recomputed balances, newest first.
async fn list_funds(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(response) = auth.require(Capability::ViewReports) {
        return response;
    }

    let fund_repo = FundRepository::new((*state.db).clone());
    match fund_repo.list_with_balances().await {
        Ok(overviews) => {
            let items: Vec<_> = overviews
                .into_iter()
                .map(|o| {
                    json!({
                        "id": o.fund.id,
                        "amount": o.fund.amount,
                        "fund_date": o.fund.fund_date,
                        "contributor": o.fund.contributor,
                        "note": o.fund.note,
                        "consumed": o.consumed,
                        "available": o.available,
                        "status": o.status.as_str(),
                        "is_active": o.fund.is_active,
                        "created_at": o.fund.created_at.to_rfc3339(),
                    })
                })
                .collect();

            (StatusCode::OK, Json(json!({ "funds": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list funds");
            internal_error()
        }
    }
}

/// GET /funds/balance - Global available balance.
async fn available_balance(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let fund_repo = FundRepository::new((*state.db).clone());
    match fund_repo.available_balance().await {
        Ok(balance) => (
            StatusCode::OK,
            Json(json!({ "available": Money::new(balance, Currency::Ars) })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to compute available balance");
            internal_error()
        }
    }
}

/// GET /funds/summary - Aggregate totals for the dashboard.
async fn fund_summary(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(response) = auth.require(Capability::ViewReports) {
        return response;
    }

    let fund_repo = FundRepository::new((*state.db).clone());
    match fund_repo.summary().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "total_injected": Money::new(summary.total_injected, Currency::Ars),
                "total_spent": Money::new(summary.total_spent, Currency::Ars),
                "total_available": Money::new(summary.total_available, Currency::Ars),
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to compute fund summary");
            internal_error()
        }
    }
}
