//! Reporting routes: read-side aggregates over expense snapshots.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::{error_json, internal_error};
use caja_core::auth::Capability;
use caja_core::reports::{
    self, ExpenseSnapshot, ReportPeriod,
};
use caja_db::repositories::expense::ExpenseRepository;

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/categories", get(by_category))
        .route("/reports/monthly", get(monthly))
        .route("/reports/trend", get(trend))
        .route("/reports/summary", get(summary))
}

/// Query parameters for the category report.
#[derive(Debug, Deserialize)]
pub struct CategoryReportQuery {
    /// Reporting window (month, quarter, semester, year). Defaults to month.
    pub period: Option<String>,
}

/// Query parameters for the trend report.
#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    /// Trailing window length in days (default 30, max 365).
    pub days: Option<u32>,
}

async fn snapshots(state: &AppState) -> Result<Vec<ExpenseSnapshot>, Response> {
    let expense_repo = ExpenseRepository::new((*state.db).clone());
    expense_repo.report_snapshots().await.map_err(|e| {
        error!(error = %e, "Failed to load expense snapshots");
        internal_error()
    })
}

/// GET /reports/categories - Approved spend by category within a period.
async fn by_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<CategoryReportQuery>,
) -> impl IntoResponse {
    if let Err(response) = auth.require(Capability::ViewReports) {
        return response;
    }

    let period = match query.period.as_deref() {
        None => ReportPeriod::Month,
        Some(p) => match ReportPeriod::parse(p) {
            Some(parsed) => parsed,
            None => return error_json(400, "VALIDATION_ERROR", "Unknown report period"),
        },
    };

    let rows = match snapshots(&state).await {
        Ok(rows) => rows,
        Err(response) => return response,
    };

    let today = chrono::Utc::now().date_naive();
    let in_period = reports::filter_by_period(&rows, period, today);
    let totals = reports::totals_by_category(&in_period);

    let items: Vec<_> = totals
        .into_iter()
        .map(|t| {
            json!({
                "category": t.category.as_str(),
                "total": t.total,
                "count": t.count,
            })
        })
        .collect();

    (StatusCode::OK, Json(json!({ "categories": items }))).into_response()
}

/// GET /reports/monthly - Last six months broken down by status.
async fn monthly(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(response) = auth.require(Capability::ViewReports) {
        return response;
    }

    let rows = match snapshots(&state).await {
        Ok(rows) => rows,
        Err(response) => return response,
    };

    let today = chrono::Utc::now().date_naive();
    let months: Vec<_> = reports::monthly_breakdown(&rows, today)
        .into_iter()
        .map(|m| {
            json!({
                "year": m.year,
                "month": m.month,
                "pending": m.pending,
                "approved": m.approved,
                "rejected": m.rejected,
                "total": m.total,
            })
        })
        .collect();

    (StatusCode::OK, Json(json!({ "months": months }))).into_response()
}

/// GET /reports/trend - Daily approved spend with a 7-day moving average.
async fn trend(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<TrendQuery>,
) -> impl IntoResponse {
    if let Err(response) = auth.require(Capability::ViewReports) {
        return response;
    }

    let days = query.days.unwrap_or(30).clamp(1, 365);

    let rows = match snapshots(&state).await {
        Ok(rows) => rows,
        Err(response) => return response,
    };

    let today = chrono::Utc::now().date_naive();
    let points: Vec<_> = reports::daily_trend(&rows, days, today)
        .into_iter()
        .map(|p| {
            json!({
                "date": p.date,
                "amount": p.amount,
                "moving_average": p.moving_average,
            })
        })
        .collect();

    (StatusCode::OK, Json(json!({ "trend": points }))).into_response()
}

/// GET /reports/summary - Month-over-month summary statistics.
async fn summary(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(response) = auth.require(Capability::ViewReports) {
        return response;
    }

    let rows = match snapshots(&state).await {
        Ok(rows) => rows,
        Err(response) => return response,
    };

    let today = chrono::Utc::now().date_naive();
    let stats = reports::summary_stats(&rows, today);

    (
        StatusCode::OK,
        Json(json!({
            "current_month_total": stats.current_month_total,
            "previous_month_total": stats.previous_month_total,
            "change_percent": stats.change_percent,
            "expense_count": stats.expense_count,
            "average_expense": stats.average_expense,
            "top_category": stats.top_category.map(|(category, total)| json!({
                "category": category.as_str(),
                "total": total,
            })),
        })),
    )
        .into_response()
}
