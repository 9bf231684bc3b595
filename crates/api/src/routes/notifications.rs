//! Notification routes (the in-app bell).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::{error_json, internal_error};
use caja_core::notification::{NotificationKind, Priority};
use caja_db::NotificationRepository;

/// Creates the notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/{notification_id}/read", post(mark_read))
        .route("/notifications/read-all", post(mark_all_read))
}

/// Query parameters for listing notifications.
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    /// Maximum number of notifications to return.
    pub limit: Option<u64>,
}

const DEFAULT_LIMIT: u64 = 100;

/// GET /notifications - The caller's notifications, newest first.
async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListNotificationsQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(500);

    let repo = NotificationRepository::new((*state.db).clone());
    match repo.list_for_user(auth.user_id(), limit).await {
        Ok(rows) => {
            let items: Vec<_> = rows
                .into_iter()
                .map(|n| {
                    json!({
                        "id": n.id,
                        "kind": NotificationKind::from(&n.kind).as_str(),
                        "title": n.title,
                        "message": n.message,
                        "priority": Priority::from(&n.priority).as_str(),
                        "expense_id": n.expense_id,
                        "is_read": n.is_read,
                        "created_at": n.created_at.to_rfc3339(),
                    })
                })
                .collect();

            (StatusCode::OK, Json(json!({ "notifications": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list notifications");
            internal_error()
        }
    }
}

/// GET /notifications/unread-count - Badge counter for the bell.
async fn unread_count(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = NotificationRepository::new((*state.db).clone());
    match repo.unread_count(auth.user_id()).await {
        Ok(count) => (StatusCode::OK, Json(json!({ "unread": count }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to count unread notifications");
            internal_error()
        }
    }
}

/// POST /notifications/{notification_id}/read - Mark one as read.
async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = NotificationRepository::new((*state.db).clone());
    match repo.mark_read(notification_id, auth.user_id()).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => error_json(404, "NOT_FOUND", "No such notification"),
        Err(e) => {
            error!(error = %e, "Failed to mark notification read");
            internal_error()
        }
    }
}

/// POST /notifications/read-all - Mark everything as read.
async fn mark_all_read(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = NotificationRepository::new((*state.db).clone());
    match repo.mark_all_read(auth.user_id()).await {
        Ok(count) => (StatusCode::OK, Json(json!({ "marked_read": count }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to mark notifications read");
            internal_error()
        }
    }
}
