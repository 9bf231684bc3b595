//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, middleware::auth::auth_middleware};
use caja_shared::AppError;

pub mod attachments;
pub mod auth;
pub mod expenses;
pub mod funds;
pub mod health;
pub mod notifications;
pub mod reports;
pub mod users;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(users::routes())
        .merge(funds::routes())
        .merge(expenses::routes())
        .merge(notifications::routes())
        .merge(attachments::routes())
        .merge(reports::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

/// Builds a JSON error response in the standard shape.
pub(crate) fn error_json(status: u16, code: &str, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({ "error": code, "message": message })),
    )
        .into_response()
}

/// Renders an application error with its canonical status and code.
pub(crate) fn app_error(err: &AppError) -> Response {
    error_json(err.status_code(), err.error_code(), &err.to_string())
}

/// The catch-all response for unexpected database failures.
pub(crate) fn internal_error() -> Response {
    app_error(&AppError::Internal("An internal error occurred".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_json_status() {
        let response = error_json(422, "INSUFFICIENT_FUNDS", "not enough");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_error_json_bad_status_falls_back() {
        let response = error_json(9999, "X", "y");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_app_error_uses_canonical_status() {
        let err = AppError::NoActiveFund("register a fund injection first".into());
        let response = app_error(&err);
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
