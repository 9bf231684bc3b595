//! Authentication routes for login and token refresh.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use crate::routes::{error_json, internal_error};
use caja_core::auth::verify_password;
use caja_db::UserRepository;
use caja_shared::auth::{LoginRequest, LoginResponse, RefreshRequest, UserInfo};

/// Creates the auth router (public endpoints only; the profile endpoint
/// lives with the protected user routes).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

/// POST /auth/login - Authenticate user and return tokens.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_email(&payload.email.to_lowercase()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(email = %payload.email, "Login attempt for non-existent user");
            return error_json(
                401,
                "invalid_credentials",
                "Invalid email or password",
            );
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error();
        }
    };

    if !user.is_active {
        return error_json(401, "account_disabled", "This account has been disabled");
    }

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return error_json(
                401,
                "invalid_credentials",
                "Invalid email or password",
            );
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error();
        }
    }

    let role: caja_core::auth::Role = (&user.role).into();

    let access_token = match state.jwt_service.generate_access_token(user.id, role.as_str()) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error();
        }
    };

    let refresh_token = match state
        .jwt_service
        .generate_refresh_token(user.id, role.as_str())
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return internal_error();
        }
    };

    info!(user_id = %user.id, "User logged in successfully");

    let response = LoginResponse {
        user: UserInfo {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: role.as_str().to_string(),
        },
        access_token,
        refresh_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// POST /auth/refresh - Exchange a refresh token for a new token pair.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    let claims = match state.jwt_service.validate_token(&payload.refresh_token) {
        Ok(c) => c,
        Err(_) => {
            return error_json(401, "invalid_token", "Invalid or expired refresh token");
        }
    };

    // Re-check the account: the role may have changed or the user may have
    // been deactivated since the token was issued.
    let user_repo = UserRepository::new((*state.db).clone());
    let user = match user_repo.find_by_id(claims.user_id()).await {
        Ok(Some(u)) if u.is_active => u,
        Ok(_) => {
            return error_json(401, "account_disabled", "This account has been disabled");
        }
        Err(e) => {
            error!(error = %e, "Database error during token refresh");
            return internal_error();
        }
    };

    let role: caja_core::auth::Role = (&user.role).into();

    let access_token = match state.jwt_service.generate_access_token(user.id, role.as_str()) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error();
        }
    };

    let refresh_token = match state
        .jwt_service
        .generate_refresh_token(user.id, role.as_str())
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return internal_error();
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "access_token": access_token,
            "refresh_token": refresh_token,
            "expires_in": state.jwt_service.access_token_expires_in(),
        })),
    )
        .into_response()
}
