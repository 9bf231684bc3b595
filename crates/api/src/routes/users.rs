//! User management routes (admin-gated) and the profile endpoint.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::{error_json, internal_error};
use caja_core::auth::{Capability, Role, hash_password};
use caja_db::UserRepository;
use caja_shared::auth::CreateUserRequest;

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/users", get(list_users))
        .route("/users", post(create_user))
}

/// GET /auth/me - Current user profile and capabilities.
async fn me(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_id(auth.user_id()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return error_json(404, "NOT_FOUND", "User no longer exists");
        }
        Err(e) => {
            error!(error = %e, "Database error fetching profile");
            return internal_error();
        }
    };

    let capabilities: Vec<_> = auth.capabilities().iter().collect();

    (
        StatusCode::OK,
        Json(json!({
            "id": user.id,
            "email": user.email,
            "full_name": user.full_name,
            "role": auth.role().as_str(),
            "capabilities": capabilities,
        })),
    )
        .into_response()
}

/// GET /users - List all users.
async fn list_users(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(response) = auth.require(Capability::ManageUsers) {
        return response;
    }

    let user_repo = UserRepository::new((*state.db).clone());
    match user_repo.list().await {
        Ok(users) => {
            let items: Vec<_> = users
                .into_iter()
                .map(|u| {
                    json!({
                        "id": u.id,
                        "email": u.email,
                        "full_name": u.full_name,
                        "role": Role::from(&u.role).as_str(),
                        "is_active": u.is_active,
                        "created_at": u.created_at.to_rfc3339(),
                    })
                })
                .collect();

            (StatusCode::OK, Json(json!({ "users": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list users");
            internal_error()
        }
    }
}

/// POST /users - Create a user with a role.
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> impl IntoResponse {
    if let Err(response) = auth.require(Capability::ManageUsers) {
        return response;
    }

    let Some(role) = Role::parse(&payload.role) else {
        return error_json(400, "VALIDATION_ERROR", "Unknown role");
    };

    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return error_json(400, "VALIDATION_ERROR", "A valid email is required");
    }
    if payload.password.len() < 8 {
        return error_json(
            400,
            "VALIDATION_ERROR",
            "Password must be at least 8 characters",
        );
    }

    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.email_exists(&payload.email.to_lowercase()).await {
        Ok(true) => {
            return error_json(409, "CONFLICT", "Email is already registered");
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking email");
            return internal_error();
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error();
        }
    };

    match user_repo
        .create(&payload.email, &password_hash, &payload.full_name, role)
        .await
    {
        Ok(user) => {
            info!(user_id = %user.id, role = %role, "User created");
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": user.id,
                    "email": user.email,
                    "full_name": user.full_name,
                    "role": role.as_str(),
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create user");
            internal_error()
        }
    }
}
