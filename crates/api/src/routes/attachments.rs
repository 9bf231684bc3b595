//! Receipt attachment routes.
//!
//! Clients upload and download receipts directly against presigned URLs;
//! the API only hands out URLs and records verified uploads.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::{app_error, error_json, internal_error};
use caja_core::auth::Capability;
use caja_shared::AppError;
use caja_core::storage::{ReceiptStorage, StorageError, UploadRequest};
use caja_db::repositories::attachment::CreateAttachmentInput;
use caja_db::repositories::expense::ExpenseRepository;
use caja_db::AttachmentRepository;

/// Creates the attachment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/expenses/{expense_id}/attachments/presign",
            post(presign_upload),
        )
        .route(
            "/expenses/{expense_id}/attachments/confirm",
            post(confirm_upload),
        )
        .route("/expenses/{expense_id}/attachments", get(list_attachments))
        .route("/attachments/{attachment_id}/download", get(presign_download))
}

/// Request body for presigning a receipt upload.
#[derive(Debug, Deserialize)]
pub struct PresignUploadRequest {
    /// Original filename.
    pub filename: String,
    /// MIME type of the receipt.
    pub content_type: String,
    /// File size in bytes.
    pub file_size: u64,
}

/// Request body for confirming a completed upload.
#[derive(Debug, Deserialize)]
pub struct ConfirmUploadRequest {
    /// The attachment ID handed out by the presign call.
    pub attachment_id: Uuid,
    /// The storage key handed out by the presign call.
    pub storage_key: String,
    /// Original filename.
    pub filename: String,
}

fn storage_or_unavailable(state: &AppState) -> Result<Arc<ReceiptStorage>, Response> {
    state.storage.clone().ok_or_else(|| {
        app_error(&AppError::StorageUnavailable(
            "Receipt storage is not configured".to_string(),
        ))
    })
}

fn storage_error_response(err: &StorageError) -> Response {
    match err {
        StorageError::FileTooLarge { .. } | StorageError::InvalidMimeType { .. } => {
            error_json(400, "VALIDATION_ERROR", &err.to_string())
        }
        StorageError::NotFound { .. } => error_json(404, "NOT_FOUND", &err.to_string()),
        _ => {
            error!(error = %err, "Storage operation failed");
            app_error(&AppError::StorageUnavailable(
                "Storage operation failed".to_string(),
            ))
        }
    }
}

/// Loads an expense and checks the caller may attach to / read it.
async fn load_owned_expense(
    state: &AppState,
    auth: &AuthUser,
    expense_id: Uuid,
) -> Result<caja_db::entities::expenses::Model, Response> {
    let expense_repo = ExpenseRepository::new((*state.db).clone());
    let expense = expense_repo
        .get(expense_id)
        .await
        .map_err(|err| error_json(err.status_code(), err.error_code(), &err.to_string()))?;

    if expense.user_id != auth.user_id() && !auth.can(Capability::ViewAllExpenses) {
        return Err(error_json(
            403,
            "forbidden",
            "Your role does not allow this operation",
        ));
    }

    Ok(expense)
}

/// POST /expenses/{expense_id}/attachments/presign - Get an upload URL.
async fn presign_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<PresignUploadRequest>,
) -> impl IntoResponse {
    let storage = match storage_or_unavailable(&state) {
        Ok(s) => s,
        Err(response) => return response,
    };
    if let Err(response) = load_owned_expense(&state, &auth, expense_id).await {
        return response;
    }

    let request = UploadRequest {
        uploaded_by: auth.user_id(),
        expense_id: Some(expense_id),
        attachment_id: Uuid::new_v4(),
        filename: payload.filename,
        content_type: payload.content_type,
        file_size: payload.file_size,
    };

    match storage.presign_upload(&request).await {
        Ok(presigned) => (
            StatusCode::OK,
            Json(json!({
                "attachment_id": request.attachment_id,
                "storage_key": ReceiptStorage::generate_storage_key(&request),
                "url": presigned.url,
                "method": presigned.method,
                "headers": presigned.headers,
                "expires_at": presigned.expires_at.to_rfc3339(),
            })),
        )
            .into_response(),
        Err(err) => storage_error_response(&err),
    }
}

/// POST /expenses/{expense_id}/attachments/confirm - Record a completed
/// upload after verifying it actually landed in storage.
async fn confirm_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ConfirmUploadRequest>,
) -> impl IntoResponse {
    let storage = match storage_or_unavailable(&state) {
        Ok(s) => s,
        Err(response) => return response,
    };
    if let Err(response) = load_owned_expense(&state, &auth, expense_id).await {
        return response;
    }

    let metadata = match storage.verify_upload(&payload.storage_key).await {
        Ok(m) => m,
        Err(err) => return storage_error_response(&err),
    };

    let attachment_repo = AttachmentRepository::new((*state.db).clone());
    let input = CreateAttachmentInput {
        id: payload.attachment_id,
        expense_id,
        uploaded_by: auth.user_id(),
        filename: payload.filename,
        storage_key: metadata.storage_key,
        content_type: metadata.content_type,
        file_size: i64::try_from(metadata.file_size).unwrap_or(i64::MAX),
    };

    match attachment_repo.create(input).await {
        Ok(attachment) => {
            info!(attachment_id = %attachment.id, expense_id = %expense_id, "Receipt recorded");
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": attachment.id,
                    "expense_id": attachment.expense_id,
                    "filename": attachment.filename,
                    "content_type": attachment.content_type,
                    "file_size": attachment.file_size,
                    "created_at": attachment.created_at.to_rfc3339(),
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to record attachment");
            internal_error()
        }
    }
}

/// GET /expenses/{expense_id}/attachments - List an expense's receipts.
async fn list_attachments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = load_owned_expense(&state, &auth, expense_id).await {
        return response;
    }

    let attachment_repo = AttachmentRepository::new((*state.db).clone());
    match attachment_repo.list_for_expense(expense_id).await {
        Ok(rows) => {
            let items: Vec<_> = rows
                .into_iter()
                .map(|a| {
                    json!({
                        "id": a.id,
                        "filename": a.filename,
                        "content_type": a.content_type,
                        "file_size": a.file_size,
                        "created_at": a.created_at.to_rfc3339(),
                    })
                })
                .collect();

            (StatusCode::OK, Json(json!({ "attachments": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list attachments");
            internal_error()
        }
    }
}

/// GET /attachments/{attachment_id}/download - Get a download URL.
async fn presign_download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(attachment_id): Path<Uuid>,
) -> impl IntoResponse {
    let storage = match storage_or_unavailable(&state) {
        Ok(s) => s,
        Err(response) => return response,
    };

    let attachment_repo = AttachmentRepository::new((*state.db).clone());
    let attachment = match attachment_repo.find_by_id(attachment_id).await {
        Ok(Some(a)) => a,
        Ok(None) => return error_json(404, "NOT_FOUND", "No such attachment"),
        Err(e) => {
            error!(error = %e, "Failed to load attachment");
            return internal_error();
        }
    };

    if let Err(response) = load_owned_expense(&state, &auth, attachment.expense_id).await {
        return response;
    }

    match storage.presign_download(&attachment.storage_key).await {
        Ok(presigned) => (
            StatusCode::OK,
            Json(json!({
                "url": presigned.url,
                "method": presigned.method,
                "expires_at": presigned.expires_at.to_rfc3339(),
            })),
        )
            .into_response(),
        Err(err) => storage_error_response(&err),
    }
}
