//! Account management routes.
//!
//! CRUD over account records plus the profile-photo upload endpoint. All
//! responses use the `{"success": bool, "data": ...}` envelope.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use atrium_core::account::{
    AccountError, AccountPatch, AccountStore, CreateAccountInput,
};
use atrium_core::profile::{Caller, PhotoUpload, ProfileError, ProfileService};
use atrium_core::storage::StorageError;
use atrium_db::AccountRepository;
use atrium_shared::Role;

/// Creates the account routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{account_id}",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route("/accounts/{account_id}/photo", put(upload_photo))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Email address (unique).
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Plaintext password; hashed before persistence, never echoed back.
    pub password: String,
    /// Role: `user` (default) or `admin`.
    #[serde(default)]
    pub role: Option<String>,
}

/// Request body for updating an account.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// New email address.
    pub email: Option<String>,
    /// New display name.
    pub full_name: Option<String>,
    /// New role: `user` or `admin`.
    pub role: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn account_store(state: &AppState) -> AccountStore<AccountRepository> {
    let repo = AccountRepository::new((*state.db).clone());
    AccountStore::new(Arc::new(repo))
}

fn profile_service(state: &AppState) -> ProfileService<AccountRepository> {
    let repo = AccountRepository::new((*state.db).clone());
    ProfileService::new(state.storage.clone(), Arc::new(repo))
}

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": error,
            "message": message.into()
        })),
    )
        .into_response()
}

/// Admin gate for the record CRUD routes.
fn require_admin(auth: &AuthUser) -> Result<(), Response> {
    if auth.role().is_admin() {
        Ok(())
    } else {
        Err(error_response(
            StatusCode::FORBIDDEN,
            "forbidden",
            "Administrator access required",
        ))
    }
}

fn parse_role(s: Option<&str>) -> Result<Role, Response> {
    match s {
        None => Ok(Role::User),
        Some(s) => Role::parse(s).ok_or_else(|| {
            error_response(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("unknown role: {s}"),
            )
        }),
    }
}

fn account_error_response(e: &AccountError) -> Response {
    match e {
        AccountError::NotFound(id) => error_response(
            StatusCode::NOT_FOUND,
            "account_not_found",
            format!("No account with the id of {id}"),
        ),
        AccountError::Validation(msg) => {
            error_response(StatusCode::BAD_REQUEST, "validation_error", msg.clone())
        }
        AccountError::Conflict(msg) => {
            error_response(StatusCode::CONFLICT, "conflict", msg.clone())
        }
        AccountError::Repository(_) | AccountError::Internal(_) => {
            error!(error = %e, "account operation failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An error occurred",
            )
        }
    }
}

fn profile_error_response(e: &ProfileError) -> Response {
    match e {
        ProfileError::AccountNotFound(id) => error_response(
            StatusCode::NOT_FOUND,
            "account_not_found",
            format!("No account with the id of {id}"),
        ),
        ProfileError::NotOwner { account_id, caller } => error_response(
            StatusCode::UNAUTHORIZED,
            "not_authorized",
            format!("Caller {caller} is not authorized to update profile {account_id}"),
        ),
        ProfileError::EmptyUpload => error_response(
            StatusCode::BAD_REQUEST,
            "no_file_uploaded",
            "Please upload a file",
        ),
        ProfileError::Storage(storage_err) => match storage_err {
            StorageError::InvalidMimeType { .. } | StorageError::FileTooLarge { .. } => {
                error_response(
                    StatusCode::BAD_REQUEST,
                    "invalid_upload",
                    storage_err.to_string(),
                )
            }
            _ => {
                error!(error = %storage_err, "storage operation failed");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error",
                    "Storage operation failed",
                )
            }
        },
        ProfileError::Account(inner) => account_error_response(inner),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/accounts` - List all accounts (admin only).
async fn list_accounts(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    match account_store(&state).list().await {
        Ok(views) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": views }))).into_response()
        }
        Err(e) => account_error_response(&e),
    }
}

/// GET `/accounts/{account_id}` - Fetch a single account (admin only).
async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<Uuid>,
) -> Response {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    match account_store(&state).get(account_id).await {
        Ok(view) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": view }))).into_response()
        }
        Err(e) => account_error_response(&e),
    }
}

/// POST `/accounts` - Create an account (admin only).
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateAccountRequest>,
) -> Response {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let role = match parse_role(payload.role.as_deref()) {
        Ok(role) => role,
        Err(response) => return response,
    };

    let input = CreateAccountInput {
        email: payload.email,
        full_name: payload.full_name,
        password: payload.password,
        role,
    };

    match account_store(&state).create(input).await {
        Ok(view) => {
            info!(account_id = %view.id, "account created");
            (
                StatusCode::CREATED,
                Json(json!({ "success": true, "data": view })),
            )
                .into_response()
        }
        Err(e) => account_error_response(&e),
    }
}

/// PUT `/accounts/{account_id}` - Apply a partial update (admin only).
async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<UpdateAccountRequest>,
) -> Response {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let role = match payload.role.as_deref() {
        None => None,
        Some(s) => match parse_role(Some(s)) {
            Ok(role) => Some(role),
            Err(response) => return response,
        },
    };

    // The photo reference is only ever swapped by the photo endpoint.
    let patch = AccountPatch {
        email: payload.email,
        full_name: payload.full_name,
        role,
        is_active: payload.is_active,
        photo_key: None,
    };

    match account_store(&state).patch(account_id, patch).await {
        Ok(view) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": view }))).into_response()
        }
        Err(e) => account_error_response(&e),
    }
}

/// DELETE `/accounts/{account_id}` - Delete an account and its photo (admin only).
///
/// Photo cleanup runs before the record delete and never blocks it.
async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<Uuid>,
) -> Response {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    match profile_service(&state).delete_account(account_id).await {
        Ok(()) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": {} }))).into_response()
        }
        Err(e) => profile_error_response(&e),
    }
}

/// PUT `/accounts/{account_id}/photo` - Upload a profile photo (owner or admin).
async fn upload_photo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<Uuid>,
    multipart: Multipart,
) -> Response {
    let upload = match read_photo_field(multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    let caller = Caller {
        id: auth.account_id(),
        role: auth.role(),
    };

    match profile_service(&state)
        .replace_photo(account_id, caller, upload)
        .await
    {
        Ok(key) => {
            (StatusCode::OK, Json(json!({ "success": true, "data": key }))).into_response()
        }
        Err(e) => profile_error_response(&e),
    }
}

/// Pull the first file field out of the multipart body.
///
/// A missing file field maps to the same 400 as an empty payload; the
/// byte-level emptiness check itself belongs to the profile service.
async fn read_photo_field(mut multipart: Multipart) -> Result<PhotoUpload, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    "no_file_uploaded",
                    "Please upload a file",
                ));
            }
            Err(e) => {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    "invalid_multipart",
                    e.to_string(),
                ));
            }
        };

        let Some(filename) = field.file_name().map(String::from) else {
            continue;
        };
        let content_type = field
            .content_type()
            .map_or_else(|| "application/octet-stream".to_string(), String::from);

        let bytes = field.bytes().await.map_err(|e| {
            error_response(StatusCode::BAD_REQUEST, "invalid_multipart", e.to_string())
        })?;

        return Ok(PhotoUpload {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role(None).unwrap(), Role::User);
        assert_eq!(parse_role(Some("admin")).unwrap(), Role::Admin);
        assert_eq!(parse_role(Some("user")).unwrap(), Role::User);
        assert!(parse_role(Some("root")).is_err());
    }

    #[test]
    fn test_error_status_mapping() {
        let not_found = account_error_response(&AccountError::NotFound(Uuid::new_v4()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let validation = account_error_response(&AccountError::validation("bad email"));
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let conflict = account_error_response(&AccountError::conflict("dup"));
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let not_owner = profile_error_response(&ProfileError::NotOwner {
            account_id: Uuid::new_v4(),
            caller: Uuid::new_v4(),
        });
        assert_eq!(not_owner.status(), StatusCode::UNAUTHORIZED);

        let empty = profile_error_response(&ProfileError::EmptyUpload);
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

        let upload_failed = profile_error_response(&ProfileError::Storage(
            StorageError::upload_failed("images/k", "connection reset"),
        ));
        assert_eq!(upload_failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
