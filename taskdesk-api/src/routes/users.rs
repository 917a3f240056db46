/// User management endpoints
///
/// # Endpoints
///
/// - `GET /v1/user/profile` - Current user's profile
/// - `PUT /v1/user/:id/update-profile` - Update a user (admin)
/// - `DELETE /v1/user/:id/delete` - Soft-delete a user (admin)
/// - `POST /v1/user/restore` - Restore a deleted user by email (admin)
///
/// Admin denials here are 400s with the contract's wording, not 403s.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::success,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskdesk_shared::{
    auth::{middleware::AuthContext, policy},
    models::user::{User, UserPatch},
};
use uuid::Uuid;

const PERMISSION_DENIED: &str = "This user can't access to this permission";

/// Restore request, keyed by email since the row is soft-deleted
#[derive(Debug, Deserialize)]
pub struct RestoreUserRequest {
    pub email: String,
}

/// Returns the authenticated user's profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let user = User::find_by_id(&state.db, actor.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not Found This User".to_string()))?;

    Ok(success(
        StatusCode::OK,
        "profile",
        json!({ "name": user.name, "email": user.email }),
    ))
}

/// Updates a user's profile (admin only)
///
/// # Errors
///
/// - `404 "Not Found This User"`: No live user with that ID
/// - `400`: Actor is not an admin
/// - `404 "Not Found Data in Request!"`: Patch had no usable fields
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<UserPatch>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not Found This User".to_string()))?;

    policy::require_admin(&actor)
        .map_err(|_| ApiError::BadRequest(PERMISSION_DENIED.to_string()))?;

    let patch = patch.normalized();
    if patch.is_empty() {
        return Err(ApiError::NotFound("Not Found Data in Request!".to_string()));
    }

    User::update_profile(&state.db, id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not Found This User".to_string()))?;

    Ok(success(
        StatusCode::OK,
        "msg",
        json!("Updated user successfully"),
    ))
}

/// Soft-deletes a user (admin only)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not Found This User".to_string()))?;

    policy::require_admin(&actor)
        .map_err(|_| ApiError::BadRequest(PERMISSION_DENIED.to_string()))?;

    User::soft_delete(&state.db, id).await?;

    Ok(success(
        StatusCode::OK,
        "msg",
        json!("Deleted user successfully"),
    ))
}

/// Restores a soft-deleted user by email (admin only)
///
/// # Errors
///
/// - `400`: Actor is not an admin
/// - `404 "User Not Found"`: No user with that email at all
/// - `400 "This user isn't deleted"`: User exists but is live
pub async fn restore_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthContext>,
    Json(req): Json<RestoreUserRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    policy::require_admin(&actor)
        .map_err(|_| ApiError::BadRequest(PERMISSION_DENIED.to_string()))?;

    let user = User::find_by_email_with_deleted(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User Not Found".to_string()))?;

    if !user.is_deleted() {
        return Err(ApiError::BadRequest("This user isn't deleted".to_string()));
    }

    User::restore(&state.db, user.id).await?;

    Ok(success(
        StatusCode::OK,
        "msg",
        json!("Restored user successfully"),
    ))
}
