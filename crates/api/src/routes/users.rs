//! User management. Self-or-admin for everything but the admin-only list.

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Json;
use taskboard_auth::Principal;
use taskboard_core::UserId;
use taskboard_storage::UserUpdate;

use crate::error::ApiError;
use crate::routes::auth::UserResponse;
use crate::state::AppState;

fn require_self_or_admin(principal: &Principal, target: UserId) -> Result<(), ApiError> {
    if principal.role.is_admin() || principal.id == target {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Access forbidden"))
    }
}

pub async fn me(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(principal.id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(user.into()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserResponse>, ApiError> {
    require_self_or_admin(&principal, user_id)?;

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(user.into()))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    if !principal.role.is_admin() {
        return Err(ApiError::Forbidden("Access forbidden"));
    }

    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<UserId>,
    Json(changes): Json<UserUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    require_self_or_admin(&principal, user_id)?;

    if changes.is_empty() {
        return Err(ApiError::BadRequest("No fields to update"));
    }

    let user = state
        .users
        .update(user_id, changes)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode, ApiError> {
    require_self_or_admin(&principal, user_id)?;

    if !state.users.delete(user_id).await? {
        return Err(ApiError::NotFound("User not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
