use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde::Deserialize;

use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;
use crate::services::ProfileUpdate;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// GET /users/me
pub async fn account_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<User> {
    let profile = state.credentials.find_user(user.username()).await?;
    Ok(ApiResponse::success(profile))
}

/// PUT /users/me - sparse update of firstName / lastName
pub async fn account_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> ApiResult<User> {
    let Json(update) = payload?;
    let profile = state.credentials.update_profile(user.username(), update).await?;
    Ok(ApiResponse::success(profile))
}

/// PUT /users/me/password
pub async fn password_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<PasswordChange>, JsonRejection>,
) -> ApiResult<()> {
    let Json(change) = payload?;

    let current = change
        .current_password
        .ok_or_else(|| ApiError::field_error("currentPassword", "Missing `currentPassword` in request body"))?;
    let new = change
        .new_password
        .ok_or_else(|| ApiError::field_error("newPassword", "Missing `newPassword` in request body"))?;

    state
        .credentials
        .change_password(user.username(), &current, &new)
        .await?;
    Ok(ApiResponse::no_content())
}

/// DELETE /users/me - removes the caller's recipes, then the account
pub async fn account_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<()> {
    let removed = state.recipes.delete_all(user.username()).await?;
    state.credentials.delete_account(user.username()).await?;

    tracing::info!("Closed account {} ({} recipes removed)", user.username(), removed);
    Ok(ApiResponse::no_content())
}
