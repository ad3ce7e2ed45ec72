// handlers/public/auth/register.rs - POST /users handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;
use crate::services::Registration;

/// POST /users - Register new user account
///
/// Expected Input:
/// ```json
/// { "username": "chef1", "password": "pw123", "firstName": "Julia", "lastName": "Child" }
/// ```
///
/// Answers 201 with the user (never the password), 400 when the username or
/// password fails policy, 409 when the username is taken.
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> ApiResult<User> {
    let Json(registration) = payload?;
    let user = state.credentials.register(registration).await?;
    Ok(ApiResponse::created(user))
}
