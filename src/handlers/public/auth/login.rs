// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::auth::IssuedToken;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/login - Authenticate user and receive a bearer token
///
/// Expected Input:
/// ```json
/// { "username": "chef1", "password": "pw123" }
/// ```
///
/// Expected Output:
/// ```json
/// { "authToken": "eyJhbGciOiJIUzI1NiI...", "tokenType": "Bearer", "expiresAt": "..." }
/// ```
///
/// Missing fields, unknown users and wrong passwords all answer the same 401.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<IssuedToken> {
    let Json(payload) = payload?;

    let (Some(username), Some(password)) = (payload.username, payload.password) else {
        return Err(ApiError::unauthorized("Incorrect username or password"));
    };

    let identity = state.credentials.authenticate(&username, &password).await?;
    let token = state.credentials.issue_token(&identity)?;

    tracing::info!("User {} logged in", identity.username);
    Ok(ApiResponse::success(token))
}
