use axum::{extract::State, Extension};

use crate::auth::IssuedToken;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

/// POST /auth/refresh - Exchange a still-valid token for a fresh one
pub async fn refresh_post(
    State(state): State<AppState>,
    Extension(AuthUser(identity)): Extension<AuthUser>,
) -> ApiResult<IssuedToken> {
    let token = state.credentials.issue_token(&identity)?;
    Ok(ApiResponse::success(token))
}
