use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::database::models::UserIdentity;
use crate::error::ApiError;
use crate::server::AppState;

/// Authenticated user context extracted from the bearer token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser(pub UserIdentity);

impl AuthUser {
    pub fn username(&self) -> &str {
        &self.0.username
    }
}

/// Rejects the request with 401 before any handler (and so any store call) runs,
/// unless it carries a valid bearer token.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(|msg| {
        tracing::debug!("Rejected request to {}: {}", request.uri().path(), msg);
        ApiError::unauthorized(msg)
    })?;

    let identity = state.credentials.verify_token(token)?;

    request.extensions_mut().insert(AuthUser(identity));
    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty bearer token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
