// handlers/public/system.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::server::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Recipe API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "register": "POST /users",
            "login": "POST /auth/login",
            "refresh": "POST /auth/refresh (token)",
            "account": "GET|PUT|DELETE /users/me, PUT /users/me/password (token)",
            "recipes": "GET|POST /recipes, GET|PUT|DELETE /recipes/:id (token)",
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable("database unavailable").into_response()
        }
    }
}

/// Any unmatched path.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}
