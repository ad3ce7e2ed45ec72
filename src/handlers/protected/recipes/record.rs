use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use uuid::Uuid;

use crate::database::models::{Recipe, RecipeInput};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

/// GET /recipes/:key - one recipe by id, or a listing by owner
///
/// A key that parses as a UUID is a recipe id; anything else is an owner name.
/// Recipes are only visible to their owner, so asking for someone else's
/// listing yields an empty array.
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    if Uuid::parse_str(&key).is_ok() {
        let recipe = state.recipes.get(user.username(), &key).await?;
        return Ok(ApiResponse::success(recipe).into_response());
    }

    let recipes = if key == user.username() {
        state.recipes.list(Some(&key)).await?
    } else {
        Vec::new()
    };
    Ok(ApiResponse::success(recipes).into_response())
}

/// PUT /recipes/:id - sparse update; the body must repeat the path id
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<RecipeInput>, JsonRejection>,
) -> ApiResult<Recipe> {
    let Json(input) = payload?;
    let recipe = state.recipes.update(user.username(), &id, input).await?;
    Ok(ApiResponse::success(recipe))
}

/// DELETE /recipes/:id - 204 whether or not the recipe existed
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.recipes.delete(user.username(), &id).await?;
    Ok(ApiResponse::no_content())
}
