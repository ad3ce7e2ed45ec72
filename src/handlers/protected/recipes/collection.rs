use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};

use crate::database::models::{Recipe, RecipeInput};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

/// GET /recipes - the caller's recipes
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Recipe>> {
    let recipes = state.recipes.list(Some(user.username())).await?;
    Ok(ApiResponse::success(recipes))
}

/// POST /recipes - create a recipe owned by the caller
///
/// `name` and `description` are required; the response carries the generated id.
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<RecipeInput>, JsonRejection>,
) -> ApiResult<Recipe> {
    let Json(input) = payload?;
    let recipe = state.recipes.create(user.username(), input).await?;
    Ok(ApiResponse::created(recipe))
}
