use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::form::PriceForm;
use crate::handlers::AppState;
use crate::pricing::PricedForm;
use crate::recipe::{RecipeLine, SavedRecipe};

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeListResponse {
    pub recipes: Vec<String>,
}

/// Body of PUT /api/recipes/:name
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveRecipeRequest {
    pub lines: Vec<RecipeLine>,
}

/// Handle GET /api/recipes
pub async fn list_recipes(
    State(state): State<AppState>,
) -> Result<Json<RecipeListResponse>, AppError> {
    let recipes = state.service.list_recipes().await?;
    Ok(Json(RecipeListResponse { recipes }))
}

/// Handle GET /api/recipes/:name
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SavedRecipe>, AppError> {
    Ok(Json(state.service.get_recipe(&name).await?))
}

/// Handle PUT /api/recipes/:name (insert or overwrite)
pub async fn save_recipe(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<SaveRecipeRequest>,
) -> Result<Json<SavedRecipe>, AppError> {
    let recipe = SavedRecipe::new(name, body.lines)?;
    state.service.save_recipe(&recipe).await?;
    Ok(Json(recipe))
}

/// Handle DELETE /api/recipes/:name
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    state.service.delete_recipe(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle POST /api/recipes/:name/price
/// The body carries session overrides; its line items are ignored.
pub async fn price_recipe(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Option<Json<PriceForm>>,
) -> Result<Json<PricedForm>, AppError> {
    let overrides = body.map(|Json(form)| form).unwrap_or_default();
    let priced = state.service.price_recipe(&name, &overrides).await?;
    Ok(Json(priced))
}
