use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::catalog::Ingredient;
use crate::error::AppError;
use crate::handlers::AppState;
use crate::warnings::PricingWarnings;

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub count: usize,
    pub ingredients: Vec<Ingredient>,
    /// Non-empty when the catalog could not be loaded or had bad rows
    pub warnings: PricingWarnings,
    /// False when pricing is refused for lack of a catalog
    pub pricing_enabled: bool,
}

/// Handle GET /api/catalog
pub async fn list_catalog(State(state): State<AppState>) -> Result<Json<CatalogResponse>, AppError> {
    let load = state.service.load_catalog().await?;
    let ingredients = load.catalog.ingredients().to_vec();

    Ok(Json(CatalogResponse {
        count: ingredients.len(),
        pricing_enabled: !ingredients.is_empty(),
        ingredients,
        warnings: load.warnings,
    }))
}
