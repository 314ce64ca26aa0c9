use axum::{extract::State, Json};

use crate::error::AppError;
use crate::form::PriceForm;
use crate::handlers::AppState;
use crate::pricing::PricedForm;

/// Handle POST /api/price
pub async fn price_form(
    State(state): State<AppState>,
    Json(form): Json<PriceForm>,
) -> Result<Json<PricedForm>, AppError> {
    tracing::debug!(
        product = %form.product_name,
        lines = form.items.len(),
        "Handling price request"
    );

    let priced = state.service.price_form(&form).await?;
    Ok(Json(priced))
}
