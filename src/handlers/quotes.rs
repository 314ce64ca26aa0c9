use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AppError;
use crate::form::PriceForm;
use crate::handlers::AppState;
use crate::pricing::QuotePreview;
use crate::quote::{Quote, QuoteItem, QuoteRecord};
use crate::warnings::PricingWarnings;

/// Item to add to a draft: either a fixed price or a saved recipe to price
#[derive(Debug, Serialize, Deserialize)]
pub struct AddItemRequest {
    pub quote: Quote,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub recipe: Option<String>,
    pub quantity: Decimal,
    /// Pricing overrides used when `recipe` is set
    #[serde(default)]
    pub overrides: PriceForm,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveItemRequest {
    pub quote: Quote,
    pub index: usize,
}

/// Updated draft plus its recomputed totals
#[derive(Debug, Serialize, Deserialize)]
pub struct DraftResponse {
    pub quote: Quote,
    pub item: QuoteItem,
    pub preview: QuotePreview,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub quotes: Vec<QuoteRecord>,
    pub warnings: PricingWarnings,
}

/// Handle POST /api/quotes/preview
pub async fn preview_quote(
    State(state): State<AppState>,
    Json(quote): Json<Quote>,
) -> Result<Json<QuotePreview>, AppError> {
    Ok(Json(state.service.preview_quote(&quote)?))
}

/// Handle POST /api/quotes/add-item
pub async fn add_item(
    State(state): State<AppState>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<DraftResponse>, AppError> {
    let AddItemRequest {
        mut quote,
        product,
        unit_price,
        recipe,
        quantity,
        overrides,
    } = request;

    let item = match (recipe, unit_price) {
        (Some(recipe), _) => {
            let priced = state
                .service
                .quote_item_from_recipe(&recipe, quantity, &overrides)
                .await?;
            let product = product.unwrap_or(priced.product);
            quote.add_item(product, quantity, priced.unit_price)?.clone()
        }
        (None, Some(unit_price)) => {
            let product = product.ok_or_else(|| {
                AppError::ValidationError("product is required with unit_price".to_string())
            })?;
            quote.add_item(product, quantity, unit_price)?.clone()
        }
        (None, None) => {
            return Err(AppError::ValidationError(
                "either recipe or unit_price is required".to_string(),
            ))
        }
    };

    let preview = state.service.preview_quote(&quote)?;
    Ok(Json(DraftResponse {
        quote,
        item,
        preview,
    }))
}

/// Handle POST /api/quotes/remove-item
pub async fn remove_item(
    State(state): State<AppState>,
    Json(request): Json<RemoveItemRequest>,
) -> Result<Json<DraftResponse>, AppError> {
    let mut quote = request.quote;
    let item = quote.remove_item(request.index)?;
    let preview = state.service.preview_quote(&quote)?;

    Ok(Json(DraftResponse {
        quote,
        item,
        preview,
    }))
}

/// Handle POST /api/quotes/text
pub async fn export_text(
    State(state): State<AppState>,
    Json(quote): Json<Quote>,
) -> Result<Response, AppError> {
    let text = state.service.quote_text(&quote)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    )
        .into_response())
}

/// Handle POST /api/quotes/pdf
pub async fn export_pdf(
    State(state): State<AppState>,
    Json(quote): Json<Quote>,
) -> Result<Response, AppError> {
    let bytes = state.service.quote_pdf(&quote)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"orcamento.pdf\"",
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Handle POST /api/quotes (append to history)
pub async fn save_quote(
    State(state): State<AppState>,
    Json(quote): Json<Quote>,
) -> Result<(StatusCode, Json<QuoteRecord>), AppError> {
    let record = state.service.save_quote(&quote).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Handle GET /api/quotes
/// A history that cannot be read is shown as empty with a warning.
pub async fn list_quotes(State(state): State<AppState>) -> Json<HistoryResponse> {
    let mut warnings = PricingWarnings::new();
    let quotes = match state.service.list_quotes().await {
        Ok(quotes) => quotes,
        Err(e) => {
            warn!("Failed to read quote history: {}", e);
            warnings.add_warning(format!("Quote history unavailable: {}", e));
            Vec::new()
        }
    };

    Json(HistoryResponse { quotes, warnings })
}
