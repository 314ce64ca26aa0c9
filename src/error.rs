use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Ingredient catalog missing, unreadable or empty
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),
    /// Line item references an ingredient absent from the catalog
    #[error("Ingredient not found: {0}")]
    IngredientNotFound(String),
    /// Unit pair without a known conversion factor
    #[error("Cannot convert '{from}' to '{to}' for ingredient '{ingredient}'")]
    UnitConversion {
        ingredient: String,
        from: String,
        to: String,
    },
    /// Unit text that does not name a known unit
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),
    /// Payment method absent from the configured table
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),
    /// Input rejected before any computation or write
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Saved recipe lookup miss
    #[error("Recipe not found: {0}")]
    RecipeNotFound(String),
    /// Quote line index outside the item list
    #[error("Quote item {index} out of range (quote has {len} items)")]
    QuoteItemOutOfRange { index: usize, len: usize },
    /// Recipe or quote store failure
    #[error("Storage error: {0}")]
    StorageError(String),
    /// Text or PDF rendering failure
    #[error("Export error: {0}")]
    ExportError(String),
    /// HTTP request error (remote catalog)
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),
    /// Internal server error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::IngredientNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UnitConversion { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UnknownUnit(_) => StatusCode::BAD_REQUEST,
            Self::UnknownPaymentMethod(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::RecipeNotFound(_) => StatusCode::NOT_FOUND,
            Self::QuoteItemOutOfRange { .. } => StatusCode::BAD_REQUEST,
            Self::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ExportError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::HttpRequest(_) => StatusCode::BAD_GATEWAY,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

pub fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::ConfigError(_) => "config_error",
        AppError::CatalogUnavailable(_) => "catalog_unavailable",
        AppError::IngredientNotFound(_) => "ingredient_not_found",
        AppError::UnitConversion { .. } => "unit_conversion",
        AppError::UnknownUnit(_) => "unknown_unit",
        AppError::UnknownPaymentMethod(_) => "unknown_payment_method",
        AppError::ValidationError(_) => "validation_error",
        AppError::RecipeNotFound(_) => "recipe_not_found",
        AppError::QuoteItemOutOfRange { .. } => "quote_item_out_of_range",
        AppError::StorageError(_) => "storage_error",
        AppError::ExportError(_) => "export_error",
        AppError::HttpRequest(_) => "http_request_error",
        AppError::InternalError(_) => "internal_error",
    }
}

// Implement conversions from common error types
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::StorageError(format!("migration failed: {}", err))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        Self::StorageError(format!("CSV error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::ValidationError(format!("JSON error: {}", err))
    }
}
