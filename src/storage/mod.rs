//! Recipe and quote-history persistence.
//!
//! Two backends implement the same traits: SQLite (default) and a pair of
//! plain CSV files.

pub mod csv_file;
pub mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::AppError;
use crate::quote::QuoteRecord;
use crate::recipe::SavedRecipe;

pub use csv_file::CsvStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Insert or replace the recipe with the same name
    async fn save_recipe(&self, recipe: &SavedRecipe) -> Result<(), AppError>;

    async fn get_recipe(&self, name: &str) -> Result<Option<SavedRecipe>, AppError>;

    /// Recipe names, sorted
    async fn list_recipes(&self) -> Result<Vec<String>, AppError>;

    /// Returns whether anything was deleted
    async fn delete_recipe(&self, name: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait QuoteHistory: Send + Sync {
    async fn append_quote(&self, record: &QuoteRecord) -> Result<(), AppError>;

    /// Newest first
    async fn list_quotes(&self) -> Result<Vec<QuoteRecord>, AppError>;
}

pub trait Storage: RecipeStore + QuoteHistory {}

impl<T: RecipeStore + QuoteHistory> Storage for T {}

pub async fn open_storage(cfg: &StorageConfig) -> Result<Arc<dyn Storage>, AppError> {
    match cfg.backend {
        StorageBackend::Sqlite => {
            info!("Opening SQLite store at {}", cfg.database_url);
            Ok(Arc::new(SqliteStore::connect(&cfg.database_url).await?))
        }
        StorageBackend::Csv => {
            info!(
                "Using CSV store (recipes: {}, quotes: {})",
                cfg.recipes_path.display(),
                cfg.quotes_path.display()
            );
            Ok(Arc::new(CsvStore::new(
                cfg.recipes_path.clone(),
                cfg.quotes_path.clone(),
            )))
        }
    }
}
