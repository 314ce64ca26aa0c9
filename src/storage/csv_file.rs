use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::quote::QuoteRecord;
use crate::recipe::{RecipeLine, SavedRecipe};
use crate::storage::{QuoteHistory, RecipeStore};
use crate::units::Unit;

/// Recipes and quote history as two CSV files.
///
/// Writes are serialised within this process only. Two processes sharing
/// the same files overwrite each other (last write wins).
pub struct CsvStore {
    recipes_path: PathBuf,
    quotes_path: PathBuf,
    write_lock: Mutex<()>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RecipeRow {
    recipe: String,
    position: usize,
    ingredient: String,
    quantity: String,
    unit: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct QuoteRow {
    id: String,
    date: String,
    client: String,
    phone: String,
    products: String,
    total: String,
    created_at: String,
}

impl CsvStore {
    pub fn new(recipes_path: PathBuf, quotes_path: PathBuf) -> Self {
        Self {
            recipes_path,
            quotes_path,
            write_lock: Mutex::new(()),
        }
    }

    async fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, AppError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut rdr = csv::Reader::from_reader(bytes.as_slice());
        rdr.deserialize()
            .collect::<Result<Vec<T>, csv::Error>>()
            .map_err(AppError::from)
    }

    /// Replace the whole file via a sibling temp file and a rename
    async fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), AppError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in rows {
            wtr.serialize(row)?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::StorageError(format!("CSV flush failed: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("csv.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

fn corrupt(what: &str, value: &str) -> AppError {
    AppError::StorageError(format!("stored {} '{}' is invalid", what, value))
}

fn row_to_line(row: RecipeRow) -> Result<RecipeLine, AppError> {
    Ok(RecipeLine {
        quantity: Decimal::from_str(&row.quantity).map_err(|_| corrupt("quantity", &row.quantity))?,
        unit: Unit::parse(&row.unit).map_err(|_| corrupt("unit", &row.unit))?,
        ingredient: row.ingredient,
    })
}

fn row_to_record(row: QuoteRow) -> Result<QuoteRecord, AppError> {
    Ok(QuoteRecord {
        id: Uuid::parse_str(&row.id).map_err(|_| corrupt("quote id", &row.id))?,
        date: NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
            .map_err(|_| corrupt("quote date", &row.date))?,
        total: Decimal::from_str(&row.total).map_err(|_| corrupt("total", &row.total))?,
        created_at: DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|_| corrupt("timestamp", &row.created_at))?
            .with_timezone(&Utc),
        client: row.client,
        phone: row.phone,
        products: row.products,
    })
}

#[async_trait]
impl RecipeStore for CsvStore {
    async fn save_recipe(&self, recipe: &SavedRecipe) -> Result<(), AppError> {
        recipe.validate()?;
        let name = recipe.name.trim();
        let _guard = self.write_lock.lock().await;

        let mut rows: Vec<RecipeRow> = Self::read_rows::<RecipeRow>(&self.recipes_path)
            .await?
            .into_iter()
            .filter(|r| r.recipe != name)
            .collect();

        rows.extend(recipe.lines.iter().enumerate().map(|(position, line)| RecipeRow {
            recipe: name.to_string(),
            position,
            ingredient: line.ingredient.clone(),
            quantity: line.quantity.to_string(),
            unit: line.unit.as_str().to_string(),
        }));

        Self::write_rows(&self.recipes_path, &rows).await?;
        debug!("Saved recipe '{}' to {}", name, self.recipes_path.display());
        Ok(())
    }

    async fn get_recipe(&self, name: &str) -> Result<Option<SavedRecipe>, AppError> {
        let name = name.trim();
        let mut rows: Vec<RecipeRow> = Self::read_rows::<RecipeRow>(&self.recipes_path)
            .await?
            .into_iter()
            .filter(|r| r.recipe == name)
            .collect();

        if rows.is_empty() {
            return Ok(None);
        }
        rows.sort_by_key(|r| r.position);

        let lines = rows
            .into_iter()
            .map(row_to_line)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(SavedRecipe {
            name: name.to_string(),
            lines,
        }))
    }

    async fn list_recipes(&self) -> Result<Vec<String>, AppError> {
        let mut names: Vec<String> = Self::read_rows::<RecipeRow>(&self.recipes_path)
            .await?
            .into_iter()
            .map(|r| r.recipe)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn delete_recipe(&self, name: &str) -> Result<bool, AppError> {
        let name = name.trim();
        let _guard = self.write_lock.lock().await;

        let rows = Self::read_rows::<RecipeRow>(&self.recipes_path).await?;
        let before = rows.len();
        let kept: Vec<RecipeRow> = rows.into_iter().filter(|r| r.recipe != name).collect();

        if kept.len() == before {
            return Ok(false);
        }
        Self::write_rows(&self.recipes_path, &kept).await?;
        Ok(true)
    }
}

#[async_trait]
impl QuoteHistory for CsvStore {
    async fn append_quote(&self, record: &QuoteRecord) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        let mut rows = Self::read_rows::<QuoteRow>(&self.quotes_path).await?;
        rows.push(QuoteRow {
            id: record.id.to_string(),
            date: record.date.format("%Y-%m-%d").to_string(),
            client: record.client.clone(),
            phone: record.phone.clone(),
            products: record.products.clone(),
            total: record.total.to_string(),
            created_at: record.created_at.to_rfc3339(),
        });

        Self::write_rows(&self.quotes_path, &rows).await
    }

    async fn list_quotes(&self) -> Result<Vec<QuoteRecord>, AppError> {
        let mut records = Self::read_rows::<QuoteRow>(&self.quotes_path)
            .await?
            .into_iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()?;
        records.reverse();
        Ok(records)
    }
}
