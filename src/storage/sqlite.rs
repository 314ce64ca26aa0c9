use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::quote::QuoteRecord;
use crate::recipe::{RecipeLine, SavedRecipe};
use crate::storage::{QuoteHistory, RecipeStore};
use crate::units::Unit;

/// Recipes and quote history in one SQLite database
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // An in-memory database lives only as long as its single connection
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, running migrations first
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, AppError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("SQLite store ready");
        Ok(Self { pool })
    }
}

fn corrupt(what: &str, value: &str) -> AppError {
    AppError::StorageError(format!("stored {} '{}' is invalid", what, value))
}

#[async_trait]
impl RecipeStore for SqliteStore {
    async fn save_recipe(&self, recipe: &SavedRecipe) -> Result<(), AppError> {
        recipe.validate()?;
        let name = recipe.name.trim();
        let now = Utc::now().timestamp_millis();

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM recipe_lines WHERE recipe_name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        for (position, line) in recipe.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO recipe_lines (recipe_name, position, ingredient, quantity, unit, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(name)
            .bind(position as i64)
            .bind(&line.ingredient)
            .bind(line.quantity.to_string())
            .bind(line.unit.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Saved recipe '{}' ({} lines)", name, recipe.lines.len());
        Ok(())
    }

    async fn get_recipe(&self, name: &str) -> Result<Option<SavedRecipe>, AppError> {
        let rows = sqlx::query_as::<_, (String, String, String)>(
            r#"
            SELECT ingredient, quantity, unit
            FROM recipe_lines
            WHERE recipe_name = ?
            ORDER BY position
            "#,
        )
        .bind(name.trim())
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }

        let lines = rows
            .into_iter()
            .map(|(ingredient, quantity, unit)| {
                Ok(RecipeLine {
                    quantity: Decimal::from_str(&quantity)
                        .map_err(|_| corrupt("quantity", &quantity))?,
                    unit: Unit::parse(&unit).map_err(|_| corrupt("unit", &unit))?,
                    ingredient,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(Some(SavedRecipe {
            name: name.trim().to_string(),
            lines,
        }))
    }

    async fn list_recipes(&self) -> Result<Vec<String>, AppError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT recipe_name FROM recipe_lines ORDER BY recipe_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    async fn delete_recipe(&self, name: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM recipe_lines WHERE recipe_name = ?")
            .bind(name.trim())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl QuoteHistory for SqliteStore {
    async fn append_quote(&self, record: &QuoteRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO quote_history (id, quote_date, client, phone, products, total, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.date.format("%Y-%m-%d").to_string())
        .bind(&record.client)
        .bind(&record.phone)
        .bind(&record.products)
        .bind(record.total.to_string())
        .bind(record.created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_quotes(&self) -> Result<Vec<QuoteRecord>, AppError> {
        let rows = sqlx::query_as::<_, (String, String, String, String, String, String, i64)>(
            r#"
            SELECT id, quote_date, client, phone, products, total, created_at
            FROM quote_history
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, date, client, phone, products, total, created_at)| {
                Ok(QuoteRecord {
                    id: Uuid::parse_str(&id).map_err(|_| corrupt("quote id", &id))?,
                    date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                        .map_err(|_| corrupt("quote date", &date))?,
                    client,
                    phone,
                    products,
                    total: Decimal::from_str(&total).map_err(|_| corrupt("total", &total))?,
                    created_at: DateTime::<Utc>::from_timestamp_millis(created_at)
                        .ok_or_else(|| corrupt("timestamp", &created_at.to_string()))?,
                })
            })
            .collect()
    }
}
