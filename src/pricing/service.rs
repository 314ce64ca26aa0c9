//! Pricing workflows shared by the HTTP handlers and the CLI.
//!
//! Each call takes a fresh configuration snapshot and reloads the catalog,
//! so a SIGHUP reload or an edited spreadsheet shows up on the next request.

use arc_swap::ArcSwap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::{CatalogLoad, CatalogSource};
use crate::config::Config;
use crate::error::AppError;
use crate::export::{breakdown_text, quote_pdf, quote_text};
use crate::form::PriceForm;
use crate::metrics;
use crate::money::{format_brl, round_money};
use crate::pricing::{CostBreakdown, CostEngine, FormattedBreakdown};
use crate::quote::{Quote, QuoteItem, QuoteRecord, QuoteTotals};
use crate::recipe::SavedRecipe;
use crate::storage::{QuoteHistory, RecipeStore, Storage};
use crate::warnings::PricingWarnings;

/// Result of pricing one form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedForm {
    pub product_name: String,
    pub breakdown: CostBreakdown,
    pub formatted: FormattedBreakdown,
    pub text: String,
    /// Catalog and conversion warnings together
    pub warnings: PricingWarnings,
}

/// Totals and shareable text for a quote draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotePreview {
    pub totals: QuoteTotals,
    pub total: String,
    pub text: String,
}

#[derive(Clone)]
pub struct PricingService {
    config: Arc<ArcSwap<Config>>,
    storage: Arc<dyn Storage>,
    http_client: reqwest::Client,
}

impl PricingService {
    pub fn new(
        config: Arc<ArcSwap<Config>>,
        storage: Arc<dyn Storage>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            config,
            storage,
            http_client,
        }
    }

    /// Current configuration snapshot
    pub fn config(&self) -> Arc<Config> {
        self.config.load_full()
    }

    /// Load the configured catalog. A load failure is not an error here: it
    /// yields an empty catalog and a warning.
    pub async fn load_catalog(&self) -> Result<CatalogLoad, AppError> {
        let config = self.config();
        let source = CatalogSource::from_config(&config.catalog)?;
        Ok(source.load_or_empty(&self.http_client).await)
    }

    pub async fn price_form(&self, form: &PriceForm) -> Result<PricedForm, AppError> {
        let config = self.config();
        let load = self.load_catalog().await?;
        let catalog = load.require_catalog()?;

        let inputs = form.resolve(catalog, &config)?;
        let engine = CostEngine::new(form.policy(&config));
        let breakdown = engine.compute(&inputs)?;

        let mut warnings = load.warnings.clone();
        warnings.merge(breakdown.warnings.clone());

        metrics::record_price_computation(&breakdown.payment_method, breakdown.final_price);
        info!(
            product = %form.product_name,
            lines = breakdown.lines.len(),
            final_price = %round_money(breakdown.final_price),
            "Priced form"
        );

        Ok(PricedForm {
            product_name: form.product_name.trim().to_string(),
            formatted: breakdown.formatted(),
            text: breakdown_text(&form.product_name, &breakdown),
            breakdown,
            warnings,
        })
    }

    /// The saved recipe as a form, with `overrides` laid over it
    pub async fn recipe_form(&self, name: &str, overrides: &PriceForm) -> Result<PriceForm, AppError> {
        let recipe = self
            .storage
            .get_recipe(name)
            .await?
            .ok_or_else(|| AppError::RecipeNotFound(name.trim().to_string()))?;

        Ok(PriceForm {
            product_name: recipe.name,
            items: recipe.lines,
            ..PriceForm::default()
        }
        .with_overrides(overrides))
    }

    pub async fn price_recipe(&self, name: &str, overrides: &PriceForm) -> Result<PricedForm, AppError> {
        let form = self.recipe_form(name, overrides).await?;
        self.price_form(&form).await
    }

    /// Quote line priced from a saved recipe. The unit price is the recipe's
    /// sale price, before delivery and payment fee, which the quote charges
    /// once for all items.
    pub async fn quote_item_from_recipe(
        &self,
        name: &str,
        quantity: Decimal,
        overrides: &PriceForm,
    ) -> Result<QuoteItem, AppError> {
        let mut form = self.recipe_form(name, overrides).await?;
        form.distance_km = Some(Decimal::ZERO);
        form.rates.payment_fee_pct = Some(Decimal::ZERO);

        let priced = self.price_form(&form).await?;
        let unit_price = round_money(priced.breakdown.sale_price);
        debug!(recipe = %priced.product_name, %unit_price, "Recipe priced for quote");

        Ok(QuoteItem {
            product: priced.product_name,
            quantity,
            unit_price,
        })
    }

    pub fn quote_totals(&self, quote: &Quote) -> Result<QuoteTotals, AppError> {
        let config = self.config();
        quote.validate()?;
        let (delivery, payment, base) = quote.resolve_rates(&config)?;
        quote.totals(&delivery, &payment, base)
    }

    pub fn preview_quote(&self, quote: &Quote) -> Result<QuotePreview, AppError> {
        let totals = self.quote_totals(quote)?;
        let business = self.config().business.name.clone();
        Ok(QuotePreview {
            total: format_brl(totals.total),
            text: quote_text(&business, quote, &totals),
            totals,
        })
    }

    pub fn quote_text(&self, quote: &Quote) -> Result<String, AppError> {
        Ok(self.preview_quote(quote)?.text)
    }

    pub fn quote_pdf(&self, quote: &Quote) -> Result<Vec<u8>, AppError> {
        let totals = self.quote_totals(quote)?;
        quote_pdf(&self.config().business.name, quote, &totals)
    }

    /// Compute totals and append the quote to history
    pub async fn save_quote(&self, quote: &Quote) -> Result<QuoteRecord, AppError> {
        quote.validate_for_save()?;
        let totals = self.quote_totals(quote)?;

        let mut record = quote.to_record(&totals);
        record.total = round_money(record.total);
        self.storage.append_quote(&record).await?;

        metrics::record_quote_saved(&totals.payment_method);
        info!(
            id = %record.id,
            client = %record.client,
            total = %record.total,
            "Quote saved to history"
        );
        Ok(record)
    }

    pub async fn list_quotes(&self) -> Result<Vec<QuoteRecord>, AppError> {
        self.storage.list_quotes().await
    }

    pub async fn save_recipe(&self, recipe: &SavedRecipe) -> Result<(), AppError> {
        recipe.validate()?;
        self.storage.save_recipe(recipe).await?;
        metrics::record_recipe_saved();
        info!(recipe = %recipe.name, lines = recipe.lines.len(), "Recipe saved");
        Ok(())
    }

    pub async fn get_recipe(&self, name: &str) -> Result<SavedRecipe, AppError> {
        self.storage
            .get_recipe(name)
            .await?
            .ok_or_else(|| AppError::RecipeNotFound(name.trim().to_string()))
    }

    pub async fn list_recipes(&self) -> Result<Vec<String>, AppError> {
        self.storage.list_recipes().await
    }

    pub async fn delete_recipe(&self, name: &str) -> Result<(), AppError> {
        if !self.storage.delete_recipe(name).await? {
            return Err(AppError::RecipeNotFound(name.trim().to_string()));
        }
        info!(recipe = %name.trim(), "Recipe deleted");
        Ok(())
    }
}
