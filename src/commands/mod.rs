//! Command implementations for the CLI
//!
//! - serve: run the HTTP API
//! - catalog: list catalog ingredients
//! - price: price a form file or a saved recipe
//! - recipe: saved recipe management
//! - quote: draft-file quote workflow
//! - history: saved quotes
//! - config: configuration display and validation

pub mod catalog;
pub mod config;
pub mod history;
pub mod price;
pub mod quote;
pub mod recipe;
pub mod serve;

use anyhow::Result;
use arc_swap::ArcSwap;
use colored::Colorize;
use precificador::{
    config::load_config,
    form::PriceForm,
    pricing::PricingService,
    storage::open_storage,
    warnings::PricingWarnings,
};
use std::path::Path;
use std::sync::Arc;

use crate::cli::OverrideArgs;

/// Load configuration and open storage for a one-shot command
pub async fn open_service(config_path: &Path) -> Result<PricingService> {
    let cfg = load_config(config_path)?;
    let storage = open_storage(&cfg.storage).await?;
    Ok(PricingService::new(
        Arc::new(ArcSwap::from_pointee(cfg)),
        storage,
        reqwest::Client::new(),
    ))
}

impl OverrideArgs {
    /// Overrides as an items-less form
    pub fn to_form(&self) -> PriceForm {
        PriceForm {
            margin_pct: self.margin,
            waste_pct: self.waste,
            overhead_pct: self.overhead,
            packaging_fee: self.packaging,
            distance_km: self.distance,
            payment_method: self.payment.clone(),
            ..PriceForm::default()
        }
    }
}

pub fn print_warnings(warnings: &PricingWarnings) {
    for warning in warnings.warnings() {
        let line = format!("! {}", warning.message);
        if warning.level == "info" {
            eprintln!("{}", line.dimmed());
        } else {
            eprintln!("{}", line.yellow());
        }
    }
}
