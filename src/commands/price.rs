use anyhow::{Context, Result};
use colored::Colorize;
use precificador::{
    form::PriceForm,
    money::format_brl,
    pricing::{PricedForm, PricingService},
};
use std::path::Path;

use super::{open_service, print_warnings};
use crate::cli::PriceArgs;

/// Execute the price command
pub async fn execute(config_path: &Path, args: PriceArgs) -> Result<()> {
    let service = open_service(config_path).await?;
    let priced = price(&service, &args).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&priced)?);
        return Ok(());
    }

    print_priced(&priced);
    Ok(())
}

async fn price(service: &PricingService, args: &PriceArgs) -> Result<PricedForm> {
    let overrides = args.overrides.to_form();

    if let Some(recipe) = &args.recipe {
        return Ok(service.price_recipe(recipe, &overrides).await?);
    }

    let path = args
        .file
        .as_deref()
        .context("either --file or --recipe is required")?;
    let form = read_form(path)?.with_overrides(&overrides);
    Ok(service.price_form(&form).await?)
}

pub fn read_form(path: &Path) -> Result<PriceForm> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read form file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid form file {}", path.display()))
}

fn print_priced(priced: &PricedForm) {
    print_warnings(&priced.warnings);

    let title = if priced.product_name.is_empty() {
        "Produto".to_string()
    } else {
        priced.product_name.clone()
    };
    println!("{}", title.bold());
    println!();

    println!("  {}", "Ingredientes".cyan());
    for line in &priced.breakdown.lines {
        println!(
            "    {:<28} {:>10} {:<8} {:>12}",
            line.ingredient,
            line.quantity.normalize().to_string(),
            line.unit.as_str(),
            format_brl(line.cost)
        );
    }
    println!();

    for (label, basis, value) in priced.breakdown.summary_rows() {
        let row = format!("  {:<22} {:<26} {:>12}", label, basis, value);
        if label == "PREÇO FINAL" {
            println!("{}", row.green().bold());
        } else if label == "CUSTO TOTAL" {
            println!("{}", row.bold());
        } else {
            println!("{}", row);
        }
    }

    println!();
    println!("  CMV: {}", priced.formatted.cmv);
}
