//! Quote workflow on a JSON draft file.
//!
//! Each subcommand reads the draft, changes it and writes it back, so a
//! quote can be built up over several invocations before it is saved.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use precificador::{
    money::format_brl,
    pricing::PricingService,
    quote::Quote,
};
use std::path::Path;
use tracing::info;

use super::open_service;
use crate::cli::{ExportFormat, QuoteArgs, QuoteCommands};

pub async fn execute(config_path: &Path, args: QuoteArgs) -> Result<()> {
    let draft = args.draft.as_path();

    match args.action {
        QuoteCommands::New {
            client,
            phone,
            date,
            distance,
            payment,
            packaging,
            force,
        } => {
            if draft.exists() && !force {
                bail!(
                    "Draft {} already exists (use --force to replace it)",
                    draft.display()
                );
            }
            let mut quote = Quote::new(
                client,
                phone,
                date.unwrap_or_else(|| chrono::Local::now().date_naive()),
            );
            quote.distance_km = distance.unwrap_or_default();
            quote.packaging_fee = packaging.unwrap_or_default();
            quote.payment_method = payment;
            quote.validate()?;

            write_draft(draft, &quote)?;
            println!(
                "{}",
                format!("✓ New quote for '{}' in {}", quote.client_name, draft.display()).green()
            );
        }
        QuoteCommands::Add {
            recipe,
            product,
            price,
            quantity,
            overrides,
        } => {
            let mut quote = read_draft(draft)?;

            let (product, unit_price) = match (recipe, price) {
                (Some(recipe), _) => {
                    let service = open_service(config_path).await?;
                    let item = service
                        .quote_item_from_recipe(&recipe, quantity, &overrides.to_form())
                        .await?;
                    (product.unwrap_or(item.product), item.unit_price)
                }
                (None, Some(price)) => (
                    product.context("--product is required with --price")?,
                    price,
                ),
                (None, None) => bail!("either --recipe or --price is required"),
            };

            let item = quote.add_item(product, quantity, unit_price)?.clone();
            write_draft(draft, &quote)?;
            println!(
                "{}",
                format!(
                    "✓ Added {}x {} at {} (item {})",
                    item.quantity.normalize(),
                    item.product,
                    format_brl(item.unit_price),
                    quote.items.len()
                )
                .green()
            );
        }
        QuoteCommands::Remove { number } => {
            let mut quote = read_draft(draft)?;
            // Items are numbered from 1 on screen
            let Some(index) = number.checked_sub(1) else {
                bail!("Item numbers start at 1");
            };
            let removed = quote.remove_item(index)?;
            write_draft(draft, &quote)?;
            println!(
                "{}",
                format!("✓ Removed item {} ({})", number, removed.product).green()
            );
        }
        QuoteCommands::Show => {
            let quote = read_draft(draft)?;
            let service = open_service(config_path).await?;
            show(&service, &quote)?;
        }
        QuoteCommands::Export { format, output } => {
            let quote = read_draft(draft)?;
            let service = open_service(config_path).await?;

            match (format, output) {
                (ExportFormat::Text, None) => println!("{}", service.quote_text(&quote)?),
                (ExportFormat::Text, Some(path)) => {
                    std::fs::write(&path, service.quote_text(&quote)?)?;
                    println!("{}", format!("✓ Wrote {}", path.display()).green());
                }
                (ExportFormat::Pdf, output) => {
                    let path = output.unwrap_or_else(|| "orcamento.pdf".into());
                    std::fs::write(&path, service.quote_pdf(&quote)?)?;
                    println!("{}", format!("✓ Wrote {}", path.display()).green());
                }
            }
        }
        QuoteCommands::Save => {
            let quote = read_draft(draft)?;
            let service = open_service(config_path).await?;
            let record = service.save_quote(&quote).await?;
            println!(
                "{}",
                format!(
                    "✓ Saved quote for '{}': {} ({})",
                    record.client,
                    format_brl(record.total),
                    record.id
                )
                .green()
            );
        }
    }

    Ok(())
}

fn show(service: &PricingService, quote: &Quote) -> Result<()> {
    let totals = service.quote_totals(quote)?;

    println!("{}", format!("Orçamento - {}", quote.client_name).bold());
    if !quote.phone.is_empty() {
        println!("  Telefone: {}", quote.phone);
    }
    println!("  Data: {}", quote.date.format("%d/%m/%Y"));
    println!();

    if quote.items.is_empty() {
        println!("{}", "  No items yet (use `quote add`)".yellow());
    }
    for (i, item) in quote.items.iter().enumerate() {
        println!(
            "  {:>2}. {:<28} {:>6} x {:>12} = {:>12}",
            i + 1,
            item.product,
            item.quantity.normalize().to_string(),
            format_brl(item.unit_price),
            format_brl(item.subtotal())
        );
    }
    println!();

    println!("  {:<24} {:>12}", "Subtotal", format_brl(totals.items_subtotal));
    println!("  {:<24} {:>12}", "Embalagem", format_brl(totals.packaging_fee));
    println!(
        "  {:<24} {:>12}",
        format!("Entrega ({} km)", quote.distance_km.normalize()),
        format_brl(totals.delivery_fee)
    );
    println!(
        "  {:<24} {:>12}",
        format!("Taxa ({})", totals.payment_method),
        format_brl(totals.payment_fee)
    );
    println!(
        "{}",
        format!("  {:<24} {:>12}", "TOTAL", format_brl(totals.total))
            .green()
            .bold()
    );
    Ok(())
}

pub fn read_draft(path: &Path) -> Result<Quote> {
    let raw = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read draft {} (start one with `quote new`)",
            path.display()
        )
    })?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid draft file {}", path.display()))
}

pub fn write_draft(path: &Path, quote: &Quote) -> Result<()> {
    let json = serde_json::to_string_pretty(quote)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write draft {}", path.display()))?;
    info!("Draft written to {}", path.display());
    Ok(())
}
