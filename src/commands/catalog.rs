use anyhow::Result;
use colored::Colorize;
use precificador::money::format_brl;
use std::path::Path;

use super::{open_service, print_warnings};

/// Execute the catalog list command
pub async fn list(config_path: &Path) -> Result<()> {
    let service = open_service(config_path).await?;
    let load = service.load_catalog().await?;

    print_warnings(&load.warnings);

    if load.catalog.is_empty() {
        println!(
            "{}",
            "Catalog is empty: pricing is disabled until it can be loaded".red()
        );
        return Ok(());
    }

    println!(
        "{}",
        format!("{} ingredients", load.catalog.len()).bold()
    );
    println!();
    println!("  {:<32} {:<8} {:>12}", "Ingrediente".cyan(), "Unidade".cyan(), "Preço".cyan());
    for ingredient in load.catalog.ingredients() {
        println!(
            "  {:<32} {:<8} {:>12}",
            ingredient.name,
            ingredient.unit.as_str(),
            format_brl(ingredient.unit_price)
        );
    }

    Ok(())
}
