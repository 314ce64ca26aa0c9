use anyhow::{Context, Result};
use colored::Colorize;
use precificador::recipe::{RecipeLine, SavedRecipe};
use std::path::Path;

use super::open_service;

pub async fn list(config_path: &Path) -> Result<()> {
    let service = open_service(config_path).await?;
    let names = service.list_recipes().await?;

    if names.is_empty() {
        println!("{}", "No saved recipes".yellow());
        return Ok(());
    }

    println!("{}", format!("{} recipes", names.len()).bold());
    for name in names {
        println!("  {}", name);
    }
    Ok(())
}

pub async fn show(config_path: &Path, name: &str) -> Result<()> {
    let service = open_service(config_path).await?;
    let recipe = service.get_recipe(name).await?;

    println!("{}", recipe.name.bold());
    for (i, line) in recipe.lines.iter().enumerate() {
        println!(
            "  {:>2}. {:<28} {:>10} {}",
            i + 1,
            line.ingredient,
            line.quantity.normalize().to_string(),
            line.unit
        );
    }
    Ok(())
}

pub async fn save(config_path: &Path, name: &str, file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read recipe file {}", file.display()))?;
    let lines: Vec<RecipeLine> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid recipe file {}", file.display()))?;

    let recipe = SavedRecipe::new(name, lines)?;
    let service = open_service(config_path).await?;
    service.save_recipe(&recipe).await?;

    println!(
        "{}",
        format!("✓ Saved recipe '{}' ({} lines)", recipe.name, recipe.lines.len()).green()
    );
    Ok(())
}

pub async fn delete(config_path: &Path, name: &str) -> Result<()> {
    let service = open_service(config_path).await?;
    service.delete_recipe(name).await?;
    println!("{}", format!("✓ Deleted recipe '{}'", name.trim()).green());
    Ok(())
}
