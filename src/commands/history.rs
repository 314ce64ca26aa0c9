use anyhow::Result;
use colored::Colorize;
use precificador::money::format_brl;
use std::path::Path;

use super::open_service;

/// Execute the history command
pub async fn execute(config_path: &Path, limit: Option<usize>) -> Result<()> {
    let service = open_service(config_path).await?;
    let quotes = service.list_quotes().await?;

    if quotes.is_empty() {
        println!("{}", "No saved quotes".yellow());
        return Ok(());
    }

    let shown = limit.unwrap_or(quotes.len()).min(quotes.len());
    println!(
        "{}",
        format!("Showing {} of {} quotes", shown, quotes.len()).bold()
    );
    println!();

    for record in quotes.iter().take(shown) {
        println!(
            "{} {} {} {}",
            record.date.format("%d/%m/%Y").to_string().dimmed(),
            record.client.cyan(),
            format_brl(record.total).green(),
            record.phone
        );
        println!("  {}", record.products);
        println!("  {}", record.id.to_string().dimmed());
    }

    Ok(())
}
