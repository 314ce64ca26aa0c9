use anyhow::Result;
use colored::Colorize;
use precificador::config::{self, CatalogSourceKind, Config};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Prints the effective configuration (file, environment and defaults
/// merged) as TOML
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;

    println!("{}", "Current Configuration:".green().bold());
    if !config_path.exists() {
        println!(
            "{}",
            format!("({} not found, showing defaults)", config_path.display()).dimmed()
        );
    }
    println!();

    let toml_string = toml::to_string_pretty(&cfg)?;
    println!("{}", toml_string);

    Ok(())
}

/// Execute the config validate command
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!("Validating configuration file {}", config_path.display());

    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("{}", format!("✗ Configuration is invalid: {}", e).red());
            return Err(e);
        }
    };

    println!("{}", "✓ Configuration is valid".green());
    println!();
    print_summary(&cfg);

    info!("Configuration validation successful");
    Ok(())
}

fn print_summary(cfg: &Config) {
    println!("{}", "Summary:".bold());
    println!("  {}: {}", "Business".cyan(), cfg.business.name);
    println!("  {}: {}:{}", "Server".cyan(), cfg.server.host, cfg.server.port);
    println!("  {}: {}", "Catalog".cyan(), catalog_location(cfg));
    println!("  {}: {:?}", "Storage".cyan(), cfg.storage.backend);
    println!(
        "  {}: waste {}%, overhead {}%, packaging {}, margin {}%",
        "Defaults".cyan(),
        cfg.defaults.waste_pct,
        cfg.defaults.overhead_pct,
        cfg.defaults.packaging_fee,
        cfg.defaults.margin_pct
    );
    println!(
        "  {}: free up to {} km, then {} per km",
        "Delivery".cyan(),
        cfg.delivery.free_km,
        cfg.delivery.per_km_rate
    );
    let methods = cfg
        .payment
        .methods
        .iter()
        .map(|(name, pct)| format!("{} {}%", name, pct))
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "  {}: {} (default {})",
        "Payment".cyan(),
        methods,
        cfg.payment.default_method
    );
    println!(
        "  {}: conversion {:?}, fee base {:?}, packaging in CMV {}",
        "Policy".cyan(),
        cfg.pricing.conversion,
        cfg.pricing.payment_fee_base,
        cfg.pricing.packaging_in_cmv
    );
}

fn catalog_location(cfg: &Config) -> String {
    match cfg.catalog.source {
        CatalogSourceKind::File => format!("file {}", cfg.catalog.path.display()),
        CatalogSourceKind::Url => format!(
            "url {} (timeout {}s)",
            cfg.catalog.url.as_deref().unwrap_or(""),
            cfg.catalog.timeout_seconds
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_location() {
        let mut cfg = Config::default();
        assert_eq!(catalog_location(&cfg), "file ingredientes.csv");

        cfg.catalog.source = CatalogSourceKind::Url;
        cfg.catalog.url = Some("https://example.com/pub?output=csv".to_string());
        assert_eq!(
            catalog_location(&cfg),
            "url https://example.com/pub?output=csv (timeout 15s)"
        );
    }

    #[test]
    fn test_default_config_serializes_to_toml() {
        let rendered = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(rendered.contains("[payment.methods]"));
        assert!(rendered.contains("default_method = \"pix\""));
    }
}
