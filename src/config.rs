use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::pricing::PaymentFeeBase;
use crate::units::ConversionPolicy;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub business: BusinessConfig,
    pub catalog: CatalogConfig,
    pub storage: StorageConfig,
    pub defaults: PricingDefaults,
    pub delivery: DeliveryConfig,
    pub payment: PaymentConfig,
    pub pricing: PricingPolicyConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BusinessConfig {
    /// Shown at the top of exported quotes
    pub name: String,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            name: "Doces & Salgados".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSourceKind {
    #[default]
    File,
    Url,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub source: CatalogSourceKind,
    pub path: PathBuf,
    /// Published-as-CSV spreadsheet URL
    pub url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSourceKind::File,
            path: PathBuf::from("ingredientes.csv"),
            url: None,
            timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Csv,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: String,
    pub recipes_path: PathBuf,
    pub quotes_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            database_url: "sqlite://precificador.db?mode=rwc".to_string(),
            recipes_path: PathBuf::from("receitas.csv"),
            quotes_path: PathBuf::from("orcamentos.csv"),
        }
    }
}

/// Values used when a form leaves a field empty
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PricingDefaults {
    pub waste_pct: Decimal,
    pub overhead_pct: Decimal,
    pub packaging_fee: Decimal,
    pub margin_pct: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub free_km: Decimal,
    pub per_km_rate: Decimal,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub default_method: String,
    /// Method name -> fee percent
    pub methods: BTreeMap<String, Decimal>,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        let mut methods = BTreeMap::new();
        methods.insert("pix".to_string(), Decimal::ZERO);
        methods.insert("dinheiro".to_string(), Decimal::ZERO);
        methods.insert("debito".to_string(), dec!(1.99));
        methods.insert("credito".to_string(), dec!(4.99));

        Self {
            default_method: "pix".to_string(),
            methods,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PricingPolicyConfig {
    pub conversion: ConversionPolicy,
    pub payment_fee_base: PaymentFeeBase,
    pub packaging_in_cmv: bool,
}

impl Default for PricingPolicyConfig {
    fn default() -> Self {
        Self {
            conversion: ConversionPolicy::Strict,
            payment_fee_base: PaymentFeeBase::SaleAndDelivery,
            packaging_in_cmv: true,
        }
    }
}

/// Load configuration from an optional TOML file layered with
/// `PRECIFICADOR__SECTION__KEY` environment variables.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("PRECIFICADOR").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.business.name.trim().is_empty() {
        anyhow::bail!("business.name cannot be empty");
    }

    let defaults = [
        ("defaults.waste_pct", cfg.defaults.waste_pct),
        ("defaults.overhead_pct", cfg.defaults.overhead_pct),
        ("defaults.packaging_fee", cfg.defaults.packaging_fee),
        ("defaults.margin_pct", cfg.defaults.margin_pct),
        ("delivery.free_km", cfg.delivery.free_km),
        ("delivery.per_km_rate", cfg.delivery.per_km_rate),
    ];
    for (name, value) in defaults {
        if value < Decimal::ZERO {
            anyhow::bail!("{} cannot be negative (got {})", name, value);
        }
    }

    if cfg.payment.methods.is_empty() {
        anyhow::bail!("At least one payment method must be configured");
    }
    for (method, pct) in &cfg.payment.methods {
        if *pct < Decimal::ZERO {
            anyhow::bail!("Payment method '{}' has a negative fee ({})", method, pct);
        }
    }
    let default_method = cfg.payment.default_method.trim().to_lowercase();
    if !cfg
        .payment
        .methods
        .keys()
        .any(|m| m.trim().to_lowercase() == default_method)
    {
        anyhow::bail!(
            "Default payment method '{}' is not in payment.methods",
            cfg.payment.default_method
        );
    }

    if cfg.catalog.source == CatalogSourceKind::Url
        && cfg.catalog.url.as_deref().map_or(true, |u| u.trim().is_empty())
    {
        anyhow::bail!("catalog.url is required when catalog.source = \"url\"");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = Config::default();
        assert!(validate_config(&cfg).is_ok());
        assert_eq!(cfg.defaults.margin_pct, Decimal::ZERO);
        assert_eq!(cfg.payment.methods["credito"], dec!(4.99));
    }

    #[test]
    fn test_validate_rejects_negative_rate() {
        let mut cfg = Config::default();
        cfg.delivery.per_km_rate = dec!(-1);

        let result = validate_config(&cfg);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("delivery.per_km_rate"));
    }

    #[test]
    fn test_validate_rejects_unknown_default_method() {
        let mut cfg = Config::default();
        cfg.payment.default_method = "boleto".to_string();

        let result = validate_config(&cfg);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("boleto"));
    }

    #[test]
    fn test_validate_url_source_needs_url() {
        let mut cfg = Config::default();
        cfg.catalog.source = CatalogSourceKind::Url;
        assert!(validate_config(&cfg).is_err());

        cfg.catalog.url = Some("https://example.com/sheet.csv".to_string());
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_load_config_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("precificador.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[business]
name = "Doceria da Ana"

[defaults]
waste_pct = 5
overhead_pct = 30
packaging_fee = 8.67
margin_pct = 150

[delivery]
free_km = 5
per_km_rate = 2

[pricing]
conversion = "lenient"
payment_fee_base = "sale_only"
"#
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.business.name, "Doceria da Ana");
        assert_eq!(cfg.defaults.packaging_fee, dec!(8.67));
        assert_eq!(cfg.delivery.free_km, dec!(5));
        assert_eq!(cfg.pricing.conversion, ConversionPolicy::Lenient);
        assert_eq!(cfg.pricing.payment_fee_base, PaymentFeeBase::SaleOnly);
        // untouched sections keep their defaults
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.payment.default_method, "pix");
    }

    #[test]
    fn test_load_config_without_file_uses_defaults() {
        let cfg = load_config(Path::new("/nonexistent/precificador.toml")).unwrap();
        assert_eq!(cfg.catalog.path, PathBuf::from("ingredientes.csv"));
        assert_eq!(cfg.storage.backend, StorageBackend::Sqlite);
    }
}
