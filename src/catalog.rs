//! Ingredient catalog: name, unit and unit price per row.
//!
//! The catalog is read from a CSV file or from a spreadsheet published as CSV.
//! Headers are normalised (trimmed, lower-cased) and a few Portuguese/English
//! aliases are accepted for each column.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{CatalogConfig, CatalogSourceKind};
use crate::error::AppError;
use crate::money::parse_amount;
use crate::units::Unit;
use crate::warnings::PricingWarnings;

const NAME_COLUMNS: &[&str] = &["nome", "name", "ingrediente", "ingredient"];
const UNIT_COLUMNS: &[&str] = &["unidade", "unit"];
const PRICE_COLUMNS: &[&str] = &["preco", "preço", "price", "valor"];

/// One catalog row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub unit: Unit,
    pub unit_price: Decimal,
}

/// Ingredients keyed by normalised name, in file order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    ingredients: Vec<Ingredient>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        let mut catalog = Self::default();
        for ingredient in ingredients {
            catalog.insert(ingredient);
        }
        catalog
    }

    /// Later rows with the same name replace earlier ones
    fn insert(&mut self, ingredient: Ingredient) {
        let key = normalize_name(&ingredient.name);
        match self.index.get(&key) {
            Some(&pos) => self.ingredients[pos] = ingredient,
            None => {
                self.index.insert(key, self.ingredients.len());
                self.ingredients.push(ingredient);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Ingredient> {
        self.index
            .get(&normalize_name(name))
            .map(|&pos| &self.ingredients[pos])
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Catalog plus whatever went wrong while loading it
#[derive(Debug, Clone, Default)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    pub warnings: PricingWarnings,
}

impl CatalogLoad {
    /// Refuse to price against an empty catalog
    pub fn require_catalog(&self) -> Result<&Catalog, AppError> {
        if self.catalog.is_empty() {
            let reason = self
                .warnings
                .warnings()
                .last()
                .map(|w| w.message.clone())
                .unwrap_or_else(|| "catalog has no ingredients".to_string());
            return Err(AppError::CatalogUnavailable(reason));
        }
        Ok(&self.catalog)
    }
}

/// Parse catalog CSV text
pub fn parse_catalog<R: Read>(reader: R) -> Result<CatalogLoad, AppError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let find = |aliases: &[&str]| headers.iter().position(|h| aliases.contains(&h.as_str()));
    let name_col = find(NAME_COLUMNS).ok_or_else(|| {
        AppError::CatalogUnavailable(format!(
            "no name column (expected one of: {})",
            NAME_COLUMNS.join(", ")
        ))
    })?;
    let unit_col = find(UNIT_COLUMNS);
    let price_col = find(PRICE_COLUMNS);

    let mut warnings = PricingWarnings::new();
    if unit_col.is_none() {
        warnings.add_info("Catalog has no unit column, assuming 'unidade'".to_string());
    }
    if price_col.is_none() {
        warnings.add_warning("Catalog has no price column, prices set to 0".to_string());
    }

    let mut ingredients = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        // header is row 1
        let row = i + 2;
        let record = record?;

        let name = record.get(name_col).unwrap_or("").trim();
        if name.is_empty() {
            continue;
        }

        let unit = match unit_col.and_then(|c| record.get(c)).map(str::trim) {
            None | Some("") => Unit::Each,
            Some(raw) => match Unit::parse(raw) {
                Ok(unit) => unit,
                Err(_) => {
                    warnings.add_skipped_row(row, &format!("unknown unit '{}'", raw));
                    continue;
                }
            },
        };

        let unit_price = match price_col.and_then(|c| record.get(c)).and_then(parse_amount) {
            None => Decimal::ZERO,
            Some(Ok(price)) if price >= Decimal::ZERO => price,
            Some(_) => {
                let raw = price_col.and_then(|c| record.get(c)).unwrap_or("");
                warnings.add_skipped_row(row, &format!("invalid price '{}'", raw));
                continue;
            }
        };

        debug!(ingredient = name, %unit, %unit_price, "Catalog row");
        ingredients.push(Ingredient {
            name: name.to_string(),
            unit,
            unit_price,
        });
    }

    Ok(CatalogLoad {
        catalog: Catalog::new(ingredients),
        warnings,
    })
}

/// Where the catalog lives
#[derive(Debug, Clone)]
pub enum CatalogSource {
    File(PathBuf),
    Url { url: String, timeout: Duration },
}

impl CatalogSource {
    pub fn from_config(cfg: &CatalogConfig) -> Result<Self, AppError> {
        match cfg.source {
            CatalogSourceKind::File => Ok(Self::File(cfg.path.clone())),
            CatalogSourceKind::Url => {
                let url = cfg
                    .url
                    .clone()
                    .filter(|u| !u.trim().is_empty())
                    .ok_or_else(|| {
                        AppError::ConfigError("catalog.url is required for source = \"url\"".to_string())
                    })?;
                Ok(Self::Url {
                    url,
                    timeout: Duration::from_secs(cfg.timeout_seconds),
                })
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Url { url, .. } => url.clone(),
        }
    }

    /// Read and parse the catalog, failing on any I/O or format problem
    pub async fn load(&self, client: &reqwest::Client) -> Result<CatalogLoad, AppError> {
        let text = match self {
            Self::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                AppError::CatalogUnavailable(format!("cannot read '{}': {}", path.display(), e))
            })?,
            Self::Url { url, timeout } => fetch_remote_csv(client, url, *timeout).await?,
        };

        let load = parse_catalog(text.as_bytes())?;
        info!(
            "Loaded {} ingredients from {}",
            load.catalog.len(),
            self.describe()
        );
        Ok(load)
    }

    /// Like `load`, but a failure yields an empty catalog and a warning
    pub async fn load_or_empty(&self, client: &reqwest::Client) -> CatalogLoad {
        match self.load(client).await {
            Ok(mut load) => {
                if load.catalog.is_empty() {
                    warn!("Catalog {} is empty", self.describe());
                    load.warnings
                        .add_warning(format!("Catalog '{}' is empty", self.describe()));
                    return load;
                }
                load
            }
            Err(e) => {
                warn!("Failed to load catalog from {}: {}", self.describe(), e);
                crate::metrics::record_catalog_failure();
                let mut warnings = PricingWarnings::new();
                warnings.add_warning(format!(
                    "Catalog '{}' could not be loaded: {}",
                    self.describe(),
                    e
                ));
                CatalogLoad {
                    catalog: Catalog::default(),
                    warnings,
                }
            }
        }
    }
}

async fn fetch_remote_csv(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<String, AppError> {
    info!("Downloading catalog from: {}", url);

    let response = client.get(url).timeout(timeout).send().await?;

    if !response.status().is_success() {
        return Err(AppError::CatalogUnavailable(format!(
            "failed to download catalog: HTTP {}",
            response.status()
        )));
    }

    let content = response.text().await?;
    debug!("Downloaded {} bytes of catalog data", content.len());
    Ok(content)
}
