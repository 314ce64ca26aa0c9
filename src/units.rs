use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Unit a quantity or a catalog price is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    Gram,
    Kilogram,
    Milliliter,
    Liter,
    Each,
}

impl Unit {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_lowercase().as_str() {
            "g" | "grama" | "gramas" => Ok(Self::Gram),
            "kg" | "quilo" | "kilo" => Ok(Self::Kilogram),
            "ml" => Ok(Self::Milliliter),
            "l" | "litro" | "litros" => Ok(Self::Liter),
            "unidade" | "unidades" | "un" | "und" | "unit" => Ok(Self::Each),
            _ => Err(AppError::UnknownUnit(raw.trim().to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gram => "g",
            Self::Kilogram => "kg",
            Self::Milliliter => "ml",
            Self::Liter => "L",
            Self::Each => "unidade",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Unit {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.as_str().to_string()
    }
}

/// How unit pairs without a known factor are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionPolicy {
    /// Unmapped pairs are rejected
    #[default]
    Strict,
    /// Unmapped pairs count as 1:1 and are reported as warnings
    Lenient,
}

/// Factor that turns a quantity in `from` into the equivalent quantity in `to`.
///
/// Only mass (g/kg) and volume (ml/L) pairs are known; anything else across
/// different units returns `None`.
pub fn conversion_factor(from: Unit, to: Unit) -> Option<Decimal> {
    use Unit::*;

    match (from, to) {
        (a, b) if a == b => Some(Decimal::ONE),
        (Gram, Kilogram) | (Milliliter, Liter) => Some(dec!(0.001)),
        (Kilogram, Gram) | (Liter, Milliliter) => Some(dec!(1000)),
        _ => None,
    }
}
