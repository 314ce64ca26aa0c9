use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::PaymentConfig;
use crate::error::AppError;

/// A payment method and the processor fee it carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub name: String,
    pub fee_pct: Decimal,
}

/// Configured payment methods, keyed by normalised name
#[derive(Debug, Clone, Default)]
pub struct PaymentMethods {
    methods: BTreeMap<String, Decimal>,
    default_method: String,
}

impl PaymentMethods {
    pub fn from_config(cfg: &PaymentConfig) -> Self {
        Self {
            methods: cfg
                .methods
                .iter()
                .map(|(name, pct)| (normalize(name), *pct))
                .collect(),
            default_method: normalize(&cfg.default_method),
        }
    }

    /// Resolve a method by name, falling back to the default when `name` is
    /// absent or blank. `fee_override` replaces the configured percentage
    /// for this lookup only.
    pub fn resolve(
        &self,
        name: Option<&str>,
        fee_override: Option<Decimal>,
    ) -> Result<PaymentMethod, AppError> {
        let key = name
            .map(normalize)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.default_method.clone());

        let configured = self
            .methods
            .get(&key)
            .copied()
            .ok_or_else(|| AppError::UnknownPaymentMethod(key.clone()))?;

        let fee_pct = fee_override.unwrap_or(configured);
        if fee_pct < Decimal::ZERO {
            return Err(AppError::ValidationError(format!(
                "payment fee for '{}' cannot be negative",
                key
            )));
        }

        Ok(PaymentMethod { name: key, fee_pct })
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
