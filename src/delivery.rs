use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::DeliveryConfig;
use crate::error::AppError;
use crate::money::checked_mul;

/// Distance-based delivery fee: free up to `free_km`, then `per_km_rate`
/// for every kilometre beyond it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRates {
    pub free_km: Decimal,
    pub per_km_rate: Decimal,
}

impl DeliveryRates {
    pub fn new(free_km: Decimal, per_km_rate: Decimal) -> Self {
        Self {
            free_km,
            per_km_rate,
        }
    }

    pub fn from_config(cfg: &DeliveryConfig) -> Self {
        Self::new(cfg.free_km, cfg.per_km_rate)
    }

    /// Kilometres that are charged
    pub fn billable_km(&self, distance_km: Decimal) -> Decimal {
        distance_km.saturating_sub(self.free_km).max(Decimal::ZERO)
    }

    pub fn fee(&self, distance_km: Decimal) -> Result<Decimal, AppError> {
        checked_mul(self.billable_km(distance_km), self.per_km_rate, "delivery fee")
    }
}
